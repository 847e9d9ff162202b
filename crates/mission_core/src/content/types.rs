use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

use super::objectives::ObjectiveSpec;
use super::phases::PhaseSpec;

pub const DEFAULT_LANDING_TOLERANCE_MULT: f32 = 1.4;
pub const DEFAULT_ARRIVAL_RADIUS: f32 = 140.0;
pub const DEFAULT_ORBITAL_INSERTION_ALTITUDE: f32 = 3_000.0;
pub const DEFAULT_STALL_WARNING_SECONDS: f32 = 120.0;

/// Read-only description of one mission. Runtime components take snapshots
/// of the pieces they mutate and never write back into it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub id: String,
    pub training: bool,
    pub tier: u32,
    pub spawn: Option<SpawnConfig>,
    pub terrain: TerrainConfig,
    pub phases: Vec<PhaseSpec>,
    pub objectives: Vec<ObjectiveSpec>,
    pub failure_rules: FailureRules,
    pub rewards: Rewards,
    pub mission_modifiers: MissionModifiers,
    pub orbital_view: OrbitalViewConfig,
}

impl MissionConfig {
    pub fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
            && self.spawn.is_none()
            && self.phases.is_empty()
            && self.objectives.is_empty()
    }

    pub fn uses_phases(&self) -> bool {
        !self.phases.is_empty()
    }

    /// Positive time limit, if the mission has one.
    pub fn time_limit_seconds(&self) -> Option<f32> {
        let limit = self.failure_rules.time_limit_seconds;
        (limit > 0.0).then_some(limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub zone_id: String,
    pub height_above_surface: f32,
    pub x_offset: f32,
    pub initial_velocity: Vec2,
    pub loadout: Loadout,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Loadout {
    pub vehicle: String,
    pub fuel_capacity: f32,
    pub thrust_mult: f32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            vehicle: "lander".to_string(),
            fuel_capacity: 100.0,
            thrust_mult: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub baseline: f32,
    pub variation: f32,
    pub landing_zones: Vec<LandingZoneConfig>,
}

impl TerrainConfig {
    pub fn landing_zone(&self, zone_id: &str) -> Option<&LandingZoneConfig> {
        self.landing_zones.iter().find(|zone| zone.id == zone_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LandingZoneConfig {
    pub id: String,
    pub center_x: f32,
    pub width: f32,
    pub spawn_offset: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FailureRules {
    pub time_limit_seconds: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Rewards {
    pub credits: u32,
    pub reputation: u32,
    pub unlocks: Vec<String>,
}

/// What a completion point with unfinished primary objectives resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialOutcomePolicy {
    /// Anything short of every primary completed is a failure.
    Disabled,
    /// At least one completed primary earns a partial outcome.
    #[default]
    SomeCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MissionModifiers {
    pub landing_tolerance_mult: f32,
    pub partial_outcome: PartialOutcomePolicy,
    pub stall_warning_seconds: f32,
}

impl Default for MissionModifiers {
    fn default() -> Self {
        Self {
            landing_tolerance_mult: DEFAULT_LANDING_TOLERANCE_MULT,
            partial_outcome: PartialOutcomePolicy::default(),
            stall_warning_seconds: DEFAULT_STALL_WARNING_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitalViewConfig {
    pub enabled: bool,
    pub insertion_altitude: f32,
    pub transition_seconds: f32,
    pub camera_zoom: f32,
}

impl Default for OrbitalViewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            insertion_altitude: DEFAULT_ORBITAL_INSERTION_ALTITUDE,
            transition_seconds: 2.5,
            camera_zoom: 0.25,
        }
    }
}
