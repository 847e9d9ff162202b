mod loader;
mod objectives;
mod phases;
mod types;

pub use loader::{
    load_mission_config, parse_mission_config, validate_mission_config, MissionConfigError,
};
pub use objectives::{
    ObjectiveKind, ObjectiveRule, ObjectiveSpec, ANY_MARKED_ZONE_TOKEN, ANY_ZONE_TOKEN,
};
pub use phases::{PhaseCompletion, PhaseMode, PhaseSpec, ZoneTarget, LEGACY_PHASE_ID};
pub use types::{
    FailureRules, LandingZoneConfig, Loadout, MissionConfig, MissionModifiers,
    OrbitalViewConfig, PartialOutcomePolicy, Rewards, SpawnConfig, TerrainConfig,
    DEFAULT_ARRIVAL_RADIUS, DEFAULT_LANDING_TOLERANCE_MULT, DEFAULT_ORBITAL_INSERTION_ALTITUDE,
    DEFAULT_STALL_WARNING_SECONDS,
};
