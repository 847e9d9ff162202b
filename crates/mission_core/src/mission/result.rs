use std::collections::BTreeMap;

use serde::Serialize;

use crate::content::{MissionConfig, ObjectiveKind, Rewards};

use super::objectives::{Objective, ObjectiveBoard, ObjectiveStatus};
use super::run_state::RunState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionOutcome {
    Success,
    Partial,
    Fail,
}

impl MissionOutcome {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveSnapshot {
    pub id: String,
    pub kind: ObjectiveKind,
    pub label: String,
    pub status: ObjectiveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub progress: BTreeMap<String, f32>,
}

impl From<&Objective> for ObjectiveSnapshot {
    fn from(objective: &Objective) -> Self {
        Self {
            id: objective.id().to_string(),
            kind: objective.kind(),
            label: objective.spec().label.clone(),
            status: objective.status(),
            failure_reason: objective.failure_reason().map(str::to_string),
            progress: objective.progress().clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissionStats {
    pub chosen_zone_id: Option<String>,
    pub phases_completed: usize,
    pub phase_count: usize,
    pub touchdown_count: u32,
    pub crash_count: u32,
    pub final_fuel_ratio: f32,
    pub max_hull_damage_ratio: f32,
    pub max_altitude: f32,
    pub orbit_reached: bool,
    pub orbit_altitude: Option<f32>,
    pub orbit_time_seconds: Option<f32>,
    pub lander_destroyed: bool,
    pub player_died: bool,
    pub death_cause: Option<String>,
    pub primary_completed: usize,
    pub primary_total: usize,
    pub bonus_completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionResult {
    pub mission_id: String,
    pub training: bool,
    pub tier: u32,
    pub outcome: MissionOutcome,
    pub failure_reason: Option<String>,
    pub elapsed_seconds: f32,
    pub time_limit_seconds: Option<f32>,
    pub primary_objectives: Vec<ObjectiveSnapshot>,
    pub bonus_objectives: Vec<ObjectiveSnapshot>,
    pub stats: MissionStats,
    pub rewards: Rewards,
}

/// Everything the result is derived from, borrowed at mission end.
#[derive(Debug, Clone, Copy)]
pub struct ResultInputs<'a> {
    pub config: &'a MissionConfig,
    pub outcome: MissionOutcome,
    pub failure_reason: Option<&'a str>,
    pub run: &'a RunState,
    pub objectives: &'a ObjectiveBoard,
    pub phases_completed: usize,
    pub phase_count: usize,
}

pub fn build_mission_result(inputs: ResultInputs<'_>) -> MissionResult {
    let ResultInputs {
        config,
        outcome,
        failure_reason,
        run,
        objectives,
        phases_completed,
        phase_count,
    } = inputs;

    let primary_objectives: Vec<ObjectiveSnapshot> =
        objectives.all_primary().map(ObjectiveSnapshot::from).collect();
    let bonus_objectives: Vec<ObjectiveSnapshot> =
        objectives.bonus().iter().map(ObjectiveSnapshot::from).collect();
    let primary_completed = objectives.completed_primary_count();
    let primary_total = objectives.total_primary_count();
    let bonus_completed = bonus_objectives
        .iter()
        .filter(|snapshot| snapshot.status == ObjectiveStatus::Completed)
        .count();

    let stats = MissionStats {
        chosen_zone_id: run.chosen_zone_id.clone(),
        phases_completed,
        phase_count,
        touchdown_count: run.touchdown_count,
        crash_count: run.crash_count,
        final_fuel_ratio: run.fuel_ratio,
        max_hull_damage_ratio: run.max_hull_damage_ratio,
        max_altitude: run.max_altitude,
        orbit_reached: run.orbit_reached,
        orbit_altitude: run.orbit_altitude,
        orbit_time_seconds: run.orbit_time_seconds,
        lander_destroyed: run.lander_destroyed,
        player_died: run.player_died,
        death_cause: run.death_cause.clone(),
        primary_completed,
        primary_total,
        bonus_completed,
    };

    MissionResult {
        mission_id: config.id.clone(),
        training: config.training,
        tier: config.tier,
        outcome,
        failure_reason: match outcome {
            MissionOutcome::Success => None,
            _ => failure_reason.map(str::to_string),
        },
        elapsed_seconds: run.elapsed_seconds,
        time_limit_seconds: run.time_limit_seconds,
        primary_objectives,
        bonus_objectives,
        stats,
        rewards: granted_rewards(&config.rewards, outcome, primary_completed, primary_total),
    }
}

/// Full rewards on success, credits scaled by completed primaries on a
/// partial outcome, nothing on failure.
pub fn granted_rewards(
    rewards: &Rewards,
    outcome: MissionOutcome,
    primary_completed: usize,
    primary_total: usize,
) -> Rewards {
    match outcome {
        MissionOutcome::Success => rewards.clone(),
        MissionOutcome::Partial if primary_total > 0 => {
            let scaled = u64::from(rewards.credits) * primary_completed as u64
                / primary_total as u64;
            Rewards {
                credits: u32::try_from(scaled).unwrap_or(rewards.credits),
                ..Rewards::default()
            }
        }
        MissionOutcome::Partial | MissionOutcome::Fail => Rewards::default(),
    }
}
