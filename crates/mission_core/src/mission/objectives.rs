use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::content::{ObjectiveKind, ObjectiveRule, ObjectiveSpec};

use super::touchdown::TouchdownPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    Pending,
    Completed,
    Failed,
}

impl ObjectiveStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveTier {
    Primary,
    Bonus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    spec: ObjectiveSpec,
    status: ObjectiveStatus,
    failure_reason: Option<String>,
    progress: BTreeMap<String, f32>,
}

impl Objective {
    pub fn new(spec: ObjectiveSpec) -> Self {
        Self {
            spec,
            status: ObjectiveStatus::Pending,
            failure_reason: None,
            progress: BTreeMap::new(),
        }
    }

    pub fn spec(&self) -> &ObjectiveSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.spec.kind()
    }

    pub fn status(&self) -> ObjectiveStatus {
        self.status
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn progress(&self) -> &BTreeMap<String, f32> {
        &self.progress
    }

    pub fn is_pending(&self) -> bool {
        self.status == ObjectiveStatus::Pending
    }

    /// Only pending objectives move; completed and failed are terminal.
    fn complete(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = ObjectiveStatus::Completed;
        true
    }

    fn fail(&mut self, reason: &str) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = ObjectiveStatus::Failed;
        self.failure_reason = Some(reason.to_string());
        true
    }

    fn note_progress(&mut self, key: &str, value: f32) {
        self.progress.insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveUpdate {
    pub objective_id: String,
    pub tier: ObjectiveTier,
    pub status: ObjectiveStatus,
}

/// Values the end-of-mission objectives are judged against.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EndConditionMetrics {
    pub elapsed_seconds: f32,
    pub fuel_ratio: f32,
    pub max_hull_damage_ratio: f32,
}

enum Verdict {
    Complete,
    Fail(&'static str),
    Skip,
}

/// Objective engine: primary objectives of the active phase, primaries
/// archived from earlier phases, and mission-long bonus objectives.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveBoard {
    primary: Vec<Objective>,
    archived_primary: Vec<Objective>,
    bonus: Vec<Objective>,
}

impl ObjectiveBoard {
    pub fn new(bonus_specs: &[ObjectiveSpec]) -> Self {
        Self {
            primary: Vec::new(),
            archived_primary: Vec::new(),
            bonus: bonus_specs.iter().cloned().map(Objective::new).collect(),
        }
    }

    /// Replaces the active primaries with fresh copies of `specs`.
    pub fn enter_phase(&mut self, specs: &[ObjectiveSpec]) {
        self.archived_primary.append(&mut self.primary);
        self.primary = specs.iter().cloned().map(Objective::new).collect();
        debug!(
            primary_count = self.primary.len(),
            archived_count = self.archived_primary.len(),
            "objectives_initialized_for_phase"
        );
    }

    pub fn primary(&self) -> &[Objective] {
        &self.primary
    }

    pub fn bonus(&self) -> &[Objective] {
        &self.bonus
    }

    /// Primaries of every phase entered so far, oldest first.
    pub fn all_primary(&self) -> impl Iterator<Item = &Objective> {
        self.archived_primary.iter().chain(self.primary.iter())
    }

    pub fn any_primary_failed(&self) -> bool {
        self.all_primary()
            .any(|objective| objective.status == ObjectiveStatus::Failed)
    }

    pub fn any_primary_pending(&self) -> bool {
        self.all_primary().any(Objective::is_pending)
    }

    pub fn completed_primary_count(&self) -> usize {
        self.all_primary()
            .filter(|objective| objective.status == ObjectiveStatus::Completed)
            .count()
    }

    pub fn total_primary_count(&self) -> usize {
        self.archived_primary.len() + self.primary.len()
    }

    pub fn evaluate_landing(
        &mut self,
        impact: &TouchdownPayload,
        successful: bool,
    ) -> Vec<ObjectiveUpdate> {
        self.evaluate(|objective| match &objective.spec.rule {
            ObjectiveRule::Landing {
                zone_id,
                max_impact_speed,
            } => {
                let zone_ok = zone_id
                    .as_deref()
                    .map_or(true, |target| impact.zone_id.as_deref() == Some(target));
                let speed_ok =
                    *max_impact_speed <= 0.0 || impact.impact_speed <= *max_impact_speed;
                objective.note_progress("impact_speed", impact.impact_speed);
                if successful && zone_ok && speed_ok {
                    Verdict::Complete
                } else {
                    Verdict::Skip
                }
            }
            ObjectiveRule::PrecisionLanding {
                max_hull_damage_ratio,
            } => {
                let within_limit = impact.hull_damage_ratio <= *max_hull_damage_ratio;
                objective.note_progress("hull_damage_ratio", impact.hull_damage_ratio);
                if successful && within_limit {
                    Verdict::Complete
                } else {
                    Verdict::Skip
                }
            }
            ObjectiveRule::LandingAccuracy { zone_id } => {
                if successful && impact.zone_id.as_deref() == Some(zone_id.as_str()) {
                    Verdict::Complete
                } else {
                    Verdict::Skip
                }
            }
            _ => Verdict::Skip,
        })
    }

    pub fn evaluate_poi(&mut self, poi_id: &str) -> Vec<ObjectiveUpdate> {
        self.evaluate(|objective| match &objective.spec.rule {
            ObjectiveRule::ReachPoi { poi_id: target } if target == poi_id => Verdict::Complete,
            _ => Verdict::Skip,
        })
    }

    pub fn evaluate_rescue(&mut self, target_id: &str) -> Vec<ObjectiveUpdate> {
        self.evaluate(|objective| match &objective.spec.rule {
            ObjectiveRule::RescueInteract { target_id: target } if target == target_id => {
                Verdict::Complete
            }
            _ => Verdict::Skip,
        })
    }

    pub fn evaluate_orbit(&mut self, orbit_reached: bool) -> Vec<ObjectiveUpdate> {
        if !orbit_reached {
            return Vec::new();
        }
        self.evaluate(|objective| match objective.spec.rule {
            ObjectiveRule::ReturnToOrbit { .. } => Verdict::Complete,
            _ => Verdict::Skip,
        })
    }

    /// `distance` is `None` while no landing site has been stored.
    pub fn evaluate_previous_landing_site(
        &mut self,
        distance: Option<f32>,
    ) -> Vec<ObjectiveUpdate> {
        let Some(distance) = distance else {
            return Vec::new();
        };
        self.evaluate(|objective| match objective.spec.rule {
            ObjectiveRule::ReachPreviousLandingSite { arrival_radius } => {
                objective.note_progress("distance", distance);
                if distance <= arrival_radius {
                    Verdict::Complete
                } else {
                    Verdict::Skip
                }
            }
            _ => Verdict::Skip,
        })
    }

    /// Final judgement of the time, fuel and damage objectives.
    pub fn evaluate_end_condition_objectives(
        &mut self,
        metrics: EndConditionMetrics,
    ) -> Vec<ObjectiveUpdate> {
        self.evaluate(|objective| match objective.spec.rule {
            ObjectiveRule::TimeUnder { limit_seconds } => {
                objective.note_progress("elapsed_seconds", metrics.elapsed_seconds);
                if metrics.elapsed_seconds <= limit_seconds {
                    Verdict::Complete
                } else {
                    Verdict::Fail("time_exceeded")
                }
            }
            ObjectiveRule::FuelRemaining { min_ratio } => {
                objective.note_progress("fuel_ratio", metrics.fuel_ratio);
                if metrics.fuel_ratio >= min_ratio {
                    Verdict::Complete
                } else {
                    Verdict::Fail("insufficient_fuel")
                }
            }
            ObjectiveRule::NoDamage => {
                objective.note_progress("max_hull_damage_ratio", metrics.max_hull_damage_ratio);
                if metrics.max_hull_damage_ratio <= 0.0 {
                    Verdict::Complete
                } else {
                    Verdict::Fail("hull_damaged")
                }
            }
            _ => Verdict::Skip,
        })
    }

    pub fn force_fail_all_pending_primary(&mut self, reason: &str) -> Vec<ObjectiveUpdate> {
        let mut updates = Vec::new();
        for objective in self
            .archived_primary
            .iter_mut()
            .chain(self.primary.iter_mut())
        {
            if objective.fail(reason) {
                updates.push(update_for(objective, ObjectiveTier::Primary));
            }
        }
        if !updates.is_empty() {
            info!(
                reason,
                failed_count = updates.len(),
                "pending_primary_objectives_force_failed"
            );
        }
        updates
    }

    /// Runs `judge` over pending objectives of the active phase and the
    /// bonus list. Archived primaries belong to finished phases.
    fn evaluate<F>(&mut self, mut judge: F) -> Vec<ObjectiveUpdate>
    where
        F: FnMut(&mut Objective) -> Verdict,
    {
        let mut updates = Vec::new();
        let tiers = [
            (ObjectiveTier::Primary, &mut self.primary),
            (ObjectiveTier::Bonus, &mut self.bonus),
        ];
        for (tier, objectives) in tiers {
            for objective in objectives.iter_mut().filter(|objective| objective.is_pending()) {
                let changed = match judge(objective) {
                    Verdict::Complete => objective.complete(),
                    Verdict::Fail(reason) => objective.fail(reason),
                    Verdict::Skip => false,
                };
                if changed {
                    info!(
                        objective_id = %objective.id(),
                        kind = objective.kind().as_token(),
                        status = ?objective.status(),
                        "objective_status_changed"
                    );
                    updates.push(update_for(objective, tier));
                }
            }
        }
        updates
    }
}

fn update_for(objective: &Objective, tier: ObjectiveTier) -> ObjectiveUpdate {
    ObjectiveUpdate {
        objective_id: objective.id().to_string(),
        tier,
        status: objective.status(),
    }
}
