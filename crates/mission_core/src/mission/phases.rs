use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::{MissionConfig, ObjectiveSpec, PhaseCompletion, PhaseSpec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("phase index {index} out of range for {len} phase(s)")]
    OutOfRange { index: usize, len: usize },
    #[error("phase index {index} is not the next phase (expected {expected})")]
    NotNext { index: usize, expected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAdvance {
    Advanced(usize),
    Exhausted,
}

/// Splits the top-level objectives into (primary, bonus) lists.
pub fn split_top_level_objectives(config: &MissionConfig) -> (Vec<ObjectiveSpec>, Vec<ObjectiveSpec>) {
    if config.uses_phases() {
        return (Vec::new(), config.objectives.clone());
    }
    config
        .objectives
        .iter()
        .cloned()
        .partition(|objective| !objective.bonus)
}

/// Phase list for one attempt. Configured phases are cloned so runtime
/// mutation never reaches the mission config; missions without phases get a
/// single synthesized legacy phase.
pub fn build_runtime_phases(config: &MissionConfig) -> Vec<PhaseSpec> {
    if config.uses_phases() {
        return config.phases.clone();
    }
    let (primary, _) = split_top_level_objectives(config);
    vec![PhaseSpec::legacy(primary)]
}

#[derive(Debug, Clone, Default)]
pub struct PhaseEngine {
    phases: Vec<PhaseSpec>,
    current: Option<usize>,
    uses_phases: bool,
    exhausted: bool,
}

impl PhaseEngine {
    pub fn from_config(config: &MissionConfig) -> Self {
        let phases = build_runtime_phases(config);
        info!(
            mission_id = %config.id,
            uses_phases = config.uses_phases(),
            phase_count = phases.len(),
            "runtime_phases_built"
        );
        Self {
            phases,
            current: None,
            uses_phases: config.uses_phases(),
            exhausted: false,
        }
    }

    pub fn uses_phases(&self) -> bool {
        self.uses_phases
    }

    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_phase(&self) -> Option<&PhaseSpec> {
        self.current.and_then(|index| self.phases.get(index))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Phases finished so far.
    pub fn completed_count(&self) -> usize {
        match (self.exhausted, self.current) {
            (true, _) => self.phases.len(),
            (false, Some(index)) => index,
            (false, None) => 0,
        }
    }

    /// Index the next transition must target.
    pub fn next_index(&self) -> usize {
        self.current.map_or(0, |index| index + 1)
    }

    /// Enters `index`, which must be in range and directly follow the
    /// current phase.
    pub fn set_current_phase(&mut self, index: usize) -> Result<&PhaseSpec, PhaseError> {
        if index >= self.phases.len() {
            warn!(index, len = self.phases.len(), "phase_index_out_of_range");
            return Err(PhaseError::OutOfRange {
                index,
                len: self.phases.len(),
            });
        }
        let expected = self.next_index();
        if index != expected {
            warn!(index, expected, "phase_transition_not_next");
            return Err(PhaseError::NotNext { index, expected });
        }
        self.current = Some(index);
        let phase = &self.phases[index];
        info!(
            index,
            phase_id = %phase.id,
            mode = phase.mode.as_token(),
            completion = phase.completion.as_token(),
            "phase_entered"
        );
        Ok(phase)
    }

    /// Moves to the next phase. Past the last phase the index stays put and
    /// the caller is told the list is exhausted.
    pub fn advance(&mut self) -> PhaseAdvance {
        let next = self.next_index();
        if next >= self.phases.len() {
            if !self.exhausted {
                info!(phase_count = self.phases.len(), "phases_exhausted");
            }
            self.exhausted = true;
            return PhaseAdvance::Exhausted;
        }
        match self.set_current_phase(next) {
            Ok(_) => PhaseAdvance::Advanced(next),
            Err(_) => PhaseAdvance::Exhausted,
        }
    }

    fn active_completion(&self) -> Option<&PhaseCompletion> {
        if self.exhausted {
            return None;
        }
        self.current_phase().map(|phase| &phase.completion)
    }

    pub fn check_touchdown(&self, landed_zone: Option<&str>, successful: bool) -> bool {
        if !successful {
            return false;
        }
        match self.active_completion() {
            Some(PhaseCompletion::LandedInZone { target }) => {
                let matched = target.matches(landed_zone);
                debug!(
                    landed_zone = landed_zone.unwrap_or(""),
                    matched, "phase_touchdown_check"
                );
                matched
            }
            _ => false,
        }
    }

    pub fn check_poi(&self, poi_id: &str) -> bool {
        matches!(
            self.active_completion(),
            Some(PhaseCompletion::ReachedPoi { poi_id: target }) if target == poi_id
        )
    }

    pub fn check_rescue(&self, target_id: &str) -> bool {
        matches!(
            self.active_completion(),
            Some(PhaseCompletion::RescuedTarget { target_id: target }) if target == target_id
        )
    }

    pub fn check_previous_landing_site(&self, distance: f32) -> bool {
        matches!(
            self.active_completion(),
            Some(PhaseCompletion::ReachedPreviousLandingSite { arrival_radius })
                if distance <= *arrival_radius
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ObjectiveRule, PhaseMode, ZoneTarget};

    fn phase(id: &str, completion: PhaseCompletion) -> PhaseSpec {
        PhaseSpec {
            id: id.to_string(),
            mode: PhaseMode::Lander,
            objectives: Vec::new(),
            completion,
        }
    }

    fn phased_config() -> MissionConfig {
        MissionConfig {
            id: "m".to_string(),
            phases: vec![
                phase(
                    "descent",
                    PhaseCompletion::LandedInZone {
                        target: ZoneTarget::Zone("alpha".to_string()),
                    },
                ),
                phase(
                    "drive",
                    PhaseCompletion::ReachedPoi {
                        poi_id: "crater".to_string(),
                    },
                ),
                phase(
                    "return",
                    PhaseCompletion::ReachedPreviousLandingSite {
                        arrival_radius: 140.0,
                    },
                ),
            ],
            objectives: vec![ObjectiveSpec::new("bonus", ObjectiveRule::NoDamage)],
            ..MissionConfig::default()
        }
    }

    #[test]
    fn legacy_mission_gets_single_phase() {
        let mut bonus = ObjectiveSpec::new("clean", ObjectiveRule::NoDamage);
        bonus.bonus = true;
        let config = MissionConfig {
            id: "m".to_string(),
            objectives: vec![
                ObjectiveSpec::new(
                    "land",
                    ObjectiveRule::Landing {
                        zone_id: None,
                        max_impact_speed: 30.0,
                    },
                ),
                bonus,
            ],
            ..MissionConfig::default()
        };
        let engine = PhaseEngine::from_config(&config);
        assert!(!engine.uses_phases());
        assert_eq!(engine.len(), 1);
        let legacy = &engine.phases()[0];
        assert_eq!(legacy.id, "legacy");
        assert_eq!(legacy.completion, PhaseCompletion::Legacy);
        assert_eq!(legacy.objectives.len(), 1);
        let (primary, bonus) = split_top_level_objectives(&config);
        assert_eq!(primary.len(), 1);
        assert_eq!(bonus.len(), 1);
    }

    #[test]
    fn phased_mission_treats_top_level_objectives_as_bonus() {
        let config = phased_config();
        let (primary, bonus) = split_top_level_objectives(&config);
        assert!(primary.is_empty());
        assert_eq!(bonus.len(), 1);
        let engine = PhaseEngine::from_config(&config);
        assert!(engine.uses_phases());
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn runtime_phases_are_independent_of_config() {
        let config = phased_config();
        let mut phases = build_runtime_phases(&config);
        phases[0].id = "mutated".to_string();
        assert_eq!(config.phases[0].id, "descent");
    }

    #[test]
    fn out_of_range_index_is_reported_not_applied() {
        let mut engine = PhaseEngine::from_config(&phased_config());
        engine.set_current_phase(0).expect("phase");
        let err = engine.set_current_phase(7).expect_err("err");
        assert_eq!(err, PhaseError::OutOfRange { index: 7, len: 3 });
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn backward_and_skipping_transitions_are_rejected() {
        let mut engine = PhaseEngine::from_config(&phased_config());
        assert_eq!(
            engine.set_current_phase(1).expect_err("skip from start"),
            PhaseError::NotNext {
                index: 1,
                expected: 0
            }
        );
        assert_eq!(engine.current_index(), None);

        engine.set_current_phase(0).expect("descent");
        engine.set_current_phase(1).expect("drive");
        assert_eq!(
            engine.set_current_phase(0).expect_err("backward"),
            PhaseError::NotNext {
                index: 0,
                expected: 2
            }
        );
        assert_eq!(
            engine.set_current_phase(1).expect_err("re-enter"),
            PhaseError::NotNext {
                index: 1,
                expected: 2
            }
        );
        assert_eq!(engine.current_index(), Some(1));
        assert_eq!(engine.completed_count(), 1);
    }

    #[test]
    fn nothing_can_be_entered_once_exhausted() {
        let mut engine = PhaseEngine::from_config(&phased_config());
        for _ in 0..4 {
            engine.advance();
        }
        assert!(engine.is_exhausted());
        assert!(engine.set_current_phase(2).is_err());
        assert!(engine.is_exhausted());
        assert_eq!(engine.completed_count(), 3);
    }

    #[test]
    fn rescued_target_phase_advances_on_matching_target_only() {
        let mut config = phased_config();
        config.phases[1].completion = PhaseCompletion::RescuedTarget {
            target_id: "crew_1".to_string(),
        };
        let mut engine = PhaseEngine::from_config(&config);
        engine.set_current_phase(0).expect("descent");
        assert!(!engine.check_rescue("crew_1"));

        engine.set_current_phase(1).expect("rescue");
        assert!(!engine.check_poi("crater"));
        assert!(!engine.check_rescue("crew_2"));
        assert!(engine.check_rescue("crew_1"));
    }

    #[test]
    fn advance_is_monotonic_and_stops_at_the_end() {
        let mut engine = PhaseEngine::from_config(&phased_config());
        assert_eq!(engine.advance(), PhaseAdvance::Advanced(0));
        assert_eq!(engine.advance(), PhaseAdvance::Advanced(1));
        assert_eq!(engine.advance(), PhaseAdvance::Advanced(2));
        assert_eq!(engine.completed_count(), 2);
        assert_eq!(engine.advance(), PhaseAdvance::Exhausted);
        assert_eq!(engine.advance(), PhaseAdvance::Exhausted);
        assert_eq!(engine.current_index(), Some(2));
        assert!(engine.is_exhausted());
        assert_eq!(engine.completed_count(), 3);
    }

    #[test]
    fn completion_checks_only_match_current_phase_type() {
        let mut engine = PhaseEngine::from_config(&phased_config());
        engine.set_current_phase(0).expect("phase");
        assert!(!engine.check_poi("crater"));
        assert!(!engine.check_touchdown(Some("beta"), true));
        assert!(!engine.check_touchdown(Some("alpha"), false));
        assert!(engine.check_touchdown(Some("alpha"), true));

        engine.set_current_phase(1).expect("phase");
        assert!(!engine.check_touchdown(Some("alpha"), true));
        assert!(!engine.check_poi("ridge"));
        assert!(engine.check_poi("crater"));

        engine.set_current_phase(2).expect("phase");
        assert!(!engine.check_previous_landing_site(141.0));
        assert!(engine.check_previous_landing_site(140.0));
    }

    #[test]
    fn legacy_phase_never_auto_advances() {
        let mut engine = PhaseEngine::from_config(&MissionConfig {
            id: "m".to_string(),
            ..MissionConfig::default()
        });
        engine.set_current_phase(0).expect("phase");
        assert!(!engine.check_touchdown(Some("alpha"), true));
        assert!(!engine.check_touchdown(None, true));
        assert!(!engine.check_poi("crater"));
        assert!(!engine.check_rescue("crew"));
        assert!(!engine.check_previous_landing_site(0.0));
    }
}
