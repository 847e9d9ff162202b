use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::content::{PhaseMode, PhaseSpec, DEFAULT_LANDING_TOLERANCE_MULT};
use crate::geometry::Vec2;

use super::run_state::RunState;

pub const TOUCHDOWN_DEBOUNCE_MS: u64 = 500;
const ARMING_PHASE_ID_MARKERS: [&str; 3] = ["descent", "landing", "legacy"];

/// Contact report from the physics layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TouchdownPayload {
    pub zone_id: Option<String>,
    pub impact_speed: f32,
    pub vertical_speed: f32,
    pub horizontal_speed: f32,
    pub hull_damage_ratio: f32,
    pub max_safe_impact_speed: Option<f32>,
    pub successful: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TouchdownDecision {
    Disarmed,
    Consumed,
    Debounced { since_last_ms: u64 },
    Accepted(TouchdownPayload),
}

/// Decides which contact events reach objective evaluation. At most one
/// successful touchdown is evaluated per phase.
#[derive(Debug, Clone)]
pub struct TouchdownGate {
    armed: bool,
    consumed: bool,
    last_accepted_ms: Option<u64>,
    tolerance_mult: f32,
}

impl Default for TouchdownGate {
    fn default() -> Self {
        Self::new(DEFAULT_LANDING_TOLERANCE_MULT)
    }
}

impl TouchdownGate {
    pub fn new(tolerance_mult: f32) -> Self {
        let mut gate = Self {
            armed: false,
            consumed: false,
            last_accepted_ms: None,
            tolerance_mult: DEFAULT_LANDING_TOLERANCE_MULT,
        };
        gate.set_tolerance_mult(tolerance_mult);
        gate
    }

    pub fn set_tolerance_mult(&mut self, tolerance_mult: f32) {
        if tolerance_mult.is_finite() && tolerance_mult > 0.0 {
            self.tolerance_mult = tolerance_mult;
        } else {
            warn!(
                tolerance_mult,
                fallback = DEFAULT_LANDING_TOLERANCE_MULT,
                "touchdown_tolerance_invalid_using_default"
            );
            self.tolerance_mult = DEFAULT_LANDING_TOLERANCE_MULT;
        }
    }

    pub fn tolerance_mult(&self) -> f32 {
        self.tolerance_mult
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn arm_for_phase(&mut self, phase: &PhaseSpec) {
        self.armed = phase_arms_gate(phase);
        self.consumed = false;
        self.last_accepted_ms = None;
        debug!(
            phase_id = %phase.id,
            mode = phase.mode.as_token(),
            armed = self.armed,
            "touchdown_gate_rearmed"
        );
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Scaled copy of the payload; the caller's values are untouched.
    pub fn apply_forgiveness(&self, payload: &TouchdownPayload) -> TouchdownPayload {
        let mult = self.tolerance_mult;
        let mut scaled = payload.clone();
        scaled.impact_speed = payload.impact_speed / mult;
        scaled.vertical_speed = payload.vertical_speed / mult;
        scaled.horizontal_speed = payload.horizontal_speed / mult;
        if let Some(max_safe) = scaled.max_safe_impact_speed {
            scaled.successful = scaled.impact_speed <= max_safe;
        }
        scaled
    }

    pub fn process(
        &mut self,
        payload: &TouchdownPayload,
        now_ms: u64,
        run: &mut RunState,
        vehicle_position: Option<Vec2>,
    ) -> TouchdownDecision {
        if !self.armed {
            return TouchdownDecision::Disarmed;
        }
        if self.consumed {
            return TouchdownDecision::Consumed;
        }
        if let Some(last) = self.last_accepted_ms {
            let since_last_ms = now_ms.saturating_sub(last);
            if since_last_ms < TOUCHDOWN_DEBOUNCE_MS {
                return TouchdownDecision::Debounced { since_last_ms };
            }
        }

        self.last_accepted_ms = Some(now_ms);
        let scaled = self.apply_forgiveness(payload);
        run.touchdown_count = run.touchdown_count.saturating_add(1);
        run.max_hull_damage_ratio = run.max_hull_damage_ratio.max(payload.hull_damage_ratio);

        if scaled.successful {
            self.consumed = true;
            run.landed = true;
            match vehicle_position {
                Some(position) if run.record_landing_site(position) => info!(
                    x = position.x,
                    y = position.y,
                    "previous_landing_site_recorded"
                ),
                Some(position) => warn!(
                    x = position.x,
                    y = position.y,
                    "previous_landing_site_rejected"
                ),
                None => warn!("previous_landing_site_unavailable_no_vehicle"),
            }
        } else {
            run.crash_count = run.crash_count.saturating_add(1);
        }

        info!(
            zone_id = scaled.zone_id.as_deref().unwrap_or(""),
            raw_impact_speed = payload.impact_speed,
            scaled_impact_speed = scaled.impact_speed,
            successful = scaled.successful,
            "touchdown_accepted"
        );
        TouchdownDecision::Accepted(scaled)
    }
}

fn phase_arms_gate(phase: &PhaseSpec) -> bool {
    phase.mode == PhaseMode::Lander
        && ARMING_PHASE_ID_MARKERS
            .iter()
            .any(|marker| phase.id.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PhaseCompletion;

    fn phase(id: &str, mode: PhaseMode) -> PhaseSpec {
        PhaseSpec {
            id: id.to_string(),
            mode,
            objectives: Vec::new(),
            completion: PhaseCompletion::Legacy,
        }
    }

    fn armed_gate(mult: f32) -> TouchdownGate {
        let mut gate = TouchdownGate::new(mult);
        gate.arm_for_phase(&phase("descent", PhaseMode::Lander));
        gate
    }

    fn crash(speed: f32) -> TouchdownPayload {
        TouchdownPayload {
            impact_speed: speed,
            hull_damage_ratio: 0.5,
            successful: false,
            ..TouchdownPayload::default()
        }
    }

    #[test]
    fn arming_follows_phase_naming_convention() {
        let mut gate = TouchdownGate::default();
        for (id, mode, expected) in [
            ("descent", PhaseMode::Lander, true),
            ("final_landing", PhaseMode::Lander, true),
            ("legacy", PhaseMode::Lander, true),
            ("ascent", PhaseMode::Lander, false),
            ("descent", PhaseMode::Buggy, false),
            ("landing", PhaseMode::Rescue, false),
        ] {
            gate.arm_for_phase(&phase(id, mode));
            assert_eq!(gate.is_armed(), expected, "{id} {mode:?}");
        }
    }

    #[test]
    fn tolerance_scales_impact_metrics() {
        let gate = TouchdownGate::new(2.0);
        let payload = TouchdownPayload {
            impact_speed: 40.0,
            vertical_speed: 30.0,
            horizontal_speed: 10.0,
            hull_damage_ratio: 0.2,
            successful: true,
            ..TouchdownPayload::default()
        };
        let scaled = gate.apply_forgiveness(&payload);
        assert_eq!(scaled.impact_speed, 20.0);
        assert_eq!(scaled.vertical_speed, 15.0);
        assert_eq!(scaled.horizontal_speed, 5.0);
        assert_eq!(scaled.hull_damage_ratio, 0.2);
        assert_eq!(payload.impact_speed, 40.0);
    }

    #[test]
    fn max_safe_speed_rederives_success() {
        let gate = TouchdownGate::new(2.0);
        let payload = TouchdownPayload {
            impact_speed: 40.0,
            max_safe_impact_speed: Some(25.0),
            successful: false,
            ..TouchdownPayload::default()
        };
        assert!(gate.apply_forgiveness(&payload).successful);

        let payload = TouchdownPayload {
            impact_speed: 60.0,
            max_safe_impact_speed: Some(25.0),
            successful: true,
            ..TouchdownPayload::default()
        };
        assert!(!gate.apply_forgiveness(&payload).successful);
    }

    #[test]
    fn invalid_tolerance_falls_back_to_default() {
        assert_eq!(
            TouchdownGate::new(0.0).tolerance_mult(),
            DEFAULT_LANDING_TOLERANCE_MULT
        );
        assert_eq!(
            TouchdownGate::new(-3.0).tolerance_mult(),
            DEFAULT_LANDING_TOLERANCE_MULT
        );
    }

    #[test]
    fn rapid_touchdowns_are_debounced() {
        let mut gate = armed_gate(1.0);
        let mut run = RunState::new(None);
        assert!(matches!(
            gate.process(&crash(10.0), 1_000, &mut run, None),
            TouchdownDecision::Accepted(_)
        ));
        assert_eq!(
            gate.process(&crash(10.0), 1_499, &mut run, None),
            TouchdownDecision::Debounced { since_last_ms: 499 }
        );
        assert_eq!(run.touchdown_count, 1);
        assert_eq!(run.crash_count, 1);
    }

    #[test]
    fn spaced_touchdowns_are_both_evaluated() {
        let mut gate = armed_gate(1.0);
        let mut run = RunState::new(None);
        assert!(matches!(
            gate.process(&crash(10.0), 1_000, &mut run, None),
            TouchdownDecision::Accepted(_)
        ));
        assert!(matches!(
            gate.process(&crash(10.0), 1_500, &mut run, None),
            TouchdownDecision::Accepted(_)
        ));
        assert_eq!(run.touchdown_count, 2);
        assert_eq!(run.crash_count, 2);
        assert_eq!(run.max_hull_damage_ratio, 0.5);
    }

    #[test]
    fn successful_touchdown_consumes_gate_and_records_site() {
        let mut gate = armed_gate(1.0);
        let mut run = RunState::new(None);
        let landing = TouchdownPayload {
            impact_speed: 5.0,
            successful: true,
            ..TouchdownPayload::default()
        };
        let site = Vec2::new(42.0, -3.0);
        assert!(matches!(
            gate.process(&landing, 0, &mut run, Some(site)),
            TouchdownDecision::Accepted(_)
        ));
        assert!(gate.is_consumed());
        assert!(run.landed);
        assert_eq!(run.previous_landing_site, Some(site));
        assert_eq!(
            gate.process(&landing, 5_000, &mut run, Some(site)),
            TouchdownDecision::Consumed
        );

        gate.arm_for_phase(&phase("second_landing", PhaseMode::Lander));
        assert!(!gate.is_consumed());
        assert!(matches!(
            gate.process(&landing, 5_100, &mut run, Some(site)),
            TouchdownDecision::Accepted(_)
        ));
    }

    #[test]
    fn disarmed_gate_ignores_contacts() {
        let mut gate = TouchdownGate::default();
        gate.arm_for_phase(&phase("drive", PhaseMode::Buggy));
        let mut run = RunState::new(None);
        assert_eq!(
            gate.process(&crash(5.0), 0, &mut run, None),
            TouchdownDecision::Disarmed
        );
        assert_eq!(run.touchdown_count, 0);
    }
}
