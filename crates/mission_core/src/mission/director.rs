//! Mission state machine. Owns the run state and routes every inbound
//! notification to the touchdown gate, phase engine and objective board.
//!
//! All handlers are synchronous and check `state == Running` first; once a
//! terminal state is reached every further notification is a no-op.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::content::{MissionConfig, ObjectiveRule, PartialOutcomePolicy, PhaseSpec};
use crate::geometry::Vec2;

use super::diagnostics::StallWatchdog;
use super::events::{EventDispatch, MissionEvent, MissionEventKind, MissionInput};
use super::objectives::{EndConditionMetrics, Objective, ObjectiveBoard, ObjectiveUpdate};
use super::orbital::{OrbitalSelection, OrbitalSelectionState};
use super::phases::{split_top_level_objectives, PhaseAdvance, PhaseEngine, PhaseError};
use super::ports::{InstrumentReadout, MissionPorts};
use super::result::{build_mission_result, MissionOutcome, MissionResult, ResultInputs};
use super::run_state::RunState;
use super::spawn::compute_spawn_position;
use super::touchdown::{TouchdownDecision, TouchdownGate, TouchdownPayload};

pub const DEFAULT_ORBIT_ALTITUDE_THRESHOLD: f32 = 10_000.0;
const ORBIT_ALTITUDE_DIVISOR: f32 = 3.0;
const ORBIT_ALTITUDE_MARGIN: f32 = 500.0;

pub const REASON_TIME_LIMIT_EXCEEDED: &str = "time_limit_exceeded";
pub const REASON_OBJECTIVES_INCOMPLETE: &str = "objectives_incomplete";
const REASON_LANDER_DESTROYED: &str = "lander_destroyed";
const REASON_PLAYER_DIED: &str = "player_died";
const REASON_ABORTED: &str = "aborted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissionState {
    #[default]
    NotStarted,
    Running,
    Success,
    Partial,
    Fail,
}

impl MissionState {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Fail => "fail",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Partial | Self::Fail)
    }

    fn from_outcome(outcome: MissionOutcome) -> Self {
        match outcome {
            MissionOutcome::Success => Self::Success,
            MissionOutcome::Partial => Self::Partial,
            MissionOutcome::Fail => Self::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Config was empty; nothing changed.
    Rejected,
    /// A mission is running or already prepared and waiting to begin.
    Ignored,
    /// `begin_gameplay` may be called directly.
    Ready,
    /// Gameplay begins once the orbital transition completes.
    AwaitingOrbitalSelection,
}

/// Altitude a return to orbit must clear: the first `return_to_orbit`
/// minimum altitude, else the spawn height, else a fixed fallback.
pub fn orbit_altitude_threshold(config: &MissionConfig, phases: &[PhaseSpec]) -> f32 {
    let from_objectives = phases
        .iter()
        .flat_map(|phase| phase.objectives.iter())
        .chain(config.objectives.iter())
        .find_map(|objective| match objective.rule {
            ObjectiveRule::ReturnToOrbit {
                min_altitude: Some(min_altitude),
            } if min_altitude > 0.0 => Some(min_altitude),
            _ => None,
        });
    if let Some(threshold) = from_objectives {
        return threshold;
    }
    match &config.spawn {
        Some(spawn) if spawn.height_above_surface > 0.0 => spawn.height_above_surface,
        _ => DEFAULT_ORBIT_ALTITUDE_THRESHOLD,
    }
}

/// Raw altitude readings are in different units than the threshold; the
/// reading is divided by 3 and reduced by 500 before comparing.
pub fn orbit_altitude_reached(altitude: f32, threshold: f32) -> bool {
    altitude / ORBIT_ALTITUDE_DIVISOR - ORBIT_ALTITUDE_MARGIN >= threshold
}

pub struct MissionDirector {
    ports: MissionPorts,
    events: EventDispatch,
    config: Option<Arc<MissionConfig>>,
    state: MissionState,
    gameplay_begun: bool,
    run: RunState,
    phases: PhaseEngine,
    objectives: ObjectiveBoard,
    gate: TouchdownGate,
    orbital: OrbitalSelection,
    watchdog: StallWatchdog,
    orbit_threshold: f32,
    last_altitude: f32,
    failure_reason: Option<String>,
    result: Option<MissionResult>,
}

impl MissionDirector {
    pub fn new(ports: MissionPorts) -> Self {
        Self {
            ports,
            events: EventDispatch::default(),
            config: None,
            state: MissionState::NotStarted,
            gameplay_begun: false,
            run: RunState::default(),
            phases: PhaseEngine::default(),
            objectives: ObjectiveBoard::default(),
            gate: TouchdownGate::default(),
            orbital: OrbitalSelection::default(),
            watchdog: StallWatchdog::default(),
            orbit_threshold: DEFAULT_ORBIT_ALTITUDE_THRESHOLD,
            last_altitude: 0.0,
            failure_reason: None,
            result: None,
        }
    }

    pub fn subscribe<F>(&mut self, kind: MissionEventKind, handler: F)
    where
        F: FnMut(&MissionEvent) + 'static,
    {
        self.events.subscribe(kind, handler);
    }

    pub fn events(&self) -> &EventDispatch {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventDispatch {
        &mut self.events
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn config(&self) -> Option<&MissionConfig> {
        self.config.as_deref()
    }

    pub fn current_phase(&self) -> Option<&PhaseSpec> {
        self.phases.current_phase()
    }

    pub fn current_phase_index(&self) -> Option<usize> {
        self.phases.current_index()
    }

    pub fn result(&self) -> Option<&MissionResult> {
        self.result.as_ref()
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn primary_objectives(&self) -> &[Objective] {
        self.objectives.primary()
    }

    pub fn bonus_objectives(&self) -> &[Objective] {
        self.objectives.bonus()
    }

    pub fn orbital_state(&self) -> OrbitalSelectionState {
        self.orbital.state()
    }

    pub fn orbit_threshold(&self) -> f32 {
        self.orbit_threshold
    }

    pub fn touchdown_gate(&self) -> &TouchdownGate {
        &self.gate
    }

    pub fn prepare(&mut self, config: Arc<MissionConfig>) -> PrepareOutcome {
        if self.state == MissionState::Running {
            warn!(
                mission_id = %config.id,
                "prepare_ignored_mission_running"
            );
            return PrepareOutcome::Ignored;
        }
        if self.state == MissionState::NotStarted && self.config.is_some() {
            warn!(
                mission_id = %config.id,
                "prepare_ignored_attempt_already_prepared"
            );
            return PrepareOutcome::Ignored;
        }
        if config.is_empty() {
            warn!("prepare_rejected_empty_mission_config");
            return PrepareOutcome::Rejected;
        }

        let (_, bonus) = split_top_level_objectives(&config);
        let modifiers = config.mission_modifiers;
        self.phases = PhaseEngine::from_config(&config);
        self.objectives = ObjectiveBoard::new(&bonus);
        self.gate = TouchdownGate::new(modifiers.landing_tolerance_mult);
        self.watchdog = StallWatchdog::new(modifiers.stall_warning_seconds);
        self.orbit_threshold = orbit_altitude_threshold(&config, self.phases.phases());
        self.run = RunState::new(config.time_limit_seconds());
        self.last_altitude = 0.0;
        self.state = MissionState::NotStarted;
        self.gameplay_begun = false;
        self.failure_reason = None;
        self.result = None;
        self.orbital.reset();
        self.ports.timer.cancel();

        let orbital = config.orbital_view.enabled;
        info!(
            mission_id = %config.id,
            phase_count = self.phases.len(),
            uses_phases = self.phases.uses_phases(),
            bonus_count = bonus.len(),
            orbit_threshold = self.orbit_threshold,
            orbital,
            "mission_prepared"
        );
        if orbital {
            self.orbital
                .start(&config.orbital_view, self.ports.view.as_mut());
        }
        self.config = Some(config);
        if orbital {
            PrepareOutcome::AwaitingOrbitalSelection
        } else {
            PrepareOutcome::Ready
        }
    }

    pub fn begin_gameplay(&mut self, zone_id: &str) {
        let Some(config) = self.config.clone() else {
            warn!(zone_id, "begin_gameplay_without_prepared_mission");
            return;
        };
        if self.gameplay_begun {
            debug!(zone_id, "begin_gameplay_already_started");
            return;
        }
        if self.orbital.is_active() {
            warn!(
                zone_id,
                orbital_state = self.orbital.state().as_token(),
                "begin_gameplay_waiting_for_orbital_selection"
            );
            return;
        }

        let zone_id = match zone_id.trim() {
            "" => config
                .spawn
                .as_ref()
                .map(|spawn| spawn.zone_id.trim().to_string())
                .unwrap_or_default(),
            zone => zone.to_string(),
        };
        self.run.chosen_zone_id = (!zone_id.is_empty()).then(|| zone_id.clone());

        let position =
            compute_spawn_position(&zone_id, config.spawn.as_ref(), self.ports.terrain.as_ref());
        match self.ports.vehicle.as_mut() {
            Some(vehicle) => {
                let (velocity, loadout) = match &config.spawn {
                    Some(spawn) => (spawn.initial_velocity, spawn.loadout.clone()),
                    None => (Vec2::ZERO, Default::default()),
                };
                vehicle.set_position(position);
                vehicle.set_velocity(velocity);
                vehicle.apply_loadout(&loadout);
                vehicle.set_active(true);
            }
            None => warn!(zone_id = %zone_id, "vehicle_not_bound_spawn_skipped"),
        }

        self.gameplay_begun = true;
        self.state = MissionState::Running;
        info!(
            mission_id = %config.id,
            zone_id = %zone_id,
            spawn_x = position.x,
            spawn_y = position.y,
            "mission_started"
        );
        self.events.emit(MissionEvent::MissionStarted {
            mission_id: config.id.clone(),
            zone_id,
        });

        match self.phases.advance() {
            PhaseAdvance::Advanced(index) => self.on_phase_entered(index),
            PhaseAdvance::Exhausted => {
                self.finish_at_completion_point();
                return;
            }
        }

        if let Some(limit) = self.run.time_limit_seconds {
            self.ports.timer.start(limit);
        }
        self.ports
            .view
            .update_timer(self.run.elapsed_seconds, self.run.time_limit_seconds);
        self.refresh_instruments();
        self.watchdog
            .mark_progress(self.run.elapsed_seconds, "gameplay_started");
    }

    pub fn on_orbital_view_shown(&mut self) {
        if self.config.is_none() || self.gameplay_begun {
            debug!("orbital_view_shown_outside_selection");
            return;
        }
        self.orbital.view_shown();
    }

    pub fn on_orbital_zone_selected(&mut self, zone_id: &str) {
        if self.config.is_none() || self.gameplay_begun {
            debug!(zone_id, "orbital_zone_selection_outside_selection");
            return;
        }
        self.orbital.select_zone(
            zone_id,
            self.ports.terrain.as_ref(),
            self.ports.view.as_mut(),
        );
    }

    pub fn on_orbital_transition_completed(&mut self) {
        if let Some(zone_id) = self.orbital.transition_completed() {
            self.ports.view.hide_orbital_view();
            self.begin_gameplay(&zone_id);
        }
    }

    pub fn on_touchdown(&mut self, payload: &TouchdownPayload) {
        if !self.is_running() {
            return;
        }
        let now_ms = self.ports.clock.now_ms();
        let vehicle_position = self
            .ports
            .vehicle
            .as_ref()
            .and_then(|vehicle| vehicle.position());
        let decision = self
            .gate
            .process(payload, now_ms, &mut self.run, vehicle_position);
        let scaled = match decision {
            TouchdownDecision::Accepted(scaled) => scaled,
            TouchdownDecision::Disarmed => {
                debug!(reason = "disarmed", "touchdown_ignored");
                return;
            }
            TouchdownDecision::Consumed => {
                debug!(reason = "consumed", "touchdown_ignored");
                return;
            }
            TouchdownDecision::Debounced { since_last_ms } => {
                debug!(reason = "debounced", since_last_ms, "touchdown_ignored");
                return;
            }
        };

        let updates = self.objectives.evaluate_landing(&scaled, scaled.successful);
        self.publish_updates(updates);
        self.watchdog
            .mark_progress(self.run.elapsed_seconds, "touchdown");
        self.refresh_instruments();
        if self
            .phases
            .check_touchdown(scaled.zone_id.as_deref(), scaled.successful)
        {
            self.advance_phase();
        }
    }

    pub fn on_lander_destroyed(&mut self, cause: &str) {
        if !self.is_running() {
            return;
        }
        self.run.lander_destroyed = true;
        let reason = non_empty_or(cause, REASON_LANDER_DESTROYED);
        let updates = self.objectives.force_fail_all_pending_primary(reason);
        self.publish_updates(updates);
        self.end_mission(MissionOutcome::Fail, Some(reason));
    }

    pub fn on_fuel_changed(&mut self, ratio: f32) {
        if !self.is_running() {
            return;
        }
        if !ratio.is_finite() {
            warn!(ratio, "fuel_ratio_not_finite_ignored");
            return;
        }
        self.run.fuel_ratio = ratio.clamp(0.0, 1.0);
        self.refresh_instruments();
    }

    pub fn on_altitude_changed(&mut self, meters: f32) {
        if !self.is_running() {
            return;
        }
        if !meters.is_finite() {
            warn!(meters, "altitude_not_finite_ignored");
            return;
        }
        self.last_altitude = meters;
        self.run.max_altitude = self.run.max_altitude.max(meters);
        self.refresh_instruments();

        if !self.run.landed
            || self.run.orbit_reached
            || !orbit_altitude_reached(meters, self.orbit_threshold)
        {
            return;
        }
        self.run.orbit_reached = true;
        self.run.orbit_altitude = Some(meters);
        self.run.orbit_time_seconds = Some(self.run.elapsed_seconds);
        info!(
            altitude = meters,
            threshold = self.orbit_threshold,
            "return_to_orbit_reached"
        );
        let updates = self.objectives.evaluate_orbit(true);
        self.publish_updates(updates);
        self.evaluate_end_conditions();
        self.end_mission(MissionOutcome::Success, None);
    }

    pub fn on_player_died(&mut self, cause: &str, context: &str) {
        if !self.is_running() {
            return;
        }
        self.run.player_died = true;
        self.run.death_cause = Some(cause.to_string());
        info!(cause, context, "player_died");
        let reason = non_empty_or(cause, REASON_PLAYER_DIED);
        let updates = self.objectives.force_fail_all_pending_primary(reason);
        self.publish_updates(updates);
        self.end_mission(MissionOutcome::Fail, Some(reason));
    }

    pub fn on_poi_entered(&mut self, poi_id: &str) {
        if !self.is_running() {
            return;
        }
        self.run.current_poi = Some(poi_id.to_string());
        let updates = self.objectives.evaluate_poi(poi_id);
        self.publish_updates(updates);
        if self.phases.check_poi(poi_id) {
            self.advance_phase();
        }
    }

    pub fn on_poi_exited(&mut self, poi_id: &str) {
        if !self.is_running() {
            return;
        }
        if self.run.current_poi.as_deref() == Some(poi_id) {
            self.run.current_poi = None;
        }
        debug!(poi_id, "poi_exited");
    }

    pub fn on_rescue_interacted(&mut self, target_id: &str) {
        if !self.is_running() {
            return;
        }
        let updates = self.objectives.evaluate_rescue(target_id);
        self.publish_updates(updates);
        if self.phases.check_rescue(target_id) {
            self.advance_phase();
        }
    }

    /// Position report from the active surface vehicle.
    pub fn on_surface_vehicle_moved(&mut self, position: Vec2) {
        if !self.is_running() || !position.is_finite() {
            return;
        }
        let Some(site) = self.run.previous_landing_site else {
            return;
        };
        let distance = position.distance_to(site);
        let updates = self
            .objectives
            .evaluate_previous_landing_site(Some(distance));
        self.publish_updates(updates);
        if self.phases.check_previous_landing_site(distance) {
            self.advance_phase();
        }
    }

    pub fn on_timer_expired(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(limit) = self.run.time_limit_seconds {
            self.run.elapsed_seconds = self.run.elapsed_seconds.max(limit);
        }
        let updates = self
            .objectives
            .force_fail_all_pending_primary(REASON_TIME_LIMIT_EXCEEDED);
        self.publish_updates(updates);
        self.end_mission(MissionOutcome::Fail, Some(REASON_TIME_LIMIT_EXCEEDED));
    }

    /// Advances mission time. Drives the HUD timer and the stall watchdog.
    pub fn advance_time(&mut self, dt_seconds: f32) {
        if !self.is_running() {
            return;
        }
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return;
        }
        self.run.elapsed_seconds += dt_seconds;
        self.ports
            .view
            .update_timer(self.run.elapsed_seconds, self.run.time_limit_seconds);
        let mission_id = self.config.as_ref().map_or("", |config| config.id.as_str());
        let phase_id = self.phases.current_phase().map_or("", |phase| phase.id.as_str());
        self.watchdog
            .observe(self.run.elapsed_seconds, mission_id, phase_id);
    }

    /// Externally triggered completion point.
    pub fn complete_mission(&mut self) {
        if !self.is_running() {
            return;
        }
        self.finish_at_completion_point();
    }

    /// Enters the phase directly after the current one without waiting for
    /// its completion rule, re-initializing objectives and re-arming the
    /// touchdown gate. Backward, skipping and out-of-range requests change
    /// nothing.
    pub fn set_current_phase(&mut self, index: usize) -> Result<(), PhaseError> {
        if !self.is_running() {
            debug!(index, state = self.state.as_token(), "set_current_phase_ignored");
            return Ok(());
        }
        self.phases.set_current_phase(index)?;
        self.on_phase_entered(index);
        Ok(())
    }

    pub fn abort(&mut self, reason: &str) {
        if self.state.is_terminal() {
            debug!(reason, state = self.state.as_token(), "abort_ignored_already_ended");
            return;
        }
        if self.config.is_none() {
            debug!(reason, "abort_ignored_no_mission");
            return;
        }
        if self.orbital.is_active() {
            self.ports.view.hide_orbital_view();
        }
        self.orbital.reset();
        let reason = non_empty_or(reason, REASON_ABORTED);
        self.end_mission(MissionOutcome::Fail, Some(reason));
    }

    pub fn handle(&mut self, input: MissionInput) {
        debug!(kind = input.as_token(), "mission_input_received");
        match input {
            MissionInput::Touchdown(payload) => self.on_touchdown(&payload),
            MissionInput::LanderDestroyed { cause } => self.on_lander_destroyed(&cause),
            MissionInput::FuelChanged { ratio } => self.on_fuel_changed(ratio),
            MissionInput::AltitudeChanged { meters } => self.on_altitude_changed(meters),
            MissionInput::PlayerDied { cause, context } => self.on_player_died(&cause, &context),
            MissionInput::PoiEntered { poi_id } => self.on_poi_entered(&poi_id),
            MissionInput::PoiExited { poi_id } => self.on_poi_exited(&poi_id),
            MissionInput::RescueInteracted { target_id } => self.on_rescue_interacted(&target_id),
            MissionInput::TimerExpired => self.on_timer_expired(),
            MissionInput::SurfaceVehicleMoved { position } => {
                self.on_surface_vehicle_moved(position)
            }
            MissionInput::OrbitalViewShown => self.on_orbital_view_shown(),
            MissionInput::OrbitalZoneSelected { zone_id } => {
                self.on_orbital_zone_selected(&zone_id)
            }
            MissionInput::OrbitalTransitionCompleted => self.on_orbital_transition_completed(),
            MissionInput::BeginGameplay { zone_id } => self.begin_gameplay(&zone_id),
            MissionInput::CompleteMission => self.complete_mission(),
            MissionInput::Abort { reason } => self.abort(&reason),
            MissionInput::Tick { dt_seconds } => self.advance_time(dt_seconds),
        }
    }

    fn is_running(&self) -> bool {
        self.state == MissionState::Running
    }

    fn on_phase_entered(&mut self, index: usize) {
        let Some(phase) = self.phases.current_phase().cloned() else {
            return;
        };
        self.objectives.enter_phase(&phase.objectives);
        self.gate.arm_for_phase(&phase);
        self.watchdog
            .mark_progress(self.run.elapsed_seconds, "phase_entered");
        self.events.emit(MissionEvent::PhaseEntered {
            index,
            phase_id: phase.id.clone(),
        });
        if phase.mode.requires_mode_switch() {
            info!(
                phase_id = %phase.id,
                mode = phase.mode.as_token(),
                "phase_mode_switch_requested"
            );
            self.events.emit(MissionEvent::PhaseModeRequested {
                mode: phase.mode,
                phase,
            });
        }
    }

    fn advance_phase(&mut self) {
        self.evaluate_end_conditions();
        match self.phases.advance() {
            PhaseAdvance::Advanced(index) => self.on_phase_entered(index),
            PhaseAdvance::Exhausted => self.finish_at_completion_point(),
        }
    }

    fn evaluate_end_conditions(&mut self) {
        let updates = self
            .objectives
            .evaluate_end_condition_objectives(EndConditionMetrics {
                elapsed_seconds: self.run.elapsed_seconds,
                fuel_ratio: self.run.fuel_ratio,
                max_hull_damage_ratio: self.run.max_hull_damage_ratio,
            });
        self.publish_updates(updates);
    }

    fn finish_at_completion_point(&mut self) {
        self.evaluate_end_conditions();
        let all_completed =
            !self.objectives.any_primary_pending() && !self.objectives.any_primary_failed();
        let policy = self
            .config
            .as_ref()
            .map(|config| config.mission_modifiers.partial_outcome)
            .unwrap_or_default();
        let completed = self.objectives.completed_primary_count();
        info!(
            completed,
            total = self.objectives.total_primary_count(),
            policy = ?policy,
            "mission_completion_point"
        );
        if all_completed {
            self.end_mission(MissionOutcome::Success, None);
        } else if policy == PartialOutcomePolicy::SomeCompleted && completed > 0 {
            self.end_mission(MissionOutcome::Partial, Some(REASON_OBJECTIVES_INCOMPLETE));
        } else {
            self.end_mission(MissionOutcome::Fail, Some(REASON_OBJECTIVES_INCOMPLETE));
        }
    }

    fn end_mission(&mut self, outcome: MissionOutcome, reason: Option<&str>) {
        if self.state.is_terminal() {
            return;
        }
        let Some(config) = self.config.clone() else {
            return;
        };
        self.state = MissionState::from_outcome(outcome);
        self.failure_reason = reason.map(str::to_string);
        self.ports.timer.cancel();
        self.gate.disarm();

        let result = build_mission_result(ResultInputs {
            config: &config,
            outcome,
            failure_reason: reason,
            run: &self.run,
            objectives: &self.objectives,
            phases_completed: self.phases.completed_count(),
            phase_count: self.phases.len(),
        });
        self.result = Some(result.clone());
        info!(
            mission_id = %config.id,
            outcome = outcome.as_token(),
            reason = reason.unwrap_or(""),
            elapsed_seconds = self.run.elapsed_seconds,
            credits = result.rewards.credits,
            "mission_ended"
        );
        let event = match outcome {
            MissionOutcome::Fail => MissionEvent::MissionFailed {
                mission_id: config.id.clone(),
                reason: reason.unwrap_or_default().to_string(),
                result,
            },
            MissionOutcome::Success | MissionOutcome::Partial => MissionEvent::MissionCompleted {
                mission_id: config.id.clone(),
                result,
            },
        };
        self.events.emit(event);
    }

    fn publish_updates(&mut self, updates: Vec<ObjectiveUpdate>) {
        if updates.is_empty() {
            return;
        }
        self.watchdog
            .mark_progress(self.run.elapsed_seconds, "objective_updated");
        for update in updates {
            self.events.emit(MissionEvent::from(update));
        }
    }

    fn refresh_instruments(&mut self) {
        self.ports.view.update_instruments(InstrumentReadout {
            fuel_ratio: self.run.fuel_ratio,
            altitude: self.last_altitude,
            max_hull_damage_ratio: self.run.max_hull_damage_ratio,
        });
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
