use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;

use mission_core::mission::Clock;
use mission_core::{
    MissionConfig, MissionEvent, MissionResult, MissionState, PrepareOutcome, Vec2,
};
use serde::Serialize;
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;
use super::harness::Harness;
use super::replay::ReplayScript;

/// Summary printed to stdout once the replay finishes.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplayReport {
    pub(crate) mission_id: String,
    pub(crate) state: &'static str,
    pub(crate) steps_applied: usize,
    pub(crate) steps_total: usize,
    pub(crate) clock_ms: u64,
    pub(crate) events: Vec<&'static str>,
    pub(crate) vehicle_position: Option<Vec2>,
    pub(crate) result: Option<MissionResult>,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let report = match run_replay(app.config, &app.replay) {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "replay_failed");
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(error = %err, "replay_report_serialize_failed");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Feeds the script into a fresh director on a manual clock. Mission time
/// advances in `tick_ms` steps between inputs and the mission timer fires
/// once its deadline is reached.
pub(crate) fn run_replay(
    config: Arc<MissionConfig>,
    script: &ReplayScript,
) -> Result<ReplayReport, String> {
    let mut harness = Harness::new(&config.terrain);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    harness
        .director
        .events_mut()
        .subscribe_all(move |event: &MissionEvent| {
            sink.borrow_mut().push(event.kind().as_token())
        });

    let mission_id = config.id.clone();
    match harness.director.prepare(config) {
        PrepareOutcome::Rejected => {
            return Err(format!("mission '{mission_id}' was rejected: config is empty"))
        }
        outcome => info!(mission_id = %mission_id, outcome = ?outcome, "replay_mission_prepared"),
    }

    let mut steps_applied = 0;
    for step in &script.steps {
        advance_until(&mut harness, step.at_ms, script.tick_ms);
        if harness.director.state().is_terminal() {
            break;
        }
        if let Some(position) = step.vehicle_position {
            harness.vehicle.borrow_mut().position = Some(position);
        }
        info!(at_ms = step.at_ms, kind = step.input.as_token(), "replay_step");
        harness.director.handle(step.input.clone());
        steps_applied += 1;
        if harness.director.state().is_terminal() {
            break;
        }
    }

    let state = harness.director.state();
    if state == MissionState::Running {
        warn!(mission_id = %mission_id, "replay_ended_with_mission_running");
    }
    let vehicle_position = harness.vehicle.borrow().position;
    let events = events.borrow().clone();
    Ok(ReplayReport {
        mission_id,
        state: state.as_token(),
        steps_applied,
        steps_total: script.steps.len(),
        clock_ms: harness.clock.now_ms(),
        events,
        vehicle_position,
        result: harness.director.result().cloned(),
    })
}

fn advance_until(harness: &mut Harness, target_ms: u64, tick_ms: u64) {
    while harness.clock.now_ms() < target_ms {
        let step_ms = tick_ms.min(target_ms - harness.clock.now_ms());
        harness.clock.advance_ms(step_ms);
        harness.director.advance_time(step_ms as f32 / 1_000.0);
        if let Some(deadline) = harness.timer_deadline_ms.get() {
            if deadline <= harness.clock.now_ms() {
                harness.timer_deadline_ms.set(None);
                harness.director.on_timer_expired();
            }
        }
        if harness.director.state().is_terminal() {
            return;
        }
    }
}
