use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::content::{PhaseMode, PhaseSpec};
use crate::geometry::Vec2;

use super::objectives::{ObjectiveStatus, ObjectiveTier, ObjectiveUpdate};
use super::result::MissionResult;
use super::touchdown::TouchdownPayload;

/// Notifications the director publishes to the surrounding game.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionEvent {
    MissionStarted {
        mission_id: String,
        zone_id: String,
    },
    MissionCompleted {
        mission_id: String,
        result: MissionResult,
    },
    MissionFailed {
        mission_id: String,
        reason: String,
        result: MissionResult,
    },
    PhaseModeRequested {
        mode: PhaseMode,
        phase: PhaseSpec,
    },
    PhaseEntered {
        index: usize,
        phase_id: String,
    },
    ObjectiveUpdated {
        objective_id: String,
        tier: ObjectiveTier,
        status: ObjectiveStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionEventKind {
    MissionStarted,
    MissionCompleted,
    MissionFailed,
    PhaseModeRequested,
    PhaseEntered,
    ObjectiveUpdated,
}

impl MissionEventKind {
    pub const ALL: [Self; 6] = [
        Self::MissionStarted,
        Self::MissionCompleted,
        Self::MissionFailed,
        Self::PhaseModeRequested,
        Self::PhaseEntered,
        Self::ObjectiveUpdated,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::MissionStarted => "mission_started",
            Self::MissionCompleted => "mission_completed",
            Self::MissionFailed => "mission_failed",
            Self::PhaseModeRequested => "phase_mode_requested",
            Self::PhaseEntered => "phase_entered",
            Self::ObjectiveUpdated => "objective_updated",
        }
    }
}

impl MissionEvent {
    pub fn kind(&self) -> MissionEventKind {
        match self {
            Self::MissionStarted { .. } => MissionEventKind::MissionStarted,
            Self::MissionCompleted { .. } => MissionEventKind::MissionCompleted,
            Self::MissionFailed { .. } => MissionEventKind::MissionFailed,
            Self::PhaseModeRequested { .. } => MissionEventKind::PhaseModeRequested,
            Self::PhaseEntered { .. } => MissionEventKind::PhaseEntered,
            Self::ObjectiveUpdated { .. } => MissionEventKind::ObjectiveUpdated,
        }
    }
}

impl From<ObjectiveUpdate> for MissionEvent {
    fn from(update: ObjectiveUpdate) -> Self {
        Self::ObjectiveUpdated {
            objective_id: update.objective_id,
            tier: update.tier,
            status: update.status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissionEventCounts {
    pub total: u32,
    pub mission_started: u32,
    pub mission_completed: u32,
    pub mission_failed: u32,
    pub phase_mode_requested: u32,
    pub phase_entered: u32,
    pub objective_updated: u32,
}

impl MissionEventCounts {
    fn record(&mut self, kind: MissionEventKind) {
        self.total = self.total.saturating_add(1);
        match kind {
            MissionEventKind::MissionStarted => {
                self.mission_started = self.mission_started.saturating_add(1)
            }
            MissionEventKind::MissionCompleted => {
                self.mission_completed = self.mission_completed.saturating_add(1)
            }
            MissionEventKind::MissionFailed => {
                self.mission_failed = self.mission_failed.saturating_add(1)
            }
            MissionEventKind::PhaseModeRequested => {
                self.phase_mode_requested = self.phase_mode_requested.saturating_add(1)
            }
            MissionEventKind::PhaseEntered => {
                self.phase_entered = self.phase_entered.saturating_add(1)
            }
            MissionEventKind::ObjectiveUpdated => {
                self.objective_updated = self.objective_updated.saturating_add(1)
            }
        }
    }
}

type EventHandler = Box<dyn FnMut(&MissionEvent)>;

/// Event kind to handler table. Handlers run synchronously in the order
/// they were registered.
#[derive(Default)]
pub struct EventDispatch {
    handlers: HashMap<MissionEventKind, Vec<EventHandler>>,
    counts: MissionEventCounts,
}

impl EventDispatch {
    pub fn subscribe<F>(&mut self, kind: MissionEventKind, handler: F)
    where
        F: FnMut(&MissionEvent) + 'static,
    {
        self.handlers
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    /// Registers a clone of `handler` for every event kind.
    pub fn subscribe_all<F>(&mut self, handler: F)
    where
        F: FnMut(&MissionEvent) + Clone + 'static,
    {
        for kind in MissionEventKind::ALL {
            self.subscribe(kind, handler.clone());
        }
    }

    pub fn handler_count(&self, kind: MissionEventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn counts(&self) -> MissionEventCounts {
        self.counts
    }

    pub fn emit(&mut self, event: MissionEvent) {
        let kind = event.kind();
        self.counts.record(kind);
        let handlers = self.handlers.get_mut(&kind);
        debug!(
            kind = kind.as_token(),
            handlers = handlers.as_ref().map_or(0, |list| list.len()),
            "mission_event_emitted"
        );
        if let Some(handlers) = handlers {
            for handler in handlers.iter_mut() {
                handler(&event);
            }
        }
    }
}

/// Inbound notification routed through `MissionDirector::handle`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissionInput {
    Touchdown(TouchdownPayload),
    LanderDestroyed {
        #[serde(default)]
        cause: String,
    },
    FuelChanged {
        ratio: f32,
    },
    AltitudeChanged {
        meters: f32,
    },
    PlayerDied {
        #[serde(default)]
        cause: String,
        #[serde(default)]
        context: String,
    },
    PoiEntered {
        poi_id: String,
    },
    PoiExited {
        poi_id: String,
    },
    RescueInteracted {
        target_id: String,
    },
    TimerExpired,
    SurfaceVehicleMoved {
        position: Vec2,
    },
    OrbitalViewShown,
    OrbitalZoneSelected {
        zone_id: String,
    },
    OrbitalTransitionCompleted,
    BeginGameplay {
        #[serde(default)]
        zone_id: String,
    },
    CompleteMission,
    Abort {
        #[serde(default)]
        reason: String,
    },
    Tick {
        dt_seconds: f32,
    },
}

impl MissionInput {
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Touchdown(_) => "touchdown",
            Self::LanderDestroyed { .. } => "lander_destroyed",
            Self::FuelChanged { .. } => "fuel_changed",
            Self::AltitudeChanged { .. } => "altitude_changed",
            Self::PlayerDied { .. } => "player_died",
            Self::PoiEntered { .. } => "poi_entered",
            Self::PoiExited { .. } => "poi_exited",
            Self::RescueInteracted { .. } => "rescue_interacted",
            Self::TimerExpired => "timer_expired",
            Self::SurfaceVehicleMoved { .. } => "surface_vehicle_moved",
            Self::OrbitalViewShown => "orbital_view_shown",
            Self::OrbitalZoneSelected { .. } => "orbital_zone_selected",
            Self::OrbitalTransitionCompleted => "orbital_transition_completed",
            Self::BeginGameplay { .. } => "begin_gameplay",
            Self::CompleteMission => "complete_mission",
            Self::Abort { .. } => "abort",
            Self::Tick { .. } => "tick",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn entered(index: usize) -> MissionEvent {
        MissionEvent::PhaseEntered {
            index,
            phase_id: format!("phase_{index}"),
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatch = EventDispatch::default();
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            dispatch.subscribe(MissionEventKind::PhaseEntered, move |_| {
                log.borrow_mut().push(name)
            });
        }
        dispatch.emit(entered(0));
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn handlers_only_see_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatch = EventDispatch::default();
        let sink = Rc::clone(&seen);
        dispatch.subscribe(MissionEventKind::MissionStarted, move |event| {
            sink.borrow_mut().push(event.kind())
        });
        dispatch.emit(entered(1));
        dispatch.emit(MissionEvent::MissionStarted {
            mission_id: "m".to_string(),
            zone_id: "alpha".to_string(),
        });
        assert_eq!(*seen.borrow(), vec![MissionEventKind::MissionStarted]);
        assert_eq!(dispatch.counts().total, 2);
        assert_eq!(dispatch.counts().phase_entered, 1);
        assert_eq!(dispatch.counts().mission_started, 1);
    }

    #[test]
    fn subscribe_all_covers_every_kind() {
        let total = Rc::new(RefCell::new(0_u32));
        let mut dispatch = EventDispatch::default();
        let sink = Rc::clone(&total);
        dispatch.subscribe_all(move |_| *sink.borrow_mut() += 1);
        for kind in MissionEventKind::ALL {
            assert_eq!(dispatch.handler_count(kind), 1);
        }
        dispatch.emit(entered(0));
        dispatch.emit(MissionEvent::from(ObjectiveUpdate {
            objective_id: "land".to_string(),
            tier: ObjectiveTier::Primary,
            status: ObjectiveStatus::Completed,
        }));
        assert_eq!(*total.borrow(), 2);
    }

    #[test]
    fn inputs_parse_from_tagged_json() {
        let touchdown: MissionInput = serde_json::from_str(
            r#"{"kind":"touchdown","zone_id":"alpha","impact_speed":25.0,"successful":true}"#,
        )
        .expect("touchdown");
        let MissionInput::Touchdown(payload) = touchdown else {
            panic!("expected touchdown");
        };
        assert_eq!(payload.zone_id.as_deref(), Some("alpha"));
        assert_eq!(payload.impact_speed, 25.0);
        assert!(payload.successful);

        let expired: MissionInput =
            serde_json::from_str(r#"{"kind":"timer_expired"}"#).expect("timer");
        assert_eq!(expired, MissionInput::TimerExpired);

        let moved: MissionInput = serde_json::from_str(
            r#"{"kind":"surface_vehicle_moved","position":{"x":4.0,"y":-2.0}}"#,
        )
        .expect("moved");
        assert_eq!(
            moved,
            MissionInput::SurfaceVehicleMoved {
                position: Vec2::new(4.0, -2.0)
            }
        );
        assert_eq!(moved.as_token(), "surface_vehicle_moved");
    }

    #[test]
    fn unknown_input_kind_is_rejected() {
        let err = serde_json::from_str::<MissionInput>(r#"{"kind":"warp_drive"}"#)
            .expect_err("unknown kind");
        assert!(err.to_string().contains("warp_drive"));
    }
}
