mod diagnostics;
mod director;
mod events;
mod objectives;
mod orbital;
mod phases;
mod ports;
mod result;
mod run_state;
mod spawn;
mod touchdown;

pub use diagnostics::StallWatchdog;
pub use director::{
    orbit_altitude_reached, orbit_altitude_threshold, MissionDirector, MissionState,
    PrepareOutcome, DEFAULT_ORBIT_ALTITUDE_THRESHOLD, REASON_OBJECTIVES_INCOMPLETE,
    REASON_TIME_LIMIT_EXCEEDED,
};
pub use events::{EventDispatch, MissionEvent, MissionEventCounts, MissionEventKind, MissionInput};
pub use objectives::{
    EndConditionMetrics, Objective, ObjectiveBoard, ObjectiveStatus, ObjectiveTier,
    ObjectiveUpdate,
};
pub use orbital::{OrbitalSelection, OrbitalSelectionState};
pub use phases::{
    build_runtime_phases, split_top_level_objectives, PhaseAdvance, PhaseEngine, PhaseError,
};
pub use ports::{
    Clock, InstrumentReadout, ManualClock, MissionPorts, MissionTimer, MissionView, NullTimer,
    NullView, SystemClock, TerrainQuery, VehicleControl, ZoneInfo,
};
pub use result::{
    build_mission_result, granted_rewards, MissionOutcome, MissionResult, MissionStats,
    ObjectiveSnapshot, ResultInputs,
};
pub use run_state::RunState;
pub use spawn::{compute_spawn_position, resolve_surface_anchor, SurfaceAnchor, DEFAULT_SPAWN_HEIGHT};
pub use touchdown::{TouchdownDecision, TouchdownGate, TouchdownPayload, TOUCHDOWN_DEBOUNCE_MS};
