//! Mission orchestration for the lander game: configuration loading, the
//! mission state machine and the components it drives.

pub mod content;
mod geometry;
pub mod mission;

pub use content::{
    load_mission_config, parse_mission_config, validate_mission_config, LandingZoneConfig,
    Loadout, MissionConfig, MissionConfigError, MissionModifiers, ObjectiveKind, ObjectiveRule,
    ObjectiveSpec, OrbitalViewConfig, PartialOutcomePolicy, PhaseCompletion, PhaseMode,
    PhaseSpec, Rewards, SpawnConfig, TerrainConfig, ZoneTarget,
};
pub use geometry::Vec2;
pub use mission::{
    EventDispatch, InstrumentReadout, ManualClock, MissionDirector, MissionEvent,
    MissionEventKind, MissionInput, MissionOutcome, MissionPorts, MissionResult, MissionState,
    MissionTimer, MissionView, ObjectiveStatus, PrepareOutcome, SystemClock, TerrainQuery,
    TouchdownPayload, VehicleControl, ZoneInfo,
};
