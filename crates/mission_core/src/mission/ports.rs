//! Collaborators the mission core talks to. The host supplies concrete
//! implementations when it builds a [`MissionDirector`](super::MissionDirector).

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::content::{Loadout, OrbitalViewConfig};
use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneInfo {
    pub center_x: f32,
    pub surface_y: f32,
    pub spawn_offset: Option<f32>,
}

pub trait TerrainQuery {
    fn highest_surface_y(&self) -> f32;
    fn center_x(&self) -> f32;
    fn landing_zone_info(&self, zone_id: &str) -> Option<ZoneInfo>;
}

pub trait VehicleControl {
    fn set_position(&mut self, position: Vec2);
    fn set_velocity(&mut self, velocity: Vec2);
    fn apply_loadout(&mut self, loadout: &Loadout);
    fn set_active(&mut self, active: bool);
    fn position(&self) -> Option<Vec2>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InstrumentReadout {
    pub fuel_ratio: f32,
    pub altitude: f32,
    pub max_hull_damage_ratio: f32,
}

/// Fire-and-forget presentation hooks.
pub trait MissionView {
    fn show_orbital_view(&mut self, _config: &OrbitalViewConfig) {}
    fn hide_orbital_view(&mut self) {}
    fn begin_orbital_transition(&mut self, _target: Vec2, _duration_seconds: f32) {}
    fn update_timer(&mut self, _elapsed_seconds: f32, _limit_seconds: Option<f32>) {}
    fn update_instruments(&mut self, _readout: InstrumentReadout) {}
}

/// Single-shot countdown. Expiry is reported back through
/// `MissionDirector::on_timer_expired`.
pub trait MissionTimer {
    fn start(&mut self, seconds: f32);
    fn cancel(&mut self);
}

pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl MissionView for NullView {}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullTimer;

impl MissionTimer for NullTimer {
    fn start(&mut self, _seconds: f32) {}
    fn cancel(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        saturating_millis(self.origin.elapsed())
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Externally driven clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Everything the director needs from the outside world.
pub struct MissionPorts {
    pub terrain: Box<dyn TerrainQuery>,
    pub vehicle: Option<Box<dyn VehicleControl>>,
    pub view: Box<dyn MissionView>,
    pub timer: Box<dyn MissionTimer>,
    pub clock: Box<dyn Clock>,
}

impl MissionPorts {
    pub fn new(terrain: Box<dyn TerrainQuery>) -> Self {
        Self {
            terrain,
            vehicle: None,
            view: Box::new(NullView),
            timer: Box::new(NullTimer),
            clock: Box::new(SystemClock::default()),
        }
    }

    pub fn with_vehicle(mut self, vehicle: Box<dyn VehicleControl>) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    pub fn with_view(mut self, view: Box<dyn MissionView>) -> Self {
        self.view = view;
        self
    }

    pub fn with_timer(mut self, timer: Box<dyn MissionTimer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
