//! Headless stand-ins for the game's terrain, vehicle, HUD and timer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mission_core::mission::Clock;
use mission_core::{
    InstrumentReadout, Loadout, ManualClock, MissionDirector, MissionPorts, MissionTimer,
    MissionView, OrbitalViewConfig, TerrainConfig, TerrainQuery, Vec2, VehicleControl, ZoneInfo,
};
use tracing::{debug, info};

/// Flat ground at the configured baseline. Peaks rise `variation` above it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlatTerrain {
    config: TerrainConfig,
}

impl FlatTerrain {
    pub(crate) fn new(config: TerrainConfig) -> Self {
        Self { config }
    }
}

impl TerrainQuery for FlatTerrain {
    fn highest_surface_y(&self) -> f32 {
        self.config.baseline - self.config.variation.abs()
    }

    fn center_x(&self) -> f32 {
        let zones = &self.config.landing_zones;
        if zones.is_empty() {
            return 0.0;
        }
        zones.iter().map(|zone| zone.center_x).sum::<f32>() / zones.len() as f32
    }

    fn landing_zone_info(&self, zone_id: &str) -> Option<ZoneInfo> {
        self.config.landing_zone(zone_id).map(|zone| ZoneInfo {
            center_x: zone.center_x,
            surface_y: self.config.baseline,
            spawn_offset: zone.spawn_offset,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct VehicleSnapshot {
    pub(crate) position: Option<Vec2>,
    pub(crate) velocity: Vec2,
    pub(crate) loadout: Option<Loadout>,
    pub(crate) active: bool,
}

pub(crate) struct LoggingVehicle {
    state: Rc<RefCell<VehicleSnapshot>>,
}

impl VehicleControl for LoggingVehicle {
    fn set_position(&mut self, position: Vec2) {
        info!(x = position.x, y = position.y, "vehicle_positioned");
        self.state.borrow_mut().position = Some(position);
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.state.borrow_mut().velocity = velocity;
    }

    fn apply_loadout(&mut self, loadout: &Loadout) {
        info!(
            vehicle = %loadout.vehicle,
            fuel_capacity = loadout.fuel_capacity,
            "vehicle_loadout_applied"
        );
        self.state.borrow_mut().loadout = Some(loadout.clone());
    }

    fn set_active(&mut self, active: bool) {
        self.state.borrow_mut().active = active;
    }

    fn position(&self) -> Option<Vec2> {
        self.state.borrow().position
    }
}

pub(crate) struct LoggingView;

impl MissionView for LoggingView {
    fn show_orbital_view(&mut self, config: &OrbitalViewConfig) {
        info!(camera_zoom = config.camera_zoom, "orbital_view_shown");
    }

    fn hide_orbital_view(&mut self) {
        info!("orbital_view_hidden");
    }

    fn begin_orbital_transition(&mut self, target: Vec2, duration_seconds: f32) {
        info!(
            target_x = target.x,
            target_y = target.y,
            duration_seconds,
            "orbital_transition_begun"
        );
    }

    fn update_timer(&mut self, elapsed_seconds: f32, limit_seconds: Option<f32>) {
        debug!(elapsed_seconds, limit_seconds, "hud_timer");
    }

    fn update_instruments(&mut self, readout: InstrumentReadout) {
        debug!(
            fuel_ratio = readout.fuel_ratio,
            altitude = readout.altitude,
            max_hull_damage_ratio = readout.max_hull_damage_ratio,
            "hud_instruments"
        );
    }
}

/// Single-shot timer whose deadline is polled by the replay loop.
pub(crate) struct ReplayTimer {
    clock: ManualClock,
    deadline_ms: Rc<Cell<Option<u64>>>,
}

impl MissionTimer for ReplayTimer {
    fn start(&mut self, seconds: f32) {
        let delay_ms = (seconds.max(0.0) * 1_000.0).round() as u64;
        let deadline = self.clock.now_ms().saturating_add(delay_ms);
        debug!(seconds, deadline_ms = deadline, "mission_timer_started");
        self.deadline_ms.set(Some(deadline));
    }

    fn cancel(&mut self) {
        self.deadline_ms.set(None);
    }
}

pub(crate) struct Harness {
    pub(crate) director: MissionDirector,
    pub(crate) clock: ManualClock,
    pub(crate) timer_deadline_ms: Rc<Cell<Option<u64>>>,
    pub(crate) vehicle: Rc<RefCell<VehicleSnapshot>>,
}

impl Harness {
    pub(crate) fn new(terrain: &TerrainConfig) -> Self {
        let clock = ManualClock::default();
        let timer_deadline_ms = Rc::new(Cell::new(None));
        let vehicle = Rc::new(RefCell::new(VehicleSnapshot::default()));
        let ports = MissionPorts::new(Box::new(FlatTerrain::new(terrain.clone())))
            .with_vehicle(Box::new(LoggingVehicle {
                state: Rc::clone(&vehicle),
            }))
            .with_view(Box::new(LoggingView))
            .with_timer(Box::new(ReplayTimer {
                clock: clock.clone(),
                deadline_ms: Rc::clone(&timer_deadline_ms),
            }))
            .with_clock(Box::new(clock.clone()));
        Self {
            director: MissionDirector::new(ports),
            clock,
            timer_deadline_ms,
            vehicle,
        }
    }
}
