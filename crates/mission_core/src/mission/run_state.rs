use crate::geometry::Vec2;

/// Per-attempt runtime fields. Owned by the director and reset on `prepare`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub elapsed_seconds: f32,
    pub time_limit_seconds: Option<f32>,
    pub fuel_ratio: f32,
    pub max_hull_damage_ratio: f32,
    pub max_altitude: f32,
    pub landed: bool,
    pub orbit_reached: bool,
    pub orbit_altitude: Option<f32>,
    pub orbit_time_seconds: Option<f32>,
    pub player_died: bool,
    pub death_cause: Option<String>,
    pub lander_destroyed: bool,
    pub chosen_zone_id: Option<String>,
    pub previous_landing_site: Option<Vec2>,
    pub touchdown_count: u32,
    pub crash_count: u32,
    pub current_poi: Option<String>,
}

impl RunState {
    pub fn new(time_limit_seconds: Option<f32>) -> Self {
        Self {
            time_limit_seconds,
            fuel_ratio: 1.0,
            ..Self::default()
        }
    }

    /// Stores a landing site only when the position is usable.
    pub fn record_landing_site(&mut self, position: Vec2) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.previous_landing_site = Some(position);
        true
    }
}
