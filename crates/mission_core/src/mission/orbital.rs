use tracing::{debug, info, warn};

use crate::content::{OrbitalViewConfig, DEFAULT_ORBITAL_INSERTION_ALTITUDE};
use crate::geometry::Vec2;

use super::ports::{MissionView, TerrainQuery};
use super::spawn::resolve_surface_anchor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrbitalSelectionState {
    #[default]
    Hidden,
    Initializing,
    WaitingForSelection,
    Transitioning,
    Completed,
}

impl OrbitalSelectionState {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Initializing => "initializing",
            Self::WaitingForSelection => "waiting_for_selection",
            Self::Transitioning => "transitioning",
            Self::Completed => "completed",
        }
    }
}

/// Pre-gameplay zone pick made from the orbital view.
#[derive(Debug, Clone, Default)]
pub struct OrbitalSelection {
    state: OrbitalSelectionState,
    config: Option<OrbitalViewConfig>,
    chosen_zone: Option<String>,
    transition_target: Option<Vec2>,
}

impl OrbitalSelection {
    pub fn state(&self) -> OrbitalSelectionState {
        self.state
    }

    pub fn chosen_zone(&self) -> Option<&str> {
        self.chosen_zone.as_deref()
    }

    pub fn transition_target(&self) -> Option<Vec2> {
        self.transition_target
    }

    pub fn is_active(&self) -> bool {
        !matches!(
            self.state,
            OrbitalSelectionState::Hidden | OrbitalSelectionState::Completed
        )
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start(&mut self, config: &OrbitalViewConfig, view: &mut dyn MissionView) {
        if self.is_active() {
            warn!(state = self.state.as_token(), "orbital_selection_already_started");
            return;
        }
        self.reset();
        self.state = OrbitalSelectionState::Initializing;
        self.config = Some(*config);
        view.show_orbital_view(config);
        info!(
            insertion_altitude = config.insertion_altitude,
            "orbital_view_requested"
        );
    }

    /// The view reports it is on screen; zone picks are accepted from here.
    pub fn view_shown(&mut self) -> bool {
        if self.state != OrbitalSelectionState::Initializing {
            debug!(state = self.state.as_token(), "orbital_view_shown_ignored");
            return false;
        }
        self.state = OrbitalSelectionState::WaitingForSelection;
        info!("orbital_selection_waiting");
        true
    }

    /// Accepts the player's zone and starts the descent transition. Returns
    /// the transition target, or `None` when no selection is expected.
    pub fn select_zone(
        &mut self,
        zone_id: &str,
        terrain: &dyn TerrainQuery,
        view: &mut dyn MissionView,
    ) -> Option<Vec2> {
        if self.state != OrbitalSelectionState::WaitingForSelection {
            warn!(
                zone_id,
                state = self.state.as_token(),
                "orbital_zone_selection_ignored"
            );
            return None;
        }
        let (insertion_altitude, transition_seconds) = self
            .config
            .map(|config| (config.insertion_altitude, config.transition_seconds))
            .unwrap_or((DEFAULT_ORBITAL_INSERTION_ALTITUDE, 0.0));
        let insertion_altitude = if insertion_altitude > 0.0 {
            insertion_altitude
        } else {
            DEFAULT_ORBITAL_INSERTION_ALTITUDE
        };
        let anchor = resolve_surface_anchor(zone_id, terrain);
        let target = Vec2::new(anchor.x, anchor.surface_y - insertion_altitude);
        self.chosen_zone = Some(zone_id.to_string());
        self.transition_target = Some(target);
        self.state = OrbitalSelectionState::Transitioning;
        view.begin_orbital_transition(target, transition_seconds);
        info!(
            zone_id,
            zone_resolved = anchor.zone_resolved,
            target_x = target.x,
            target_y = target.y,
            "orbital_transition_started"
        );
        Some(target)
    }

    /// Yields the chosen zone once; later calls return `None`.
    pub fn transition_completed(&mut self) -> Option<String> {
        if self.state != OrbitalSelectionState::Transitioning {
            debug!(
                state = self.state.as_token(),
                "orbital_transition_completion_ignored"
            );
            return None;
        }
        self.state = OrbitalSelectionState::Completed;
        let zone = self.chosen_zone.clone().unwrap_or_default();
        info!(zone_id = %zone, "orbital_selection_completed");
        Some(zone)
    }
}
