use tracing::warn;

use crate::content::{SpawnConfig, ANY_MARKED_ZONE_TOKEN, ANY_ZONE_TOKEN};
use crate::geometry::Vec2;

use super::ports::TerrainQuery;

/// Height used when a mission carries no spawn block.
pub const DEFAULT_SPAWN_HEIGHT: f32 = 400.0;

/// Horizontal anchor and surface height a spawn or transition is placed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAnchor {
    pub x: f32,
    pub surface_y: f32,
    pub zone_resolved: bool,
}

/// Resolves a zone to its surface anchor, falling back to the terrain's
/// center column and highest point for empty, wildcard or unknown ids.
pub fn resolve_surface_anchor(zone_id: &str, terrain: &dyn TerrainQuery) -> SurfaceAnchor {
    let zone_id = zone_id.trim();
    let wildcard =
        zone_id.is_empty() || zone_id == ANY_ZONE_TOKEN || zone_id == ANY_MARKED_ZONE_TOKEN;
    if !wildcard {
        if let Some(info) = terrain.landing_zone_info(zone_id) {
            return SurfaceAnchor {
                x: info.center_x + info.spawn_offset.unwrap_or(0.0),
                surface_y: info.surface_y,
                zone_resolved: true,
            };
        }
        warn!(zone_id, "spawn_zone_unresolved_using_terrain_center");
    }
    SurfaceAnchor {
        x: terrain.center_x(),
        surface_y: terrain.highest_surface_y(),
        zone_resolved: false,
    }
}

/// World position for the vehicle at mission start. Up is negative Y, so the
/// height above the surface is subtracted.
pub fn compute_spawn_position(
    zone_id: &str,
    spawn: Option<&SpawnConfig>,
    terrain: &dyn TerrainQuery,
) -> Vec2 {
    let (height_above_surface, x_offset) = match spawn {
        Some(spawn) => (spawn.height_above_surface, spawn.x_offset),
        None => {
            warn!(
                default_height = DEFAULT_SPAWN_HEIGHT,
                "spawn_block_missing_using_default_height"
            );
            (DEFAULT_SPAWN_HEIGHT, 0.0)
        }
    };
    let anchor = resolve_surface_anchor(zone_id, terrain);
    Vec2 {
        x: anchor.x + x_offset,
        y: anchor.surface_y - height_above_surface,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use crate::mission::ports::{TerrainQuery, ZoneInfo};

    #[derive(Debug, Clone, Default)]
    pub(crate) struct StubTerrain {
        pub(crate) highest_surface_y: f32,
        pub(crate) center_x: f32,
        pub(crate) zones: HashMap<String, ZoneInfo>,
    }

    impl StubTerrain {
        pub(crate) fn with_zone(mut self, id: &str, info: ZoneInfo) -> Self {
            self.zones.insert(id.to_string(), info);
            self
        }
    }

    impl TerrainQuery for StubTerrain {
        fn highest_surface_y(&self) -> f32 {
            self.highest_surface_y
        }

        fn center_x(&self) -> f32 {
            self.center_x
        }

        fn landing_zone_info(&self, zone_id: &str) -> Option<ZoneInfo> {
            self.zones.get(zone_id).copied()
        }
    }
}
