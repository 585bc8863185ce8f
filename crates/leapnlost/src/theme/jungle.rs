//! Jungle theme: dirt tracks with rolling boulders, swamps with lilypads

use leap_engine::foundation::math::Vec3;
use leap_engine::render::{PointLight, SpotLight};

use super::{Theme, ThemeAssets, ThemeKind};
use crate::entity::{Entity, EntityId, EntityKind, Visual};
use crate::level::{Row, Tile};

const FIREFLY_COLOR: [f32; 3] = [0.6, 1.0, 0.3];

/// Jungle row generator
#[derive(Debug, Clone)]
pub struct Jungle {
    assets: ThemeAssets,
}

impl Default for Jungle {
    fn default() -> Self {
        Self {
            assets: ThemeAssets {
                road_tile: Visual::new("tile", "dirt.png"),
                water_tile: Visual::new("tile", "swamp.png"),
                grass_tile: Visual::new("tile", "jungle_grass.png"),
                vehicle: Visual::new("boulder", "boulder.png"),
                platform: Visual::new("lilypad", "lilypad.png"),
            },
        }
    }
}

impl Theme for Jungle {
    fn kind(&self) -> ThemeKind {
        ThemeKind::Jungle
    }

    fn parse_row_objects(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Entity> {
        self.assets.row_objects(row, row_index, tiles_per_row)
    }

    fn parse_row_tiles(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Tile> {
        self.assets.row_tiles(row, row_index, tiles_per_row)
    }

    // Fireflies hover over the lilypads
    fn setup_point_lights(&self, entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, PointLight)> {
        entities
            .iter()
            .filter(|(_, e)| e.kind() == EntityKind::Platform)
            .map(|&(id, e)| {
                let position = e.transform.position + Vec3::new(0.0, 1.5, 0.0);
                (id, PointLight::new(Vec3::from(FIREFLY_COLOR), position))
            })
            .collect()
    }

    fn setup_spot_lights(&self, _entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, SpotLight)> {
        Vec::new()
    }

    fn collectible_visual(&self) -> Visual {
        Visual::new("fragment", "fragment_jungle.png")
    }

    fn music_track(&self) -> &str {
        "jungle_theme"
    }
}
