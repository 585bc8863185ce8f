use leap_engine::foundation::math::Vec3;
use leap_engine::render::{PointLight, SpotLight};

use super::{Theme, ThemeAssets, ThemeKind};
use crate::entity::{Entity, EntityId, EntityKind, Visual};
use crate::level::{Row, Tile};

const HEADLIGHT_COLOR: [f32; 3] = [1.0, 0.95, 0.7];

/// Streets with cars, rivers with logs
#[derive(Debug, Clone)]
pub struct City {
    assets: ThemeAssets,
}

impl Default for City {
    fn default() -> Self {
        Self {
            assets: ThemeAssets {
                road_tile: Visual::new("tile", "road.png"),
                water_tile: Visual::new("tile", "river.png"),
                grass_tile: Visual::new("tile", "sidewalk.png"),
                vehicle: Visual::new("car", "car.png"),
                platform: Visual::new("log", "log.png"),
            },
        }
    }
}

impl Theme for City {
    fn kind(&self) -> ThemeKind {
        ThemeKind::City
    }

    fn parse_row_objects(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Entity> {
        self.assets.row_objects(row, row_index, tiles_per_row)
    }

    fn parse_row_tiles(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Tile> {
        self.assets.row_tiles(row, row_index, tiles_per_row)
    }

    /// A headlight glow in front of every car
    fn setup_point_lights(&self, entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, PointLight)> {
        entities
            .iter()
            .filter(|(_, e)| e.kind() == EntityKind::Vehicle)
            .map(|&(id, e)| {
                let position = e.transform.position + Vec3::new(0.0, 1.0, 0.0);
                (id, PointLight::new(Vec3::from(HEADLIGHT_COLOR), position))
            })
            .collect()
    }

    fn setup_spot_lights(&self, _entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, SpotLight)> {
        Vec::new()
    }

    fn collectible_visual(&self) -> Visual {
        Visual::new("fragment", "fragment_city.png")
    }

    fn music_track(&self) -> &str {
        "city_theme"
    }
}
