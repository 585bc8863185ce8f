//! Lab theme: conveyor lanes with carts, coolant channels with floating panels

use leap_engine::foundation::math::{constants, Vec3};
use leap_engine::render::{PointLight, SpotLight};

use super::{CollectibleOverride, Theme, ThemeAssets, ThemeKind};
use crate::entity::{Entity, EntityId, EntityKind, Visual};
use crate::level::{Row, Tile};

const CEILING_HEIGHT: f32 = 6.0;
const SPOT_COLOR: [f32; 3] = [0.7, 0.8, 1.0];
const ESCAPE_LEVEL: u32 = 5;

/// Lab row generator
#[derive(Debug, Clone)]
pub struct Lab {
    assets: ThemeAssets,
}

impl Default for Lab {
    fn default() -> Self {
        Self {
            assets: ThemeAssets {
                road_tile: Visual::new("tile", "conveyor.png"),
                water_tile: Visual::new("tile", "coolant.png"),
                grass_tile: Visual::new("tile", "lab_floor.png"),
                vehicle: Visual::new("cart", "cart.png"),
                platform: Visual::new("panel", "panel.png"),
            },
        }
    }
}

impl Theme for Lab {
    fn kind(&self) -> ThemeKind {
        ThemeKind::Lab
    }

    fn parse_row_objects(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Entity> {
        self.assets.row_objects(row, row_index, tiles_per_row)
    }

    fn parse_row_tiles(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Tile> {
        self.assets.row_tiles(row, row_index, tiles_per_row)
    }

    fn setup_point_lights(&self, _entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, PointLight)> {
        Vec::new()
    }

    /// A tracking ceiling spot above every cart
    fn setup_spot_lights(&self, entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, SpotLight)> {
        entities
            .iter()
            .filter(|(_, e)| e.kind() == EntityKind::Vehicle)
            .map(|&(id, e)| {
                let spot = SpotLight::new(
                    Vec3::from(SPOT_COLOR),
                    e.transform.position + Vec3::new(0.0, CEILING_HEIGHT, 0.0),
                    Vec3::new(0.0, -1.0, 0.0),
                    constants::QUARTER_PI * 0.5,
                    constants::QUARTER_PI,
                );
                (id, spot)
            })
            .collect()
    }

    /// The last lab level ends on the escape ship
    fn special_case_collectible(&self, level: u32) -> Option<CollectibleOverride> {
        (level == ESCAPE_LEVEL).then(|| CollectibleOverride {
            visual: Visual::new("ship", "ship.png"),
            scale: 0.04,
            rotation: Vec3::zeros(),
        })
    }

    fn collectible_visual(&self) -> Visual {
        Visual::new("fragment", "fragment_lab.png")
    }

    fn music_track(&self) -> &str {
        "lab_theme"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_ship_only_on_escape_level() {
        let lab = Lab::default();
        let ship = lab.special_case_collectible(5).unwrap();
        assert_eq!(ship.visual, Visual::new("ship", "ship.png"));
        assert_eq!(ship.scale, 0.04);
        assert!(lab.special_case_collectible(4).is_none());
    }

    #[test]
    fn test_spot_light_per_cart() {
        let lab = Lab::default();
        let mut arena: SlotMap<EntityId, Entity> = SlotMap::with_key();
        let cart = arena.insert(Entity::vehicle(
            Visual::new("cart", "cart.png"),
            Vec3::new(3.0, 0.0, -6.0),
            3,
            1.0,
            28.0,
        ));
        arena.insert(Entity::coin(Visual::new("coin", "coin.png"), 3, 4, 14));

        let entities: Vec<(EntityId, &Entity)> = arena.iter().collect();
        let spots = lab.setup_spot_lights(&entities);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].0, cart);
        assert_eq!(spots[0].1.position, Vec3::new(3.0, CEILING_HEIGHT, -6.0));
    }
}
