//! Theme strategies
//!
//! A theme turns a row's declared type into concrete obstacles and ground
//! tiles, and places the extra lights used on night levels. Themes differ in
//! art and lighting; row generation rules are shared through [`ThemeAssets`].

mod city;
mod jungle;
mod lab;

pub use city::City;
pub use jungle::Jungle;
pub use lab::Lab;

use leap_engine::foundation::math::Vec3;
use leap_engine::render::{PointLight, SpotLight};

use crate::entity::{Entity, EntityId, Visual};
use crate::level::{tile_position, ParseError, Row, RowType, Tile, TILE_SIZE};

/// Known themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    /// Streets and rivers
    City,
    /// Dirt tracks and swamps
    Jungle,
    /// Conveyor lanes and coolant
    Lab,
}

impl ThemeKind {
    /// Look up a theme by name, ignoring case
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        match name.to_ascii_lowercase().as_str() {
            "city" => Ok(Self::City),
            "jungle" => Ok(Self::Jungle),
            "lab" => Ok(Self::Lab),
            _ => Err(ParseError::UnknownTheme(name.to_string())),
        }
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::City => "City",
            Self::Jungle => "Jungle",
            Self::Lab => "Lab",
        }
    }

    /// Strategy generating rows for this theme
    pub fn strategy(self) -> Box<dyn Theme> {
        match self {
            Self::City => Box::new(City::default()),
            Self::Jungle => Box::new(Jungle::default()),
            Self::Lab => Box::new(Lab::default()),
        }
    }
}

/// Replacement look for a level's collectible
#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleOverride {
    /// Mesh and texture
    pub visual: Visual,
    /// Uniform scale
    pub scale: f32,
    /// Euler rotation in radians
    pub rotation: Vec3,
}

/// Row generation and lighting for one visual theme
pub trait Theme {
    /// Which theme this is
    fn kind(&self) -> ThemeKind;

    /// Obstacles for `row`, placed at `x = -tiles_per_row * TILE_SIZE` on the row's depth
    fn parse_row_objects(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Entity>;

    /// One ground tile per column of `row`
    fn parse_row_tiles(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Tile>;

    /// Point lights for a night level, each tagged with the obstacle it rides on
    fn setup_point_lights(&self, entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, PointLight)>;

    /// Spot lights for a night level, each tagged with the obstacle it rides on
    fn setup_spot_lights(&self, entities: &[(EntityId, &Entity)]) -> Vec<(EntityId, SpotLight)>;

    /// Per-level replacement for the collectible's look
    fn special_case_collectible(&self, _level: u32) -> Option<CollectibleOverride> {
        None
    }

    /// Coin look
    fn coin_visual(&self) -> Visual {
        Visual::new("coin", "coin.png")
    }

    /// Default collectible look
    fn collectible_visual(&self) -> Visual;

    /// Background music track
    fn music_track(&self) -> &str;
}

/// Art used by a theme's row generator
#[derive(Debug, Clone)]
pub struct ThemeAssets {
    /// Ground tile on traffic rows
    pub road_tile: Visual,
    /// Ground tile on water rows
    pub water_tile: Visual,
    /// Ground tile on safe rows
    pub grass_tile: Visual,
    /// Lethal obstacle
    pub vehicle: Visual,
    /// Rideable obstacle
    pub platform: Visual,
}

impl ThemeAssets {
    /// Obstacles for one row: a vehicle on roads, a platform on water
    pub fn row_objects(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Entity> {
        let lane_half_extent = tiles_per_row as f32 * TILE_SIZE;
        let position = Vec3::new(-lane_half_extent, 0.0, -(row_index as f32) * TILE_SIZE);
        match row.row_type {
            RowType::Road => vec![Entity::vehicle(
                self.vehicle.clone(),
                position,
                row_index,
                row.speed,
                lane_half_extent,
            )],
            RowType::Water => vec![Entity::platform(
                self.platform.clone(),
                position,
                row_index,
                row.speed,
                lane_half_extent,
            )],
            RowType::Grass | RowType::Other(_) => Vec::new(),
        }
    }

    /// Ground tiles for one row
    pub fn row_tiles(&self, row: &Row, row_index: usize, tiles_per_row: usize) -> Vec<Tile> {
        let visual = match row.row_type {
            RowType::Road => &self.road_tile,
            RowType::Water => &self.water_tile,
            RowType::Grass | RowType::Other(_) => &self.grass_tile,
        };
        (0..tiles_per_row)
            .map(|column| Tile {
                position: tile_position(row_index, column, tiles_per_row),
                row: row_index,
                column,
                visual: visual.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_theme_names_are_case_insensitive() {
        assert_eq!(ThemeKind::from_name("City").unwrap(), ThemeKind::City);
        assert_eq!(ThemeKind::from_name("jungle").unwrap(), ThemeKind::Jungle);
        assert_eq!(ThemeKind::from_name("LAB").unwrap(), ThemeKind::Lab);
        assert!(matches!(ThemeKind::from_name("Space"), Err(ParseError::UnknownTheme(_))));
    }

    #[test]
    fn test_strategy_matches_kind() {
        for kind in [ThemeKind::City, ThemeKind::Jungle, ThemeKind::Lab] {
            assert_eq!(kind.strategy().kind(), kind);
            assert_eq!(ThemeKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_row_objects_by_type() {
        let theme = ThemeKind::City.strategy();

        let road = theme.parse_row_objects(&Row::new(RowType::Road, 3.0), 4, 14);
        assert_eq!(road.len(), 1);
        assert_eq!(road[0].kind(), EntityKind::Vehicle);
        assert_eq!(road[0].row, Some(4));
        assert_relative_eq!(road[0].transform.position, Vec3::new(-28.0, 0.0, -8.0));
        assert_relative_eq!(road[0].as_obstacle().unwrap().speed, 3.0);

        let water = theme.parse_row_objects(&Row::new(RowType::Water, -1.0), 2, 14);
        assert_eq!(water[0].kind(), EntityKind::Platform);

        assert!(theme.parse_row_objects(&Row::new(RowType::Grass, 0.0), 1, 14).is_empty());
        assert!(theme
            .parse_row_objects(&Row::new(RowType::Other("bridge".into()), 0.0), 1, 14)
            .is_empty());
    }

    #[test]
    fn test_row_tiles_cover_every_column() {
        let theme = ThemeKind::Jungle.strategy();
        let tiles = theme.parse_row_tiles(&Row::new(RowType::Road, 1.0), 3, 9);

        assert_eq!(tiles.len(), 9);
        for (column, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.row, 3);
            assert_eq!(tile.column, column);
            assert_relative_eq!(tile.position, tile_position(3, column, 9));
        }
    }
}
