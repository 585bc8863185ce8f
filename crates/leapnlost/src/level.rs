//! Level model
//!
//! Parses a level description into an immutable [`Level`]: header info plus an
//! ordered list of typed rows. Pure data shaping; generating entities from
//! rows is the theme's job.
//!
//! ```json
//! {
//!   "info": { "theme": "City", "area": 1, "level": 1, "night": false },
//!   "rows": [ { "type": "grass" }, { "type": "road", "speed": 3.5 } ]
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use leap_engine::foundation::math::Vec3;
use serde::Deserialize;
use thiserror::Error;

use crate::entity::Visual;
use crate::theme::ThemeKind;

/// Edge length of one tile in world units
pub const TILE_SIZE: f32 = 2.0;

/// Columns per row when a level does not say otherwise
pub const DEFAULT_TILES_PER_ROW: usize = 14;

/// Smallest row width that still leaves room for coin columns `[2, n-2)`
pub const MIN_TILES_PER_ROW: usize = 5;

/// Errors raised while reading or parsing a level description
#[derive(Debug, Error)]
pub enum ParseError {
    /// The level file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The description is not valid level JSON
    #[error("Malformed level data: {0}")]
    Json(#[from] serde_json::Error),

    /// The header names a theme with no generator
    #[error("Unknown level theme: {0:?}")]
    UnknownTheme(String),

    /// The level has no rows
    #[error("Level has no rows")]
    EmptyLevel,

    /// The row width cannot hold the coin band
    #[error("tilesPerRow must be at least 5, got {0}")]
    InvalidTilesPerRow(usize),

    /// Area and level numbers are 1-based
    #[error("Invalid level identifier {area}-{level}")]
    InvalidIdentifier {
        /// Area number from the header
        area: u32,
        /// Level number from the header
        level: u32,
    },

    /// No description exists for this area/level
    #[error("Level {area}-{level} not found")]
    NotFound {
        /// Requested area
        area: u32,
        /// Requested level
        level: u32,
    },
}

/// Declared type of a row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RowType {
    /// Traffic lane; spawns lethal vehicles
    Road,
    /// River lane; spawns rideable platforms, lethal to stand in
    Water,
    /// Safe lane
    Grass,
    /// Any other tag; treated as a safe lane
    Other(String),
}

impl From<String> for RowType {
    fn from(tag: String) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "road" => Self::Road,
            "water" => Self::Water,
            "grass" => Self::Grass,
            _ => Self::Other(tag),
        }
    }
}

/// One lane of the level
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Row {
    /// Declared type
    #[serde(rename = "type")]
    pub row_type: RowType,

    /// Scroll speed in world units per second; only meaningful on moving rows
    #[serde(default)]
    pub speed: f32,
}

impl Row {
    /// Create a row
    pub fn new(row_type: RowType, speed: f32) -> Self {
        Self { row_type, speed }
    }
}

/// Level header
#[derive(Debug, Clone, PartialEq)]
pub struct LevelInfo {
    /// Theme that generates the rows
    pub theme: ThemeKind,
    /// 1-based area number
    pub area: u32,
    /// 1-based level number within the area
    pub level: u32,
    /// Night levels use dim lighting plus theme lights
    pub night: bool,
    /// Columns in every row
    pub tiles_per_row: usize,
}

/// A non-interactive ground unit occupying one (row, column) cell
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// World position of the tile center
    pub position: Vec3,
    /// Row index
    pub row: usize,
    /// Column index
    pub column: usize,
    /// Mesh and texture
    pub visual: Visual,
}

/// A parsed level; immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    info: LevelInfo,
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct LevelDocument {
    info: InfoDocument,
    rows: Vec<Row>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfoDocument {
    theme: String,
    area: u32,
    level: u32,
    #[serde(default)]
    night: bool,
    #[serde(default = "default_tiles_per_row")]
    tiles_per_row: usize,
}

const fn default_tiles_per_row() -> usize {
    DEFAULT_TILES_PER_ROW
}

impl Level {
    /// Read and parse the description for `area`-`level` from `source`
    ///
    /// The header must name the requested area and level, otherwise scores
    /// would be recorded against the wrong level.
    pub fn load(source: &dyn LevelSource, area: u32, level: u32) -> Result<Self, ParseError> {
        let data = source.read_level(area, level)?;
        let parsed = Self::parse_json(&data)?;
        if (parsed.info.area, parsed.info.level) != (area, level) {
            log::warn!(
                "Level file for {}-{} is labelled {}-{}",
                area,
                level,
                parsed.info.area,
                parsed.info.level
            );
            return Err(ParseError::InvalidIdentifier {
                area: parsed.info.area,
                level: parsed.info.level,
            });
        }
        Ok(parsed)
    }

    /// Parse a level description
    pub fn parse_json(data: &str) -> Result<Self, ParseError> {
        let document: LevelDocument = serde_json::from_str(data)?;
        let info = document.info;

        let theme = ThemeKind::from_name(&info.theme)?;
        if info.area == 0 || info.level == 0 {
            return Err(ParseError::InvalidIdentifier {
                area: info.area,
                level: info.level,
            });
        }
        if info.tiles_per_row < MIN_TILES_PER_ROW {
            return Err(ParseError::InvalidTilesPerRow(info.tiles_per_row));
        }
        if document.rows.is_empty() {
            return Err(ParseError::EmptyLevel);
        }

        Ok(Self {
            info: LevelInfo {
                theme,
                area: info.area,
                level: info.level,
                night: info.night,
                tiles_per_row: info.tiles_per_row,
            },
            rows: document.rows,
        })
    }

    /// Header info
    pub fn info(&self) -> &LevelInfo {
        &self.info
    }

    /// Rows in travel order; row 0 is the start
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row by index
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the last row
    pub fn last_row(&self) -> usize {
        self.rows.len() - 1
    }

    /// Columns in every row
    pub fn tiles_per_row(&self) -> usize {
        self.info.tiles_per_row
    }
}

/// World position of the center of cell (`row`, `column`)
///
/// The center column sits on `x = 0`; rows advance along `-z`.
pub fn tile_position(row: usize, column: usize, tiles_per_row: usize) -> Vec3 {
    let center = (tiles_per_row / 2) as f32;
    Vec3::new(
        (column as f32 - center) * TILE_SIZE,
        0.0,
        -(row as f32) * TILE_SIZE,
    )
}

/// Row index covering world depth `z`
pub fn row_at_depth(z: f32) -> usize {
    // Rows are placed at exact multiples of TILE_SIZE; the epsilon absorbs rounding
    let row = (-z / TILE_SIZE + 1e-4).floor();
    if row <= 0.0 {
        0
    } else {
        row as usize
    }
}

/// Column index nearest to world x, clamped to the row
pub fn column_at(x: f32, tiles_per_row: usize) -> usize {
    let column = (x / TILE_SIZE).round() + (tiles_per_row / 2) as f32;
    column.clamp(0.0, (tiles_per_row - 1) as f32) as usize
}

/// Supplies raw level descriptions by area and level number
pub trait LevelSource {
    /// Return the serialized description of `area`-`level`
    fn read_level(&self, area: u32, level: u32) -> Result<String, ParseError>;
}

/// Reads `level_<area>_<level>.json` files from a directory
#[derive(Debug, Clone)]
pub struct DirectoryLevelSource {
    root: PathBuf,
}

impl DirectoryLevelSource {
    /// Source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding `area`-`level`
    pub fn path_for(&self, area: u32, level: u32) -> PathBuf {
        self.root.join(format!("level_{area}_{level}.json"))
    }
}

impl LevelSource for DirectoryLevelSource {
    fn read_level(&self, area: u32, level: u32) -> Result<String, ParseError> {
        let path = self.path_for(area, level);
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ParseError::NotFound { area, level }
            } else {
                ParseError::Io(e)
            }
        })
    }
}

/// In-memory level descriptions
#[derive(Debug, Clone, Default)]
pub struct MemoryLevelSource {
    levels: HashMap<(u32, u32), String>,
}

impl MemoryLevelSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the description for `area`-`level`
    pub fn insert(&mut self, area: u32, level: u32, data: impl Into<String>) {
        self.levels.insert((area, level), data.into());
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_level(mut self, area: u32, level: u32, data: impl Into<String>) -> Self {
        self.insert(area, level, data);
        self
    }
}

impl LevelSource for MemoryLevelSource {
    fn read_level(&self, area: u32, level: u32) -> Result<String, ParseError> {
        self.levels
            .get(&(area, level))
            .cloned()
            .ok_or(ParseError::NotFound { area, level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    const CITY_LEVEL: &str = r#"{
        "info": { "theme": "City", "area": 1, "level": 2, "night": true },
        "rows": [
            { "type": "grass" },
            { "type": "road", "speed": 3.5 },
            { "type": "Water", "speed": -2.0 },
            { "type": "bridge", "speed": 0.0 }
        ]
    }"#;

    #[test]
    fn test_parse_populates_info_and_rows() {
        let level = Level::parse_json(CITY_LEVEL).unwrap();

        assert_eq!(level.info().theme, ThemeKind::City);
        assert_eq!((level.info().area, level.info().level), (1, 2));
        assert!(level.info().night);
        assert_eq!(level.tiles_per_row(), DEFAULT_TILES_PER_ROW);
        assert_eq!(level.row_count(), 4);
        assert_eq!(level.rows()[0], Row::new(RowType::Grass, 0.0));
        assert_eq!(level.rows()[1], Row::new(RowType::Road, 3.5));
        assert_eq!(level.rows()[2].row_type, RowType::Water);
        assert_eq!(level.rows()[3].row_type, RowType::Other("bridge".to_string()));
    }

    #[test]
    fn test_unknown_theme_is_a_parse_error() {
        let data = CITY_LEVEL.replace("\"City\"", "\"Volcano\"");
        let result = Level::parse_json(&data);
        assert!(matches!(result, Err(ParseError::UnknownTheme(name)) if name == "Volcano"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(Level::parse_json("{ \"info\": "), Err(ParseError::Json(_))));
        assert!(matches!(
            Level::parse_json(r#"{ "info": { "theme": "City" }, "rows": [] }"#),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_structural_validation() {
        let empty = r#"{ "info": { "theme": "Lab", "area": 3, "level": 1 }, "rows": [] }"#;
        assert!(matches!(Level::parse_json(empty), Err(ParseError::EmptyLevel)));

        let narrow = r#"{ "info": { "theme": "Lab", "area": 3, "level": 1, "tilesPerRow": 4 },
                          "rows": [ { "type": "grass" } ] }"#;
        assert!(matches!(Level::parse_json(narrow), Err(ParseError::InvalidTilesPerRow(4))));

        let zero_area = r#"{ "info": { "theme": "Lab", "area": 0, "level": 1 },
                             "rows": [ { "type": "grass" } ] }"#;
        assert!(matches!(
            Level::parse_json(zero_area),
            Err(ParseError::InvalidIdentifier { area: 0, level: 1 })
        ));
    }

    #[test]
    fn test_tile_positions_are_deterministic() {
        let center = tile_position(0, 7, 14);
        assert_relative_eq!(center, Vec3::zeros());

        let far_corner = tile_position(3, 13, 14);
        assert_relative_eq!(far_corner, Vec3::new(6.0 * TILE_SIZE, 0.0, -3.0 * TILE_SIZE));
    }

    #[test]
    fn test_row_at_depth_inverts_tile_position() {
        for row in 0..40 {
            let z = tile_position(row, 0, 14).z;
            assert_eq!(row_at_depth(z), row);
        }
        assert_eq!(row_at_depth(1.0), 0);
    }

    #[test]
    fn test_column_at_clamps_to_row() {
        assert_eq!(column_at(0.0, 14), 7);
        assert_eq!(column_at(-100.0, 14), 0);
        assert_eq!(column_at(100.0, 14), 13);
    }

    #[test]
    fn test_directory_source_reads_named_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("level_1_2.json"), CITY_LEVEL).unwrap();
        let source = DirectoryLevelSource::new(dir.path());

        let level = Level::load(&source, 1, 2).unwrap();
        assert_eq!(level.info().level, 2);

        assert!(matches!(
            Level::load(&source, 2, 1),
            Err(ParseError::NotFound { area: 2, level: 1 })
        ));
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryLevelSource::new().with_level(1, 2, CITY_LEVEL);
        assert!(Level::load(&source, 1, 2).is_ok());
        assert!(matches!(source.read_level(9, 9), Err(ParseError::NotFound { .. })));
    }

    #[test]
    fn test_mislabelled_level_is_rejected() {
        let source = MemoryLevelSource::new().with_level(2, 4, CITY_LEVEL);
        assert!(matches!(
            Level::load(&source, 2, 4),
            Err(ParseError::InvalidIdentifier { area: 1, level: 2 })
        ));
    }
}
