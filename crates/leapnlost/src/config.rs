//! Game configuration
//!
//! Loaded from TOML or RON through the engine [`Config`] trait. Every section
//! is `#[serde(default)]`, so a file only needs the keys it overrides.

use std::path::PathBuf;

use leap_engine::config::{Config, Deserialize, Serialize};
use leap_engine::foundation::math::Vec3;
use leap_engine::render::Projection;

/// Top-level game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Rules and tuning
    pub gameplay: GameplayConfig,
    /// Follow camera
    pub camera: CameraConfig,
    /// Data locations
    pub paths: PathsConfig,
}

impl Config for GameConfig {}

/// Rules and tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Row at which the run is complete
    pub terminal_row: usize,
    /// Points per coin
    pub coin_value: i64,
    /// Points for the level collectible
    pub collectible_value: i64,
    /// Entities further than this along the travel axis are culled
    pub view_distance: f32,
    /// Seconds one hop takes
    pub hop_duration: f32,
    /// Seed for coin placement; random when unset
    pub rng_seed: Option<u64>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            terminal_row: 30,
            coin_value: 10,
            collectible_value: 100,
            view_distance: 50.0,
            hop_duration: 0.15,
            rng_seed: None,
        }
    }
}

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Follow camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye offset from the player in world space
    pub offset: Vec3,
    /// Projection mode and parameters
    pub projection: Projection,
    /// Drawable size
    pub viewport: Viewport,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 14.0, 8.5),
            projection: Projection::default(),
            viewport: Viewport::default(),
        }
    }
}

/// Data locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `level_<area>_<level>.json`
    pub levels_dir: PathBuf,
    /// Profile file
    pub profile_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            levels_dir: PathBuf::from("assets/levels"),
            profile_path: PathBuf::from("saves/profile.ron"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.gameplay.terminal_row, 30);
        assert_eq!(config.gameplay.coin_value, 10);
        assert_relative_eq!(config.gameplay.view_distance, 50.0);
        assert_relative_eq!(config.camera.offset, Vec3::new(0.0, 14.0, 8.5));
        assert!(matches!(config.camera.projection, Projection::Orthographic { .. }));
    }

    #[test]
    fn test_partial_toml_overrides_only_given_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.toml");
        std::fs::write(
            &path,
            r#"
            [gameplay]
            rng_seed = 7
            coin_value = 25

            [camera.projection]
            mode = "perspective"
            fov_degrees = 60.0
            near = 1.0
            far = 40.0
            "#,
        )
        .unwrap();

        let config = GameConfig::load_from_file(&path).unwrap();
        assert_eq!(config.gameplay.rng_seed, Some(7));
        assert_eq!(config.gameplay.coin_value, 25);
        assert_eq!(config.gameplay.terminal_row, 30);
        assert!(matches!(config.camera.projection, Projection::Perspective { .. }));
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("absent.toml"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.toml");
        let mut config = GameConfig::default();
        config.gameplay.rng_seed = Some(42);

        config.save_to_file(&path).unwrap();
        assert_eq!(GameConfig::load_from_file(&path).unwrap(), config);
    }
}
