//! # Leap'n'Lost
//!
//! Lane-based 3D action game core: the player hops forward through rows of
//! traffic and rivers, picking up coins and the level collectible on the way.
//!
//! The crate is headless. Rendering, model loading and audio are reached
//! through the `leap_engine` contracts handed to [`scene::Scene`].
//!
//! ```rust
//! use leapnlost::prelude::*;
//! use leap_engine::audio::NullAudio;
//!
//! let rows: Vec<String> = (0..31).map(|_| r#"{ "type": "grass" }"#.to_string()).collect();
//! let json = format!(
//!     r#"{{ "info": {{ "theme": "City", "area": 1, "level": 1 }}, "rows": [{}] }}"#,
//!     rows.join(",")
//! );
//! let levels = MemoryLevelSource::new().with_level(1, 1, json);
//!
//! let mut scene = Scene::new(
//!     GameConfig::default(),
//!     Box::new(levels),
//!     Box::new(MemoryProfileStore::new()),
//!     Box::new(NullAudio),
//! )
//! .unwrap();
//! scene.load_level(1, 1).unwrap();
//! scene.handle_input(Direction::Up);
//! scene.update(1.0 / 60.0);
//! assert_eq!(scene.player_state().unwrap().tile_row, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod collision;
pub mod config;
pub mod entity;
pub mod level;
pub mod profile;
pub mod scene;
pub mod theme;

/// Common imports for hosts and tests
pub mod prelude {
    pub use crate::{
        collision::CollisionIndex,
        config::GameConfig,
        entity::{Direction, Entity, EntityId, EntityKind, PlayerStatus, Visual},
        level::{DirectoryLevelSource, Level, LevelSource, MemoryLevelSource, ParseError, RowType},
        profile::{FileProfileStore, MemoryProfileStore, PersistenceError, Profile, ProfileStore},
        scene::{Scene, SceneError},
        theme::{Theme, ThemeKind},
    };
}
