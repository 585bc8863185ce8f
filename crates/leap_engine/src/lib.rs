//! # Leap Engine
//!
//! Engine layer for lane-based 3D action games.
//!
//! ## Features
//!
//! - **Math**: nalgebra-backed vectors, matrices and Euler transforms
//! - **Camera**: Follow camera with perspective and orthographic projections
//! - **Lighting**: Directional, point and spot light data with per-draw selection
//! - **Contracts**: Narrow traits for the renderer, asset loader and audio
//! - **Configuration**: TOML/RON configuration files via serde
//!
//! ## Quick Start
//!
//! ```rust
//! use leap_engine::prelude::*;
//!
//! let mut camera = CameraController::new(Vec3::new(0.0, 14.0, 8.5), Projection::default());
//! camera.update_projection(1280, 720);
//! camera.update_position(Vec3::new(0.0, 0.0, -4.0));
//! assert_eq!(camera.target(), Vec3::new(0.0, 0.0, -4.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod audio;
pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, Model, ModelCache, ModelId, ModelLoader, NullModelLoader},
        audio::{AudioService, NullAudio, SoundEffect},
        config::{Config, ConfigError},
        foundation::math::{Mat4, Mat4Ext, Transform, Vec3},
        render::{
            CameraController, DirectionalLight, DrawLights, NullRenderBackend, PointLight, Projection,
            RenderBackend, SceneLights, SpotLight,
        },
    };
}
