//! Rendering-facing types: camera, lights, and the backend contract

pub mod backend;
pub mod camera;
pub mod lighting;

pub use backend::{NullRenderBackend, RenderBackend};
pub use camera::{CameraController, Projection};
pub use lighting::{DirectionalLight, DrawLights, PointLight, SceneLights, SpotLight};
