//! Rendering backend contract
//!
//! The scene supplies transforms and lights; how drawing happens is the
//! backend's business. Mesh upload, shader binding and draw submission all
//! live on the other side of [`RenderBackend`].

use crate::assets::Model;
use crate::foundation::math::Mat4;
use crate::render::lighting::DrawLights;

/// Receives one frame worth of draws
pub trait RenderBackend {
    /// Start a frame with the camera matrices
    fn begin_frame(&mut self, view: &Mat4, projection: &Mat4);

    /// Draw `model` with the given model matrix and lights
    fn submit(&mut self, model: &Model, transform: &Mat4, lights: &DrawLights<'_>);
}

/// Backend that only counts what it is given
#[derive(Debug)]
pub struct NullRenderBackend {
    /// Frames started
    pub frames: usize,
    /// Draws submitted since the last `begin_frame`
    pub submissions: usize,
    /// Draws submitted over the backend's lifetime
    pub total_submissions: usize,
    /// View matrix of the current frame
    pub view: Mat4,
    /// Projection matrix of the current frame
    pub projection: Mat4,
}

impl Default for NullRenderBackend {
    fn default() -> Self {
        Self {
            frames: 0,
            submissions: 0,
            total_submissions: 0,
            view: Mat4::identity(),
            projection: Mat4::identity(),
        }
    }
}

impl RenderBackend for NullRenderBackend {
    fn begin_frame(&mut self, view: &Mat4, projection: &Mat4) {
        self.frames += 1;
        self.submissions = 0;
        self.view = *view;
        self.projection = *projection;
    }

    fn submit(&mut self, _model: &Model, _transform: &Mat4, _lights: &DrawLights<'_>) {
        self.submissions += 1;
        self.total_submissions += 1;
    }
}
