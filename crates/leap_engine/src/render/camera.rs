//! # Follow camera
//!
//! Camera controller that tracks a target with a fixed world-space offset and
//! produces the view and projection matrices for the renderer.
//!
//! ## Design Principles
//! - **Library-agnostic**: No backend dependencies in camera math
//! - **No smoothing**: Position updates are assigned directly, so a teleporting
//!   target never leaves the camera lagging behind what the simulation sees
//! - **Two projections**: Perspective recomputed from the viewport each frame,
//!   orthographic with a fixed world-space extent

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Projection parameters for the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Projection {
    /// Perspective projection; the aspect ratio comes from the viewport
    Perspective {
        /// Vertical field of view in degrees
        fov_degrees: f32,
        /// Distance to near clipping plane
        near: f32,
        /// Distance to far clipping plane
        far: f32,
    },
    /// Orthographic projection with a fixed world-space extent
    Orthographic {
        /// Visible width in world units
        width: f32,
        /// Visible height in world units
        height: f32,
        /// Distance to near clipping plane
        near: f32,
        /// Distance to far clipping plane
        far: f32,
    },
}

impl Projection {
    /// Build the projection matrix for a viewport of the given pixel size
    ///
    /// The orthographic variant ignores the viewport entirely. A zero-height
    /// viewport (minimized window) falls back to a square aspect ratio.
    pub fn matrix(&self, viewport_width: u32, viewport_height: u32) -> Mat4 {
        match *self {
            Self::Perspective { fov_degrees, near, far } => {
                let aspect = if viewport_height == 0 {
                    1.0
                } else {
                    viewport_width as f32 / viewport_height as f32
                };
                Mat4::perspective(utils::deg_to_rad(fov_degrees), aspect, near, far)
            }
            Self::Orthographic { width, height, near, far } => Mat4::orthographic(width, height, near, far),
        }
    }
}

impl Default for Projection {
    /// Top-down gameplay view
    fn default() -> Self {
        Self::Orthographic {
            width: 10.0,
            height: 10.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

/// Camera that follows a target at a fixed offset
#[derive(Debug, Clone)]
pub struct CameraController {
    /// World-space offset from the tracked target to the eye
    offset: Vec3,

    /// Active projection mode
    projection: Projection,

    /// Up vector for camera orientation
    up: Vec3,

    /// Current eye position
    position: Vec3,

    /// Current look-at point
    target: Vec3,

    /// Last viewport used for the projection, in pixels
    viewport: (u32, u32),

    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl CameraController {
    /// Create a camera that tracks a target from `offset`
    pub fn new(offset: Vec3, projection: Projection) -> Self {
        let mut camera = Self {
            offset,
            projection,
            up: Vec3::y(),
            position: offset,
            target: Vec3::zeros(),
            viewport: (1, 1),
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
        };
        camera.update_position(Vec3::zeros());
        camera.update_projection(1, 1);
        camera
    }

    /// Switch projection mode; takes effect on the next `update_projection`
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Recompute the projection matrix for the current viewport
    pub fn update_projection(&mut self, viewport_width: u32, viewport_height: u32) {
        self.viewport = (viewport_width, viewport_height);
        self.projection_matrix = self.projection.matrix(viewport_width, viewport_height);
    }

    /// Track `target`: the eye is placed at `target + offset`, looking at `target`
    pub fn update_position(&mut self, target: Vec3) {
        self.target = target;
        self.position = target + self.offset;
        self.view_matrix = Mat4::look_at(self.position, self.target, self.up);
        log::trace!("Camera tracking {:?} from {:?}", self.target, self.position);
    }

    /// Current eye position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current look-at point
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Offset from target to eye
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Active projection parameters
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Viewport used by the last projection update
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Camera-to-clip transform
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined `projection * view`
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn perspective() -> Projection {
        Projection::Perspective {
            fov_degrees: 60.0,
            near: 1.0,
            far: 40.0,
        }
    }

    #[test]
    fn test_position_is_target_plus_offset() {
        let offset = Vec3::new(0.0, 14.0, 8.5);
        let mut camera = CameraController::new(offset, Projection::default());

        camera.update_position(Vec3::new(2.0, 0.0, -10.0));

        assert_relative_eq!(camera.position(), Vec3::new(2.0, 14.0, -1.5));
        assert_relative_eq!(camera.target(), Vec3::new(2.0, 0.0, -10.0));
    }

    #[test]
    fn test_teleport_is_not_smoothed() {
        let mut camera = CameraController::new(Vec3::new(0.0, 14.0, 8.5), Projection::default());
        camera.update_position(Vec3::zeros());

        // Jump far along the travel axis in a single frame
        camera.update_position(Vec3::new(0.0, 0.0, -60.0));

        assert_relative_eq!(camera.position(), Vec3::new(0.0, 14.0, -51.5));
    }

    #[test]
    fn test_perspective_tracks_viewport_aspect() {
        let mut camera = CameraController::new(Vec3::new(0.0, 14.0, 8.5), perspective());

        camera.update_projection(1920, 1080);
        let wide = *camera.projection_matrix();
        camera.update_projection(1080, 1920);
        let tall = *camera.projection_matrix();

        assert!(wide[(0, 0)] < tall[(0, 0)]);
        assert_relative_eq!(wide[(1, 1)], tall[(1, 1)]);
        assert_eq!(camera.viewport(), (1080, 1920));
    }

    #[test]
    fn test_orthographic_ignores_viewport() {
        let mut camera = CameraController::new(Vec3::new(0.0, 14.0, 8.5), Projection::default());

        camera.update_projection(800, 600);
        let first = *camera.projection_matrix();
        camera.update_projection(2560, 1440);

        assert_relative_eq!(first, *camera.projection_matrix());
        assert_relative_eq!(first[(0, 0)], 2.0 / 10.0);
    }

    #[test]
    fn test_zero_height_viewport_does_not_produce_nan() {
        let mut camera = CameraController::new(Vec3::new(0.0, 14.0, 8.5), perspective());
        camera.update_projection(800, 0);
        assert!(camera.projection_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_projection_deserializes_from_tagged_toml() {
        let projection: Projection =
            toml::from_str("mode = \"perspective\"\nfov_degrees = 60.0\nnear = 1.0\nfar = 40.0\n").unwrap();
        assert_eq!(projection, perspective());
    }
}
