//! Scene lighting data
//!
//! Pure data handed to the rendering backend alongside each draw. The engine
//! decides which lights reach a draw; the backend decides how they are shaded.

use crate::foundation::math::Vec3;

/// Maximum number of point lights applied to a single draw
pub const MAX_POINT_LIGHTS_PER_DRAW: usize = 4;

/// Directional light (like sunlight) with parallel rays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// RGB color values (0.0 to 1.0 range)
    pub color: Vec3,
    /// Ambient contribution
    pub ambient_intensity: f32,
    /// Diffuse contribution
    pub diffuse_intensity: f32,
    /// Specular contribution
    pub specular_intensity: f32,
    /// Direction the light travels in world space
    pub direction: Vec3,
}

impl DirectionalLight {
    /// Daytime sun
    pub fn day() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 0.8),
            ambient_intensity: 0.5,
            diffuse_intensity: 1.0,
            specular_intensity: 1.0,
            direction: Vec3::new(0.0, -2.0, -5.0),
        }
    }

    /// Dim, green-tinted moonlight for night levels
    pub fn night() -> Self {
        Self {
            color: Vec3::new(0.8, 1.0, 0.8),
            ambient_intensity: 0.02,
            diffuse_intensity: 0.04,
            specular_intensity: 0.02,
            direction: Vec3::new(0.0, -2.0, -5.0),
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::day()
    }
}

/// Point light that radiates in all directions from a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// RGB color values (0.0 to 1.0 range)
    pub color: Vec3,
    /// Ambient contribution
    pub ambient_intensity: f32,
    /// Diffuse contribution
    pub diffuse_intensity: f32,
    /// Specular contribution
    pub specular_intensity: f32,
    /// Position in world space
    pub position: Vec3,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation term
    pub linear: f32,
    /// Quadratic attenuation term
    pub quadratic: f32,
}

impl PointLight {
    /// Point light with the default attenuation curve
    pub fn new(color: Vec3, position: Vec3) -> Self {
        Self {
            color,
            ambient_intensity: 0.5,
            diffuse_intensity: 1.0,
            specular_intensity: 1.0,
            position,
            constant: 1.0,
            linear: 0.5,
            quadratic: 0.1,
        }
    }
}

/// Spot light that creates a cone of light from a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// RGB color values (0.0 to 1.0 range)
    pub color: Vec3,
    /// Diffuse contribution
    pub diffuse_intensity: f32,
    /// Specular contribution
    pub specular_intensity: f32,
    /// Position in world space
    pub position: Vec3,
    /// Direction of the cone axis in world space
    pub direction: Vec3,
    /// Inner cone angle in radians
    pub inner_cone: f32,
    /// Outer cone angle in radians
    pub outer_cone: f32,
}

impl SpotLight {
    /// Spot light pointing along `direction`
    pub fn new(color: Vec3, position: Vec3, direction: Vec3, inner_cone: f32, outer_cone: f32) -> Self {
        Self {
            color,
            diffuse_intensity: 1.0,
            specular_intensity: 1.0,
            position,
            direction: direction.normalize(),
            inner_cone,
            outer_cone,
        }
    }
}

/// All lights active in a scene
#[derive(Debug, Clone, Default)]
pub struct SceneLights {
    /// The sun or moon
    pub directional: DirectionalLight,
    /// Point lights
    pub point_lights: Vec<PointLight>,
    /// Spot lights
    pub spot_lights: Vec<SpotLight>,
}

/// Lights selected for a single draw
#[derive(Debug, Clone)]
pub struct DrawLights<'a> {
    /// The sun or moon
    pub directional: &'a DirectionalLight,
    /// Up to [`MAX_POINT_LIGHTS_PER_DRAW`] point lights, nearest first
    pub point_lights: Vec<&'a PointLight>,
    /// Spot lights
    pub spot_lights: &'a [SpotLight],
}

impl SceneLights {
    /// Remove every point and spot light and restore daylight
    pub fn reset(&mut self) {
        self.directional = DirectionalLight::day();
        self.point_lights.clear();
        self.spot_lights.clear();
    }

    /// Select the lights that reach a draw at `position`
    pub fn for_position(&self, position: Vec3) -> DrawLights<'_> {
        let mut nearest: Vec<&PointLight> = self.point_lights.iter().collect();
        nearest.sort_by(|a, b| {
            let da = (a.position - position).norm_squared();
            let db = (b.position - position).norm_squared();
            da.total_cmp(&db)
        });
        nearest.truncate(MAX_POINT_LIGHTS_PER_DRAW);

        DrawLights {
            directional: &self.directional,
            point_lights: nearest,
            spot_lights: &self.spot_lights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_position_caps_and_orders_point_lights() {
        let mut lights = SceneLights::default();
        for z in 0..6 {
            lights
                .point_lights
                .push(PointLight::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, -(z as f32) * 2.0)));
        }

        let selected = lights.for_position(Vec3::new(0.0, 0.0, -10.0));

        assert_eq!(selected.point_lights.len(), MAX_POINT_LIGHTS_PER_DRAW);
        assert_eq!(selected.point_lights[0].position.z, -10.0);
        assert_eq!(selected.point_lights[1].position.z, -8.0);
    }

    #[test]
    fn test_reset_restores_daylight() {
        let mut lights = SceneLights {
            directional: DirectionalLight::night(),
            ..Default::default()
        };
        lights.point_lights.push(PointLight::new(Vec3::zeros(), Vec3::zeros()));

        lights.reset();

        assert_eq!(lights.directional, DirectionalLight::day());
        assert!(lights.point_lights.is_empty());
    }
}
