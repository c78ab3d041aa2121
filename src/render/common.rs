use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Camera parameters consumed by the renderer's uniforms.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Directional sun light shading the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.4, -1.0, -0.3),
            color: Vec3::splat(1.0),
            intensity: 1.0,
        }
    }
}

impl LightParams {
    /// Unit vector pointing from the surface towards the light.
    pub fn to_light(&self) -> Vec3 {
        (-self.direction).normalize_or_zero()
    }
}
