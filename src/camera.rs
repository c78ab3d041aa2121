use glam::{Mat4, Vec2, Vec3};

use crate::render::CameraParams;

/// Orbit camera that circles a focus point.
///
/// Mouse drags feed [`DeltaCamera::rotate`] and wheel movement feeds
/// [`DeltaCamera::zoom`]; both are deltas rather than absolute positions.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaCamera {
    translation: Vec3,
    radius: f32,
    yaw: f32,
    pitch: f32,
    min_radius: f32,
}

impl Default for DeltaCamera {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            radius: 10.0,
            yaw: 45f32.to_radians(),
            pitch: 35f32.to_radians(),
            min_radius: 1.0,
        }
    }
}

impl DeltaCamera {
    const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

    pub fn new(min_radius: f32) -> Self {
        Self {
            min_radius: min_radius.max(f32::EPSILON),
            ..Self::default()
        }
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(self.min_radius);
    }

    /// Orbits by `delta` radians (x = yaw, y = pitch).
    pub fn rotate(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.yaw = (self.yaw + delta.x).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta.y).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Scales the orbit radius; positive deltas move away from the focus.
    pub fn zoom(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.set_radius(self.radius * (1.0 + delta));
    }

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        );
        self.translation + offset * self.radius
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.translation, Vec3::Y)
    }

    /// Far plane grows with the orbit so large terrains are never clipped.
    pub fn params(&self, aspect: f32, fov_degrees: f32) -> CameraParams {
        let far = (self.radius * 4.0).max(100.0);
        let projection =
            Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect.max(0.01), 0.1, far);
        CameraParams {
            view_proj: projection * self.view_matrix(),
            position: self.eye(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_radius_away_from_focus() {
        let mut camera = DeltaCamera::default();
        camera.set_translation(Vec3::new(10.0, 0.0, 10.0));
        camera.set_radius(20.0);
        let distance = camera.eye().distance(camera.translation());
        assert!((distance - 20.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = DeltaCamera::default();
        camera.rotate(Vec2::new(0.0, 10.0));
        assert!(camera.pitch() < std::f32::consts::FRAC_PI_2);
        camera.rotate(Vec2::new(0.0, -20.0));
        assert!(camera.pitch() > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn non_finite_motion_is_ignored() {
        let mut camera = DeltaCamera::default();
        let eye = camera.eye();
        camera.rotate(Vec2::new(f32::NAN, 0.0));
        camera.zoom(f32::INFINITY);
        assert_eq!(camera.eye(), eye);
        assert!(camera.yaw().is_finite());
    }

    #[test]
    fn zoom_respects_minimum_radius() {
        let mut camera = DeltaCamera::new(2.0);
        camera.set_radius(4.0);
        camera.zoom(-0.9);
        assert_eq!(camera.radius(), 2.0);
        camera.zoom(1.0);
        assert_eq!(camera.radius(), 4.0);
    }

    #[test]
    fn focus_projects_to_screen_centre() {
        let mut camera = DeltaCamera::default();
        camera.set_translation(Vec3::new(5.0, 1.0, -3.0));
        let params = camera.params(16.0 / 9.0, 60.0);
        let clip = params.view_proj.project_point3(camera.translation());
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert_eq!(params.position, camera.eye());
    }
}
