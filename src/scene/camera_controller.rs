//! Orbit camera control
//!
//! Left-drag rotates around the target, scroll zooms.

use glam::{Vec2, Vec3};

use super::Camera;

/// Input state for the camera controller
#[derive(Debug, Clone, Default)]
pub struct CameraInput {
    /// Mouse delta since last frame (in pixels)
    pub mouse_delta: Vec2,
    /// Mouse scroll delta (positive = scroll up)
    pub scroll_delta: f32,
    /// Whether the orbit button is held
    pub mouse_look_active: bool,
}

impl CameraInput {
    /// Reset per-frame deltas (call after update)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// Rotates around a target point at a variable distance.
///
/// Azimuth and elevation are zero when the camera sits on the +Z axis.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Horizontal angle in radians
    pub azimuth: f32,
    /// Vertical angle in radians
    pub elevation: f32,
    /// Radians per pixel
    pub orbit_sensitivity: f32,
    /// Zoom factor per scroll unit
    pub zoom_factor: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 50.0)
    }
}

impl OrbitController {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            min_distance: 1.0,
            max_distance: 500.0,
            azimuth: 0.0,
            elevation: 0.0,
            orbit_sensitivity: 0.005,
            zoom_factor: 1.1,
        }
    }

    /// Initialize from camera's current position and target
    pub fn sync_with_camera(&mut self, camera: &Camera) {
        self.target = camera.target;
        let offset = camera.position - camera.target;
        self.distance = offset.length().max(self.min_distance);
        self.elevation = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.azimuth = offset.x.atan2(offset.z);
    }

    fn calculate_position(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        self.target
            + Vec3::new(
                horizontal * self.azimuth.sin(),
                self.distance * self.elevation.sin(),
                horizontal * self.azimuth.cos(),
            )
    }

    pub fn update(&mut self, camera: &mut Camera, input: &CameraInput) {
        if input.scroll_delta > 0.0 {
            self.distance /= self.zoom_factor;
        } else if input.scroll_delta < 0.0 {
            self.distance *= self.zoom_factor;
        }
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if input.mouse_look_active && input.mouse_delta != Vec2::ZERO {
            self.azimuth -= input.mouse_delta.x * self.orbit_sensitivity;
            self.elevation += input.mouse_delta.y * self.orbit_sensitivity;

            let max_elevation = std::f32::consts::FRAC_PI_2 - 0.05;
            self.elevation = self.elevation.clamp(-max_elevation, max_elevation);
            self.azimuth %= std::f32::consts::TAU;
        }

        camera.position = self.calculate_position();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_update_keeps_the_camera_on_z() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO);
        let mut orbit = OrbitController::default();
        orbit.sync_with_camera(&camera);

        orbit.update(&mut camera, &CameraInput::default());
        assert!((camera.position - Vec3::new(0.0, 0.0, 30.0)).length() < 1e-4);
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut camera = Camera::default();
        let mut orbit = OrbitController::new(Vec3::ZERO, 1.05);
        let input = CameraInput {
            scroll_delta: 1.0,
            ..Default::default()
        };
        orbit.update(&mut camera, &input);
        assert_eq!(orbit.distance, orbit.min_distance);
    }

    #[test]
    fn drag_keeps_the_distance() {
        let mut camera = Camera::default();
        let mut orbit = OrbitController::new(Vec3::ZERO, 20.0);
        let input = CameraInput {
            mouse_delta: Vec2::new(120.0, -400.0),
            mouse_look_active: true,
            ..Default::default()
        };
        orbit.update(&mut camera, &input);
        assert!((camera.position.length() - 20.0).abs() < 1e-3);
        assert!(orbit.elevation.abs() < std::f32::consts::FRAC_PI_2);
    }
}
