//! Orbit camera around the stage center, with screen-ray unprojection for
//! pointer picking.

use glam::{Mat4, Vec3, Vec4};

use crate::params::RenderConfig;

/// Pointer-drag sensitivity (radians per pixel)
const DRAG_SENSITIVITY: f32 = 0.005;

/// Pitch limit keeping the camera off the poles (radians)
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Orbit camera: yaw/pitch on a sphere around a fixed target
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
}

impl OrbitCamera {
    /// Create camera at the initial viewing position (straight down +Z)
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: config.camera_distance,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Rotate by a pointer drag delta in pixels
    pub fn rotate(&mut self, dx_px: f32, dy_px: f32) {
        self.yaw -= dx_px * DRAG_SENSITIVITY;
        self.pitch = (self.pitch + dy_px * DRAG_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Current eye position
    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        ) * self.distance;
        self.target + offset
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn view_proj(&self, config: &RenderConfig) -> (Mat4, Vec3) {
        let eye = self.eye();
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            config.fov_degrees.to_radians(),
            config.aspect_ratio(),
            config.near_plane,
            config.far_plane,
        );
        (proj * view, eye)
    }

    /// Unproject a window-space pixel into a world-space ray.
    ///
    /// # Returns
    /// Tuple of (ray_origin, ray_direction), direction normalized
    pub fn screen_ray(&self, px: f32, py: f32, config: &RenderConfig) -> (Vec3, Vec3) {
        let ndc_x = 2.0 * px / config.window_width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * py / config.window_height as f32;

        let (view_proj, eye) = self.view_proj(config);
        let inv = view_proj.inverse();

        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far = far.truncate() / far.w;

        (eye, (far - eye).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_eye_position() {
        let config = RenderConfig::default();
        let camera = OrbitCamera::new(&config);
        let eye = camera.eye();

        assert!((eye - Vec3::new(0.0, 0.0, config.camera_distance)).length() < 1e-5);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let config = RenderConfig::default();
        let camera = OrbitCamera::new(&config);

        let (view_proj, eye) = camera.view_proj(&config);

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);

        // Eye position should be valid (not NaN or infinite)
        assert!(eye.x.is_finite());
        assert!(eye.y.is_finite());
        assert!(eye.z.is_finite());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let config = RenderConfig::default();
        let mut camera = OrbitCamera::new(&config);

        camera.rotate(0.0, 100000.0);
        assert!(camera.pitch <= PITCH_LIMIT);

        camera.rotate(0.0, -200000.0);
        assert!(camera.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let config = RenderConfig::default();
        let camera = OrbitCamera::new(&config);

        let (origin, dir) = camera.screen_ray(
            config.window_width as f32 / 2.0,
            config.window_height as f32 / 2.0,
            &config,
        );

        assert!((origin - camera.eye()).length() < 1e-5);
        assert!((dir.length() - 1.0).abs() < 1e-5);

        // Camera sits on +Z looking at the origin: center ray goes -Z
        assert!(dir.z < -0.999);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let config = RenderConfig::default();
        let mut camera = OrbitCamera::new(&config);

        for _ in 0..10 {
            camera.rotate(37.0, -11.0);
            let eye = camera.eye();
            assert!((eye.length() - config.camera_distance).abs() < 1e-4);
        }
    }
}
