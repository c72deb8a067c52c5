//! Fixed demo camera with off-axis stereo projections.
//!
//! The camera sits in front of the box and never rotates. Stereo views for
//! the quilt are produced by *shearing*: the eye slides along its right axis
//! and the projection is sheared back so every view converges on the focal
//! plane through the camera target. Because the views only translate, camera
//! right and up stay the world x and y axes for every view.

use glam::{Mat4, Vec3};

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Fixed camera for viewing the box.
pub struct Camera {
    /// Eye position for the center view.
    pub position: Vec3,
    /// Point the camera looks at; also the focal plane for stereo views.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    /// Create the demo camera: 20 units in front of the origin, 45° FOV.
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 20.0),
            target: Vec3::ZERO,
            fov_y: 45.0_f32.to_radians(),
        }
    }

    /// On-axis view-projection matrix for the center view.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.offset_view_proj(aspect, 0.0)
    }

    /// View-projection matrix for a view rotated `angle` radians off-axis
    /// around the target, realized as a sheared frustum.
    pub fn offset_view_proj(&self, aspect: f32, angle: f32) -> Mat4 {
        let distance = (self.position - self.target).length();
        let offset = distance * angle.tan();

        // Slide eye and target together: a shear, not a rotation.
        let shift = Vec3::X * offset;
        let view = Mat4::look_at_rh(self.position + shift, self.target + shift, Vec3::Y);

        let mut proj = Mat4::perspective_rh(self.fov_y, aspect, Z_NEAR, Z_FAR);
        // Shear the frustum back so all views line up on the focal plane.
        let half_height = distance * (self.fov_y * 0.5).tan();
        proj.z_axis.x = -offset / (aspect * half_height);

        proj * view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndc(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_zero_angle_matches_center_view() {
        let camera = Camera::new();
        let a = camera.view_proj(1.6);
        let b = camera.offset_view_proj(1.6, 0.0);
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::new();
        let p = ndc(camera.view_proj(1.6), Vec3::ZERO);
        assert!(p.x.abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
    }

    #[test]
    fn test_focal_plane_is_fixed_across_views() {
        let camera = Camera::new();
        let p = Vec3::new(0.7, 0.3, 0.0); // on the focal plane
        let center = ndc(camera.view_proj(1.6), p);
        for angle in [-0.35f32, -0.1, 0.2, 0.35] {
            let view = ndc(camera.offset_view_proj(1.6, angle), p);
            assert!(
                (view.x - center.x).abs() < 1e-4 && (view.y - center.y).abs() < 1e-4,
                "focal-plane point drifted at angle {}: {:?} vs {:?}",
                angle,
                view,
                center
            );
        }
    }

    #[test]
    fn test_off_plane_points_have_parallax() {
        let camera = Camera::new();
        let p = Vec3::new(0.0, 0.0, 1.0); // in front of the focal plane
        let left = ndc(camera.offset_view_proj(1.6, -0.3), p);
        let right = ndc(camera.offset_view_proj(1.6, 0.3), p);
        assert!(
            (left.x - right.x).abs() > 1e-3,
            "expected parallax, got {} vs {}",
            left.x,
            right.x
        );
    }
}
