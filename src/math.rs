use glam::{DMat3, DVec3};

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f64 = 2.0;

/// Horizontal field of view in radians
pub const DEFAULT_FOV: f64 = 90.0 * std::f64::consts::PI / 180.0;

/// Rotation for a first-person view: yaw about +Y, then pitch about the local X axis.
///
/// Positive yaw turns toward +X, positive pitch looks up.
pub fn orientation(yaw: f64, pitch: f64) -> DMat3 {
    let rotation_y = DMat3::from_rotation_y(yaw);
    let rotation_x = DMat3::from_rotation_x(-pitch);
    rotation_y * rotation_x
}

/// Orthonormal camera frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
}

impl ViewBasis {
    pub fn from_angles(yaw: f64, pitch: f64) -> Self {
        let rotation = orientation(yaw, pitch);
        ViewBasis {
            forward: rotation * DVec3::Z,
            right: rotation * DVec3::X,
            up: rotation * DVec3::Y,
        }
    }

    /// Unit ray through the centre of cell (`col`, `row`) of a `width` x `height` grid.
    pub fn ray_through_cell(&self, col: usize, row: usize, width: usize, height: usize, fov: f64) -> DVec3 {
        let half_w = (fov / 2.0).tan();
        let half_h = half_w * (height as f64 * CELL_ASPECT) / width.max(1) as f64;

        let x = 2.0 * (col as f64 + 0.5) / width.max(1) as f64 - 1.0;
        let y = 1.0 - 2.0 * (row as f64 + 0.5) / height.max(1) as f64;

        (self.forward + self.right * (x * half_w) + self.up * (y * half_h)).normalize()
    }
}
