//! Camera basis, view matrix and off-center perspective projection

use serde::{Deserialize, Serialize};

use super::math::{Mat4, Vec3};
use crate::error::{RenderError, Result};

/// View frustum bounds on the near plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub near: f32,
    pub far: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Frustum {
    /// Symmetric frustum with the given near-plane half extent
    pub fn symmetric(near: f32, far: f32, half_extent: f32) -> Self {
        Self {
            near,
            far,
            top: half_extent,
            bottom: -half_extent,
            left: -half_extent,
            right: half_extent,
        }
    }

    fn validate(&self) -> Result<()> {
        let bounds = [self.near, self.far, self.top, self.bottom, self.left, self.right];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(RenderError::DegenerateFrustum(format!("non-finite bound in {:?}", self)));
        }
        if self.near <= 0.0 {
            return Err(RenderError::DegenerateFrustum(format!("near must be positive, got {}", self.near)));
        }
        if self.near == self.far {
            return Err(RenderError::DegenerateFrustum(format!("near == far ({})", self.near)));
        }
        if self.left == self.right {
            return Err(RenderError::DegenerateFrustum(format!("left == right ({})", self.left)));
        }
        if self.top == self.bottom {
            return Err(RenderError::DegenerateFrustum(format!("top == bottom ({})", self.top)));
        }
        Ok(())
    }

    /// Off-center perspective projection. Entries not set here keep their
    /// identity value, so `w = 1 - z_view` and depth grows with distance.
    pub fn projection_matrix(&self) -> Mat4 {
        let Frustum { near, far, top, bottom, left, right } = *self;
        let mut m = Mat4::IDENTITY;
        m.m[0][0] = 2.0 * near / (right - left);
        m.m[0][2] = (right + left) / (right - left);
        m.m[1][1] = 2.0 * near / (top - bottom);
        m.m[1][2] = (top + bottom) / (top - bottom);
        m.m[2][2] = -(far + near) / (far - near);
        m.m[2][3] = -2.0 * far * near / (far - near);
        m.m[3][2] = -1.0;
        m
    }
}

/// Camera state. View and projection are derived at construction and
/// cannot drift from the placement they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    from: Vec3,
    to: Vec3,
    up: Vec3,
    frustum: Frustum,
    width: usize,
    height: usize,

    // Computed basis vectors
    basis_u: Vec3,
    basis_v: Vec3,
    basis_n: Vec3,

    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(from: Vec3, to: Vec3, up: Vec3, frustum: Frustum, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution { width, height });
        }
        frustum.validate()?;

        // Look direction points from the target back to the eye
        let look = from - to;
        if look.len() == 0.0 || !look.is_finite() {
            return Err(RenderError::DegenerateCamera(format!("from and to coincide at {:?}", from)));
        }
        let basis_n = look.normalize();

        // Right vector
        let right = up.cross(basis_n);
        if right.len() < 1e-6 {
            return Err(RenderError::DegenerateCamera(format!(
                "up hint {:?} is parallel to the view direction",
                up
            )));
        }
        let basis_u = right.normalize();

        // Up vector
        let basis_v = basis_n.cross(basis_u);

        let view = Mat4::from_rows([
            [basis_u.x, basis_u.y, basis_u.z, -from.dot(basis_u)],
            [basis_v.x, basis_v.y, basis_v.z, -from.dot(basis_v)],
            [basis_n.x, basis_n.y, basis_n.z, -from.dot(basis_n)],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        Ok(Self {
            from,
            to,
            up,
            frustum,
            width,
            height,
            basis_u,
            basis_v,
            basis_n,
            view,
            projection: frustum.projection_matrix(),
        })
    }

    /// Same placement and frustum at a different output size
    pub fn with_resolution(&self, width: usize, height: usize) -> Result<Self> {
        Self::new(self.from, self.to, self.up, self.frustum, width, height)
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Look direction `normalize(from - to)`, pointing from the target back
    /// toward the eye. Camera space +Z.
    pub fn view_direction(&self) -> Vec3 {
        self.basis_n
    }

    /// Orthonormal (right, up, back) basis
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.basis_u, self.basis_v, self.basis_n)
    }

    pub fn position(&self) -> Vec3 {
        self.from
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}
