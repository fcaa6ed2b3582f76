//! Object space to screen space
//!
//! World = T * Rz * Ry * Rx * S. Normals go through the inverse-transpose
//! of the world matrix so non-uniform scale does not skew them.

use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::math::{Mat4, Vec2, Vec3};
use super::types::Triangle;
use crate::error::{RenderError, Result};

/// Per-shape placement: non-uniform scale, XYZ rotation in degrees, translation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub scale: Vec3,
    pub rotation: Vec3,
    pub translation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

impl Transform {
    fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_z(self.rotation.z) * Mat4::rotation_y(self.rotation.y) * Mat4::rotation_x(self.rotation.x)
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation) * self.rotation_matrix() * Mat4::scale(self.scale)
    }

    /// S^-1 * R^T * T^-1. Fails when any scale component is exactly zero.
    pub fn inverse_world_matrix(&self) -> Result<Mat4> {
        let s = self.scale;
        if s.x == 0.0 || s.y == 0.0 || s.z == 0.0 {
            return Err(RenderError::SingularScale);
        }
        let inv_scale = Mat4::scale(Vec3::new(1.0 / s.x, 1.0 / s.y, 1.0 / s.z));
        let inv_translation = Mat4::translation(-self.translation);
        Ok(inv_scale * self.rotation_matrix().transpose() * inv_translation)
    }

    /// Inverse-transpose of the world matrix, for transforming normals
    pub fn normal_matrix(&self) -> Result<Mat4> {
        Ok(self.inverse_world_matrix()?.transpose())
    }
}

/// A vertex after projection and viewport mapping
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenVertex {
    /// Pixel coordinates, row 0 at the top
    pub x: f32,
    pub y: f32,
    /// NDC depth, smaller is nearer
    pub z: f32,
    /// Clip-space w, used for perspective-correct attributes
    pub w: f32,
    /// Camera-space unit normal
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Map NDC x/y onto pixel coordinates, flipping Y so NDC +1 is row 0
pub fn viewport(ndc: Vec3, width: usize, height: usize) -> (f32, f32) {
    let sx = (ndc.x + 1.0) * (width as f32 - 1.0) / 2.0;
    let sy = (1.0 - ndc.y) * (height as f32 - 1.0) / 2.0;
    (sx, sy)
}

/// Matrices for one shape, combined with the camera once per shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTransform {
    /// Projection * View * World
    pub clip: Mat4,
    /// View rotation * normal matrix
    pub normal: Mat4,
}

impl ShapeTransform {
    pub fn new(world: &Mat4, normal_matrix: &Mat4, camera: &Camera) -> Self {
        let view = camera.view_matrix();
        Self {
            clip: *camera.projection_matrix() * *view * *world,
            normal: view.rotation_part() * *normal_matrix,
        }
    }

    /// Transform a triangle to screen space. Returns `None` when any vertex
    /// sits on or behind the eye plane, where the perspective divide breaks down.
    pub fn project(&self, triangle: &Triangle, width: usize, height: usize) -> Option<[ScreenVertex; 3]> {
        let mut out = [ScreenVertex::default(); 3];
        for (slot, v) in out.iter_mut().zip(triangle.vertices.iter()) {
            let clip = self.clip.transform_point(v.position);
            if clip.w <= f32::EPSILON {
                return None;
            }
            let ndc = clip.perspective_divide();
            let (x, y) = viewport(ndc, width, height);
            *slot = ScreenVertex {
                x,
                y,
                z: ndc.z,
                w: clip.w,
                normal: self.normal.transform_direction(v.normal).truncate().normalize(),
                uv: v.uv,
            };
        }
        Some(out)
    }
}
