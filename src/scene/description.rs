//! On-disk scene description
//!
//! The same structs deserialize from RON and JSON; see `loader`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rasterizer::{Camera, Frustum, Light, Material, Transform, Vec3};

fn default_up() -> Vec3 {
    Vec3::UP
}

/// Camera placement, frustum bounds and output size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    pub from: Vec3,
    pub to: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    /// (width, height) in pixels
    pub resolution: (usize, usize),
}

impl CameraDescription {
    pub fn frustum(&self) -> Frustum {
        Frustum {
            near: self.near,
            far: self.far,
            top: self.top,
            bottom: self.bottom,
            left: self.left,
            right: self.right,
        }
    }

    /// Validate and build the camera
    pub fn build(&self) -> Result<Camera> {
        let (width, height) = self.resolution;
        Camera::new(self.from, self.to, self.up, self.frustum(), width, height)
    }
}

/// One mesh instance: geometry by identifier, its material and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: String,
    pub material: Material,
    #[serde(default)]
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    /// Clear color, linear [0, 1]
    #[serde(default)]
    pub background: Vec3,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}
