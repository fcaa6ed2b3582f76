//! CPU triangle rasterizer
//!
//! Features:
//! - Off-center perspective projection from explicit frustum bounds
//! - Edge-function barycentric rasterization with a strict-less z-buffer
//! - Flat, Gouraud and Phong shading on the Phong reflection model
//! - Perspective-correct, bilinearly filtered texture lookups

mod camera;
mod context;
mod math;
mod render;
mod shading;
mod transform;
mod types;

pub use camera::*;
pub use context::*;
pub use math::*;
pub use render::*;
pub use shading::*;
pub use transform::*;
pub use types::*;
