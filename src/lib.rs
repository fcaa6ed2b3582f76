//! Nocturne: CPU-only triangle rasterizer
//!
//! Scenes of triangle meshes go through a transform, rasterize and shade
//! pipeline into an RGBA framebuffer, which can be written out as a
//! plain-text PPM. No GPU API is involved.
//!
//! - [`rasterizer`]: math, camera, transforms, z-buffered rasterization,
//!   flat / Gouraud / Phong shading and texture sampling
//! - [`scene`]: scene files (RON or JSON), mesh and texture loading, and
//!   whole-frame rendering
//! - [`ppm`]: P3 output
//! - [`rects`]: solid rectangle fill

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod logging;
pub mod ppm;
pub mod rasterizer;
pub mod rects;
pub mod scene;

pub use error::{RenderError, Result};
pub use scene::{load_scene, render_scene, render_scene_to_file, render_scene_with, Scene};
