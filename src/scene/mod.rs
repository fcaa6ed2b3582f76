//! Scene aggregate and the whole-frame render entry points

mod description;
mod loader;

pub use description::*;
pub use loader::*;

use std::collections::HashMap;
use std::path::Path;

use log::info;

use crate::error::{RenderError, Result};
use crate::ppm;
use crate::rasterizer::{Camera, Color, FrameStats, Framebuffer, Light, Mesh, RenderContext, ShadingMode, Texture};

/// Everything needed to render one frame. Shapes refer to meshes and
/// textures by identifier; the maps own the data and drop with the scene.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub shapes: Vec<Shape>,
    pub background: Color,
    pub meshes: HashMap<String, Mesh>,
    pub textures: HashMap<String, Texture>,
}

impl Scene {
    /// Empty scene with a black background
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            lights: Vec::new(),
            shapes: Vec::new(),
            background: Color::BLACK,
            meshes: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.shapes
            .iter()
            .filter_map(|s| self.meshes.get(&s.geometry))
            .map(Mesh::len)
            .sum()
    }
}

/// Render one frame at the camera's resolution
pub fn render_scene(scene: &Scene, shading: ShadingMode) -> Result<Framebuffer> {
    render_scene_with(scene, shading, |_, _| {})
}

/// Render one frame, calling `on_shape(index, shape)` after each shape is drawn
pub fn render_scene_with<F>(scene: &Scene, shading: ShadingMode, mut on_shape: F) -> Result<Framebuffer>
where
    F: FnMut(usize, &Shape),
{
    // Every shape must resolve before anything is drawn
    let mut meshes = Vec::with_capacity(scene.shapes.len());
    for shape in &scene.shapes {
        let mesh = scene
            .meshes
            .get(&shape.geometry)
            .ok_or_else(|| RenderError::MissingGeometry(shape.geometry.clone()))?;
        meshes.push(mesh);
    }

    let (width, height) = scene.camera.resolution();
    let mut fb = Framebuffer::new(width, height);
    fb.clear(scene.background);

    let stats = render_shapes(&mut fb, scene, &meshes, shading, &mut on_shape)?;
    info!(
        "Rendered {}x{} ({:?}): {} triangles, {} pixels written, {} behind the eye",
        width, height, shading, stats.triangles_submitted, stats.fragments_written, stats.triangles_behind_eye
    );
    Ok(fb)
}

fn render_shapes<F>(
    fb: &mut Framebuffer,
    scene: &Scene,
    meshes: &[&Mesh],
    shading: ShadingMode,
    on_shape: &mut F,
) -> Result<FrameStats>
where
    F: FnMut(usize, &Shape),
{
    let mut ctx = RenderContext::new(fb, &scene.camera, &scene.lights, shading)?;
    for (index, (shape, mesh)) in scene.shapes.iter().zip(meshes).enumerate() {
        ctx.set_transform(&shape.transform)?;
        let texture = shape.material.texture.as_ref().and_then(|name| scene.textures.get(name));
        for triangle in &mesh.triangles {
            ctx.put_triangle(triangle, &shape.material, texture);
        }
        on_shape(index, shape);
    }
    Ok(ctx.finish())
}

/// Render one frame and write it as a P3 PPM
pub fn render_scene_to_file<P: AsRef<Path>>(scene: &Scene, path: P, shading: ShadingMode) -> Result<()> {
    let fb = render_scene(scene, shading)?;
    ppm::save_ppm(&fb, path)
}
