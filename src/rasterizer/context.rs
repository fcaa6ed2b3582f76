//! Per-frame render state
//!
//! A `RenderContext` borrows the framebuffer and camera for one frame and
//! owns the depth buffer. Everything a triangle needs flows through it;
//! there is no global state.

use log::{debug, warn};

use super::camera::Camera;
use super::math::Mat4;
use super::render::{covers_screen_area, rasterize_triangle, DepthBuffer, Framebuffer};
use super::shading::{apply_texture, LightRig, PerspectiveUv, TriangleShader};
use super::transform::{ShapeTransform, Transform};
use super::types::{Color, Light, Material, ShadingMode, Texture, Triangle};
use crate::error::{RenderError, Result};

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles_submitted: usize,
    /// No screen area once clamped to the framebuffer, which includes
    /// triangles lying entirely off one side of the screen
    pub triangles_degenerate: usize,
    /// A vertex on or behind the eye plane
    pub triangles_behind_eye: usize,
    pub fragments_written: usize,
}

pub struct RenderContext<'a> {
    target: &'a mut Framebuffer,
    depth: DepthBuffer,
    camera: &'a Camera,
    world: Mat4,
    normal_matrix: Mat4,
    shape: ShapeTransform,
    shading: ShadingMode,
    lights: LightRig,
    stats: FrameStats,
}

impl<'a> RenderContext<'a> {
    /// Start a frame. The framebuffer must match the camera resolution.
    pub fn new(target: &'a mut Framebuffer, camera: &'a Camera, lights: &[Light], shading: ShadingMode) -> Result<Self> {
        let (width, height) = camera.resolution();
        if target.width != width || target.height != height {
            return Err(RenderError::InvalidResolution {
                width: target.width,
                height: target.height,
            });
        }

        Ok(Self {
            target,
            depth: DepthBuffer::new(width, height),
            camera,
            world: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
            shape: ShapeTransform::new(&Mat4::IDENTITY, &Mat4::IDENTITY, camera),
            shading,
            lights: LightRig::from_lights(lights, camera.view_matrix()),
            stats: FrameStats::default(),
        })
    }

    /// Set the object-to-world placement for the following triangles
    pub fn set_transform(&mut self, transform: &Transform) -> Result<()> {
        self.normal_matrix = transform.normal_matrix()?;
        self.world = transform.world_matrix();
        self.shape = ShapeTransform::new(&self.world, &self.normal_matrix, self.camera);
        Ok(())
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    pub fn normal_matrix(&self) -> &Mat4 {
        &self.normal_matrix
    }

    pub fn shading(&self) -> ShadingMode {
        self.shading
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Transform, rasterize and shade one triangle.
    ///
    /// `texture` is the resolved `material.texture`; when the material names
    /// a texture but none is given, the triangle renders untextured.
    /// Returns the number of pixels written.
    pub fn put_triangle(&mut self, triangle: &Triangle, material: &Material, texture: Option<&Texture>) -> usize {
        self.stats.triangles_submitted += 1;
        let (width, height) = (self.target.width, self.target.height);

        let Some(screen) = self.shape.project(triangle, width, height) else {
            debug!("Skipping triangle with a vertex behind the eye");
            self.stats.triangles_behind_eye += 1;
            return 0;
        };

        let texture = match (&material.texture, texture) {
            (Some(_), Some(tex)) => Some((tex, PerspectiveUv::new(&screen))),
            (Some(name), None) => {
                warn!("Texture '{}' is not loaded; rendering untextured", name);
                None
            }
            (None, _) => None,
        };

        let shader = TriangleShader::new(self.shading, &screen, &self.lights, material);
        let lights = &self.lights;
        let written = rasterize_triangle(&mut *self.target, &mut self.depth, &screen, |fragment| {
            let lit = shader.color_at(fragment.bary, lights, material);
            let color = match &texture {
                Some((tex, uv)) => apply_texture(lit, tex, uv.at(fragment.bary), material.kt),
                None => lit,
            };
            Color::from_unit(color)
        });

        if written == 0 && !covers_screen_area(&screen, width, height) {
            self.stats.triangles_degenerate += 1;
        }
        self.stats.fragments_written += written;
        written
    }

    /// End the frame, returning its counters. The depth buffer is dropped.
    pub fn finish(self) -> FrameStats {
        debug!("Frame finished: {:?}", self.stats);
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::camera::Frustum;
    use crate::rasterizer::math::{Vec2, Vec3};
    use crate::rasterizer::types::{Mesh, Vertex};

    fn camera(size: usize) -> Camera {
        Camera::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::UP,
            Frustum::symmetric(1.0, 10.0, 0.5),
            size,
            size,
        )
        .unwrap()
    }

    fn ambient_material(color: Vec3) -> Material {
        Material {
            color,
            ka: 1.0,
            kd: 0.0,
            ks: 0.0,
            kt: 0.0,
            specular_exponent: 1.0,
            texture: None,
        }
    }

    fn white_ambient() -> Vec<Light> {
        vec![Light::ambient(Vec3::ONE, 1.0)]
    }

    #[test]
    fn test_framebuffer_must_match_camera() {
        let cam = camera(16);
        let mut fb = Framebuffer::new(8, 16);
        assert!(RenderContext::new(&mut fb, &cam, &[], ShadingMode::Flat).is_err());
    }

    #[test]
    fn test_flat_ambient_fills_with_surface_color() {
        let cam = camera(32);
        let mut fb = Framebuffer::new(32, 32);
        let color = Vec3::new(0.2, 0.6, 0.4);
        let lights = white_ambient();
        let mut ctx = RenderContext::new(&mut fb, &cam, &lights, ShadingMode::Flat).unwrap();
        for tri in &Mesh::unit_quad().triangles {
            ctx.put_triangle(tri, &ambient_material(color), None);
        }
        let stats = ctx.finish();
        assert!(stats.fragments_written > 0);

        let expected = Color::from_unit(color);
        let mut lit = 0;
        for y in 0..32 {
            for x in 0..32 {
                let px = fb.get_pixel(x, y).unwrap();
                if px != Color::BLACK {
                    assert_eq!(px, expected);
                    lit += 1;
                }
            }
        }
        // Pixels on the shared diagonal may be written twice
        assert!(lit > 0 && lit <= stats.fragments_written);
    }

    #[test]
    fn test_nearer_shape_hides_farther_one() {
        let cam = camera(32);
        let mut fb = Framebuffer::new(32, 32);
        let lights = white_ambient();
        let red = ambient_material(Vec3::new(1.0, 0.0, 0.0));
        let blue = ambient_material(Vec3::new(0.0, 0.0, 1.0));
        let quad = Mesh::unit_quad();

        let mut ctx = RenderContext::new(&mut fb, &cam, &lights, ShadingMode::Gouraud).unwrap();
        ctx.set_transform(&Transform {
            translation: Vec3::new(0.0, 0.0, 1.0),
            ..Transform::default()
        })
        .unwrap();
        for tri in &quad.triangles {
            ctx.put_triangle(tri, &red, None);
        }
        ctx.set_transform(&Transform::default()).unwrap();
        for tri in &quad.triangles {
            ctx.put_triangle(tri, &blue, None);
        }
        let center_depth = ctx.depth().get(16, 16).unwrap();
        ctx.finish();

        assert!(center_depth.is_finite());
        assert_eq!(fb.get_pixel(16, 16), Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn test_missing_texture_degrades_to_untextured() {
        let cam = camera(16);
        let mut fb = Framebuffer::new(16, 16);
        let lights = white_ambient();
        let mut material = ambient_material(Vec3::new(0.5, 0.5, 0.5));
        material.texture = Some("missing.bmp".to_string());
        material.kt = 1.0;

        let mut ctx = RenderContext::new(&mut fb, &cam, &lights, ShadingMode::Phong).unwrap();
        let written: usize = Mesh::unit_quad().triangles.iter().map(|t| ctx.put_triangle(t, &material, None)).sum();
        ctx.finish();

        assert!(written > 0);
        assert_eq!(fb.get_pixel(8, 8), Some(Color::from_unit(Vec3::new(0.5, 0.5, 0.5))));
    }

    #[test]
    fn test_texture_is_added_per_fragment() {
        let cam = camera(16);
        let mut fb = Framebuffer::new(16, 16);
        let lights = white_ambient();
        let mut material = ambient_material(Vec3::ZERO);
        material.texture = Some("solid".to_string());
        material.kt = 0.5;
        let tex = Texture::checkerboard(4, 4, 4, Vec3::new(0.8, 0.4, 1.0), Vec3::ZERO);

        let mut ctx = RenderContext::new(&mut fb, &cam, &lights, ShadingMode::Flat).unwrap();
        for tri in &Mesh::unit_quad().triangles {
            ctx.put_triangle(tri, &material, Some(&tex));
        }
        ctx.finish();
        assert_eq!(fb.get_pixel(8, 8), Some(Color::from_unit(Vec3::new(0.4, 0.2, 0.5))));
    }

    #[test]
    fn test_degenerate_and_behind_eye_triangles_are_counted() {
        let cam = camera(16);
        let mut fb = Framebuffer::new(16, 16);
        let m = ambient_material(Vec3::ONE);
        let v = |x: f32, y: f32, z: f32| Vertex::new(Vec3::new(x, y, z), Vec3::new(0.0, 0.0, 1.0), Vec2::default());

        let mut ctx = RenderContext::new(&mut fb, &cam, &[], ShadingMode::Flat).unwrap();
        let sliver = Triangle::new(v(0.0, 0.0, 0.0), v(0.0, 0.0, 0.0), v(0.5, 0.5, 0.0));
        assert_eq!(ctx.put_triangle(&sliver, &m, None), 0);
        let behind = Triangle::new(v(0.0, 0.0, 7.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0));
        assert_eq!(ctx.put_triangle(&behind, &m, None), 0);

        let stats = ctx.finish();
        assert_eq!(stats.triangles_submitted, 2);
        assert_eq!(stats.triangles_degenerate, 1);
        assert_eq!(stats.triangles_behind_eye, 1);
    }

    #[test]
    fn test_off_screen_triangle_counts_as_degenerate() {
        let cam = camera(16);
        let mut fb = Framebuffer::new(16, 16);
        let m = ambient_material(Vec3::ONE);
        let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec2::default());

        let mut ctx = RenderContext::new(&mut fb, &cam, &white_ambient(), ShadingMode::Flat).unwrap();
        let off_left = Triangle::new(v(-10.0, 0.0), v(-8.0, 0.0), v(-9.0, 1.0));
        assert_eq!(ctx.put_triangle(&off_left, &m, None), 0);

        let stats = ctx.finish();
        assert_eq!(stats.triangles_submitted, 1);
        assert_eq!(stats.triangles_degenerate, 1);
        assert_eq!(stats.triangles_behind_eye, 0);
    }

    #[test]
    fn test_context_exposes_current_state() {
        let cam = camera(16);
        let mut fb = Framebuffer::new(16, 16);
        let placement = Transform {
            translation: Vec3::new(1.0, -2.0, 0.5),
            rotation: Vec3::new(0.0, 30.0, 0.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };

        let mut ctx = RenderContext::new(&mut fb, &cam, &white_ambient(), ShadingMode::Gouraud).unwrap();
        assert_eq!(ctx.shading(), ShadingMode::Gouraud);
        assert_eq!(*ctx.world_matrix(), Mat4::IDENTITY);

        ctx.set_transform(&placement).unwrap();
        assert_eq!(*ctx.world_matrix(), placement.world_matrix());
        assert_eq!(*ctx.normal_matrix(), placement.normal_matrix().unwrap());

        ctx.put_triangle(&Mesh::unit_quad().triangles[0], &ambient_material(Vec3::ONE), None);
        let mid_frame = ctx.stats();
        assert_eq!(mid_frame.triangles_submitted, 1);
        assert_eq!(ctx.finish(), mid_frame);
    }

    #[test]
    fn test_directional_light_facing_rotated_quad_is_white() {
        let cam = Camera::new(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::UP,
            Frustum::symmetric(1.0, 10.0, 0.5),
            32,
            32,
        )
        .unwrap();
        // Quad normal (0, 0, 1) turns to (1, 0, 0), toward the camera
        let facing_camera = Transform {
            rotation: Vec3::new(0.0, 90.0, 0.0),
            ..Transform::default()
        };
        let lights = [Light::directional(Vec3::ONE, 1.0, Vec3::new(-1.0, 0.0, 0.0))];
        let diffuse = Material {
            color: Vec3::ONE,
            ka: 0.0,
            kd: 1.0,
            ks: 0.0,
            kt: 0.0,
            specular_exponent: 1.0,
            texture: None,
        };

        for mode in [ShadingMode::Flat, ShadingMode::Gouraud, ShadingMode::Phong] {
            let mut fb = Framebuffer::new(32, 32);
            let mut ctx = RenderContext::new(&mut fb, &cam, &lights, mode).unwrap();
            ctx.set_transform(&facing_camera).unwrap();
            for tri in &Mesh::unit_quad().triangles {
                ctx.put_triangle(tri, &diffuse, None);
            }
            ctx.finish();
            assert_eq!(fb.get_pixel(16, 16), Some(Color::WHITE), "{:?}", mode);
        }
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        let cam = camera(8);
        let mut fb = Framebuffer::new(8, 8);
        let mut ctx = RenderContext::new(&mut fb, &cam, &[], ShadingMode::Flat).unwrap();
        let flat = Transform {
            scale: Vec3::new(1.0, 1.0, 0.0),
            ..Transform::default()
        };
        assert!(matches!(ctx.set_transform(&flat), Err(RenderError::SingularScale)));
    }
}
