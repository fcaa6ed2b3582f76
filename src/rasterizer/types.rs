//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::{Vec2, Vec3, Vec4};
use crate::error::{RenderError, Result};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize a linear [0, 1] color. Out-of-range components are clamped.
    pub fn from_unit(c: Vec3) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(c.x), q(c.y), q(c.z))
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A vertex with position, normal and texture coordinate (object space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self { position, normal, uv }
    }
}

/// The only primitive the pipeline draws
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self { vertices: [v0, v1, v2] }
    }
}

/// Ordered triangle list, shared read-only by every shape that names it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Two-triangle quad in the z = 0 plane facing +Z, spanning [-1, 1] in x and y
    pub fn unit_quad() -> Self {
        let n = Vec3::new(0.0, 0.0, 1.0);
        let v = |x: f32, y: f32, u: f32, t: f32| Vertex::new(Vec3::new(x, y, 0.0), n, Vec2::new(u, t));
        let bl = v(-1.0, -1.0, 0.0, 1.0);
        let br = v(1.0, -1.0, 1.0, 1.0);
        let tr = v(1.0, 1.0, 1.0, 0.0);
        let tl = v(-1.0, 1.0, 0.0, 0.0);
        Self::new(vec![Triangle::new(bl, br, tr), Triangle::new(bl, tr, tl)])
    }
}

/// Surface reflectance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base surface color, linear [0, 1]
    pub color: Vec3,
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    /// Weight of the texture sample added on top of the lit color
    #[serde(default)]
    pub kt: f32,
    pub specular_exponent: f32,
    /// Texture identifier, resolved through the scene
    #[serde(default)]
    pub texture: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            ka: 0.1,
            kd: 0.7,
            ks: 0.2,
            kt: 0.0,
            specular_exponent: 32.0,
            texture: None,
        }
    }
}

/// Immutable grid of normalized RGBA texels, row 0 at v = 0
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Vec4>,
}

impl Texture {
    pub fn new(width: usize, height: usize, texels: Vec<Vec4>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTexture(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if texels.len() != width * height {
            return Err(RenderError::InvalidTexture(format!(
                "expected {} texels for {}x{}, got {}",
                width * height,
                width,
                height,
                texels.len()
            )));
        }
        Ok(Self { width, height, texels })
    }

    /// Load texture from raw encoded bytes (BMP, PNG or JPEG)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| RenderError::InvalidTexture(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width as usize, height as usize, rgba.as_raw())
    }

    /// Build from tightly packed 8-bit RGBA, validated like `new`
    pub fn from_rgba8(width: usize, height: usize, rgba: &[u8]) -> Result<Self> {
        let texels = rgba
            .chunks_exact(4)
            .map(|p| {
                Vec4::new(
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                )
            })
            .collect();
        Self::new(width, height, texels)
    }

    /// Create a checkerboard test texture with `cell`-texel squares
    pub fn checkerboard(width: usize, height: usize, cell: usize, color1: Vec3, color2: Vec3) -> Self {
        let (width, height, cell) = (width.max(1), height.max(1), cell.max(1));
        let mut texels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                texels.push(if checker { color1 } else { color2 }.extend(1.0));
            }
        }
        Self { width, height, texels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Texel at x,y, clamped to the texture edge
    pub fn texel(&self, x: usize, y: usize) -> Vec4 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.texels[y * self.width + x]
    }

    /// Bilinear sample at UV in [0, 1]. Texel centers sit at u = i / (width - 1).
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Vec4 {
        let fx = u.clamp(0.0, 1.0) * (self.width - 1) as f32;
        let fy = v.clamp(0.0, 1.0) * (self.height - 1) as f32;

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let s = fx - x0 as f32;
        let t = fy - y0 as f32;

        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), s);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), s);
        top.lerp(bottom, t)
    }
}

/// Scene light source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Light {
    Ambient {
        color: Vec3,
        intensity: f32,
    },
    Directional {
        color: Vec3,
        intensity: f32,
        /// Direction the light travels in world space
        direction: Vec3,
    },
}

impl Light {
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn directional(color: Vec3, intensity: f32, direction: Vec3) -> Self {
        Light::Directional {
            color,
            intensity,
            direction: direction.normalize(),
        }
    }
}

/// When the lighting model is evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// Once per triangle, with the averaged vertex normal
    Flat,
    /// Once per vertex, colors interpolated
    Gouraud,
    /// Once per fragment, normals interpolated
    #[default]
    Phong,
}

impl std::str::FromStr for ShadingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(ShadingMode::Flat),
            "gouraud" => Ok(ShadingMode::Gouraud),
            "phong" => Ok(ShadingMode::Phong),
            other => Err(format!("unknown shading mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Texture {
        let texels = vec![
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        ];
        Texture::new(2, 2, texels).unwrap()
    }

    #[test]
    fn test_texture_rejects_zero_dimension() {
        assert!(matches!(Texture::new(0, 4, Vec::new()), Err(RenderError::InvalidTexture(_))));
        assert!(Texture::new(2, 2, vec![Vec4::default(); 3]).is_err());
    }

    #[test]
    fn test_decoded_pixels_are_validated() {
        assert!(matches!(Texture::from_rgba8(0, 3, &[]), Err(RenderError::InvalidTexture(_))));
        assert!(matches!(Texture::from_rgba8(2, 1, &[255; 4]), Err(RenderError::InvalidTexture(_))));

        let tex = Texture::from_rgba8(1, 1, &[255, 0, 51, 255]).unwrap();
        assert_eq!(tex.texel(0, 0), Vec4::new(1.0, 0.0, 0.2, 1.0));
        assert!(matches!(Texture::from_bytes(b"not an image"), Err(RenderError::InvalidTexture(_))));
    }

    #[test]
    fn test_bilinear_at_texel_center_is_exact() {
        let tex = Texture::checkerboard(4, 4, 1, Vec3::new(0.2, 0.4, 0.6), Vec3::new(0.9, 0.1, 0.3));
        for y in 0..4 {
            for x in 0..4 {
                let u = x as f32 / 3.0;
                let v = y as f32 / 3.0;
                let s = tex.sample_bilinear(u, v);
                let t = tex.texel(x, y);
                assert!((s.x - t.x).abs() < 1e-6);
                assert!((s.y - t.y).abs() < 1e-6);
                assert!((s.z - t.z).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint_blends_four_texels() {
        let s = gradient().sample_bilinear(0.5, 0.5);
        assert!((s.x - 0.25).abs() < 1e-6);
        assert!((s.y - 0.25).abs() < 1e-6);
        assert!((s.z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_clamps_outside_uv() {
        let tex = gradient();
        assert_eq!(tex.sample_bilinear(-3.0, -3.0), tex.texel(0, 0));
        assert_eq!(tex.sample_bilinear(7.0, 7.0), tex.texel(1, 1));
    }

    #[test]
    fn test_single_texel_texture() {
        let tex = Texture::new(1, 1, vec![Vec4::new(0.5, 0.5, 0.5, 1.0)]).unwrap();
        assert_eq!(tex.sample_bilinear(0.7, 0.2), Vec4::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn test_color_from_unit_clamps() {
        assert_eq!(Color::from_unit(Vec3::new(2.0, -1.0, 0.5)), Color::new(255, 0, 128));
    }

    #[test]
    fn test_shading_mode_from_str() {
        assert_eq!("Gouraud".parse::<ShadingMode>(), Ok(ShadingMode::Gouraud));
        assert!("toon".parse::<ShadingMode>().is_err());
    }
}
