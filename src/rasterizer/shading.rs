//! Phong reflection model and its flat / Gouraud / Phong evaluation schedules

use log::warn;

use super::math::{Mat4, Vec2, Vec3};
use super::transform::ScreenVertex;
use super::types::{Light, Material, ShadingMode, Texture};

/// Look direction in camera space (from the surface toward the eye is +Z)
const VIEW_DIRECTION: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

#[derive(Debug, Clone, Copy, PartialEq)]
struct DirectionalTerm {
    color: Vec3,
    intensity: f32,
    /// Direction of travel, camera space, unit length
    direction: Vec3,
}

/// The active lights for one frame: at most one ambient and one directional
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightRig {
    ambient: Option<(Vec3, f32)>,
    directional: Option<DirectionalTerm>,
}

impl LightRig {
    /// Pick the first light of each kind and rotate the directional light
    /// into camera space with `view`.
    pub fn from_lights(lights: &[Light], view: &Mat4) -> Self {
        let mut rig = LightRig::default();
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    if rig.ambient.is_some() {
                        warn!("Ignoring extra ambient light {:?}", light);
                        continue;
                    }
                    rig.ambient = Some((color, intensity));
                }
                Light::Directional { color, intensity, direction } => {
                    if rig.directional.is_some() {
                        warn!("Ignoring extra directional light {:?}", light);
                        continue;
                    }
                    let direction = view.transform_direction(direction).truncate().normalize();
                    rig.directional = Some(DirectionalTerm { color, intensity, direction });
                }
            }
        }
        rig
    }

    /// Lit color for a camera-space unit normal, clamped to [0, 1]
    pub fn shade(&self, material: &Material, normal: Vec3) -> Vec3 {
        let ambient = self
            .ambient
            .map(|(color, intensity)| color * intensity)
            .unwrap_or(Vec3::ZERO);

        let (diffuse, specular) = match self.directional {
            Some(light) => {
                let to_light = -light.direction;
                let diffuse = light.color * (to_light.dot(normal).max(0.0) * light.intensity);
                let reflected = to_light.reflect(normal);
                let highlight = (-VIEW_DIRECTION).dot(reflected).max(0.0).powf(material.specular_exponent);
                let specular = light.color * (highlight * light.intensity);
                (diffuse, specular)
            }
            None => (Vec3::ZERO, Vec3::ZERO),
        };

        let reflectance = ambient * material.ka + diffuse * material.kd + specular * material.ks;
        (material.color * reflectance).saturate()
    }
}

/// Lighting precomputed for one triangle in the active shading mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleShader {
    /// One color for every fragment
    Flat(Vec3),
    /// Lit color per vertex
    Gouraud([Vec3; 3]),
    /// Camera-space normal per vertex
    Phong([Vec3; 3]),
}

impl TriangleShader {
    pub fn new(mode: ShadingMode, vertices: &[ScreenVertex; 3], rig: &LightRig, material: &Material) -> Self {
        let normals = [vertices[0].normal, vertices[1].normal, vertices[2].normal];
        match mode {
            ShadingMode::Flat => {
                let average = (normals[0] + normals[1] + normals[2]).normalize();
                TriangleShader::Flat(rig.shade(material, average))
            }
            ShadingMode::Gouraud => TriangleShader::Gouraud(normals.map(|n| rig.shade(material, n))),
            ShadingMode::Phong => TriangleShader::Phong(normals),
        }
    }

    /// Lit color at barycentric weights `bary`
    pub fn color_at(&self, bary: Vec3, rig: &LightRig, material: &Material) -> Vec3 {
        match self {
            TriangleShader::Flat(color) => *color,
            TriangleShader::Gouraud(c) => c[0] * bary.x + c[1] * bary.y + c[2] * bary.z,
            TriangleShader::Phong(n) => {
                let normal = (n[0] * bary.x + n[1] * bary.y + n[2] * bary.z).normalize();
                rig.shade(material, normal)
            }
        }
    }
}

/// Per-vertex u/w, v/w and 1/w for perspective-correct texture coordinates.
///
/// `w` is the clip-space w, not NDC z. It stays positive for every vertex
/// in front of the eye, while NDC z crosses 0 inside the frustum and would
/// blow up the division there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveUv {
    u_over_w: Vec3,
    v_over_w: Vec3,
    one_over_w: Vec3,
}

impl PerspectiveUv {
    pub fn new(vertices: &[ScreenVertex; 3]) -> Self {
        let inv = |i: usize| 1.0 / vertices[i].w;
        let one_over_w = Vec3::new(inv(0), inv(1), inv(2));
        Self {
            u_over_w: Vec3::new(vertices[0].uv.x, vertices[1].uv.x, vertices[2].uv.x) * one_over_w,
            v_over_w: Vec3::new(vertices[0].uv.y, vertices[1].uv.y, vertices[2].uv.y) * one_over_w,
            one_over_w,
        }
    }

    pub fn at(&self, bary: Vec3) -> Vec2 {
        let q = self.one_over_w.dot(bary);
        Vec2::new(self.u_over_w.dot(bary) / q, self.v_over_w.dot(bary) / q)
    }
}

/// Add the weighted texture sample to the lit color
pub fn apply_texture(lit: Vec3, texture: &Texture, uv: Vec2, kt: f32) -> Vec3 {
    let texel = texture.sample_bilinear(uv.x, uv.y).truncate();
    (lit + texel * kt).saturate()
}
