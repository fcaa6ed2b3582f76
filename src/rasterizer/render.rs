//! Frame sink, depth buffer and triangle rasterization

use super::math::Vec3;
use super::transform::ScreenVertex;
use super::types::Color;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut fb = Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        };
        fb.clear(Color::BLACK);
        fb
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let p = &self.pixels[idx..idx + 4];
            Some(Color::with_alpha(p[0], p[1], p[2], p[3]))
        } else {
            None
        }
    }

    /// Fill the inclusive pixel rectangle, clamped to the framebuffer
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let (x0, x1) = (x0.min(x1).clamp(0, max_x), x0.max(x1).clamp(0, max_x));
        let (y0, y1) = (y0.min(y1).clamp(0, max_y), y0.max(y1).clamp(0, max_y));
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
    }

    /// Iterate rows top to bottom, each as a slice of RGBA bytes
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact((self.width * 4).max(1)).take(self.height)
    }
}

/// Per-pixel nearest depth, one flat row-major buffer
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    depth: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            depth: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Store `z` if it is strictly nearer than what is there. Ties keep the
    /// earlier write.
    pub fn test_and_set(&mut self, x: usize, y: usize, z: f32) -> bool {
        match self.index(x, y) {
            Some(i) if z < self.depth[i] => {
                self.depth[i] = z;
                true
            }
            _ => false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// A covered, depth-passing sample handed to the shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    pub z: f32,
    /// Barycentric weights of v0, v1, v2
    pub bary: Vec3,
}

/// Edge function for edge a->b evaluated at (x, y)
#[inline]
pub fn edge_function(a: &ScreenVertex, b: &ScreenVertex, x: f32, y: f32) -> f32 {
    (a.y - b.y) * x + (b.x - a.x) * y + a.x * b.y - b.x * a.y
}

/// Barycentric weights of (x, y). `None` for a zero-area triangle.
pub fn barycentric(v: &[ScreenVertex; 3], x: f32, y: f32) -> Option<Vec3> {
    let d_alpha = edge_function(&v[1], &v[2], v[0].x, v[0].y);
    let d_beta = edge_function(&v[2], &v[0], v[1].x, v[1].y);
    let d_gamma = edge_function(&v[0], &v[1], v[2].x, v[2].y);
    if d_alpha == 0.0 || d_beta == 0.0 || d_gamma == 0.0 {
        return None;
    }
    Some(Vec3::new(
        edge_function(&v[1], &v[2], x, y) / d_alpha,
        edge_function(&v[2], &v[0], x, y) / d_beta,
        edge_function(&v[0], &v[1], x, y) / d_gamma,
    ))
}

/// Clamp vertices to `[0, width] x [0, height]` and compute the three edge
/// normalizers. `None` when the clamped triangle has no area or the
/// projection produced NaN.
fn clamped_setup(
    triangle: &[ScreenVertex; 3],
    width: usize,
    height: usize,
) -> Option<([ScreenVertex; 3], [f32; 3])> {
    if width == 0 || height == 0 {
        return None;
    }

    let mut v = *triangle;
    for sv in v.iter_mut() {
        sv.x = sv.x.clamp(0.0, width as f32);
        sv.y = sv.y.clamp(0.0, height as f32);
    }

    let d = [
        edge_function(&v[1], &v[2], v[0].x, v[0].y),
        edge_function(&v[2], &v[0], v[1].x, v[1].y),
        edge_function(&v[0], &v[1], v[2].x, v[2].y),
    ];
    if d.iter().any(|d| *d == 0.0 || !d.is_finite()) {
        return None;
    }
    Some((v, d))
}

/// Whether the triangle keeps any area once clamped to a `width x height` screen.
/// A triangle entirely off one side collapses onto the border and has none.
pub fn covers_screen_area(triangle: &[ScreenVertex; 3], width: usize, height: usize) -> bool {
    clamped_setup(triangle, width, height).is_some()
}

/// Rasterize a single screen-space triangle.
///
/// Vertices are clamped to the screen rectangle first; this is a coarse
/// clamp, not clipping, and distorts triangles that reach far off-screen.
/// Coverage is inclusive on edges. Depth is NDC z interpolated linearly in
/// screen space and must be strictly nearer to win. `shade` runs only for
/// fragments that pass the depth test. Returns the number of pixels written.
pub fn rasterize_triangle<F>(
    fb: &mut Framebuffer,
    depth: &mut DepthBuffer,
    triangle: &[ScreenVertex; 3],
    mut shade: F,
) -> usize
where
    F: FnMut(&Fragment) -> Color,
{
    let width = fb.width.min(depth.width());
    let height = fb.height.min(depth.height());
    let Some((v, [d_alpha, d_beta, d_gamma])) = clamped_setup(triangle, width, height) else {
        return 0;
    };

    // Bounding box
    let min_x = v[0].x.min(v[1].x).min(v[2].x).floor() as usize;
    let max_x = (v[0].x.max(v[1].x).max(v[2].x).ceil() as usize).min(width - 1);
    let min_y = v[0].y.min(v[1].y).min(v[2].y).floor() as usize;
    let max_y = (v[0].y.max(v[1].y).max(v[2].y).ceil() as usize).min(height - 1);

    let mut written = 0;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (px, py) = (x as f32, y as f32);
            let alpha = edge_function(&v[1], &v[2], px, py) / d_alpha;
            let beta = edge_function(&v[2], &v[0], px, py) / d_beta;
            let gamma = edge_function(&v[0], &v[1], px, py) / d_gamma;

            if alpha < 0.0 || beta < 0.0 || gamma < 0.0 {
                continue;
            }

            let z = alpha * v[0].z + beta * v[1].z + gamma * v[2].z;
            if !depth.test_and_set(x, y, z) {
                continue;
            }

            let fragment = Fragment {
                x,
                y,
                z,
                bary: Vec3::new(alpha, beta, gamma),
            };
            let color = shade(&fragment);
            fb.set_pixel(x, y, color);
            written += 1;
        }
    }
    written
}
