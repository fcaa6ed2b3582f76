//! Solid rectangle fill
//!
//! Input is one rectangle per line: `ulx uly lrx lry r g b`, integer
//! corners (inclusive) and non-negative color channels. Channels are
//! scaled from `0..=max_value` to 0-255 when filled, so files written for
//! a wider range (e.g. 12-bit 0-4095) keep their colors. Blank lines and
//! `#` comments are skipped.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{RenderError, Result};
use crate::rasterizer::{Color, Framebuffer, Vec3};

/// Channel range of plain 8-bit input
pub const DEFAULT_MAX_VALUE: u16 = 255;

/// One filled rectangle, corners in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectFill {
    pub upper_left: (i64, i64),
    pub lower_right: (i64, i64),
    /// Raw r, g, b as written in the file
    pub channels: [u16; 3],
}

impl RectFill {
    /// 8-bit color for channels in `0..=max_value`. Values above the max saturate.
    pub fn color(&self, max_value: u16) -> Color {
        let max = f32::from(max_value.max(1));
        let [r, g, b] = self.channels.map(|c| f32::from(c) / max);
        Color::from_unit(Vec3::new(r, g, b))
    }
}

/// Parse a rectangle list. Any malformed line fails the whole parse.
pub fn parse_rects(text: &str) -> Result<Vec<RectFill>> {
    let mut rects = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let number = index + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(RenderError::RectParse {
                line: number,
                message: format!("expected 7 integers, found {} fields", fields.len()),
            });
        }

        let mut values = [0i64; 7];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| RenderError::RectParse {
                line: number,
                message: format!("'{}' is not an integer", field),
            })?;
        }

        let channel = |v: i64| {
            u16::try_from(v).map_err(|_| RenderError::RectParse {
                line: number,
                message: format!("color channel {} is outside 0-{}", v, u16::MAX),
            })
        };
        rects.push(RectFill {
            upper_left: (values[0], values[1]),
            lower_right: (values[2], values[3]),
            channels: [channel(values[4])?, channel(values[5])?, channel(values[6])?],
        });
    }
    Ok(rects)
}

/// Fill each rectangle, in order, into a fresh black framebuffer.
/// Channels are read against `max_value` (255 for 8-bit input).
pub fn render_rects(width: usize, height: usize, max_value: u16, rects: &[RectFill]) -> Result<Framebuffer> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }
    let mut fb = Framebuffer::new(width, height);
    for rect in rects {
        let (x0, y0) = rect.upper_left;
        let (x1, y1) = rect.lower_right;
        fb.fill_rect(x0, y0, x1, y1, rect.color(max_value));
    }
    Ok(fb)
}

/// Read a rectangle file and fill it at the given size
pub fn render_rects_file<P: AsRef<Path>>(path: P, width: usize, height: usize, max_value: u16) -> Result<Framebuffer> {
    let path = path.as_ref();
    let rects = parse_rects(&fs::read_to_string(path)?)?;
    info!(
        "Filling {} rectangles from {} (channel max {})",
        rects.len(),
        path.display(),
        max_value
    );
    render_rects(width, height, max_value, &rects)
}
