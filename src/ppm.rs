//! Plain-text PPM (P3) output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::rasterizer::Framebuffer;

/// Write `fb` as P3: a `P3 / width height / 255` header, then one line per
/// row of space-separated `R G B` triples. Alpha is dropped.
pub fn write_ppm<W: Write>(fb: &Framebuffer, mut out: W) -> Result<()> {
    write!(out, "P3\n{} {}\n255\n", fb.width, fb.height)?;
    let mut line = String::with_capacity(fb.width * 12);
    for row in fb.rows() {
        line.clear();
        for (i, px) in row.chunks_exact(4).enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&format!("{} {} {}", px[0], px[1], px[2]));
        }
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Write `fb` to a `.ppm` file, replacing it if present
pub fn save_ppm<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_ppm(fb, BufWriter::new(file))?;
    info!("Wrote {}x{} image to {}", fb.width, fb.height, path.display());
    Ok(())
}
