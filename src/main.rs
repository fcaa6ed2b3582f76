//! Nocturne command line: render a scene file or fill rectangles into a PPM

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use nocturne::logging::{init_logging, LoggingConfig};
use nocturne::ppm::save_ppm;
use nocturne::rasterizer::ShadingMode;
use nocturne::rects::{render_rects_file, DEFAULT_MAX_VALUE};
use nocturne::scene::{load_scene, render_scene_with};

#[derive(Parser)]
#[command(name = "nocturne", version)]
#[command(about = "CPU triangle rasterizer writing plain-text PPM images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a RON or JSON scene description
    Render {
        /// Scene file (.ron or .json)
        scene: PathBuf,

        /// Output PPM file
        #[arg(short, long)]
        output: PathBuf,

        /// flat, gouraud or phong
        #[arg(long, default_value = "phong")]
        shading: ShadingMode,

        /// Override the scene's output width
        #[arg(long)]
        width: Option<usize>,

        /// Override the scene's output height
        #[arg(long)]
        height: Option<usize>,
    },
    /// Fill `ulx uly lrx lry r g b` rectangles into a black image
    Rects {
        /// Rectangle list, one per line
        input: PathBuf,

        /// Output PPM file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "512")]
        width: usize,

        #[arg(long, default_value = "512")]
        height: usize,

        /// Largest channel value in the input; channels are scaled from 0..=max to 0-255
        #[arg(long, default_value_t = DEFAULT_MAX_VALUE, value_parser = clap::value_parser!(u16).range(1..))]
        max_value: u16,
    },
}

/// Run `f` and measure how long it took
fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.quiet {
        LoggingConfig::quiet()
    } else {
        LoggingConfig::default()
    });

    match cli.command {
        Commands::Render {
            scene,
            output,
            shading,
            width,
            height,
        } => {
            let (loaded, load_time) = timed(|| load_scene(&scene));
            let mut loaded = loaded.with_context(|| format!("Failed to load scene {}", scene.display()))?;

            if width.is_some() || height.is_some() {
                let (w, h) = loaded.camera.resolution();
                let (w, h) = (width.unwrap_or(w), height.unwrap_or(h));
                loaded.camera = loaded
                    .camera
                    .with_resolution(w, h)
                    .with_context(|| format!("Invalid output size {}x{}", w, h))?;
            }

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                ProgressBar::new(loaded.shapes.len() as u64)
            };
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} shapes {msg}")?.progress_chars("=> "),
            );

            info!("Rendering {} triangles with {:?} shading", loaded.triangle_count(), shading);
            let (fb, render_time) = timed(|| {
                render_scene_with(&loaded, shading, |_, shape| {
                    progress.set_message(shape.geometry.clone());
                    progress.inc(1);
                })
            });
            let fb = fb.with_context(|| format!("Failed to render {}", scene.display()))?;
            progress.finish_and_clear();
            info!("Scene loaded in {:.2?}, rendered in {:.2?}", load_time, render_time);

            save_ppm(&fb, &output).with_context(|| format!("Failed to write {}", output.display()))?;
            if !cli.quiet {
                eprintln!("Wrote {} ({}x{})", output.display(), fb.width, fb.height);
            }
        }
        Commands::Rects {
            input,
            output,
            width,
            height,
            max_value,
        } => {
            let fb = render_rects_file(&input, width, height, max_value)
                .with_context(|| format!("Failed to fill rectangles from {}", input.display()))?;
            save_ppm(&fb, &output).with_context(|| format!("Failed to write {}", output.display()))?;
            if !cli.quiet {
                eprintln!("Wrote {} ({}x{})", output.display(), fb.width, fb.height);
            }
        }
    }

    Ok(())
}
