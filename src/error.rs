use std::path::PathBuf;

/// Errors that abort a scene load or a frame.
///
/// Per-triangle problems (zero area, vertices behind the eye, a missing
/// texture on lookup) are absorbed by the pipeline and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// I/O error reading inputs or writing the image.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed scene description.
    #[error("Scene parse error for {path}: {message}")]
    SceneParse { path: PathBuf, message: String },

    /// Malformed mesh file.
    #[error("Mesh parse error for {path}: {message}")]
    MeshParse { path: PathBuf, message: String },

    /// Texture file could not be decoded.
    #[error("Texture decode error for {path}: {message}")]
    TextureDecode { path: PathBuf, message: String },

    /// Texel grid with a zero dimension or mismatched size.
    #[error("Invalid texture: {0}")]
    InvalidTexture(String),

    /// A shape references geometry that is not loaded and cannot be found.
    #[error("No mesh for geometry '{0}'")]
    MissingGeometry(String),

    /// Frustum bounds that would divide by zero or produce NaNs.
    #[error("Degenerate frustum: {0}")]
    DegenerateFrustum(String),

    /// Camera placement with no well-defined view basis.
    #[error("Degenerate camera: {0}")]
    DegenerateCamera(String),

    /// A scale component of exactly zero has no inverse.
    #[error("Scale has a zero component and cannot be inverted")]
    SingularScale,

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: usize, height: usize },

    /// Malformed line in a rectangle fill file.
    #[error("Rect parse error on line {line}: {message}")]
    RectParse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;
