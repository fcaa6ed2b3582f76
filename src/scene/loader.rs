//! Scene, mesh and texture loading
//!
//! A scene file names its geometry and textures by identifier. Meshes are
//! looked up next to the scene file as `<id>.json`, then `<id>.asc`;
//! textures are file names relative to the same directory. Loading is all
//! or nothing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use super::description::SceneDescription;
use super::Scene;
use crate::error::{RenderError, Result};
use crate::rasterizer::{Color, Mesh, Texture, Triangle, Vec2, Vec3, Vertex};

/// Scene description syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Ron,
    Json,
}

impl SceneFormat {
    /// `.json` is JSON, anything else is RON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SceneFormat::Json,
            _ => SceneFormat::Ron,
        }
    }
}

/// Parse a scene description from a string. `path` is only used in errors.
pub fn parse_scene_description(text: &str, format: SceneFormat, path: &Path) -> Result<SceneDescription> {
    let parsed = match format {
        SceneFormat::Ron => ron::from_str(text).map_err(|e| e.to_string()),
        SceneFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| RenderError::SceneParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Load a scene description from a RON or JSON file
pub fn load_scene_description<P: AsRef<Path>>(path: P) -> Result<SceneDescription> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_scene_description(&contents, SceneFormat::from_path(path), path)
}

/// Load a scene file with every mesh and texture it references
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();
    let description = load_scene_description(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    scene_from_description(description, dir)
}

/// Build a scene, resolving geometry and texture identifiers against `dir`
pub fn scene_from_description(description: SceneDescription, dir: &Path) -> Result<Scene> {
    let camera = description.camera.build()?;

    let mut meshes = HashMap::new();
    let mut textures = HashMap::new();
    for shape in &description.shapes {
        if !meshes.contains_key(&shape.geometry) {
            let mesh = load_mesh(dir, &shape.geometry)?;
            meshes.insert(shape.geometry.clone(), mesh);
        }
        if let Some(name) = &shape.material.texture {
            if !textures.contains_key(name) {
                let texture = load_texture(dir.join(name))?;
                textures.insert(name.clone(), texture);
            }
        }
    }

    info!(
        "Loaded scene: {} shapes, {} meshes, {} textures, {} lights",
        description.shapes.len(),
        meshes.len(),
        textures.len(),
        description.lights.len()
    );

    Ok(Scene {
        camera,
        lights: description.lights,
        shapes: description.shapes,
        background: Color::from_unit(description.background),
        meshes,
        textures,
    })
}

/// Find and load mesh `id` from `dir`, trying `<id>.json` then `<id>.asc`
pub fn load_mesh(dir: &Path, id: &str) -> Result<Mesh> {
    for ext in ["json", "asc"] {
        let candidate = dir.join(format!("{}.{}", id, ext));
        if candidate.is_file() {
            return load_mesh_file(candidate);
        }
    }
    Err(RenderError::MissingGeometry(id.to_string()))
}

/// Load a mesh file, choosing the parser by extension
pub fn load_mesh_file<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let is_asc = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("asc"));

    let mesh = if is_asc {
        parse_asc_mesh(&contents, path)?
    } else {
        parse_json_mesh(&contents, path)?
    };
    info!("Loaded mesh {} ({} triangles)", path.display(), mesh.len());
    Ok(mesh)
}

#[derive(Deserialize)]
struct JsonVertex {
    v: Vec3,
    n: Vec3,
    t: Vec2,
}

#[derive(Deserialize)]
struct JsonTriangle {
    v0: JsonVertex,
    v1: JsonVertex,
    v2: JsonVertex,
}

#[derive(Deserialize)]
struct JsonMesh {
    data: Vec<JsonTriangle>,
}

impl From<JsonVertex> for Vertex {
    fn from(v: JsonVertex) -> Self {
        Vertex::new(v.v, v.n, v.t)
    }
}

/// Parse a `{"data": [{"v0": {"v", "n", "t"}, "v1": .., "v2": ..}]}` triangle list
pub fn parse_json_mesh(text: &str, path: &Path) -> Result<Mesh> {
    let mesh: JsonMesh = serde_json::from_str(text).map_err(|e| RenderError::MeshParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let triangles = mesh
        .data
        .into_iter()
        .map(|t| Triangle::new(t.v0.into(), t.v1.into(), t.v2.into()))
        .collect();
    Ok(Mesh::new(triangles))
}

/// Parse the `.asc` triangle format: a keyword token, then three vertices
/// of eight numbers each (position, normal, uv). Whitespace is free-form.
pub fn parse_asc_mesh(text: &str, path: &Path) -> Result<Mesh> {
    let mesh_error = |message: String| RenderError::MeshParse {
        path: path.to_path_buf(),
        message,
    };

    let mut tokens = text.split_whitespace();
    let mut triangles = Vec::new();
    while let Some(keyword) = tokens.next() {
        let index = triangles.len();
        let mut values = [0.0f32; 24];
        for (i, slot) in values.iter_mut().enumerate() {
            let token = tokens.next().ok_or_else(|| {
                mesh_error(format!(
                    "triangle {} ('{}') ends after {} of 24 values",
                    index, keyword, i
                ))
            })?;
            *slot = token
                .parse()
                .map_err(|_| mesh_error(format!("triangle {}: '{}' is not a number", index, token)))?;
        }

        let vertex = |k: usize| {
            let f = &values[k * 8..k * 8 + 8];
            Vertex::new(
                Vec3::new(f[0], f[1], f[2]),
                Vec3::new(f[3], f[4], f[5]),
                Vec2::new(f[6], f[7]),
            )
        };
        triangles.push(Triangle::new(vertex(0), vertex(1), vertex(2)));
    }

    debug!("Parsed {} triangles from {}", triangles.len(), path.display());
    Ok(Mesh::new(triangles))
}

/// Decode a texture file (BMP, PNG or JPEG)
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<Texture> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let bytes = fs::read(&path)?;
    let texture = Texture::from_bytes(&bytes).map_err(|e| RenderError::TextureDecode {
        path: path.clone(),
        message: e.to_string(),
    })?;
    info!("Loaded texture {} ({}x{})", path.display(), texture.width(), texture.height());
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENE_RON: &str = r#"(
        camera: (
            from: (0.0, 0.0, 5.0), to: (0.0, 0.0, 0.0),
            near: 1.0, far: 10.0, top: 0.5, bottom: -0.5, left: -0.5, right: 0.5,
            resolution: (32, 24),
        ),
        background: (0.0, 0.0, 1.0),
        lights: [
            (kind: "ambient", color: (1.0, 1.0, 1.0), intensity: 0.25),
            (kind: "directional", color: (1.0, 0.5, 0.5), intensity: 0.75, direction: (0.0, 0.0, -1.0)),
        ],
        shapes: [
            (
                geometry: "tri",
                material: (color: (0.8, 0.3, 0.3), ka: 0.1, kd: 0.7, ks: 0.3,
                           specular_exponent: 16.0, texture: None),
                transform: (rotation: (0.0, 30.0, 0.0)),
            ),
        ],
    )"#;

    const SCENE_JSON: &str = r#"{
        "camera": {
            "from": [0.0, 0.0, 5.0], "to": [0.0, 0.0, 0.0],
            "near": 1.0, "far": 10.0, "top": 0.5, "bottom": -0.5, "left": -0.5, "right": 0.5,
            "resolution": [32, 24]
        },
        "background": [0.0, 0.0, 1.0],
        "lights": [
            {"kind": "ambient", "color": [1.0, 1.0, 1.0], "intensity": 0.25},
            {"kind": "directional", "color": [1.0, 0.5, 0.5], "intensity": 0.75, "direction": [0.0, 0.0, -1.0]}
        ],
        "shapes": [
            {
                "geometry": "tri",
                "material": {"color": [0.8, 0.3, 0.3], "ka": 0.1, "kd": 0.7, "ks": 0.3,
                             "specular_exponent": 16.0, "texture": null},
                "transform": {"rotation": [0.0, 30.0, 0.0]}
            }
        ]
    }"#;

    const TRI_JSON: &str = r#"{"data": [
        {"v0": {"v": [-1.0, -1.0, 0.0], "n": [0.0, 0.0, 1.0], "t": [0.0, 1.0]},
         "v1": {"v": [1.0, -1.0, 0.0], "n": [0.0, 0.0, 1.0], "t": [1.0, 1.0]},
         "v2": {"v": [0.0, 1.0, 0.0], "n": [0.0, 0.0, 1.0], "t": [0.5, 0.0]}}
    ]}"#;

    const TRI_ASC: &str = "triangle\n\
        -1.0 -1.0 0.0 0.0 0.0 1.0 0.0 1.0\n\
        1.0 -1.0 0.0 0.0 0.0 1.0 1.0 1.0\n\
        0.0 1.0 0.0 0.0 0.0 1.0 0.5 0.0\n";

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SceneFormat::from_path(Path::new("a/scene.json")), SceneFormat::Json);
        assert_eq!(SceneFormat::from_path(Path::new("scene.JSON")), SceneFormat::Json);
        assert_eq!(SceneFormat::from_path(Path::new("scene.ron")), SceneFormat::Ron);
        assert_eq!(SceneFormat::from_path(Path::new("scene")), SceneFormat::Ron);
    }

    #[test]
    fn test_ron_and_json_descriptions_match() {
        let ron = parse_scene_description(SCENE_RON, SceneFormat::Ron, Path::new("s.ron")).unwrap();
        let json = parse_scene_description(SCENE_JSON, SceneFormat::Json, Path::new("s.json")).unwrap();
        assert_eq!(ron, json);

        assert_eq!(ron.camera.up, Vec3::UP);
        assert_eq!(ron.camera.resolution, (32, 24));
        assert_eq!(ron.lights.len(), 2);
        assert_eq!(ron.shapes[0].transform.scale, Vec3::ONE);
        assert_eq!(ron.shapes[0].material.kt, 0.0);
    }

    #[test]
    fn test_bad_description_names_the_file() {
        let err = parse_scene_description("{ not json", SceneFormat::Json, Path::new("broken.json")).unwrap_err();
        match err {
            RenderError::SceneParse { path, .. } => assert_eq!(path, Path::new("broken.json")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_json_and_asc_meshes_match() {
        let json = parse_json_mesh(TRI_JSON, Path::new("tri.json")).unwrap();
        let asc = parse_asc_mesh(TRI_ASC, Path::new("tri.asc")).unwrap();
        assert_eq!(json.len(), 1);
        assert_eq!(json, asc);
        assert_eq!(asc.triangles[0].vertices[2].uv, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_asc_reports_truncated_triangle() {
        let truncated = "triangle 1.0 2.0 3.0";
        assert!(matches!(
            parse_asc_mesh(truncated, Path::new("t.asc")),
            Err(RenderError::MeshParse { .. })
        ));
        let garbage = TRI_ASC.replace("0.5", "half");
        assert!(matches!(
            parse_asc_mesh(&garbage, Path::new("t.asc")),
            Err(RenderError::MeshParse { .. })
        ));
        assert!(parse_asc_mesh("", Path::new("t.asc")).unwrap().is_empty());
    }

    #[test]
    fn test_load_scene_resolves_meshes_next_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tri.asc", TRI_ASC.as_bytes());
        let path = write(dir.path(), "scene.ron", SCENE_RON.as_bytes());

        let scene = load_scene(&path).unwrap();
        assert_eq!(scene.camera.resolution(), (32, 24));
        assert_eq!(scene.meshes["tri"].len(), 1);
        assert_eq!(scene.background, Color::new(0, 0, 255));
        assert!(scene.textures.is_empty());
    }

    #[test]
    fn test_json_mesh_is_preferred_over_asc() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tri.json", TRI_JSON.as_bytes());
        write(dir.path(), "tri.asc", b"not a mesh");
        assert_eq!(load_mesh(dir.path(), "tri").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_mesh_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "scene.json", SCENE_JSON.as_bytes());
        assert!(matches!(load_scene(&path), Err(RenderError::MissingGeometry(id)) if id == "tri"));
    }

    #[test]
    fn test_texture_is_decoded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        assert_eq!((tex.width(), tex.height()), (2, 1));
        assert_eq!(tex.texel(1, 0).truncate(), Vec3::new(0.0, 0.0, 1.0));

        let junk = write(dir.path(), "junk.bmp", b"definitely not a bitmap");
        assert!(matches!(load_texture(junk), Err(RenderError::TextureDecode { .. })));
    }
}
