//! The shader library.
//!
//! Every program lives in its own directory under `src/render/shaders/` as `vert.glsl`,
//! `frag.glsl` and optionally `geom.glsl`. The directory is embedded in the binary; when a
//! shader directory is configured, files found there win over the embedded copies so shaders
//! can be edited without rebuilding.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use include_dir::{Dir, include_dir};

use crate::abs::ShaderProgram;

static SHADERS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/render/shaders");

pub const VERTEX_FILE: &str = "vert.glsl";
pub const FRAGMENT_FILE: &str = "frag.glsl";
pub const GEOMETRY_FILE: &str = "geom.glsl";

/// Looks up shader sources by program name.
#[derive(Clone, Debug, Default)]
pub struct ShaderLibrary {
    override_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    /// Names of all embedded programs.
    pub fn embedded_programs() -> impl Iterator<Item = &'static str> {
        SHADERS
            .dirs()
            .filter_map(|dir| dir.path().file_name().and_then(|name| name.to_str()))
    }

    /// Returns the source of one stage, or `None` if the program has no such stage.
    pub fn source(&self, program: &str, file: &str) -> Result<Option<String>, String> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(program).join(file);
            if path.is_file() {
                log::debug!("Using shader override {}", path.display());
                return std::fs::read_to_string(&path)
                    .map(Some)
                    .map_err(|e| format!("failed to read {}: {e}", path.display()));
            }
        }

        let path = Path::new(program).join(file);
        match SHADERS.get_file(&path) {
            Some(file) => file
                .contents_utf8()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| format!("shader {} is not valid UTF-8", path.display())),
            None => Ok(None),
        }
    }

    /// Compiles and links the named program.
    pub fn program(&self, gl: &Arc<glow::Context>, name: &str) -> Result<ShaderProgram, String> {
        let required = |file: &str| {
            self.source(name, file)?
                .ok_or_else(|| missing_stage(name, file))
        };
        let vertex = required(VERTEX_FILE)?;
        let fragment = required(FRAGMENT_FILE)?;
        let geometry = self.source(name, GEOMETRY_FILE)?;

        ShaderProgram::from_sources(gl, &vertex, &fragment, geometry.as_deref())
            .map_err(|e| format!("shader program '{name}': {e}"))
    }
}

fn missing_stage(program: &str, file: &str) -> String {
    let known: Vec<_> = ShaderLibrary::embedded_programs().collect();
    format!(
        "shader program '{program}' has no {file} (embedded: {})",
        known.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_has_vertex_and_fragment_stages() {
        let library = ShaderLibrary::default();
        let names: Vec<_> = ShaderLibrary::embedded_programs().collect();
        assert!(!names.is_empty());
        for name in names {
            let vert = library.source(name, VERTEX_FILE).unwrap();
            let frag = library.source(name, FRAGMENT_FILE).unwrap();
            assert!(vert.is_some_and(|s| s.starts_with("#version 330 core")), "{name}");
            assert!(frag.is_some_and(|s| s.starts_with("#version 330 core")), "{name}");
        }
    }

    #[test]
    fn geometry_stage_is_optional() {
        let library = ShaderLibrary::default();
        assert!(library.source("normals", GEOMETRY_FILE).unwrap().is_some());
        assert!(library.source("point_shadow_depth", GEOMETRY_FILE).unwrap().is_some());
        assert!(library.source("lit", GEOMETRY_FILE).unwrap().is_none());
    }

    #[test]
    fn unknown_program_has_no_sources() {
        let library = ShaderLibrary::default();
        assert!(library.source("nope", VERTEX_FILE).unwrap().is_none());
    }

    #[test]
    fn missing_stage_lists_embedded_programs() {
        let message = missing_stage("nope", VERTEX_FILE);
        assert!(message.starts_with("shader program 'nope' has no vert.glsl"));
        assert!(message.contains("lit"));
        assert!(message.contains("skybox"));
    }

    #[test]
    fn override_directory_wins() {
        let dir = std::env::temp_dir().join(format!("learnopengl-shaders-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("lit")).unwrap();
        std::fs::write(dir.join("lit").join(FRAGMENT_FILE), "// patched").unwrap();

        let library = ShaderLibrary::new(Some(dir.clone()));
        let frag = library.source("lit", FRAGMENT_FILE).unwrap().unwrap();
        assert_eq!(frag, "// patched");
        // Files missing from the override still come from the binary.
        let vert = library.source("lit", VERTEX_FILE).unwrap().unwrap();
        assert!(vert.starts_with("#version"));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
