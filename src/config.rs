//! Runtime configuration.
//!
//! The configuration is a JSON file, by default `<config_dir>/learnopengl/config.json`. Every
//! field is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory holding textures, models and skybox faces when the config does not name one.
pub const DEFAULT_ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Samples per pixel, `0` disables multisampling.
    pub msaa_samples: u8,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            msaa_samples: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse movement.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: 2.5,
            sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterConfig {
    /// Chapter to open when none is given on the command line, by name or 1-based number.
    pub start: Option<String>,
    pub shadow_map_size: u32,
    pub asteroid_count: usize,
    pub asteroid_seed: u64,
    /// Length of the lines drawn by the normal visualization chapter.
    pub normal_length: f32,
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            start: None,
            shadow_map_size: 1024,
            asteroid_count: 10_000,
            asteroid_seed: 0x5EED,
            normal_length: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Also write the log to `<data_local_dir>/learnopengl/latest.log`.
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub chapters: ChapterConfig,
    pub log: LogConfig,
    pub assets_dir: Option<PathBuf>,
    /// When set, shader files found here replace the embedded copies.
    pub shader_dir: Option<PathBuf>,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| format!("invalid config: {e}"))
    }

    /// Loads the configuration from `path`, or from the default location when `path` is
    /// `None`. An explicitly given path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(format!("failed to read {}: {e}", path.display())),
        }
    }

    /// `<config_dir>/learnopengl/config.json`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("learnopengl").join("config.json"))
    }

    /// The assets root, falling back to the directory next to the manifest.
    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR))
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.camera.speed, 2.5);
        assert_eq!(config.chapters.shadow_map_size, 1024);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_json(
            r#"{ "window": { "width": 640, "height": 480 }, "chapters": { "start": "skybox" } }"#,
        )
        .unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert!(config.window.vsync);
        assert_eq!(config.chapters.start.as_deref(), Some("skybox"));
        assert_eq!(config.chapters.asteroid_count, 10_000);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = Config::from_json("{ window: 3 }").unwrap_err();
        assert!(err.starts_with("invalid config"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("learnopengl-does-not-exist.json");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn log_level_parses_or_falls_back() {
        let mut config = Config::default();
        config.log.level = "debug".to_string();
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
        config.log.level = "loud".to_string();
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn assets_dir_defaults_to_manifest() {
        let config = Config::default();
        assert!(config.assets_dir().ends_with("assets"));
        let config = Config::from_json(r#"{ "assets_dir": "/tmp/res" }"#).unwrap();
        assert_eq!(config.assets_dir(), PathBuf::from("/tmp/res"));
    }
}
