//! Viewer configuration.
//!
//! Read from a JSON file; every field is optional and falls back to the
//! defaults below.

use crate::display::ScaleMode;
use crate::error::ViewerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PDF_VIEWER_CONFIG";

/// File name looked up in the application config directory.
pub const CONFIG_FILE_NAME: &str = "viewer.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub layout: LayoutConfig,
    pub defaults: DisplayDefaults,
    pub engine: EngineConfig,
}

/// Pixel insets the scale calculator reserves around a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Border drawn around each page, per side.
    pub page_border_width: f32,
    /// Space reserved for a scrollbar so overflow on one axis does not
    /// force overflow on the other.
    pub scrollbar_size: f32,
    /// Vertical gap between pages in multi-page layout.
    pub page_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_border_width: 9.0,
            scrollbar_size: 16.0,
            page_gap: 10.0,
        }
    }
}

/// Initial property values for a freshly created display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayDefaults {
    pub scale: ScaleMode,
    pub zoom: f32,
    pub multi_page: bool,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            scale: ScaleMode::Cover,
            zoom: 1.0,
            multi_page: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// PDFium shared library, or a directory containing it.
    pub library_path: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loading viewer config from {}", path.display());
                Self::from_json(&json)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No viewer config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ViewerError::ConfigIo {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from `PDF_VIEWER_CONFIG` if set, otherwise from `viewer.json`
    /// inside `config_dir`.
    pub fn discover(config_dir: Option<&Path>) -> Result<Self, ViewerError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        match config_dir {
            Some(dir) => Self::load(&dir.join(CONFIG_FILE_NAME)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ViewerError> {
        let layout = &self.layout;
        for (name, value) in [
            ("layout.page_border_width", layout.page_border_width),
            ("layout.scrollbar_size", layout.scrollbar_size),
            ("layout.page_gap", layout.page_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ViewerError::InvalidProperty {
                    name,
                    value: value.to_string(),
                });
            }
        }
        if !self.defaults.zoom.is_finite() || self.defaults.zoom <= 0.0 {
            return Err(ViewerError::InvalidProperty {
                name: "defaults.zoom",
                value: self.defaults.zoom.to_string(),
            });
        }
        Ok(())
    }
}
