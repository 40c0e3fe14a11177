//! The component's property surface.

use crate::config::DisplayDefaults;
use crate::error::ViewerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the display picks its base scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScaleRepr", into = "ScaleRepr")]
pub enum ScaleMode {
    /// Literal scale factor; 1.0 shows a page at 96 DPI.
    Factor(f32),
    /// Fill the container, cropping the overflowing axis.
    Cover,
    /// Fit the whole page inside the container.
    Contain,
}

impl ScaleMode {
    pub fn factor(value: f32) -> Result<Self, ViewerError> {
        if value.is_finite() && value > 0.0 {
            Ok(ScaleMode::Factor(value))
        } else {
            Err(ViewerError::InvalidProperty {
                name: "scale",
                value: value.to_string(),
            })
        }
    }
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Cover
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMode::Factor(value) => write!(f, "{}", value),
            ScaleMode::Cover => f.write_str("cover"),
            ScaleMode::Contain => f.write_str("contain"),
        }
    }
}

impl FromStr for ScaleMode {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cover" => Ok(ScaleMode::Cover),
            "contain" => Ok(ScaleMode::Contain),
            other => other
                .parse::<f32>()
                .map_err(|_| ViewerError::InvalidProperty {
                    name: "scale",
                    value: s.to_string(),
                })
                .and_then(ScaleMode::factor),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScaleRepr {
    Number(f32),
    Keyword(String),
}

impl TryFrom<ScaleRepr> for ScaleMode {
    type Error = ViewerError;

    fn try_from(repr: ScaleRepr) -> Result<Self, Self::Error> {
        match repr {
            ScaleRepr::Number(value) => ScaleMode::factor(value),
            ScaleRepr::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<ScaleMode> for ScaleRepr {
    fn from(mode: ScaleMode) -> Self {
        match mode {
            ScaleMode::Factor(value) => ScaleRepr::Number(value),
            keyword => ScaleRepr::Keyword(keyword.to_string()),
        }
    }
}

/// Externally settable state of the display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayConfig {
    pub src: Option<String>,
    /// The current 1-based page number.
    pub page: u32,
    /// Whether multiple pages should render. Single page rendering is much faster.
    pub multi_page: bool,
    pub scale: ScaleMode,
    pub zoom: f32,
    /// Derived from document metadata.
    pub document_title: Option<String>,
}

impl DisplayConfig {
    pub fn from_defaults(defaults: &DisplayDefaults) -> Self {
        Self {
            src: None,
            page: 1,
            multi_page: defaults.multi_page,
            scale: defaults.scale,
            zoom: defaults.zoom,
            document_title: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::from_defaults(&DisplayDefaults::default())
    }
}

pub(crate) fn validate_page(page: u32) -> Result<u32, ViewerError> {
    if page == 0 {
        return Err(ViewerError::InvalidProperty {
            name: "page",
            value: page.to_string(),
        });
    }
    Ok(page)
}

pub(crate) fn validate_zoom(zoom: f32) -> Result<f32, ViewerError> {
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(ViewerError::InvalidProperty {
            name: "zoom",
            value: zoom.to_string(),
        });
    }
    Ok(zoom)
}

/// Properties touched since the last update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyChanges {
    pub multi_page: bool,
    pub src: bool,
    pub page: bool,
    pub scale: bool,
    pub zoom: bool,
    /// The host box was resized.
    pub size: bool,
    /// A new document was attached outside an update pass.
    pub document: bool,
}

impl PropertyChanges {
    pub fn is_empty(&self) -> bool {
        *self == PropertyChanges::default()
    }

    pub fn merge(&mut self, other: PropertyChanges) {
        self.multi_page |= other.multi_page;
        self.src |= other.src;
        self.page |= other.page;
        self.scale |= other.scale;
        self.zoom |= other.zoom;
        self.size |= other.size;
        self.document |= other.document;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_mode_parses_attribute_strings() {
        assert_eq!("cover".parse::<ScaleMode>().unwrap(), ScaleMode::Cover);
        assert_eq!(" contain ".parse::<ScaleMode>().unwrap(), ScaleMode::Contain);
        assert_eq!("1.25".parse::<ScaleMode>().unwrap(), ScaleMode::Factor(1.25));
        assert!("0".parse::<ScaleMode>().is_err());
        assert!("-2".parse::<ScaleMode>().is_err());
        assert!("fill".parse::<ScaleMode>().is_err());
        assert!("NaN".parse::<ScaleMode>().is_err());
    }

    #[test]
    fn scale_mode_displays_as_attribute() {
        assert_eq!(ScaleMode::Cover.to_string(), "cover");
        assert_eq!(ScaleMode::Factor(2.0).to_string(), "2");
    }

    #[test]
    fn scale_mode_json_shape() {
        assert_eq!(serde_json::to_string(&ScaleMode::Contain).unwrap(), "\"contain\"");
        assert_eq!(serde_json::to_string(&ScaleMode::Factor(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::from_str::<ScaleMode>("0.5").unwrap(),
            ScaleMode::Factor(0.5)
        );
    }

    #[test]
    fn defaults_match_element_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.page, 1);
        assert!(!config.multi_page);
        assert_eq!(config.scale, ScaleMode::Cover);
        assert_eq!(config.zoom, 1.0);
        assert_eq!(config.src, None);
    }

    #[test]
    fn changes_merge() {
        let mut changes = PropertyChanges {
            page: true,
            ..Default::default()
        };
        assert!(!changes.is_empty());
        changes.merge(PropertyChanges {
            document: true,
            ..Default::default()
        });
        assert!(changes.page && changes.document);
        assert!(!changes.src);
    }
}
