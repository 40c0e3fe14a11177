use crate::pdf::PdfError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the display component.
///
/// `Load` and `Metadata` are both reported to listeners as a single `error`
/// event; the component stays usable after either.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to load `{src}`: {cause}")]
    Load {
        src: String,
        #[source]
        cause: PdfError,
    },

    #[error("Failed to read metadata of `{src}`: {cause}")]
    Metadata {
        src: String,
        #[source]
        cause: PdfError,
    },

    #[error("Invalid value for `{name}`: {value}")]
    InvalidProperty { name: &'static str, value: String },

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute `{0}` is read-only")]
    ReadOnlyAttribute(&'static str),

    #[error("Failed to compute scale: {0}")]
    Scale(#[source] PdfError),

    #[error("Rendering failed: {0}")]
    Render(#[source] PdfError),

    #[error("No viewer available")]
    NoViewer,

    #[error("Failed to read config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl ViewerError {
    /// Whether this error came out of the load pipeline.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, ViewerError::Load { .. } | ViewerError::Metadata { .. })
    }
}

impl Serialize for ViewerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
