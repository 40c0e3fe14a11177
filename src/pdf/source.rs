//! Resolving document source references to local files.
//!
//! A source reference is a plain path, a `file://` URL, or a percent-encoded
//! path (as handed over by some file managers).

use super::PdfError;
use std::path::{Path, PathBuf};

/// Check if a path is an existing PDF file.
pub fn is_pdf_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
}

/// Check if a path string looks like a PDF (extension check only).
pub fn looks_like_pdf(path: &str) -> bool {
    path.to_lowercase().ends_with(".pdf")
}

/// Convert a `file://` URL to a file path string.
pub fn url_to_file_path(url: &url::Url) -> Option<String> {
    url.to_file_path()
        .ok()
        .and_then(|p| p.to_str().map(|s| s.to_string()))
}

/// Resolve a source reference to the local path it points at.
///
/// The path is not required to exist; reading it reports the failure.
pub fn resolve_source(src: &str) -> Result<PathBuf, PdfError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(PdfError::UnsupportedSource("empty source reference".to_string()));
    }

    if let Ok(url) = url::Url::parse(src) {
        match url.scheme() {
            "file" => {
                return url_to_file_path(&url)
                    .map(PathBuf::from)
                    .ok_or_else(|| PdfError::UnsupportedSource(src.to_string()));
            }
            // Single-letter schemes are Windows drive letters (C:\...)
            scheme if scheme.len() > 1 => {
                return Err(PdfError::UnsupportedSource(src.to_string()));
            }
            _ => {}
        }
    }

    let direct = PathBuf::from(src);
    if direct.exists() {
        return Ok(direct);
    }

    if let Ok(decoded) = urlencoding::decode(src) {
        let decoded = PathBuf::from(decoded.as_ref());
        if decoded != direct && decoded.exists() {
            log::debug!("Resolved percent-encoded source to {}", decoded.display());
            return Ok(decoded);
        }
    }

    Ok(direct)
}
