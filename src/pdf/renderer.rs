//! Low-level PDFium access using pdfium-render.
//!
//! Note: pdfium-render's Pdfium struct is not Send+Sync, so we bind an instance
//! on-demand within each operation rather than storing it in shared state.
//! Documents are kept as raw bytes and reopened per operation.

use crate::config::EngineConfig;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during PDF operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to initialize PDFium: {0}")]
    InitError(String),

    #[error("Failed to load PDF: {0}")]
    LoadError(String),

    #[error("Unsupported source reference: {0}")]
    UnsupportedSource(String),

    #[error("Document has been released")]
    Released,

    #[error("Invalid page number: {0}")]
    InvalidPage(u32),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Image encoding failed: {0}")]
    ImageError(String),
}

impl Serialize for PdfError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Page geometry read when a document is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page index (0-based)
    pub index: u32,
    /// Page width in PDF points
    pub width: f32,
    /// Page height in PDF points
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// Document title (if available)
    pub title: Option<String>,
}

/// Resolved way of reaching the PDFium shared library.
///
/// Created once by [`PdfiumBinding::initialize`]; every later operation binds
/// through the same resolved location.
#[derive(Debug, Clone)]
pub struct PdfiumBinding {
    library_path: Option<PathBuf>,
}

impl PdfiumBinding {
    /// Locate PDFium and verify it can be bound.
    ///
    /// Search order:
    /// 1. `library_path` from the engine config (a file, or a directory holding
    ///    the platform library name)
    /// 2. Next to the current executable (and `../Frameworks` on macOS bundles)
    /// 3. System library paths
    pub fn initialize(config: &EngineConfig) -> Result<Self, PdfError> {
        let mut candidates = Vec::new();
        if let Some(path) = &config.library_path {
            if path.is_dir() {
                candidates.push(Pdfium::pdfium_platform_library_name_at_path(path));
            } else {
                candidates.push(path.clone());
            }
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        {
            #[cfg(target_os = "macos")]
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(
                &exe_dir.join("..").join("Frameworks"),
            ));
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
        }

        for candidate in candidates {
            match Pdfium::bind_to_library(&candidate) {
                Ok(_) => {
                    log::info!("Bound PDFium library at {}", candidate.display());
                    return Ok(Self {
                        library_path: Some(candidate),
                    });
                }
                Err(e) => log::debug!("PDFium not usable at {}: {:?}", candidate.display(), e),
            }
        }

        match Pdfium::bind_to_system_library() {
            Ok(_) => {
                log::info!("Bound system PDFium library");
                Ok(Self { library_path: None })
            }
            Err(e) => Err(PdfError::InitError(format!(
                "Could not load PDFium library ({:?}). Set engine.library_path in the viewer config.",
                e
            ))),
        }
    }

    /// Bind a usable Pdfium instance for a single operation.
    pub fn bind(&self) -> Result<Pdfium, PdfError> {
        let bindings = match &self.library_path {
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfError::InitError(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }

    /// A binding that was never verified, for tests that stay clear of PDFium.
    #[cfg(test)]
    pub(crate) fn unverified() -> Self {
        Self { library_path: None }
    }
}

/// Parse a document once and return its info together with every page's size.
pub fn inspect_document(
    binding: &PdfiumBinding,
    bytes: &[u8],
) -> Result<(DocumentInfo, Vec<PageInfo>), PdfError> {
    let pdfium = binding.bind()?;
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PdfError::LoadError(e.to_string()))?;

    let metadata = doc.metadata();
    let title = metadata
        .get(PdfDocumentMetadataTagType::Title)
        .map(|t| t.value().to_string())
        .filter(|t| !t.is_empty());

    let page_count = doc.pages().len() as u32;
    let mut pages = Vec::with_capacity(page_count as usize);
    for i in 0..page_count {
        let page = doc
            .pages()
            .get(i as u16)
            .map_err(|_| PdfError::InvalidPage(i + 1))?;
        pages.push(PageInfo {
            index: i,
            width: page.width().value,
            height: page.height().value,
        });
    }

    let info = DocumentInfo { page_count, title };
    Ok((info, pages))
}

/// Render a page to PNG bytes at an exact pixel size.
pub fn render_page_to_png(
    binding: &PdfiumBinding,
    bytes: &[u8],
    page_index: u32,
    width_px: i32,
    height_px: i32,
) -> Result<Vec<u8>, PdfError> {
    let pdfium = binding.bind()?;
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PdfError::LoadError(e.to_string()))?;

    let page = doc
        .pages()
        .get(page_index as u16)
        .map_err(|_| PdfError::InvalidPage(page_index + 1))?;

    let config = PdfRenderConfig::new()
        .set_target_width(width_px.max(1))
        .set_target_height(height_px.max(1))
        .render_form_data(true)
        .render_annotations(true);

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| PdfError::RenderError(e.to_string()))?;

    let image = bitmap.as_image();
    let mut png_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| PdfError::ImageError(e.to_string()))?;

    Ok(png_bytes)
}
