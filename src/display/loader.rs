//! Document loading with latest-request-wins semantics.
//!
//! Every load is tagged with a monotonically increasing id when it starts.
//! A completion is only accepted while its id is still the latest issued, so
//! two loads racing each other can never leave the older document bound.

use crate::engine::{DocumentEngine, DocumentHandle, DocumentMetadata};
use crate::error::ViewerError;
use crate::pdf::PdfError;

/// Identifies one in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    src: String,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

#[derive(Debug, Default)]
pub struct DocumentLoader {
    latest: u64,
}

impl DocumentLoader {
    pub fn begin(&mut self, src: &str) -> LoadTicket {
        self.latest += 1;
        log::info!("Loading document #{}: {}", self.latest, src);
        LoadTicket {
            id: self.latest,
            src: src.to_string(),
        }
    }

    /// Forget every in-flight load.
    pub fn cancel(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.id == self.latest
    }
}

/// A freshly loaded document and its metadata, not yet attached.
#[derive(Debug)]
pub struct FetchedDocument<D> {
    pub document: D,
    pub metadata: DocumentMetadata,
}

/// Outcome of handing a completed load back to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Attached,
    Failed,
    /// A newer load was started meanwhile; the result was dropped.
    Stale,
}

/// Load `ticket`'s source and read its metadata.
///
/// A document without pages counts as a failed load. If it has no pages or
/// metadata extraction fails, the loaded document is released before the
/// error is returned.
pub async fn fetch_document<E: DocumentEngine>(
    engine: &E,
    ticket: &LoadTicket,
) -> Result<FetchedDocument<E::Document>, ViewerError> {
    let document = engine
        .load(ticket.src())
        .await
        .map_err(|cause| ViewerError::Load {
            src: ticket.src().to_string(),
            cause,
        })?;

    if document.page_count() == 0 {
        document.destroy();
        return Err(ViewerError::Load {
            src: ticket.src().to_string(),
            cause: PdfError::LoadError("document has no pages".to_string()),
        });
    }

    match document.metadata().await {
        Ok(metadata) => Ok(FetchedDocument { document, metadata }),
        Err(cause) => {
            document.destroy();
            Err(ViewerError::Metadata {
                src: ticket.src().to_string(),
                cause,
            })
        }
    }
}
