//! The PDF display component.
//!
//! [`PdfViewerDisplay`] owns one viewer and at most one loaded document.
//! Setters only record what changed; [`PdfViewerDisplay::update`] then runs a
//! single reactive pass:
//!
//! 1. recreate the viewer if the layout mode changed,
//! 2. load the document if `src` changed,
//! 3. scroll to the requested page,
//! 4. recompute and apply the scale.
//!
//! Load outcomes are reported through the [`EventBus`].

mod adapter;
mod events;
mod loader;
mod properties;
mod resize;
pub mod scale;

pub use adapter::{AdapterSlot, AdapterState};
pub use events::{DisplayEvent, EventBus, EventPayload};
pub use loader::{fetch_document, DocumentLoader, FetchedDocument, LoadStatus, LoadTicket};
pub use properties::{DisplayConfig, PropertyChanges, ScaleMode};
pub use resize::ResizeObserver;

use crate::config::{LayoutConfig, ViewerConfig};
use crate::engine::{
    BoxSize, Container, DocumentEngine, DocumentHandle, LayoutMode, PageFrame, VisiblePage,
};
use crate::error::ViewerError;
use properties::{validate_page, validate_zoom};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Point-in-time view of the display, for reflecting state into a UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub src: Option<String>,
    pub page: u32,
    pub multi_page: bool,
    pub scale: ScaleMode,
    pub zoom: f32,
    pub document_title: Option<String>,
    pub page_count: Option<u32>,
    pub current_page: Option<u32>,
    pub current_scale: Option<f32>,
}

pub struct PdfViewerDisplay<E: DocumentEngine> {
    engine: Arc<E>,
    layout: LayoutConfig,
    props: DisplayConfig,
    changes: PropertyChanges,
    container: Container,
    resize: ResizeObserver,
    slot: AdapterSlot<E::Document>,
    document: Option<Arc<E::Document>>,
    loader: DocumentLoader,
    computed_scale: Option<f32>,
    /// The last scale computation failed; wait for new inputs before retrying.
    scale_failed: bool,
    events: EventBus,
}

/// The pages to rasterize for one frame, detached from the display so the
/// blocking render can run without holding it.
pub struct RenderPlan<D> {
    document: Arc<D>,
    pages: Vec<VisiblePage>,
}

impl<D: DocumentHandle> RenderPlan<D> {
    pub fn pages(&self) -> &[VisiblePage] {
        &self.pages
    }

    /// Rasterize every planned page. Blocking.
    pub fn render(&self) -> Result<Vec<PageFrame>, ViewerError> {
        self.pages
            .iter()
            .map(|page| self.document.render_page(*page))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ViewerError::Render)
    }
}

impl<E: DocumentEngine> PdfViewerDisplay<E> {
    pub fn new(engine: Arc<E>, config: &ViewerConfig) -> Self {
        Self {
            engine,
            layout: config.layout,
            props: DisplayConfig::from_defaults(&config.defaults),
            changes: PropertyChanges {
                multi_page: true,
                ..Default::default()
            },
            container: Container::default(),
            resize: ResizeObserver::default(),
            slot: AdapterSlot::new(),
            document: None,
            loader: DocumentLoader::default(),
            computed_scale: None,
            scale_failed: false,
            events: EventBus::new(),
        }
    }

    pub fn engine(&self) -> Arc<E> {
        Arc::clone(&self.engine)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.props
    }

    pub fn src(&self) -> Option<&str> {
        self.props.src.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.props.page
    }

    pub fn multi_page(&self) -> bool {
        self.props.multi_page
    }

    pub fn scale(&self) -> ScaleMode {
        self.props.scale
    }

    pub fn zoom(&self) -> f32 {
        self.props.zoom
    }

    pub fn document_title(&self) -> Option<&str> {
        self.props.document_title.as_deref()
    }

    /// Total page count of the current document.
    pub fn page_count(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.page_count())
    }

    pub fn current_page(&self) -> Option<u32> {
        match self.slot.state() {
            AdapterState::Ready => self.slot.viewer().map(|v| v.current_page_number()),
            _ => None,
        }
    }

    /// Scale last pushed into the viewer, zoom included.
    pub fn current_scale(&self) -> Option<f32> {
        self.slot.viewer().and_then(|v| v.current_scale())
    }

    pub fn adapter_state(&self) -> AdapterState {
        self.slot.state()
    }

    pub fn layout_mode(&self) -> Option<LayoutMode> {
        self.slot.layout()
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// Whether an update pass has work to do.
    pub fn needs_update(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn set_src(&mut self, src: Option<String>) {
        if self.props.src != src {
            self.props.src = src;
            self.changes.src = true;
        }
    }

    /// Load the current `src` again on the next pass.
    pub fn reload(&mut self) {
        self.changes.src = true;
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ViewerError> {
        let page = validate_page(page)?;
        if self.props.page != page {
            self.props.page = page;
            self.changes.page = true;
        }
        Ok(())
    }

    pub fn set_multi_page(&mut self, multi_page: bool) {
        if self.props.multi_page != multi_page {
            self.props.multi_page = multi_page;
            self.changes.multi_page = true;
        }
    }

    pub fn set_scale(&mut self, scale: ScaleMode) -> Result<(), ViewerError> {
        if let ScaleMode::Factor(value) = scale {
            ScaleMode::factor(value)?;
        }
        if self.props.scale != scale {
            self.props.scale = scale;
            self.changes.scale = true;
        }
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f32) -> Result<(), ViewerError> {
        let zoom = validate_zoom(zoom)?;
        if self.props.zoom != zoom {
            self.props.zoom = zoom;
            self.changes.zoom = true;
        }
        Ok(())
    }

    /// Box-size notification from the host. Returns whether an update pass
    /// is now due.
    pub fn resize(&mut self, size: BoxSize) -> bool {
        if !self.resize.observe(size) {
            return false;
        }
        self.container.size = size;
        if let Some(viewer) = self.slot.viewer_mut() {
            viewer.set_container(self.container);
        }
        self.changes.size = true;
        true
    }

    /// Set a property from its HTML attribute form. `None` removes the
    /// attribute, restoring the default.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Result<(), ViewerError> {
        let invalid = |name: &'static str, value: &str| ViewerError::InvalidProperty {
            name,
            value: value.to_string(),
        };
        match name {
            "src" => self.set_src(value.map(str::to_string)),
            "page" => {
                let page = match value {
                    Some(v) => v.trim().parse::<u32>().map_err(|_| invalid("page", v))?,
                    None => 1,
                };
                self.set_page(page)?;
            }
            "multi-page" => self.set_multi_page(value.is_some()),
            "scale" => {
                let scale = match value {
                    Some(v) => v.parse()?,
                    None => ScaleMode::default(),
                };
                self.set_scale(scale)?;
            }
            "zoom" => {
                let zoom = match value {
                    Some(v) => v.trim().parse::<f32>().map_err(|_| invalid("zoom", v))?,
                    None => 1.0,
                };
                self.set_zoom(zoom)?;
            }
            "document-title" => return Err(ViewerError::ReadOnlyAttribute("document-title")),
            other => return Err(ViewerError::UnknownAttribute(other.to_string())),
        }
        Ok(())
    }

    /// Reflected attribute value. Boolean attributes are `Some("")` when set.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "src" => self.props.src.clone(),
            "page" => Some(self.props.page.to_string()),
            "multi-page" => self.props.multi_page.then(String::new),
            "scale" => Some(self.props.scale.to_string()),
            "zoom" => Some(self.props.zoom.to_string()),
            "document-title" => self.props.document_title.clone(),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            src: self.props.src.clone(),
            page: self.props.page,
            multi_page: self.props.multi_page,
            scale: self.props.scale,
            zoom: self.props.zoom,
            document_title: self.props.document_title.clone(),
            page_count: self.page_count(),
            current_page: self.current_page(),
            current_scale: self.current_scale(),
        }
    }

    /// Run one reactive pass over everything changed since the last one.
    pub async fn update(&mut self) {
        let mut changes = std::mem::take(&mut self.changes);
        let mut apply_scale = changes.zoom;

        if changes.multi_page || self.slot.state() == AdapterState::Absent {
            self.recreate_viewer();
            apply_scale = true;
            // a fresh viewer starts at the first page
            changes.page = true;
        }

        if changes.src {
            if let Some(ticket) = self.start_load() {
                let engine = Arc::clone(&self.engine);
                let fetched = fetch_document(engine.as_ref(), &ticket).await;
                self.finish_load(ticket, fetched);
            }
            changes.merge(std::mem::take(&mut self.changes));
        }

        if changes.page || changes.document {
            self.scroll_to_current_page();
        }

        let Some(document) = self.document.clone() else {
            return;
        };

        let stale = self.computed_scale.is_none() && !self.scale_failed;
        if stale || changes.scale || changes.size || changes.document {
            self.computed_scale = None;
            match self.compute_scale(document).await {
                Ok(base) => {
                    self.computed_scale = Some(base);
                    self.scale_failed = false;
                    apply_scale = true;
                }
                Err(error) => {
                    // only load outcomes are reported as events
                    log::warn!("{}", error);
                    self.scale_failed = true;
                }
            }
        }

        if apply_scale {
            self.apply_scale();
        }
    }

    /// Start the load a pending `src` change asks for, without running the
    /// rest of the pass.
    ///
    /// For hosts that fetch outside their lock: pass the ticket to
    /// [`fetch_document`] and the result to [`PdfViewerDisplay::finish_load`].
    pub fn take_pending_load(&mut self) -> Option<LoadTicket> {
        if !self.changes.src {
            return None;
        }
        self.changes.src = false;
        self.start_load()
    }

    fn start_load(&mut self) -> Option<LoadTicket> {
        match self.props.src.as_deref() {
            Some(src) => Some(self.loader.begin(src)),
            None => {
                // nothing to load; any in-flight load is no longer wanted
                self.loader.cancel();
                None
            }
        }
    }

    /// Attach a completed load, unless a newer one was started since.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchedDocument<E::Document>, ViewerError>,
    ) -> LoadStatus {
        if !self.loader.is_current(&ticket) {
            log::info!("Discarding stale load #{} of {}", ticket.id(), ticket.src());
            if let Ok(fetched) = result {
                fetched.document.destroy();
            }
            return LoadStatus::Stale;
        }

        match result {
            Ok(FetchedDocument { document, metadata }) => {
                if let Some(previous) = self.document.take() {
                    log::debug!("Releasing previous document");
                    previous.destroy();
                }
                let document = Arc::new(document);
                let page_count = document.page_count();
                self.document = Some(Arc::clone(&document));
                self.slot.bind(document);
                self.props.document_title = metadata.title.clone();
                self.computed_scale = None;
                self.scale_failed = false;
                self.changes.document = true;

                log::info!("Loaded {} ({} pages)", ticket.src(), page_count);
                self.events.dispatch(DisplayEvent::Load {
                    title: metadata.title,
                    page_count,
                });
                LoadStatus::Attached
            }
            Err(error) => {
                log::warn!("{}", error);
                self.events.dispatch(DisplayEvent::Error(Arc::new(error)));
                LoadStatus::Failed
            }
        }
    }

    /// What [`PdfViewerDisplay::render`] would draw, or `None` while no
    /// document is bound.
    pub fn render_plan(&self) -> Result<Option<RenderPlan<E::Document>>, ViewerError> {
        let viewer = self.slot.viewer().ok_or(ViewerError::NoViewer)?;
        match (self.slot.state(), &self.document) {
            (AdapterState::Ready, Some(document)) => Ok(Some(RenderPlan {
                document: Arc::clone(document),
                pages: viewer.visible_pages(),
            })),
            _ => Ok(None),
        }
    }

    /// Render the visible page(s) at the current scale.
    pub fn render(&self) -> Result<Vec<PageFrame>, ViewerError> {
        match self.render_plan()? {
            Some(plan) => plan.render(),
            None => Ok(Vec::new()),
        }
    }

    fn recreate_viewer(&mut self) {
        let layout = LayoutMode::from_multi_page(self.props.multi_page);
        self.slot.discard();
        self.container.clear();
        log::info!("Creating {:?} viewer", layout);
        let viewer = self.engine.create_viewer(layout, &self.container);
        self.slot.install(viewer, self.document.as_ref());
    }

    fn scroll_to_current_page(&mut self) {
        // a page requested before any document loads waits for the document
        let Some(page_count) = self.page_count() else {
            return;
        };
        let page = self.props.page.clamp(1, page_count.max(1));
        if page != self.props.page {
            log::debug!("Clamping page {} to {}", self.props.page, page);
            self.props.page = page;
        }
        if let Some(viewer) = self.slot.ready_mut() {
            viewer.scroll_page_into_view(page);
        }
    }

    async fn compute_scale(&self, document: Arc<E::Document>) -> Result<f32, ViewerError> {
        let mode = self.props.scale;
        if let ScaleMode::Factor(value) = mode {
            return Ok(value);
        }
        let page_number = self
            .slot
            .viewer()
            .map(|v| v.current_page_number())
            .unwrap_or(self.props.page);
        let page = document
            .page_size(page_number)
            .await
            .map_err(ViewerError::Scale)?;
        let base = scale::compute_base_scale(mode, self.container.size, page, &self.layout);
        log::debug!(
            "{} scale for page {} in {}x{}: {}",
            mode,
            page_number,
            self.container.size.width,
            self.container.size.height,
            base
        );
        Ok(base)
    }

    fn apply_scale(&mut self) {
        let Some(base) = self.computed_scale else {
            return;
        };
        let scale = scale::applied_scale(base, self.props.zoom);
        if let Some(viewer) = self.slot.ready_mut() {
            viewer.set_current_scale(scale);
        }
    }
}
