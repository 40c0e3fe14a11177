//! Ownership of the single live viewer.

use crate::engine::{DocumentHandle, LayoutMode, ViewerAdapter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// No viewer created yet.
    Absent,
    /// Viewer exists without a document.
    Bound,
    /// Viewer has a document bound.
    Ready,
}

/// Holds at most one viewer and tracks whether it has a document.
pub struct AdapterSlot<D: DocumentHandle> {
    viewer: Option<Box<dyn ViewerAdapter<D>>>,
    has_document: bool,
}

impl<D: DocumentHandle> AdapterSlot<D> {
    pub fn new() -> Self {
        Self {
            viewer: None,
            has_document: false,
        }
    }

    pub fn state(&self) -> AdapterState {
        match (&self.viewer, self.has_document) {
            (None, _) => AdapterState::Absent,
            (Some(_), false) => AdapterState::Bound,
            (Some(_), true) => AdapterState::Ready,
        }
    }

    pub fn layout(&self) -> Option<LayoutMode> {
        self.viewer.as_ref().map(|v| v.layout())
    }

    /// Drop the current viewer, if any.
    pub fn discard(&mut self) {
        if let Some(old) = self.viewer.take() {
            log::debug!("Discarding {:?} viewer", old.layout());
        }
        self.has_document = false;
    }

    /// Install `viewer` in place of the current one and rebind `document`.
    pub fn install(&mut self, viewer: Box<dyn ViewerAdapter<D>>, document: Option<&Arc<D>>) {
        self.discard();
        self.viewer = Some(viewer);
        if let Some(document) = document {
            self.bind(Arc::clone(document));
        }
    }

    /// Bind `document` to the current viewer, if there is one.
    pub fn bind(&mut self, document: Arc<D>) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.set_document(document);
            self.has_document = true;
        }
    }

    pub fn viewer(&self) -> Option<&dyn ViewerAdapter<D>> {
        self.viewer.as_deref()
    }

    /// The viewer, but only once a document is bound to it.
    pub fn ready_mut(&mut self) -> Option<&mut (dyn ViewerAdapter<D> + 'static)> {
        if self.has_document {
            self.viewer.as_deref_mut()
        } else {
            None
        }
    }

    pub fn viewer_mut(&mut self) -> Option<&mut (dyn ViewerAdapter<D> + 'static)> {
        self.viewer.as_deref_mut()
    }
}

impl<D: DocumentHandle> Default for AdapterSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}
