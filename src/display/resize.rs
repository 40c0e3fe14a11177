use crate::engine::BoxSize;

/// Filters box-size notifications down to real changes.
#[derive(Debug, Default)]
pub struct ResizeObserver {
    last: Option<BoxSize>,
}

impl ResizeObserver {
    /// Record a notification; returns whether the size actually changed.
    pub fn observe(&mut self, size: BoxSize) -> bool {
        if !size.is_valid() {
            log::warn!("Ignoring invalid box size {:?}", size);
            return false;
        }
        if self.last == Some(size) {
            return false;
        }
        log::debug!("Container resized to {}x{}", size.width, size.height);
        self.last = Some(size);
        true
    }

    pub fn last(&self) -> Option<BoxSize> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_sizes_are_not_changes() {
        let mut observer = ResizeObserver::default();
        assert!(observer.observe(BoxSize::new(800.0, 600.0)));
        assert!(!observer.observe(BoxSize::new(800.0, 600.0)));
        assert!(observer.observe(BoxSize::new(801.0, 600.0)));
        assert_eq!(observer.last(), Some(BoxSize::new(801.0, 600.0)));
    }

    #[test]
    fn invalid_sizes_are_dropped() {
        let mut observer = ResizeObserver::default();
        assert!(!observer.observe(BoxSize::new(f32::INFINITY, 600.0)));
        assert_eq!(observer.last(), None);
    }
}
