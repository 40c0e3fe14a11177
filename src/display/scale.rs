//! Scale calculation for the fit policies.

use super::ScaleMode;
use crate::config::LayoutConfig;
use crate::engine::{BoxSize, PageSize};

/// PDF points to CSS pixels at 96 DPI.
pub const PT_TO_PX: f32 = 96.0 / 72.0;

/// Space left for the page once borders and the scrollbar reservation are
/// taken out, floored at one pixel per axis.
pub fn available_size(container: BoxSize, layout: &LayoutConfig) -> BoxSize {
    let inset = layout.page_border_width * 2.0 + layout.scrollbar_size;
    BoxSize::new(
        (container.width - inset).max(1.0),
        (container.height - inset).max(1.0),
    )
}

/// Scales at which the page exactly fills the available width and height.
pub fn fit_scales(container: BoxSize, page: PageSize, layout: &LayoutConfig) -> (f32, f32) {
    let available = available_size(container, layout);
    let page_width_px = page.width * PT_TO_PX;
    let page_height_px = page.height * PT_TO_PX;
    (
        available.width / page_width_px,
        available.height / page_height_px,
    )
}

/// Base scale for `mode`, before zoom.
///
/// `page` is only consulted by the fit policies.
pub fn compute_base_scale(
    mode: ScaleMode,
    container: BoxSize,
    page: PageSize,
    layout: &LayoutConfig,
) -> f32 {
    match mode {
        ScaleMode::Factor(value) => value,
        ScaleMode::Cover => {
            let (fit_width, fit_height) = fit_scales(container, page, layout);
            fit_width.max(fit_height)
        }
        ScaleMode::Contain => {
            let (fit_width, fit_height) = fit_scales(container, page, layout);
            fit_width.min(fit_height)
        }
    }
}

pub fn applied_scale(base: f32, zoom: f32) -> f32 {
    base * zoom
}
