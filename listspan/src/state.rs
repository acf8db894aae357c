use alloc::vec::Vec;

use crate::SizeRun;
use crate::types::sanitize_extent;

/// Scroll container geometry as reported by the renderer.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub scroll_height: f64,
}

impl ViewportState {
    pub fn new(scroll_top: f64, viewport_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            scroll_height,
        }
    }

    /// Replaces NaN, infinite and negative fields with zero.
    pub fn sanitized(self) -> Self {
        Self {
            scroll_top: sanitize_extent(self.scroll_top),
            viewport_height: sanitize_extent(self.viewport_height),
            scroll_height: sanitize_extent(self.scroll_height),
        }
    }

    pub fn scroll_bottom(&self) -> f64 {
        self.scroll_top + self.viewport_height
    }
}

/// Everything needed to bring a list back after it was unmounted (e.g. a tab switch).
///
/// Opaque to renderers: produced by `ListEngine::snapshot` and consumed by
/// `ListEngine::restore_state_from`. With `feature = "serde"`, this type implements
/// `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListSnapshot {
    pub size_runs: Vec<SizeRun>,
    pub group_counts: Vec<usize>,
    pub scroll_top: f64,
}
