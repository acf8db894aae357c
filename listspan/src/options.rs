use alloc::sync::Arc;

use crate::{CompensationContext, IncreaseViewportBy, Overscan};

/// Decides whether an anchor deviation caused by a size commit is applied as a scroll
/// correction. Overrides [`CompensationContext::default_should_compensate`].
pub type ShouldCompensateCallback = Arc<dyn Fn(&CompensationContext) -> bool + Send + Sync>;

/// Configuration for [`crate::ListEngine`].
///
/// Cheap to clone: the only heavy field is an `Arc`.
#[derive(Clone)]
pub struct EngineOptions {
    /// Item count known at construction. `None` means "not ready yet": scroll requests issued
    /// before a count arrives are queued by the adapter.
    pub initial_total_count: Option<usize>,

    /// Size estimate for items that were not measured yet.
    ///
    /// When `None`, the first measurement becomes the estimate for every other item.
    pub default_item_size: Option<f64>,
    /// Size estimate for group header rows.
    pub default_group_size: Option<f64>,

    /// Space between items.
    pub gap: f64,

    pub overscan: Overscan,
    pub increase_viewport_by: IncreaseViewportBy,

    /// How far (px) the required window may leave the rendered span before the visible range is
    /// recomputed.
    pub hysteresis_tolerance: f64,

    /// Distance from the top (px) still reported as "at top".
    pub at_top_threshold: f64,
    /// Distance from the bottom (px) still reported as "at bottom".
    pub at_bottom_threshold: f64,

    pub initial_scroll_top: f64,

    /// Debounced fallback for resetting `is_scrolling` after the last scroll event.
    pub is_scrolling_reset_delay_ms: u64,

    pub should_compensate: Option<ShouldCompensateCallback>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            initial_total_count: None,
            default_item_size: None,
            default_group_size: None,
            gap: 0.0,
            overscan: Overscan::default(),
            increase_viewport_by: IncreaseViewportBy::default(),
            hysteresis_tolerance: 1.0,
            at_top_threshold: 0.0,
            at_bottom_threshold: 4.0,
            initial_scroll_top: 0.0,
            is_scrolling_reset_delay_ms: 150,
            should_compensate: None,
        }
    }
}

impl EngineOptions {
    /// Options for a list of `count` items estimated at `default_item_size` each.
    pub fn new(count: usize, default_item_size: f64) -> Self {
        Self {
            initial_total_count: Some(count),
            default_item_size: Some(default_item_size),
            ..Self::default()
        }
    }

    pub fn with_total_count(mut self, count: Option<usize>) -> Self {
        self.initial_total_count = count;
        self
    }

    pub fn with_default_item_size(mut self, size: Option<f64>) -> Self {
        self.default_item_size = size;
        self
    }

    pub fn with_default_group_size(mut self, size: Option<f64>) -> Self {
        self.default_group_size = size;
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_overscan(mut self, overscan: impl Into<Overscan>) -> Self {
        self.overscan = overscan.into();
        self
    }

    pub fn with_increase_viewport_by(mut self, increase: impl Into<IncreaseViewportBy>) -> Self {
        self.increase_viewport_by = increase.into();
        self
    }

    pub fn with_hysteresis_tolerance(mut self, tolerance: f64) -> Self {
        self.hysteresis_tolerance = tolerance;
        self
    }

    pub fn with_at_top_threshold(mut self, threshold: f64) -> Self {
        self.at_top_threshold = threshold;
        self
    }

    pub fn with_at_bottom_threshold(mut self, threshold: f64) -> Self {
        self.at_bottom_threshold = threshold;
        self
    }

    pub fn with_initial_scroll_top(mut self, scroll_top: f64) -> Self {
        self.initial_scroll_top = scroll_top;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_should_compensate(
        mut self,
        f: Option<impl Fn(&CompensationContext) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.should_compensate = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("initial_total_count", &self.initial_total_count)
            .field("default_item_size", &self.default_item_size)
            .field("default_group_size", &self.default_group_size)
            .field("gap", &self.gap)
            .field("overscan", &self.overscan)
            .field("increase_viewport_by", &self.increase_viewport_by)
            .field("hysteresis_tolerance", &self.hysteresis_tolerance)
            .field("at_top_threshold", &self.at_top_threshold)
            .field("at_bottom_threshold", &self.at_bottom_threshold)
            .field("initial_scroll_top", &self.initial_scroll_top)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
