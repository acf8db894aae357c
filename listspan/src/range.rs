use crate::types::sanitize_extent;
use crate::{OffsetTable, ScrollDirection, ViewportState, VisibleRange};

/// Extra pixels rendered beyond the viewport, biased towards the scroll direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Overscan {
    /// Added only on the side the user is scrolling towards.
    Pixels(f64),
    /// `main` on the side the user is scrolling towards, `reverse` on the other side.
    Directional { main: f64, reverse: f64 },
}

impl Default for Overscan {
    fn default() -> Self {
        Self::Pixels(0.0)
    }
}

impl From<f64> for Overscan {
    fn from(px: f64) -> Self {
        Self::Pixels(px)
    }
}

impl Overscan {
    /// Returns `(top, bottom)` margins. An unknown direction counts as forward.
    pub fn margins(self, direction: Option<ScrollDirection>) -> (f64, f64) {
        let (main, reverse) = match self {
            Self::Pixels(px) => (px, 0.0),
            Self::Directional { main, reverse } => (main, reverse),
        };
        let (main, reverse) = (sanitize_extent(main), sanitize_extent(reverse));
        match direction {
            Some(ScrollDirection::Backward) => (main, reverse),
            Some(ScrollDirection::Forward) | None => (reverse, main),
        }
    }
}

/// Pixels added to both edges of the viewport, regardless of scroll direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IncreaseViewportBy {
    Uniform(f64),
    Sides { top: f64, bottom: f64 },
}

impl Default for IncreaseViewportBy {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl From<f64> for IncreaseViewportBy {
    fn from(px: f64) -> Self {
        Self::Uniform(px)
    }
}

impl IncreaseViewportBy {
    pub fn top(self) -> f64 {
        match self {
            Self::Uniform(px) => sanitize_extent(px),
            Self::Sides { top, .. } => sanitize_extent(top),
        }
    }

    pub fn bottom(self) -> f64 {
        match self {
            Self::Uniform(px) => sanitize_extent(px),
            Self::Sides { bottom, .. } => sanitize_extent(bottom),
        }
    }
}

/// Computes the inclusive range of items intersecting the viewport plus its margins.
///
/// Returns `None` when `count == 0`. A zero-height viewport yields the item under
/// `scroll_top`.
pub fn compute_visible_range(
    table: &OffsetTable,
    count: usize,
    viewport: &ViewportState,
    direction: Option<ScrollDirection>,
    overscan: Overscan,
    increase_viewport_by: IncreaseViewportBy,
) -> Option<VisibleRange> {
    let scroll_top = sanitize_extent(viewport.scroll_top);
    let height = sanitize_extent(viewport.viewport_height);
    let (over_top, over_bottom) = overscan.margins(direction);
    let top = scroll_top - increase_viewport_by.top() - over_top;
    let bottom = scroll_top + height + increase_viewport_by.bottom() + over_bottom;
    window_to_range(table, count, top, bottom)
}

fn window_to_range(
    table: &OffsetTable,
    count: usize,
    top: f64,
    bottom: f64,
) -> Option<VisibleRange> {
    let start_index = table.index_at_offset(top, count)?;
    let mut end_index = table.index_at_offset(bottom, count)?.max(start_index);
    // An item starting exactly at the bottom edge is not visible.
    if end_index > start_index && table.offset_at_index(end_index) >= bottom {
        end_index -= 1;
    }
    Some(VisibleRange {
        start_index,
        end_index,
    })
}

#[derive(Clone, Copy, Debug)]
struct RenderedSpan {
    range: VisibleRange,
    top: f64,
    bottom: f64,
    viewport_height: f64,
    count: usize,
    revision: u64,
}

/// A [`compute_visible_range`] wrapper with hysteresis.
///
/// The previous range is kept while the required window (viewport plus `increase_viewport_by`,
/// without overscan) stays inside the previously rendered pixel span widened by `tolerance`.
/// Viewport height, item count and offset table changes always recompute.
#[derive(Clone, Debug)]
pub struct RangeCalculator {
    tolerance: f64,
    last: Option<RenderedSpan>,
}

impl Default for RangeCalculator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RangeCalculator {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: sanitize_extent(tolerance),
            last: None,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = sanitize_extent(tolerance);
    }

    /// Forgets the previous range so the next call recomputes unconditionally.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last_range(&self) -> Option<VisibleRange> {
        self.last.map(|s| s.range)
    }

    pub fn compute(
        &mut self,
        table: &OffsetTable,
        count: usize,
        viewport: &ViewportState,
        direction: Option<ScrollDirection>,
        overscan: Overscan,
        increase_viewport_by: IncreaseViewportBy,
    ) -> Option<VisibleRange> {
        let scroll_top = sanitize_extent(viewport.scroll_top);
        let height = sanitize_extent(viewport.viewport_height);

        if let Some(last) = self.last {
            let reusable = last.count == count
                && last.viewport_height == height
                && last.revision == table.revision();
            if reusable {
                let total = table.total_size(count);
                let need_top = (scroll_top - increase_viewport_by.top()).max(0.0);
                let need_bottom =
                    (scroll_top + height + increase_viewport_by.bottom()).min(total);
                if need_top >= last.top - self.tolerance
                    && need_bottom <= last.bottom + self.tolerance
                {
                    return Some(last.range);
                }
            }
        }

        let Some(range) = compute_visible_range(
            table,
            count,
            viewport,
            direction,
            overscan,
            increase_viewport_by,
        ) else {
            self.last = None;
            return None;
        };
        self.last = Some(RenderedSpan {
            range,
            top: table.offset_at_index(range.start_index),
            bottom: table.offset_at_index(range.end_index) + table.size_at(range.end_index),
            viewport_height: height,
            count,
            revision: table.revision(),
        });
        ltrace!(
            start = range.start_index,
            end = range.end_index,
            scroll_top,
            "RangeCalculator::compute"
        );
        Some(range)
    }
}
