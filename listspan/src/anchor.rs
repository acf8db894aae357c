use crate::types::sanitize_extent;
use crate::{OffsetTable, ScrollDirection};

/// The item a scroll position is pinned to across size changes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    pub index: usize,
    /// The item's top edge when the anchor was captured.
    pub offset: f64,
    /// Distance from the item's top edge to the scroll position.
    pub offset_in_viewport: f64,
}

/// Captures the topmost (fully or partially) visible item at `scroll_top`.
///
/// Returns `None` for an empty list.
pub fn capture_anchor(table: &OffsetTable, count: usize, scroll_top: f64) -> Option<ScrollAnchor> {
    let scroll_top = sanitize_extent(scroll_top);
    let index = table.index_at_offset(scroll_top, count)?;
    let offset = table.offset_at_index(index);
    Some(ScrollAnchor {
        index,
        offset,
        offset_in_viewport: scroll_top - offset,
    })
}

/// Inputs to the "should this deviation be compensated" decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompensationContext {
    pub anchor: ScrollAnchor,
    /// Signed change of the anchor's top edge.
    pub deviation: f64,
    pub scroll_top: f64,
    pub is_scrolling: bool,
    pub direction: Option<ScrollDirection>,
}

impl CompensationContext {
    /// Default policy: compensate unless the user is actively scrolling forward.
    ///
    /// Idle growth and backward scrolling are compensated; a forward scroll owns its position.
    pub fn default_should_compensate(&self) -> bool {
        !(self.is_scrolling && self.direction == Some(ScrollDirection::Forward))
    }
}

/// Detects how far the anchor item moved when a size batch is committed.
///
/// Usage: call [`Self::before_commit`] with the table as it is before the Size Index changes,
/// then [`Self::on_sizes_committed`] once the Offset Table was rebuilt.
#[derive(Clone, Debug, Default)]
pub struct DeviationCompensator {
    anchor: Option<ScrollAnchor>,
}

impl DeviationCompensator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_commit(&mut self, table: &OffsetTable, count: usize, scroll_top: f64) {
        self.anchor = capture_anchor(table, count, scroll_top);
    }

    pub fn anchor(&self) -> Option<ScrollAnchor> {
        self.anchor
    }

    /// Returns the signed pixel delta that keeps the anchor visually in place, consuming the
    /// captured anchor. Positive means content above the anchor grew.
    pub fn on_sizes_committed(&mut self, table: &OffsetTable) -> f64 {
        let Some(anchor) = self.anchor.take() else {
            return 0.0;
        };
        let deviation = table.offset_at_index(anchor.index) - anchor.offset;
        if deviation != 0.0 {
            ltrace!(index = anchor.index, deviation, "anchor moved");
        }
        deviation
    }
}
