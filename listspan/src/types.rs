use crate::DisplayIndex;

/// Where a scroll-to-index request places the item inside the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    /// Towards larger offsets (down for vertical lists).
    Forward,
    /// Towards smaller offsets (up for vertical lists).
    Backward,
}

/// How the renderer should perform a requested scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollBehavior {
    #[default]
    Instant,
    Smooth,
}

/// A measured size for the closed flat index range `[start_index, end_index]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeReport {
    pub start_index: usize,
    pub end_index: usize, // inclusive
    pub size: f64,
}

impl SizeReport {
    pub fn new(start_index: usize, end_index: usize, size: f64) -> Self {
        Self {
            start_index,
            end_index,
            size,
        }
    }

    /// A report for a single item.
    pub fn single(index: usize, size: f64) -> Self {
        Self::new(index, index, size)
    }
}

/// A run-length encoded size: every index from `start_index` up to the next run has `size`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeRun {
    pub start_index: usize,
    pub size: f64,
}

/// The inclusive range of flat indexes the renderer must mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize, // inclusive
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start_index <= index && index <= self.end_index
    }
}

/// An item inside the rendered range.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListItem {
    pub flat_index: usize,
    /// The caller-facing address of this slot (group header or item).
    pub display: DisplayIndex,
    /// Top edge in the scroll axis.
    pub offset: f64,
    /// Size in the scroll axis (excludes `gap`).
    pub size: f64,
}

impl ListItem {
    pub fn end(&self) -> f64 {
        self.offset + self.size
    }

    pub fn is_group_header(&self) -> bool {
        matches!(self.display, DisplayIndex::Group { .. })
    }
}

/// Returns `value` when it is a finite, non-negative pixel quantity.
pub(crate) fn valid_extent(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Maps NaN, infinite and negative values to zero.
pub(crate) fn sanitize_extent(value: f64) -> f64 {
    valid_extent(value).unwrap_or(0.0)
}
