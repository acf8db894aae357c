use alloc::vec::Vec;

use crate::SizeIndex;
use crate::types::sanitize_extent;

/// A breakpoint of the offset table: `index` starts at `offset` and every item up to the next
/// breakpoint has `size`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetEntry {
    pub index: usize,
    pub offset: f64,
    pub size: f64,
}

impl OffsetEntry {
    fn offset_of(&self, index: usize, gap: f64) -> f64 {
        self.offset + (index - self.index) as f64 * (self.size + gap)
    }
}

/// Cumulative pixel offsets derived from a [`SizeIndex`].
///
/// One entry per size run, sorted by both index and offset, so "which item is at pixel `p`"
/// and "where does item `i` start" are binary searches followed by a multiplication.
///
/// The table is pure derived state. Callers rebuild it after each size index mutation, passing
/// the smallest touched index so only the suffix is recomputed.
#[derive(Clone, Debug, Default)]
pub struct OffsetTable {
    entries: Vec<OffsetEntry>,
    gap: f64,
    revision: u64,
}

impl OffsetTable {
    pub fn new(gap: f64) -> Self {
        Self {
            entries: Vec::new(),
            gap: sanitize_extent(gap),
            revision: 0,
        }
    }

    pub fn from_sizes(sizes: &SizeIndex, gap: f64) -> Self {
        let mut table = Self::new(gap);
        table.rebuild(sizes);
        table
    }

    pub fn entries(&self) -> &[OffsetEntry] {
        &self.entries
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Bumped on every rebuild; lets range caches detect stale pixel spans.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Changes the inter-item gap. Returns `true` (and rebuilds everything) when it changed.
    pub fn set_gap(&mut self, gap: f64, sizes: &SizeIndex) -> bool {
        let gap = sanitize_extent(gap);
        if self.gap == gap {
            return false;
        }
        self.gap = gap;
        self.rebuild(sizes);
        true
    }

    pub fn rebuild(&mut self, sizes: &SizeIndex) {
        self.rebuild_from(sizes, 0);
    }

    /// Recomputes every breakpoint at or after `changed_start_index`, keeping the prefix.
    pub fn rebuild_from(&mut self, sizes: &SizeIndex, changed_start_index: usize) {
        let keep = self
            .entries
            .partition_point(|e| e.index < changed_start_index);
        self.entries.truncate(keep);
        let runs = if keep == 0 {
            sizes.runs()
        } else {
            sizes.runs_from(changed_start_index)
        };

        let gap = self.gap;
        for run in runs {
            let entry = match self.entries.last() {
                // The first run also covers the indexes below its start.
                None => OffsetEntry {
                    index: 0,
                    offset: 0.0,
                    size: run.size,
                },
                Some(prev) => {
                    if run.start_index <= prev.index || run.size == prev.size {
                        continue;
                    }
                    OffsetEntry {
                        index: run.start_index,
                        offset: prev.offset_of(run.start_index, gap),
                        size: run.size,
                    }
                }
            };
            self.entries.push(entry);
        }
        self.revision = self.revision.wrapping_add(1);
        ltrace!(
            from = changed_start_index,
            kept = keep,
            entries = self.entries.len(),
            "OffsetTable::rebuild_from"
        );
    }

    fn entry_for(&self, index: usize) -> Option<(usize, &OffsetEntry)> {
        let i = self.entries.partition_point(|e| e.index <= index);
        let slot = i.checked_sub(1)?;
        Some((slot, &self.entries[slot]))
    }

    /// Pixel position of the top edge of `index`.
    pub fn offset_at_index(&self, index: usize) -> f64 {
        self.entry_for(index)
            .map_or(0.0, |(_, e)| e.offset_of(index, self.gap))
    }

    /// Size in effect for `index` (0 when no size is known).
    pub fn size_at(&self, index: usize) -> f64 {
        self.entry_for(index).map_or(0.0, |(_, e)| e.size)
    }

    /// Total scrollable extent of `count` items: their sizes plus `gap * (count - 1)`.
    pub fn total_size(&self, count: usize) -> f64 {
        let Some(last) = count.checked_sub(1) else {
            return 0.0;
        };
        self.offset_at_index(last) + self.size_at(last)
    }

    /// The item whose `[offset, offset + size)` contains `offset`, clamped to `[0, count)`.
    ///
    /// Offsets inside a gap map to the preceding item. Returns `None` when `count == 0`.
    pub fn index_at_offset(&self, offset: f64, count: usize) -> Option<usize> {
        let last = count.checked_sub(1)?;
        // Also catches NaN.
        if !(offset > 0.0) || self.entries.is_empty() {
            return Some(0);
        }
        if offset >= self.total_size(count) {
            return Some(last);
        }

        let slot = self.entries.partition_point(|e| e.offset <= offset) - 1;
        let entry = &self.entries[slot];
        let stride = entry.size + self.gap;
        let mut steps = if stride > 0.0 {
            ((offset - entry.offset) / stride) as usize
        } else {
            0
        };
        // Division can land one step off for non-integral strides.
        if steps > 0 && entry.offset + steps as f64 * stride > offset {
            steps -= 1;
        } else if stride > 0.0 && entry.offset + steps.saturating_add(1) as f64 * stride <= offset {
            steps = steps.saturating_add(1);
        }

        let mut index = entry.index.saturating_add(steps);
        if let Some(next) = self.entries.get(slot + 1) {
            index = index.min(next.index - 1);
        }
        Some(index.min(last))
    }
}
