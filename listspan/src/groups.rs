use alloc::vec::Vec;

/// The caller-facing address of a flat slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayIndex {
    /// The header row of `group_index`.
    Group { group_index: usize },
    /// The `index`-th non-header row overall, belonging to `group_index`.
    ///
    /// Ungrouped lists report every slot as an item of group 0.
    Item { index: usize, group_index: usize },
}

/// Folds group header rows into the flat index space.
///
/// Group `g` occupies one header slot followed by `counts[g]` item slots. Display indexes
/// address items only ("item 0, item 1, ..."), while the size and offset structures address
/// flat slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupIndex {
    counts: Vec<usize>,
    /// Flat index of each group header (strictly increasing).
    headers: Vec<usize>,
    /// Number of items in all groups before `g`.
    items_before: Vec<usize>,
    total_items: usize,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: &[usize]) -> Self {
        let mut groups = Self::new();
        groups.set_group_counts(counts);
        groups
    }

    /// Replaces the group layout.
    ///
    /// Returns the first flat index whose layout changed, or `None` when `counts` is unchanged.
    pub fn set_group_counts(&mut self, counts: &[usize]) -> Option<usize> {
        if self.counts == counts {
            return None;
        }
        let first_changed_group = self
            .counts
            .iter()
            .zip(counts)
            .take_while(|(a, b)| a == b)
            .count();

        self.counts.clear();
        self.counts.extend_from_slice(counts);
        self.headers.clear();
        self.items_before.clear();

        let mut flat = 0usize;
        let mut items = 0usize;
        for &count in counts {
            self.headers.push(flat);
            self.items_before.push(items);
            flat = flat.saturating_add(1).saturating_add(count);
            items = items.saturating_add(count);
        }
        self.total_items = items;

        let first_changed_flat = self
            .headers
            .get(first_changed_group)
            .copied()
            .unwrap_or(flat);
        ldebug!(
            groups = counts.len(),
            items = items,
            first_changed_flat,
            "GroupIndex::set_group_counts"
        );
        Some(first_changed_flat)
    }

    pub fn is_grouped(&self) -> bool {
        !self.counts.is_empty()
    }

    pub fn group_counts(&self) -> &[usize] {
        &self.counts
    }

    /// Flat index of every group header.
    pub fn header_flat_indices(&self) -> &[usize] {
        &self.headers
    }

    pub fn header_flat_index(&self, group_index: usize) -> Option<usize> {
        self.headers.get(group_index).copied()
    }

    pub fn group_count(&self) -> usize {
        self.counts.len()
    }

    /// Number of non-header rows.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of flat slots (headers plus items).
    pub fn flat_len(&self) -> usize {
        self.headers.len().saturating_add(self.total_items)
    }

    pub fn is_group_header(&self, flat_index: usize) -> bool {
        self.headers.binary_search(&flat_index).is_ok()
    }

    /// The group containing `flat_index` (clamped), or `None` when ungrouped.
    pub fn group_of_flat(&self, flat_index: usize) -> Option<usize> {
        if !self.is_grouped() {
            return None;
        }
        let flat_index = flat_index.min(self.flat_len().saturating_sub(1));
        Some(self.headers.partition_point(|&h| h <= flat_index) - 1)
    }

    /// Translates an item's display index into its flat slot (clamped to the last item).
    pub fn to_flat_index(&self, display_index: usize) -> usize {
        if !self.is_grouped() {
            return display_index;
        }
        if self.total_items == 0 {
            return self.flat_len().saturating_sub(1);
        }
        let display_index = display_index.min(self.total_items - 1);
        // Empty groups share `items_before` with their successor; the last match owns the item.
        let group = self.items_before.partition_point(|&b| b <= display_index) - 1;
        self.headers[group] + 1 + (display_index - self.items_before[group])
    }

    /// Translates a flat slot into a group header or item address (clamped).
    pub fn to_display_index(&self, flat_index: usize) -> DisplayIndex {
        let Some(group_index) = self.group_of_flat(flat_index) else {
            return DisplayIndex::Item {
                index: flat_index,
                group_index: 0,
            };
        };
        let flat_index = flat_index.min(self.flat_len().saturating_sub(1));
        let header = self.headers[group_index];
        if flat_index == header {
            DisplayIndex::Group { group_index }
        } else {
            DisplayIndex::Item {
                index: self.items_before[group_index] + (flat_index - header - 1),
                group_index,
            }
        }
    }
}
