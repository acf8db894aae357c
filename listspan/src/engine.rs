use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

use crate::types::{sanitize_extent, valid_extent};
use crate::{
    CompensationContext, DeviationCompensator, DisplayIndex, EngineOptions, GroupIndex,
    IncreaseViewportBy, ListItem, ListSnapshot, OffsetTable, Overscan, RangeCalculator,
    ScrollAnchor, ScrollBehavior, ScrollDirection, SizeIndex, SizeReport, ViewportState,
    VisibleRange,
};

/// Outbound notifications for the renderer, drained with [`ListEngine::take_events`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListEvent {
    /// Mount exactly `start_index..=end_index` (flat indexes) and report their sizes.
    VisibleRangeChanged {
        start_index: usize,
        end_index: usize,
        items: Vec<ListItem>,
        /// Group whose header should be pinned at the top of the viewport.
        sticky_group: Option<usize>,
    },
    /// The list became empty; unmount everything.
    VisibleRangeCleared,
    /// Apply immediately (non-animated) as `scrollBy(delta)`.
    ScrollCorrection(f64),
    /// Perform a native scroll to `top`.
    ScrollTarget { top: f64, behavior: ScrollBehavior },
    /// Size the scrollable content to this extent.
    TotalExtentChanged(f64),
    AtTopChanged(bool),
    AtBottomChanged(bool),
}

/// A headless indexing engine for virtualized lists.
///
/// The engine holds no UI objects. The renderer drives it with the inbound setters
/// (`set_total_count`, `set_sizes`, `set_viewport`, ...) and reacts to the [`ListEvent`]s it
/// queues. All indexes used by the engine are flat indexes; grouped lists translate with
/// [`Self::to_flat_index`] / [`Self::to_display_index`].
///
/// For scroll-to-index navigation and restore workflows, see the `listspan-adapter` crate.
#[derive(Clone, Debug)]
pub struct ListEngine {
    options: EngineOptions,
    sizes: SizeIndex,
    table: OffsetTable,
    groups: GroupIndex,
    ranges: RangeCalculator,
    compensator: DeviationCompensator,

    total_count: Option<usize>, // flat
    viewport: ViewportState,
    is_scrolling: bool,
    scroll_direction: Option<ScrollDirection>,
    last_scroll_event_ms: Option<u64>,
    compensation_suspended: bool,

    rendered: Option<VisibleRange>,
    rendered_revision: u64,
    sticky_group: Option<usize>,
    total_extent: Option<f64>,
    at_top: Option<bool>,
    at_bottom: Option<bool>,
    events: Vec<ListEvent>,
}

impl ListEngine {
    pub fn new(options: EngineOptions) -> Self {
        let sizes = match options.default_item_size {
            Some(size) => SizeIndex::with_default_size(size),
            None => SizeIndex::new(),
        };
        let table = OffsetTable::from_sizes(&sizes, options.gap);
        let viewport = ViewportState {
            scroll_top: sanitize_extent(options.initial_scroll_top),
            ..ViewportState::default()
        };
        ldebug!(
            count = options.initial_total_count,
            default_item_size = options.default_item_size,
            gap = options.gap,
            "ListEngine::new"
        );
        Self {
            ranges: RangeCalculator::new(options.hysteresis_tolerance),
            compensator: DeviationCompensator::new(),
            total_count: options.initial_total_count,
            groups: GroupIndex::new(),
            viewport,
            is_scrolling: false,
            scroll_direction: None,
            last_scroll_event_ms: None,
            compensation_suspended: false,
            rendered: None,
            rendered_revision: table.revision(),
            sticky_group: None,
            total_extent: None,
            at_top: None,
            at_bottom: None,
            events: Vec::new(),
            sizes,
            table,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn size_index(&self) -> &SizeIndex {
        &self.sizes
    }

    pub fn offset_table(&self) -> &OffsetTable {
        &self.table
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    /// `true` once an item count (or a group layout) is known.
    pub fn is_ready(&self) -> bool {
        self.total_count.is_some()
    }

    /// Number of addressable items (group headers excluded), `None` until ready.
    pub fn total_count(&self) -> Option<usize> {
        if self.groups.is_grouped() {
            return Some(self.groups.total_items());
        }
        self.total_count
    }

    /// Number of flat slots (group headers included).
    pub fn flat_count(&self) -> usize {
        self.total_count.unwrap_or(0)
    }

    // Inbound interface.

    /// Sets the item count of an ungrouped list.
    ///
    /// Shrinking drops the measurements of removed items.
    pub fn set_total_count(&mut self, count: usize) {
        if self.groups.is_grouped() {
            lwarn!(count, "set_total_count ignored: grouped lists derive counts from groups");
            return;
        }
        let prev = self.total_count;
        if prev == Some(count) {
            return;
        }
        self.total_count = Some(count);
        if prev.is_some_and(|prev| count < prev) {
            // Dropped items fall back to the estimate so later growth does not inherit a
            // measured size.
            let estimate = self
                .options
                .default_item_size
                .or_else(|| self.sizes.size_at(usize::MAX));
            if let Some(estimate) = estimate {
                let tail = [SizeReport::new(count, usize::MAX, estimate)];
                if let Some(from) = self.sizes.apply_reports(&tail) {
                    self.table.rebuild_from(&self.sizes, from);
                }
            }
        }
        ldebug!(prev = prev, count, "ListEngine::set_total_count");
        self.refresh();
    }

    /// Applies a batch of measured sizes (flat indexes). Returns `false` when nothing changed.
    ///
    /// When the batch moves the topmost visible item, a [`ListEvent::ScrollCorrection`] is
    /// queued (subject to the compensation policy) and the engine's scroll position follows.
    pub fn set_sizes(&mut self, reports: &[SizeReport]) -> bool {
        let count = self.flat_count();
        self.compensator
            .before_commit(&self.table, count, self.viewport.scroll_top);
        let anchor = self.compensator.anchor();

        let Some(from) = self.sizes.apply_reports(reports) else {
            self.compensator.on_sizes_committed(&self.table);
            return false;
        };
        self.table.rebuild_from(&self.sizes, from);
        let deviation = self.compensator.on_sizes_committed(&self.table);
        ltrace!(reports = reports.len(), from, deviation, "ListEngine::set_sizes");
        if let Some(anchor) = anchor {
            self.compensate(anchor, deviation);
        }
        self.refresh();
        true
    }

    /// Convenience for a single measured item.
    pub fn set_size(&mut self, index: usize, size: f64) -> bool {
        self.set_sizes(&[SizeReport::single(index, size)])
    }

    /// Replaces the group layout: `counts[g]` items follow the header of group `g`.
    ///
    /// An empty slice turns grouping off and leaves an empty list.
    pub fn set_group_counts(&mut self, counts: &[usize]) {
        let old_headers: Vec<usize> = self.groups.header_flat_indices().to_vec();
        let Some(first_changed) = self.groups.set_group_counts(counts) else {
            return;
        };
        let mut from = first_changed;

        if let Some(group_size) = self.options.default_group_size.and_then(valid_extent) {
            if !self.sizes.is_empty() {
                let mut reports = Vec::new();
                for &header in self.groups.header_flat_indices() {
                    if old_headers.binary_search(&header).is_err() {
                        reports.push(SizeReport::single(header, group_size));
                    }
                }
                if let Some(item_size) = self.options.default_item_size {
                    for &old in &old_headers {
                        if !self.groups.is_group_header(old)
                            && self.sizes.size_at(old) == Some(group_size)
                        {
                            reports.push(SizeReport::single(old, item_size));
                        }
                    }
                }
                if let Some(changed) = self.sizes.apply_reports(&reports) {
                    from = from.min(changed);
                }
            }
        }

        self.total_count = Some(self.groups.flat_len());
        self.table.rebuild_from(&self.sizes, from);
        self.refresh();
    }

    pub fn set_gap(&mut self, gap: f64) {
        if self.table.set_gap(gap, &self.sizes) {
            self.options.gap = self.table.gap();
            self.refresh();
        }
    }

    pub fn set_overscan(&mut self, overscan: impl Into<Overscan>) {
        self.options.overscan = overscan.into();
        self.ranges.reset();
        self.refresh();
    }

    pub fn set_increase_viewport_by(&mut self, increase: impl Into<IncreaseViewportBy>) {
        self.options.increase_viewport_by = increase.into();
        self.ranges.reset();
        self.refresh();
    }

    /// Applies scroll container geometry reported by the renderer.
    ///
    /// Invalid fields are treated as zero. The scroll direction follows `scroll_top`.
    pub fn set_viewport(&mut self, viewport: ViewportState) {
        let next = viewport.sanitized();
        let prev = self.viewport;
        if next == prev {
            return;
        }
        self.scroll_direction = match next.scroll_top.partial_cmp(&prev.scroll_top) {
            Some(Ordering::Greater) => Some(ScrollDirection::Forward),
            Some(Ordering::Less) => Some(ScrollDirection::Backward),
            _ => self.scroll_direction,
        };
        self.viewport = next;
        ltrace!(
            scroll_top = next.scroll_top,
            viewport_height = next.viewport_height,
            "ListEngine::set_viewport"
        );
        self.refresh();
    }

    /// Applies a user scroll (wheel/drag/touch) and marks the engine as scrolling.
    pub fn apply_scroll_event(&mut self, viewport: ViewportState, now_ms: u64) {
        self.set_viewport(viewport);
        self.notify_scroll_event(now_ms);
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        if self.is_scrolling == is_scrolling {
            return;
        }
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        }
    }

    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        self.last_scroll_event_ms = Some(now_ms);
        self.set_is_scrolling(true);
    }

    /// Resets `is_scrolling` once no scroll event arrived for `is_scrolling_reset_delay_ms`.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
            self.set_is_scrolling(false);
        }
    }

    /// Suppresses scroll corrections, e.g. while a programmatic smooth scroll is in flight.
    pub fn set_compensation_suspended(&mut self, suspended: bool) {
        self.compensation_suspended = suspended;
    }

    pub fn compensation_suspended(&self) -> bool {
        self.compensation_suspended
    }

    /// Inserts `count` items at the front of an ungrouped list.
    ///
    /// Existing measurements move with their items; the new items take the size of the first
    /// run. A correction keeps the previously visible content in place.
    pub fn prepend_items(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if self.groups.is_grouped() {
            lwarn!(count, "prepend_items ignored: grouped lists derive counts from groups");
            return;
        }
        let prev = self.flat_count();
        self.sizes.rebase(isize::try_from(count).unwrap_or(isize::MAX));
        self.table.rebuild(&self.sizes);
        self.total_count = Some(prev.saturating_add(count));
        if prev > 0 {
            let delta = self.table.offset_at_index(count);
            self.viewport.scroll_top += delta;
            self.events.push(ListEvent::ScrollCorrection(delta));
        }
        ldebug!(count, total = prev.saturating_add(count), "ListEngine::prepend_items");
        self.refresh();
    }

    /// Removes `count` items from the front of an ungrouped list.
    pub fn remove_items_from_front(&mut self, count: usize) {
        if self.groups.is_grouped() {
            lwarn!(count, "remove_items_from_front ignored for grouped lists");
            return;
        }
        let prev = self.flat_count();
        let count = count.min(prev);
        if count == 0 {
            return;
        }
        let removed_extent = self.table.offset_at_index(count);
        self.sizes.rebase(-isize::try_from(count).unwrap_or(isize::MAX));
        self.table.rebuild(&self.sizes);
        self.total_count = Some(prev - count);

        let scroll_top = self.viewport.scroll_top;
        let next = (scroll_top - removed_extent).max(0.0);
        if next != scroll_top {
            self.viewport.scroll_top = next;
            self.events.push(ListEvent::ScrollCorrection(next - scroll_top));
        }
        ldebug!(count, total = prev - count, "ListEngine::remove_items_from_front");
        self.refresh();
    }

    /// Queues a [`ListEvent::ScrollTarget`]. Instant scrolls move the engine immediately;
    /// smooth scrolls are tracked through the viewport updates the renderer reports.
    pub fn request_scroll(&mut self, top: f64, behavior: ScrollBehavior) {
        let top = sanitize_extent(top).min(self.max_scroll_top());
        self.events.push(ListEvent::ScrollTarget { top, behavior });
        if behavior == ScrollBehavior::Instant && self.viewport.scroll_top != top {
            self.viewport.scroll_top = top;
            self.refresh();
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            size_runs: self.sizes.runs(),
            group_counts: self.groups.group_counts().to_vec(),
            scroll_top: self.viewport.scroll_top,
        }
    }

    /// Rehydrates measurements, groups and scroll position from a [`ListSnapshot`].
    ///
    /// The scroll position is restored directly (no animation).
    pub fn restore_state_from(&mut self, snapshot: &ListSnapshot) {
        self.sizes = SizeIndex::from_runs(snapshot.size_runs.iter().copied());
        if !snapshot.group_counts.is_empty() || self.groups.is_grouped() {
            self.groups.set_group_counts(&snapshot.group_counts);
            self.total_count = Some(self.groups.flat_len());
        }
        self.table.rebuild(&self.sizes);
        self.ranges.reset();

        let mut top = sanitize_extent(snapshot.scroll_top);
        if self.viewport.viewport_height > 0.0 {
            top = top.min(self.max_scroll_top());
        }
        self.viewport.scroll_top = top;
        self.scroll_direction = None;
        self.events.push(ListEvent::ScrollTarget {
            top,
            behavior: ScrollBehavior::Instant,
        });
        ldebug!(
            runs = self.sizes.len(),
            groups = snapshot.group_counts.len(),
            scroll_top = top,
            "ListEngine::restore_state_from"
        );
        self.refresh();
    }

    // Queries.

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn scroll_top(&self) -> f64 {
        self.viewport.scroll_top
    }

    pub fn size_at(&self, flat_index: usize) -> f64 {
        self.table.size_at(flat_index)
    }

    pub fn offset_at_index(&self, flat_index: usize) -> f64 {
        self.table.offset_at_index(flat_index)
    }

    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        self.table.index_at_offset(offset, self.flat_count())
    }

    pub fn total_size(&self) -> f64 {
        self.table.total_size(self.flat_count())
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.total_size() - self.viewport.viewport_height).max(0.0)
    }

    pub fn to_flat_index(&self, display_index: usize) -> usize {
        self.groups.to_flat_index(display_index)
    }

    pub fn to_display_index(&self, flat_index: usize) -> DisplayIndex {
        self.groups.to_display_index(flat_index)
    }

    /// The range most recently announced to the renderer.
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.rendered
    }

    pub fn sticky_group(&self) -> Option<usize> {
        self.sticky_group
    }

    pub fn at_top(&self) -> bool {
        self.at_top.unwrap_or(true)
    }

    pub fn at_bottom(&self) -> bool {
        self.at_bottom.unwrap_or(true)
    }

    pub fn item(&self, flat_index: usize) -> ListItem {
        ListItem {
            flat_index,
            display: self.groups.to_display_index(flat_index),
            offset: self.table.offset_at_index(flat_index),
            size: self.table.size_at(flat_index),
        }
    }

    pub fn for_each_item(&self, mut f: impl FnMut(ListItem)) {
        let Some(range) = self.rendered else {
            return;
        };
        for i in range.start_index..=range.end_index {
            f(self.item(i));
        }
    }

    /// Collects the rendered items into `out` (clears `out` first).
    pub fn collect_items(&self, out: &mut Vec<ListItem>) {
        out.clear();
        self.for_each_item(|it| out.push(it));
    }

    pub fn events(&self) -> &[ListEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ListEvent> {
        mem::take(&mut self.events)
    }

    fn compensate(&mut self, anchor: ScrollAnchor, deviation: f64) {
        if deviation == 0.0 {
            return;
        }
        if self.compensation_suspended {
            ltrace!(deviation, "compensation suspended");
            return;
        }
        let ctx = CompensationContext {
            anchor,
            deviation,
            scroll_top: self.viewport.scroll_top,
            is_scrolling: self.is_scrolling,
            direction: self.scroll_direction,
        };
        let apply = match &self.options.should_compensate {
            Some(f) => f(&ctx),
            None => ctx.default_should_compensate(),
        };
        if !apply {
            ltrace!(deviation, "compensation skipped by policy");
            return;
        }
        let scroll_top = self.viewport.scroll_top;
        let next = (scroll_top + deviation).max(0.0);
        self.viewport.scroll_top = next;
        self.events.push(ListEvent::ScrollCorrection(next - scroll_top));
    }

    fn refresh(&mut self) {
        let count = self.flat_count();
        let total = self.table.total_size(count);
        if self.total_extent != Some(total) {
            self.total_extent = Some(total);
            self.events.push(ListEvent::TotalExtentChanged(total));
        }

        let range = self.ranges.compute(
            &self.table,
            count,
            &self.viewport,
            self.scroll_direction,
            self.options.overscan,
            self.options.increase_viewport_by,
        );
        // The header of the group owning the first visible row sticks, overscan aside.
        let sticky_group = range
            .and_then(|_| self.table.index_at_offset(self.viewport.scroll_top, count))
            .and_then(|first| self.groups.group_of_flat(first));
        let revision = self.table.revision();
        if range != self.rendered
            || sticky_group != self.sticky_group
            || (range.is_some() && revision != self.rendered_revision)
        {
            self.rendered = range;
            self.rendered_revision = revision;
            self.sticky_group = sticky_group;
            match range {
                Some(r) => {
                    let mut items = Vec::with_capacity(r.len());
                    self.for_each_item(|it| items.push(it));
                    self.events.push(ListEvent::VisibleRangeChanged {
                        start_index: r.start_index,
                        end_index: r.end_index,
                        items,
                        sticky_group,
                    });
                }
                None => self.events.push(ListEvent::VisibleRangeCleared),
            }
        }

        let at_top = count == 0 || self.viewport.scroll_top <= self.options.at_top_threshold;
        if self.at_top != Some(at_top) {
            self.at_top = Some(at_top);
            self.events.push(ListEvent::AtTopChanged(at_top));
        }
        let at_bottom =
            count == 0 || self.viewport.scroll_bottom() >= total - self.options.at_bottom_threshold;
        if self.at_bottom != Some(at_bottom) {
            self.at_bottom = Some(at_bottom);
            self.events.push(ListEvent::AtBottomChanged(at_bottom));
        }
    }
}
