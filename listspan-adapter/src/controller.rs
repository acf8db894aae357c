use alloc::vec::Vec;

use listspan::{
    EngineOptions, IncreaseViewportBy, ListEngine, ListEvent, ListSnapshot, Overscan, SizeReport,
    ViewportState,
};

use crate::{NavState, Navigator, NavigatorOptions, ScrollToIndex};

/// A framework-neutral controller that wraps a `listspan::ListEngine` and a [`Navigator`].
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - the inbound setters (`set_total_count`, `set_sizes`, `set_viewport`, ...) as data and
///   geometry change
/// - `on_scroll` for user-initiated scrolls (cancels navigation)
/// - `tick(now_ms)` each frame/timer tick (watchdog and `is_scrolling` debouncing)
///
/// and by applying the [`ListEvent`]s drained from `take_events`.
#[derive(Clone, Debug)]
pub struct Controller {
    engine: ListEngine,
    nav: Navigator,
    now_ms: u64,
}

impl Controller {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_navigator(options, NavigatorOptions::default())
    }

    pub fn with_navigator(options: EngineOptions, nav_options: NavigatorOptions) -> Self {
        Self::from_engine(ListEngine::new(options), nav_options)
    }

    /// Wraps an existing engine. A configured initial item is scrolled to as soon as the engine
    /// is ready.
    pub fn from_engine(engine: ListEngine, nav_options: NavigatorOptions) -> Self {
        let mut c = Self {
            engine,
            nav: Navigator::new(nav_options),
            now_ms: 0,
        };
        c.nav.on_total_count_ready(&mut c.engine, 0);
        c
    }

    pub fn engine(&self) -> &ListEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ListEngine {
        &mut self.engine
    }

    pub fn into_engine(self) -> ListEngine {
        self.engine
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn nav_state(&self) -> NavState {
        self.nav.state()
    }

    pub fn set_total_count(&mut self, count: usize) {
        let was_ready = self.engine.is_ready();
        self.engine.set_total_count(count);
        if !was_ready {
            self.nav.on_total_count_ready(&mut self.engine, self.now_ms);
        } else {
            self.nav.on_sizes_committed(&mut self.engine, self.now_ms);
        }
    }

    /// Applies measured sizes and lets an in-flight scroll re-resolve its target.
    pub fn set_sizes(&mut self, reports: &[SizeReport]) -> bool {
        let changed = self.engine.set_sizes(reports);
        if changed {
            self.nav.on_sizes_committed(&mut self.engine, self.now_ms);
        }
        changed
    }

    pub fn set_group_counts(&mut self, counts: &[usize]) {
        let was_ready = self.engine.is_ready();
        self.engine.set_group_counts(counts);
        if was_ready {
            self.nav.on_sizes_committed(&mut self.engine, self.now_ms);
        } else {
            self.nav.on_total_count_ready(&mut self.engine, self.now_ms);
        }
    }

    pub fn set_gap(&mut self, gap: f64) {
        self.engine.set_gap(gap);
        self.nav.on_sizes_committed(&mut self.engine, self.now_ms);
    }

    pub fn set_overscan(&mut self, overscan: impl Into<Overscan>) {
        self.engine.set_overscan(overscan);
    }

    pub fn set_increase_viewport_by(&mut self, increase: impl Into<IncreaseViewportBy>) {
        self.engine.set_increase_viewport_by(increase);
    }

    /// Reports scroll container geometry (resizes, or progress of a programmatic scroll).
    pub fn set_viewport(&mut self, viewport: ViewportState) {
        self.engine.set_viewport(viewport);
    }

    /// Call this when the UI reports a user scroll (wheel/drag/touch).
    ///
    /// This cancels any in-flight navigation.
    pub fn on_scroll(&mut self, viewport: ViewportState, now_ms: u64) {
        self.now_ms = now_ms;
        self.nav.stop(&mut self.engine);
        self.engine.apply_scroll_event(viewport, now_ms);
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        self.engine.set_is_scrolling(is_scrolling);
    }

    pub fn scroll_to_index(&mut self, request: ScrollToIndex, now_ms: u64) {
        self.now_ms = now_ms;
        self.nav.scroll_to_index(&mut self.engine, request, now_ms);
    }

    pub fn stop(&mut self) {
        self.nav.stop(&mut self.engine);
    }

    pub fn scroll_target_reached(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.nav.scroll_target_reached(&mut self.engine);
    }

    pub fn scroll_cancelled(&mut self) {
        self.nav.scroll_cancelled(&mut self.engine);
    }

    /// Advances the controller: navigation watchdog, then `is_scrolling` debouncing.
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.nav.tick(&mut self.engine, now_ms);
        self.engine.update_scrolling(now_ms);
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.engine.snapshot()
    }

    pub fn restore_state_from(&mut self, snapshot: &ListSnapshot) {
        self.nav.restore_state_from(&mut self.engine, snapshot);
    }

    pub fn take_events(&mut self) -> Vec<ListEvent> {
        self.engine.take_events()
    }
}
