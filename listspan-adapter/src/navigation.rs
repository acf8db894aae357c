use listspan::{Align, ListEngine, ListSnapshot, ScrollBehavior};

/// Which row a [`ScrollToIndex`] request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexLocation {
    /// An item by display index (group headers excluded).
    Index(usize),
    /// The header row of a group.
    Group(usize),
    /// The last item.
    Last,
}

impl From<usize> for IndexLocation {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A symbolic scroll target: which row, where in the viewport, and how to get there.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollToIndex {
    pub index: IndexLocation,
    pub align: Align,
    pub behavior: ScrollBehavior,
    /// Extra pixels added to the resolved scroll position.
    pub offset: f64,
}

impl ScrollToIndex {
    pub fn new(index: impl Into<IndexLocation>) -> Self {
        Self {
            index: index.into(),
            align: Align::Start,
            behavior: ScrollBehavior::Instant,
            offset: 0.0,
        }
    }

    pub fn last() -> Self {
        Self::new(IndexLocation::Last)
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn smooth(self) -> Self {
        self.with_behavior(ScrollBehavior::Smooth)
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

/// Lifecycle of a scroll-to-index request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavState {
    #[default]
    Idle,
    /// Computing the target, or waiting for the item count.
    Resolving,
    /// A smooth scroll is in flight.
    Animating,
    /// An instant scroll was issued; measurements may still move the target.
    Instant,
    /// Content reshaped under an in-flight scroll; the target is being re-resolved.
    Retrying,
    Settled,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigatorOptions {
    /// Smooth scrolls are force-settled after this long, even without a completion signal.
    pub smooth_scroll_watchdog_ms: u64,
    /// How far (px) a re-resolved target may drift before the scroll is re-issued.
    pub retry_tolerance: f64,
    /// Height of a fixed header overlaying the top of the viewport.
    pub fixed_header_height: f64,
    /// Height of a fixed footer overlaying the bottom of the viewport.
    pub fixed_footer_height: f64,
    /// Item (display index) to show at the top once the list is ready.
    pub initial_top_most_item_index: Option<usize>,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            smooth_scroll_watchdog_ms: 1200,
            retry_tolerance: 1.0,
            fixed_header_height: 0.0,
            fixed_footer_height: 0.0,
            initial_top_most_item_index: None,
        }
    }
}

impl NavigatorOptions {
    pub fn with_smooth_scroll_watchdog_ms(mut self, ms: u64) -> Self {
        self.smooth_scroll_watchdog_ms = ms;
        self
    }

    pub fn with_retry_tolerance(mut self, tolerance: f64) -> Self {
        self.retry_tolerance = tolerance;
        self
    }

    pub fn with_fixed_header_height(mut self, height: f64) -> Self {
        self.fixed_header_height = height;
        self
    }

    pub fn with_fixed_footer_height(mut self, height: f64) -> Self {
        self.fixed_footer_height = height;
        self
    }

    pub fn with_initial_top_most_item_index(mut self, index: Option<usize>) -> Self {
        self.initial_top_most_item_index = index;
        self
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Resolves a request into a concrete, clamped scroll position.
///
/// Fixed header and footer overlay the viewport, so the usable window is
/// `[top + header, top + viewport - footer]`. In grouped lists the sticky group header also
/// covers the top of the window when targeting an item.
pub fn resolve_scroll_target(
    engine: &ListEngine,
    request: &ScrollToIndex,
    options: &NavigatorOptions,
) -> f64 {
    let flat_count = engine.flat_count();
    if flat_count == 0 {
        return 0.0;
    }
    let groups = engine.groups();
    let last_item = engine.total_count().unwrap_or(0).saturating_sub(1);
    let (flat, sticky_inset) = match request.index {
        IndexLocation::Group(g) if groups.is_grouped() => {
            let g = g.min(groups.group_count() - 1);
            (groups.header_flat_index(g).unwrap_or(0), 0.0)
        }
        IndexLocation::Group(_) => (0, 0.0),
        IndexLocation::Index(i) => {
            let flat = engine.to_flat_index(i.min(last_item));
            (flat, sticky_header_size(engine, flat))
        }
        IndexLocation::Last => {
            let flat = engine.to_flat_index(last_item);
            (flat, sticky_header_size(engine, flat))
        }
    };
    let flat = flat.min(flat_count - 1);

    let item_top = engine.offset_at_index(flat);
    let item_size = engine.size_at(flat);
    let viewport = engine.viewport().viewport_height;
    let window_top = non_negative(options.fixed_header_height) + sticky_inset;
    let window_bottom = (viewport - non_negative(options.fixed_footer_height)).max(window_top);

    let top = match request.align {
        Align::Start => item_top - window_top,
        Align::End => item_top + item_size - window_bottom,
        Align::Center => {
            item_top + item_size / 2.0 - (window_top + (window_bottom - window_top) / 2.0)
        }
    };
    let offset = if request.offset.is_finite() {
        request.offset
    } else {
        0.0
    };
    (top + offset).max(0.0).min(engine.max_scroll_top())
}

fn sticky_header_size(engine: &ListEngine, flat: usize) -> f64 {
    let groups = engine.groups();
    if groups.is_group_header(flat) {
        return 0.0;
    }
    groups
        .group_of_flat(flat)
        .and_then(|g| groups.header_flat_index(g))
        .map_or(0.0, |header| engine.size_at(header))
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    request: ScrollToIndex,
    target: f64,
    /// Watchdog deadline of a smooth scroll.
    deadline_ms: Option<u64>,
}

/// Drives scroll-to-index requests against a [`ListEngine`].
///
/// The navigator never animates anything itself. It issues `ScrollTarget` events through the
/// engine and waits for the renderer to report back with [`Self::scroll_target_reached`] or
/// [`Self::scroll_cancelled`]. Smooth scrolls are force-settled by [`Self::tick`] once the
/// watchdog expires.
///
/// Only one request is tracked at a time: a new request (or [`Self::stop`]) drops the previous
/// one along with its watchdog.
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    options: NavigatorOptions,
    state: NavState,
    pending: Option<ScrollToIndex>,
    in_flight: Option<InFlight>,
}

impl Navigator {
    pub fn new(options: NavigatorOptions) -> Self {
        let pending = options
            .initial_top_most_item_index
            .map(ScrollToIndex::new);
        Self {
            state: if pending.is_some() {
                NavState::Resolving
            } else {
                NavState::Idle
            },
            options,
            pending,
            in_flight: None,
        }
    }

    pub fn options(&self) -> &NavigatorOptions {
        &self.options
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// `true` while a request is queued or in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.in_flight.is_some()
    }

    /// The scroll position the in-flight request is heading to.
    pub fn target(&self) -> Option<f64> {
        self.in_flight.map(|f| f.target)
    }

    /// Starts a new request, cancelling the previous one.
    ///
    /// Requests issued before the item count is known are queued until
    /// [`Self::on_total_count_ready`].
    pub fn scroll_to_index(&mut self, engine: &mut ListEngine, request: ScrollToIndex, now_ms: u64) {
        self.stop(engine);
        if !engine.is_ready() {
            ldebug!(index = ?request.index, "scroll_to_index queued until the list is ready");
            self.pending = Some(request);
            self.state = NavState::Resolving;
            return;
        }
        self.issue(engine, request, None, now_ms);
    }

    /// Resolves a queued request once the engine has a count.
    pub fn on_total_count_ready(&mut self, engine: &mut ListEngine, now_ms: u64) {
        if !engine.is_ready() {
            return;
        }
        if let Some(request) = self.pending.take() {
            self.issue(engine, request, None, now_ms);
        }
    }

    /// Re-resolves the in-flight target after a size batch or layout change.
    ///
    /// A smooth scroll whose target drifted by more than `retry_tolerance` is re-issued
    /// (Retrying). An instant scroll is re-issued when the engine's position no longer matches.
    pub fn on_sizes_committed(&mut self, engine: &mut ListEngine, now_ms: u64) {
        let Some(flight) = self.in_flight else {
            return;
        };
        let target = resolve_scroll_target(engine, &flight.request, &self.options);
        let reference = match self.state {
            NavState::Animating => flight.target,
            NavState::Instant => engine.scroll_top(),
            _ => return,
        };
        let drift = target - reference;
        let tolerance = non_negative(self.options.retry_tolerance);
        if drift <= tolerance && drift >= -tolerance {
            return;
        }
        ldebug!(
            from = reference,
            to = target,
            state = ?self.state,
            "scroll target moved; retrying"
        );
        self.state = NavState::Retrying;
        self.issue(engine, flight.request, flight.deadline_ms, now_ms);
    }

    /// The renderer reports that the native scroll arrived.
    pub fn scroll_target_reached(&mut self, engine: &mut ListEngine) {
        if matches!(self.state, NavState::Animating | NavState::Instant) {
            self.settle(engine);
        }
    }

    /// The renderer reports that the native scroll was interrupted (e.g. by the user).
    pub fn scroll_cancelled(&mut self, engine: &mut ListEngine) {
        if self.in_flight.is_some() {
            ldebug!("scroll_to_index cancelled by the renderer");
            self.stop(engine);
        }
    }

    /// Drops the queued and in-flight requests.
    pub fn stop(&mut self, engine: &mut ListEngine) {
        self.pending = None;
        if self.in_flight.take().is_some() {
            engine.set_compensation_suspended(false);
        }
        self.state = NavState::Idle;
    }

    /// Advances timers: force-settles expired smooth scrolls and settles instant scrolls that
    /// survived a frame.
    pub fn tick(&mut self, engine: &mut ListEngine, now_ms: u64) {
        let Some(flight) = self.in_flight else {
            return;
        };
        match self.state {
            NavState::Instant => self.settle(engine),
            NavState::Animating => {
                if flight.deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
                    lwarn!(
                        target = flight.target,
                        now_ms,
                        "smooth scroll watchdog expired; force-settling"
                    );
                    self.settle(engine);
                }
            }
            _ => {}
        }
    }

    /// Cancels navigation and rehydrates the engine from `snapshot`.
    pub fn restore_state_from(&mut self, engine: &mut ListEngine, snapshot: &ListSnapshot) {
        self.stop(engine);
        engine.restore_state_from(snapshot);
    }

    fn issue(
        &mut self,
        engine: &mut ListEngine,
        request: ScrollToIndex,
        deadline_ms: Option<u64>,
        now_ms: u64,
    ) {
        self.state = NavState::Resolving;
        let target = resolve_scroll_target(engine, &request, &self.options);
        engine.request_scroll(target, request.behavior);

        let deadline_ms = match request.behavior {
            ScrollBehavior::Smooth => {
                engine.set_compensation_suspended(true);
                self.state = NavState::Animating;
                Some(deadline_ms.unwrap_or_else(|| {
                    now_ms.saturating_add(self.options.smooth_scroll_watchdog_ms)
                }))
            }
            ScrollBehavior::Instant => {
                self.state = NavState::Instant;
                None
            }
        };
        ltrace!(target, state = ?self.state, "scroll_to_index issued");
        self.in_flight = Some(InFlight {
            request,
            target,
            deadline_ms,
        });
    }

    fn settle(&mut self, engine: &mut ListEngine) {
        if self.in_flight.take().is_some() {
            ldebug!(state = ?self.state, "scroll_to_index settled");
        }
        engine.set_compensation_suspended(false);
        self.state = NavState::Settled;
    }
}
