use crate::*;

use alloc::vec;
use alloc::vec::Vec;
use listspan::{
    Align, EngineOptions, ListEngine, ListEvent, ScrollBehavior, SizeReport, ViewportState,
};

fn ready_engine(count: usize, size: f64, viewport_height: f64) -> ListEngine {
    let mut e = ListEngine::new(EngineOptions::new(count, size));
    e.set_viewport(ViewportState::new(0.0, viewport_height, 0.0));
    e.take_events();
    e
}

fn controller(count: usize, size: f64) -> Controller {
    let mut c = Controller::new(EngineOptions::new(count, size));
    c.set_viewport(ViewportState::new(0.0, 300.0, 0.0));
    c.take_events();
    c
}

fn scroll_targets(events: &[ListEvent]) -> Vec<(f64, ScrollBehavior)> {
    events
        .iter()
        .filter_map(|e| match e {
            ListEvent::ScrollTarget { top, behavior } => Some((*top, *behavior)),
            _ => None,
        })
        .collect()
}

#[test]
fn resolve_applies_alignment() {
    let e = ready_engine(100, 50.0, 300.0);
    let opts = NavigatorOptions::default();
    let at = |request: ScrollToIndex| resolve_scroll_target(&e, &request, &opts);

    assert_eq!(at(ScrollToIndex::new(10)), 500.0);
    assert_eq!(at(ScrollToIndex::new(10).with_align(Align::End)), 250.0);
    assert_eq!(at(ScrollToIndex::new(10).with_align(Align::Center)), 375.0);
    assert_eq!(at(ScrollToIndex::new(10).with_offset(10.0)), 510.0);
    assert_eq!(at(ScrollToIndex::new(0).with_offset(-40.0)), 0.0);
}

#[test]
fn resolve_accounts_for_fixed_header_and_footer() {
    let e = ready_engine(100, 50.0, 300.0);
    let opts = NavigatorOptions::default()
        .with_fixed_header_height(20.0)
        .with_fixed_footer_height(30.0);
    let at = |request: ScrollToIndex| resolve_scroll_target(&e, &request, &opts);

    assert_eq!(at(ScrollToIndex::new(10)), 480.0);
    assert_eq!(at(ScrollToIndex::new(10).with_align(Align::End)), 280.0);
    assert_eq!(at(ScrollToIndex::new(10).with_align(Align::Center)), 380.0);
}

#[test]
fn resolve_clamps_out_of_range_targets() {
    let e = ready_engine(100, 50.0, 300.0);
    let opts = NavigatorOptions::default();
    assert_eq!(
        resolve_scroll_target(&e, &ScrollToIndex::new(99), &opts),
        4_700.0
    );
    assert_eq!(
        resolve_scroll_target(&e, &ScrollToIndex::new(10_000), &opts),
        4_700.0
    );
    assert_eq!(
        resolve_scroll_target(&e, &ScrollToIndex::last().with_align(Align::End), &opts),
        4_700.0
    );

    let empty = ready_engine(0, 50.0, 300.0);
    assert_eq!(
        resolve_scroll_target(&empty, &ScrollToIndex::new(5), &opts),
        0.0
    );
}

#[test]
fn resolve_keeps_items_below_the_sticky_group_header() {
    let opts = EngineOptions::default()
        .with_default_item_size(Some(30.0))
        .with_default_group_size(Some(20.0));
    let mut e = ListEngine::new(opts);
    e.set_group_counts(&[3, 2]);
    e.set_viewport(ViewportState::new(0.0, 60.0, 0.0));
    let nav = NavigatorOptions::default();

    // Display item 3 is flat 5 at offset 130; group 1's header (20px) sticks above it.
    assert_eq!(
        resolve_scroll_target(&e, &ScrollToIndex::new(3), &nav),
        110.0
    );
    assert_eq!(
        resolve_scroll_target(&e, &ScrollToIndex::new(IndexLocation::Group(1)), &nav),
        110.0
    );
    assert_eq!(
        resolve_scroll_target(&e, &ScrollToIndex::new(IndexLocation::Group(9)), &nav),
        110.0
    );
}

#[test]
fn instant_scroll_moves_engine_and_settles_on_tick() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(20), 0);
    assert_eq!(c.nav_state(), NavState::Instant);
    assert_eq!(c.engine().scroll_top(), 1_000.0);
    let events = c.take_events();
    assert_eq!(
        scroll_targets(&events),
        vec![(1_000.0, ScrollBehavior::Instant)]
    );
    assert!(events.iter().any(|e| matches!(
        e,
        ListEvent::VisibleRangeChanged {
            start_index: 20,
            ..
        }
    )));

    c.tick(16);
    assert_eq!(c.nav_state(), NavState::Settled);
}

#[test]
fn smooth_scroll_is_force_settled_by_watchdog() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(40).smooth(), 0);
    assert_eq!(c.nav_state(), NavState::Animating);
    assert!(c.engine().compensation_suspended());
    assert_eq!(
        scroll_targets(&c.take_events()),
        vec![(2_000.0, ScrollBehavior::Smooth)]
    );
    // The engine follows the renderer, not the request.
    assert_eq!(c.engine().scroll_top(), 0.0);

    c.tick(1_199);
    assert_eq!(c.nav_state(), NavState::Animating);
    c.tick(1_200);
    assert_eq!(c.nav_state(), NavState::Settled);
    assert!(!c.engine().compensation_suspended());
}

#[test]
fn scroll_target_reached_settles_early() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(40).smooth(), 0);
    c.set_viewport(ViewportState::new(2_000.0, 300.0, 0.0));
    c.scroll_target_reached(300);
    assert_eq!(c.nav_state(), NavState::Settled);
    assert!(!c.navigator().is_busy());
}

#[test]
fn new_request_cancels_previous_watchdog() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(40).smooth(), 0);
    c.scroll_to_index(ScrollToIndex::new(60).smooth(), 1_000);
    assert_eq!(c.navigator().target(), Some(3_000.0));

    // The first request's watchdog would have fired here.
    c.tick(1_300);
    assert_eq!(c.nav_state(), NavState::Animating);
    c.tick(2_200);
    assert_eq!(c.nav_state(), NavState::Settled);
}

#[test]
fn stop_and_cancel_return_to_idle() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(40).smooth(), 0);
    c.stop();
    assert_eq!(c.nav_state(), NavState::Idle);
    assert!(!c.engine().compensation_suspended());

    c.scroll_to_index(ScrollToIndex::new(40).smooth(), 0);
    c.scroll_cancelled();
    assert_eq!(c.nav_state(), NavState::Idle);

    c.scroll_to_index(ScrollToIndex::new(40).smooth(), 0);
    c.on_scroll(ViewportState::new(10.0, 300.0, 0.0), 50);
    assert_eq!(c.nav_state(), NavState::Idle);
    assert!(c.engine().is_scrolling());
}

#[test]
fn request_before_count_is_queued() {
    let mut c = Controller::new(EngineOptions::default().with_default_item_size(Some(50.0)));
    c.set_viewport(ViewportState::new(0.0, 300.0, 0.0));
    c.take_events();

    c.scroll_to_index(ScrollToIndex::new(50), 0);
    assert_eq!(c.nav_state(), NavState::Resolving);
    assert!(c.navigator().is_busy());
    assert!(scroll_targets(&c.take_events()).is_empty());

    c.set_total_count(100);
    assert_eq!(c.nav_state(), NavState::Instant);
    assert_eq!(
        scroll_targets(&c.take_events()),
        vec![(2_500.0, ScrollBehavior::Instant)]
    );
}

#[test]
fn initial_item_is_scrolled_to_once_ready() {
    let nav = NavigatorOptions::default().with_initial_top_most_item_index(Some(20));
    let mut c = Controller::with_navigator(EngineOptions::new(100, 50.0), nav.clone());
    assert_eq!(
        scroll_targets(&c.take_events()),
        vec![(1_000.0, ScrollBehavior::Instant)]
    );

    let mut c = Controller::with_navigator(
        EngineOptions::default().with_default_item_size(Some(50.0)),
        nav,
    );
    assert_eq!(c.nav_state(), NavState::Resolving);
    c.set_total_count(100);
    assert_eq!(c.engine().scroll_top(), 1_000.0);
}

#[test]
fn smooth_scroll_retries_when_content_reshapes() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(50).smooth(), 0);
    c.take_events();

    // Items above the target grow while the animation runs.
    assert!(c.set_sizes(&[SizeReport::new(0, 9, 100.0)]));
    let events = c.take_events();
    assert_eq!(scroll_targets(&events), vec![(3_000.0, ScrollBehavior::Smooth)]);
    assert!(!events.iter().any(|e| matches!(e, ListEvent::ScrollCorrection(_))));
    assert_eq!(c.nav_state(), NavState::Animating);
    assert_eq!(c.navigator().target(), Some(3_000.0));

    // Sub-tolerance drift (0.5px) does not re-issue.
    assert!(c.set_sizes(&[SizeReport::single(10, 50.5)]));
    assert_eq!(c.navigator().target(), Some(3_000.0));
    assert!(scroll_targets(&c.take_events()).is_empty());

    // The retry keeps the original watchdog deadline.
    c.tick(1_200);
    assert_eq!(c.nav_state(), NavState::Settled);
}

#[test]
fn instant_scroll_retries_when_target_moves() {
    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(50).with_align(Align::End), 0);
    assert_eq!(c.engine().scroll_top(), 2_250.0);
    c.take_events();

    // Growing the target itself moves its bottom edge without any anchor compensation.
    c.set_sizes(&[SizeReport::single(50, 100.0)]);
    assert_eq!(
        scroll_targets(&c.take_events()),
        vec![(2_300.0, ScrollBehavior::Instant)]
    );
    assert_eq!(c.engine().scroll_top(), 2_300.0);
    assert_eq!(c.nav_state(), NavState::Instant);

    c.tick(16);
    assert_eq!(c.nav_state(), NavState::Settled);
}

#[test]
fn restore_cancels_navigation_and_scrolls_instantly() {
    let mut source = controller(100, 50.0);
    source.set_sizes(&[SizeReport::new(0, 4, 80.0)]);
    source.set_viewport(ViewportState::new(640.0, 300.0, 0.0));
    let snapshot = source.snapshot();

    let mut c = controller(100, 50.0);
    c.scroll_to_index(ScrollToIndex::new(90).smooth(), 0);
    c.take_events();

    c.restore_state_from(&snapshot);
    assert_eq!(c.nav_state(), NavState::Idle);
    assert!(!c.engine().compensation_suspended());
    assert_eq!(
        scroll_targets(&c.take_events()),
        vec![(640.0, ScrollBehavior::Instant)]
    );
    assert_eq!(c.engine().scroll_top(), 640.0);
    assert_eq!(c.engine().size_at(3), 80.0);
    assert_eq!(c.engine().total_size(), source.engine().total_size());
}

#[test]
fn tick_debounces_is_scrolling() {
    let mut c = controller(100, 50.0);
    c.on_scroll(ViewportState::new(100.0, 300.0, 0.0), 0);
    assert!(c.engine().is_scrolling());
    c.tick(100);
    assert!(c.engine().is_scrolling());
    c.tick(150);
    assert!(!c.engine().is_scrolling());
}
