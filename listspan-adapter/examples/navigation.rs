// Example: smooth scroll-to-index with a watchdog and a retry when rows are measured mid-flight.
use listspan::{Align, EngineOptions, ListEvent, SizeReport, ViewportState};
use listspan_adapter::{Controller, NavigatorOptions, ScrollToIndex};

fn print_targets(c: &mut Controller) {
    for event in c.take_events() {
        if let ListEvent::ScrollTarget { top, behavior } = event {
            println!("  scroll to {top} ({behavior:?})");
        }
    }
}

fn main() {
    let nav = NavigatorOptions::default().with_fixed_header_height(48.0);
    let mut c = Controller::with_navigator(EngineOptions::new(10_000, 32.0), nav);
    c.set_viewport(ViewportState::new(0.0, 640.0, 0.0));
    c.take_events();

    c.scroll_to_index(
        ScrollToIndex::new(5_000).with_align(Align::Center).smooth(),
        0,
    );
    println!("state={:?}", c.nav_state());
    print_targets(&mut c);

    // Rows above the target get measured while the animation runs: the target is re-resolved.
    c.set_sizes(&[SizeReport::new(0, 99, 64.0)]);
    println!("state={:?}", c.nav_state());
    print_targets(&mut c);

    // No completion signal from the renderer: the watchdog settles the request.
    c.tick(1_200);
    println!("state={:?}", c.nav_state());
}
