// Example: keeping the viewport stable while estimates are corrected and older rows are
// prepended (chat/timeline "load more").
use listspan::{EngineOptions, ListEngine, ListEvent, SizeReport, ViewportState};

fn corrections(engine: &mut ListEngine) -> Vec<f64> {
    engine
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            ListEvent::ScrollCorrection(delta) => Some(delta),
            _ => None,
        })
        .collect()
}

fn main() {
    let mut engine = ListEngine::new(EngineOptions::new(200, 30.0));
    engine.set_viewport(ViewportState::new(900.0, 400.0, 0.0));
    engine.take_events();

    // Rows above the viewport turn out taller than estimated.
    engine.set_sizes(&[SizeReport::new(10, 19, 55.0)]);
    println!(
        "corrections={:?} scroll_top={}",
        corrections(&mut engine),
        engine.scroll_top()
    );

    // 50 older rows arrive at the front.
    engine.prepend_items(50);
    println!(
        "corrections={:?} scroll_top={} count={:?}",
        corrections(&mut engine),
        engine.scroll_top(),
        engine.total_count()
    );
}
