// Example: a million uniformly estimated rows, one scroll and one measurement batch.
use listspan::{EngineOptions, ListEngine, ListEvent, SizeReport, ViewportState};

fn main() {
    let mut engine = ListEngine::new(EngineOptions::new(1_000_000, 24.0).with_overscan(48.0));
    engine.set_viewport(ViewportState::new(240_000.0, 600.0, 0.0));

    for event in engine.take_events() {
        match event {
            ListEvent::VisibleRangeChanged {
                start_index,
                end_index,
                items,
                ..
            } => println!(
                "mount {start_index}..={end_index} (first at {}px)",
                items.first().map_or(0.0, |it| it.offset)
            ),
            other => println!("{other:?}"),
        }
    }

    // The renderer measured the mounted rows: a few are taller than the estimate.
    let range = engine.visible_range().expect("list is not empty");
    let reports: Vec<SizeReport> = (range.start_index..=range.end_index)
        .filter(|i| i % 7 == 0)
        .map(|i| SizeReport::single(i, 60.0))
        .collect();
    engine.set_sizes(&reports);

    println!("size runs={}", engine.size_index().len());
    println!("total_size={}", engine.total_size());
    println!("events after measuring={:?}", engine.take_events().len());
}
