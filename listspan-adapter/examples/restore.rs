// Example: keep measurements and scroll position across an unmount/remount (tab switch).
use listspan::{EngineOptions, SizeReport, ViewportState};
use listspan_adapter::Controller;

fn main() {
    let mut tab = Controller::new(EngineOptions::new(500, 40.0));
    tab.set_viewport(ViewportState::new(0.0, 480.0, 0.0));
    tab.set_sizes(&[SizeReport::new(0, 30, 72.0)]);
    tab.set_viewport(ViewportState::new(1_500.0, 480.0, 0.0));
    let snapshot = tab.snapshot();
    drop(tab);

    let mut remounted = Controller::new(EngineOptions::new(500, 40.0));
    remounted.restore_state_from(&snapshot);
    println!("events={:?}", remounted.take_events().first());
    println!(
        "scroll_top={} total_size={}",
        remounted.engine().scroll_top(),
        remounted.engine().total_size()
    );
}
