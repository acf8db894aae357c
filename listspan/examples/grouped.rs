// Example: grouped list with sticky headers.
use listspan::{DisplayIndex, EngineOptions, ListEngine, ViewportState};

fn main() {
    let opts = EngineOptions::default()
        .with_default_item_size(Some(40.0))
        .with_default_group_size(Some(28.0));
    let mut engine = ListEngine::new(opts);
    engine.set_group_counts(&[5, 12, 3, 40]);
    engine.set_viewport(ViewportState::new(300.0, 200.0, 0.0));

    println!(
        "items={:?} flat slots={} sticky group={:?}",
        engine.total_count(),
        engine.flat_count(),
        engine.sticky_group()
    );
    engine.for_each_item(|it| match it.display {
        DisplayIndex::Group { group_index } => {
            println!("  [{:>6.1}] header of group {group_index}", it.offset)
        }
        DisplayIndex::Item { index, group_index } => {
            println!("  [{:>6.1}] item {index} (group {group_index})", it.offset)
        }
    });

    let flat = engine.to_flat_index(17);
    println!("display 17 -> flat {flat} -> {:?}", engine.to_display_index(flat));
}
