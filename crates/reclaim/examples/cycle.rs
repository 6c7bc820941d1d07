//! Example: Decide one polling cycle for a crowded disk
//!
//! Run with: cargo run -p reclaim --example cycle

use reclaim::units::{GB, KB, MB, format_size, format_speed};
use reclaim::{Item, LogSink, ReclaimConfig, Snapshot, plan_cycle};

fn main() {
    let snapshot = Snapshot::from_items(vec![
        Item::new("1", 60 * GB).with_speed(38 * MB).complete(),
        Item::new("2", 35 * GB).with_speed(17 * MB).complete(),
        Item::new("3", 20 * GB).with_speed(18 * MB + 768 * KB).complete(),
        Item::new("4", 10 * GB).with_speed(4_592_762).complete(),
        Item::new("5", 10 * GB).complete(),
    ]);
    let config = ReclaimConfig::with_capacity(140 * GB);

    let plan = plan_cycle(&snapshot, &config, &LogSink);
    if let Some(headroom) = plan.headroom() {
        println!(
            "free {} / increment {} -> {} tier, target {} GB",
            format_size(headroom.free_space.max(0) as u64),
            format_size(headroom.increment),
            headroom.tier.label(),
            headroom.tier.target()
        );
    }
    println!("{:-<60}", "");

    for item in snapshot.items() {
        let verdict = if plan.should_delete(item, &LogSink) {
            "DELETE"
        } else {
            "keep  "
        };
        println!(
            "{} {:>3} {:>9} {:>12}",
            verdict,
            item.name,
            format_size(item.completed),
            format_speed(item.upload_speed)
        );
    }
}
