use anyhow::Result;
use reclaim::predicates::CountConfig;
use reclaim::units::{format_size, format_speed};
use reclaim::{Snapshot, count_should_delete};

use crate::Context;
use crate::cli::SnapshotArgs;
use crate::{config, snapshot, ui};

pub fn run(ctx: &Context, args: SnapshotArgs) -> Result<()> {
    let policies = config::load(ctx.config.as_deref())?.compile()?;
    let snapshot = snapshot::load(&args.snapshot)?;

    let doomed = find_doomed(&snapshot, &policies.count);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&doomed)?);
        return Ok(());
    }
    if ctx.quiet {
        for name in &doomed {
            println!("{name}");
        }
        return Ok(());
    }

    ui::header("Item Count");
    ui::kv("Items", &snapshot.items().len().to_string());
    ui::kv(
        "Limits",
        &format!("soft {} / hard {}", policies.count.soft_limit, policies.count.hard_limit),
    );
    println!();

    if doomed.is_empty() {
        ui::success("Item count within limits");
        return Ok(());
    }
    for item in snapshot.items() {
        let delete = doomed.contains(&item.name.as_str());
        ui::item_row(
            delete,
            &[format_size(item.completed), format_speed(item.upload_speed)],
            &item.name,
        );
    }
    println!();
    ui::info(&format!("{} idle items to delete", doomed.len()));

    Ok(())
}

/// Names of the items the count heuristic would delete
pub fn find_doomed<'a>(snapshot: &'a Snapshot, config: &CountConfig) -> Vec<&'a str> {
    snapshot
        .items()
        .iter()
        .filter(|item| count_should_delete(snapshot, item, config))
        .map(|item| item.name.as_str())
        .collect()
}
