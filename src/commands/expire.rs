use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use reclaim::predicates::ExpiryPolicy;
use reclaim::units::format_size;
use reclaim::{Snapshot, force_free};
use serde::Serialize;

use crate::Context;
use crate::cli::ExpireArgs;
use crate::{config, snapshot, ui};

#[derive(Debug, Serialize)]
pub struct Expired {
    pub name: String,
    pub completed: u64,
    pub age_hours: i64,
    pub window_hours: i64,
}

pub fn run(ctx: &Context, args: ExpireArgs) -> Result<()> {
    let policies = config::load(ctx.config.as_deref())?.compile()?;
    let snapshot = snapshot::load(&args.input.snapshot)?;
    let now = match args.now {
        Some(secs) => DateTime::from_timestamp(secs, 0)
            .with_context(|| format!("--now {secs} is out of range"))?,
        None => Utc::now(),
    };

    let expired = find_expired(&snapshot, &policies.expiry, now);

    if args.input.json {
        println!("{}", serde_json::to_string_pretty(&expired)?);
        return Ok(());
    }
    if ctx.quiet {
        for item in &expired {
            println!("{}", item.name);
        }
        return Ok(());
    }

    ui::header("Expired Free Windows");
    ui::kv("Evaluated at", &now.to_rfc3339());
    println!();
    if expired.is_empty() {
        ui::success("No free window has expired");
        return Ok(());
    }
    for item in &expired {
        ui::item_row(
            true,
            &[
                format_size(item.completed),
                format!("{}h/{}h", item.age_hours, item.window_hours),
            ],
            &item.name,
        );
    }
    println!();
    ui::info(&format!("{} incomplete items to remove", expired.len()));

    Ok(())
}

/// Items whose free window has run out at `now`
pub fn find_expired(snapshot: &Snapshot, policy: &ExpiryPolicy, now: DateTime<Utc>) -> Vec<Expired> {
    snapshot
        .items()
        .iter()
        .filter(|item| force_free(item, now, policy))
        .map(|item| Expired {
            name: item.name.clone(),
            completed: item.completed,
            age_hours: item.added_on.map_or(0, |added| (now - added).num_hours()),
            window_hours: policy
                .window_for(item)
                .map_or(0, |window| window.num_hours()),
        })
        .collect()
}
