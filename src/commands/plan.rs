use anyhow::Result;
use reclaim::units::{format_signed_size, format_size, format_speed};
use reclaim::{CyclePlan, DiagnosticSink, LogSink, Snapshot, WriterSink, plan_cycle};
use serde::Serialize;
use std::io;

use crate::Context;
use crate::cli::PlanArgs;
use crate::{config, snapshot, ui};

/// Machine-readable plan, printed with `--json`
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub free_space: Option<i64>,
    pub increment: Option<u64>,
    pub tier: Option<&'static str>,
    pub target_units: u64,
    pub verdict: &'static str,
    pub candidates: usize,
    pub feasible: bool,
    pub items: Vec<ItemDecision>,
}

#[derive(Debug, Serialize)]
pub struct ItemDecision {
    pub name: String,
    pub size: u64,
    pub completed: u64,
    pub upload_speed: u64,
    pub delete: bool,
    pub rule: Option<&'static str>,
}

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let policies = config::load(ctx.config.as_deref())?.compile()?;
    let snapshot = snapshot::load(&args.input.snapshot)?;

    let sink: Box<dyn DiagnosticSink> = if args.explain {
        Box::new(WriterSink::new(io::stderr()))
    } else {
        Box::new(LogSink)
    };

    let plan = plan_cycle(&snapshot, &policies.disk, sink.as_ref());
    let report = build_report(&snapshot, &plan, sink.as_ref());

    if args.input.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if ctx.quiet {
        for item in report.items.iter().filter(|i| i.delete) {
            println!("{}", item.name);
        }
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Evaluate every item against one plan, reporting deletions to `sink`
pub fn build_report(snapshot: &Snapshot, plan: &CyclePlan, sink: &dyn DiagnosticSink) -> PlanReport {
    let items = snapshot
        .items()
        .iter()
        .map(|item| ItemDecision {
            name: item.name.clone(),
            size: item.size,
            completed: item.completed,
            upload_speed: item.upload_speed,
            delete: plan.should_delete(item, sink),
            rule: plan.decide(item).map(|rule| rule.label()),
        })
        .collect();

    PlanReport {
        free_space: plan.headroom().map(|h| h.free_space),
        increment: plan.headroom().map(|h| h.increment),
        tier: plan.tier().map(|t| t.label()),
        target_units: plan.tier().map(|t| t.target()).unwrap_or(0),
        verdict: plan.verdict().label(),
        candidates: plan.candidate_count(),
        feasible: plan.selection().is_none_or(|s| s.feasible),
        items,
    }
}

fn print_report(report: &PlanReport) {
    ui::header("Cycle Plan");

    match report.free_space {
        Some(free) => ui::kv("Free space", &format_signed_size(free)),
        None => ui::kv("Free space", "unknown"),
    }
    if let Some(increment) = report.increment {
        ui::kv("Increment", &format_size(increment));
    }
    ui::kv("Tier", report.tier.unwrap_or("unknown"));
    if report.tier == Some("urgent") {
        ui::kv("Target", &format!("{} units", report.target_units));
        ui::kv("Candidates", &report.candidates.to_string());
    }
    ui::kv("Verdict", report.verdict);

    if report.items.is_empty() {
        println!();
        ui::dim("No items in snapshot");
        return;
    }

    ui::section("Items");
    for item in &report.items {
        ui::item_row(
            item.delete,
            &[format_size(item.completed), format_speed(item.upload_speed)],
            &item.name,
        );
    }

    let doomed: Vec<&ItemDecision> = report.items.iter().filter(|i| i.delete).collect();
    let freed: u64 = doomed.iter().map(|i| i.completed).sum();
    println!();
    if doomed.is_empty() {
        ui::success("Nothing to delete");
    } else {
        ui::info(&format!(
            "{} of {} items to delete, freeing {}",
            doomed.len(),
            report.items.len(),
            format_size(freed)
        ));
    }
    if !report.feasible {
        ui::warn("Target cannot be met even by deleting every candidate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim::units::{GB, MB};
    use reclaim::{Item, NoopSink, ReclaimConfig};

    #[test]
    fn test_report_for_urgent_cycle() {
        let snapshot = Snapshot::from_items(vec![
            Item::new("busy", 60 * GB).with_speed(38 * MB).complete(),
            Item::new("quiet", 35 * GB).with_speed(MB).complete(),
            Item::new("dead", 40 * GB).complete(),
            Item::new("queued", 0),
        ]);
        let config = ReclaimConfig::with_capacity(140 * GB);
        let plan = plan_cycle(&snapshot, &config, &NoopSink);

        let report = build_report(&snapshot, &plan, &NoopSink);
        assert_eq!(report.tier, Some("urgent"));
        assert_eq!(report.verdict, "reclaim");
        assert_eq!(report.candidates, 3);
        assert!(report.feasible);

        let deleted: Vec<&str> = report
            .items
            .iter()
            .filter(|i| i.delete)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(deleted, vec!["dead"]);
        assert_eq!(report.items[2].rule, Some("reclaim"));
        assert_eq!(report.items[3].rule, None);
    }

    #[test]
    fn test_report_serializes() {
        let snapshot = Snapshot::from_items(vec![Item::new("a", GB)]);
        let config = ReclaimConfig::with_capacity(140 * GB);
        let plan = plan_cycle(&snapshot, &config, &NoopSink);
        let report = build_report(&snapshot, &plan, &NoopSink);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verdict"], "hold");
        assert_eq!(json["items"][0]["delete"], false);
    }
}
