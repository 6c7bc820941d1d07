use anyhow::{Context as _, Result};
use colored::Colorize;
use reclaim::predicates::AcceptPolicy;
use reclaim::units::{format_size, parse_size};
use reclaim::{Listing, accept};

use crate::Context;
use crate::cli::AcceptArgs;
use crate::{config, ui};

pub fn run(ctx: &Context, args: AcceptArgs) -> Result<()> {
    let policies = config::load(ctx.config.as_deref())?.compile()?;
    let size = parse_size(&args.size).with_context(|| format!("Invalid --size '{}'", args.size))?;
    let listing = Listing::new(args.name, size);

    let accepted = accept(&listing, &policies.accept);

    if ctx.quiet {
        println!("{}", if accepted { "accept" } else { "reject" });
        return Ok(());
    }

    ui::header("Listing");
    ui::kv("Name", &listing.name);
    ui::kv("Size", &format_size(listing.size));
    ui::kv("Reason", &explain(&listing, &policies.accept));
    println!();
    if accepted {
        println!("  {}", "accept".green().bold());
    } else {
        println!("  {}", "reject".red().bold());
    }

    Ok(())
}

/// Describe which gate decided the listing
fn explain(listing: &Listing, policy: &AcceptPolicy) -> String {
    let (min, max) = policy.size_bounds();
    if listing.size < min || listing.size > max {
        return format!("size outside {} - {}", format_size(min), format_size(max));
    }

    match policy.classify(&listing.name) {
        None => "no rule matches the name".to_string(),
        Some(c) if c.official => format!("official release, rule '{}'", c.rule),
        Some(c) => format!("unofficial release, rule '{}'", c.rule),
    }
}
