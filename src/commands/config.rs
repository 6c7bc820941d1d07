use anyhow::Result;
use reclaim::FreeSpaceSource;
use reclaim::units::{format_size, format_speed};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::{config, paths, ui};

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => path(ctx),
        ConfigCommand::Init { force } => init(ctx, force),
        ConfigCommand::Validate => validate(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let loaded = config::load(ctx.config.as_deref())?;
    if !ctx.quiet {
        ui::dim(&format!("# {}", loaded.path.display()));
    }
    print!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

fn path(ctx: &Context) -> Result<()> {
    println!("{}", paths::config_file(ctx.config.as_deref())?.display());
    Ok(())
}

fn init(ctx: &Context, force: bool) -> Result<()> {
    let path = paths::config_file(ctx.config.as_deref())?;
    config::write_template(&path, force)?;
    if !ctx.quiet {
        ui::success(&format!("Wrote {}", path.display()));
        ui::dim("Set [disk.free_space] to match your volume before running 'seedkeep plan'");
    }
    Ok(())
}

fn validate(ctx: &Context) -> Result<()> {
    let loaded = config::load(ctx.config.as_deref())?;
    let policies = loaded.compile()?;
    if ctx.quiet {
        return Ok(());
    }

    ui::success(&format!("{} is valid", loaded.path.display()));

    let disk = &policies.disk;
    ui::section("Disk");
    match disk.free_space {
        FreeSpaceSource::Capacity { total } => {
            ui::kv("Free space", &format!("capacity {} minus used", format_size(total)));
        }
        FreeSpaceSource::Reported => ui::kv("Free space", "reported by client"),
    }
    ui::kv("Ingest rate", &format_speed(disk.max_ingest_rate));
    ui::kv("Report interval", &format!("{}s", disk.report_interval_secs));
    ui::kv("Increment", &format_size(reclaim::headroom::increment(disk)));
    ui::kv("Weight unit", &format_size(disk.weight_unit));

    ui::section("Predicates");
    ui::kv("Accept rules", &loaded.config.accept.rules.len().to_string());
    ui::kv("Expiry categories", &loaded.config.expiry.len().to_string());
    ui::kv(
        "Count limits",
        &format!("soft {} / hard {}", policies.count.soft_limit, policies.count.hard_limit),
    );
    Ok(())
}
