use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seedkeep")]
#[command(version)]
#[command(about = "Keep a seeding box under its disk budget without losing the best seeders", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config dir>/config.toml)
    #[arg(short, long, global = true, env = "SEEDKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decide which items to delete for one polling cycle
    Plan(PlanArgs),

    /// Check whether a release would be accepted for download
    Accept(AcceptArgs),

    /// List incomplete items whose free window has expired
    Expire(ExpireArgs),

    /// List items the count-based heuristic would delete
    Count(SnapshotArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Snapshot Commands
// ============================================================================

#[derive(Parser)]
pub struct SnapshotArgs {
    /// Snapshot JSON file from the download manager ("-" for stdin)
    pub snapshot: PathBuf,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Write diagnostic lines for each deletion to stderr
    #[arg(short, long)]
    pub explain: bool,
}

#[derive(Parser)]
pub struct ExpireArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Evaluate at this Unix time instead of now
    #[arg(long)]
    pub now: Option<i64>,
}

#[derive(Parser)]
pub struct AcceptArgs {
    /// Release name as announced by the feed
    #[arg(short, long)]
    pub name: String,

    /// Declared size (e.g. "25GB", "1.5TB", bytes if no suffix)
    #[arg(short, long)]
    pub size: String,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the config file and compile its rule tables
    Validate,
}
