use anyhow::{Context, Result};
use reclaim::{Config, Policies};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Commented starting config written by `seedkeep config init`
pub const TEMPLATE: &str = r#"# seedkeep configuration

[disk]
# Fastest the download client can fill the disk
max_ingest_rate = "150MB"
# Seconds between state reports from the download client
report_interval_secs = 60
# Extra headroom kept on top of the ingest estimate
reserve = "1GB"
# Accounting unit for sizes in the reclamation solver
weight_unit = "1GB"
# Complete items slower than this are treated as idle
idle_threshold = "1KB"
# Items slower than this are purged when the client fails to report them
emergency_threshold = "2MB"

# Where free space comes from. "capacity" subtracts the reported used space
# from a fixed volume size; "reported" trusts the client's free-space figure,
# which can lag the device by one report interval.
[disk.free_space]
source = "capacity"
total = "140GB"

[accept]
min_size = "1GB"
max_size = "100GB"
official_markers = ["(-|@)CHDWEB", "(-|@)CHDBits", "(-|@)CHD"]

[[accept.rule]]
name = "movies"
pattern = '^\[Movies\]'
official = true
unofficial = true
unofficial_exclude = ["WEB-DL"]

[[accept.rule]]
name = "tv"
pattern = '^\[TV Series\]'
official = true
unofficial = false

[[expiry]]
category = "chdbits"
window_hours = 24

[[expiry.promotions]]
pattern = "(-|@)CHDWEB"
tiers = [
    { max_size = "15GB", window_hours = 12 },
    { max_size = "40GB", window_hours = 24 },
    { max_size = "100GB", window_hours = 36 },
    { window_hours = 48 },
]

[count]
soft_limit = 15
hard_limit = 20
soft_idle_threshold = "1KB"
hard_idle_threshold = "1MB"
"#;

/// A loaded config together with where it came from
pub struct Loaded {
    pub path: PathBuf,
    pub config: Config,
}

impl Loaded {
    /// Validate and compile the rule tables
    pub fn compile(&self) -> Result<Policies> {
        self.config
            .compile()
            .with_context(|| format!("Invalid config {}", self.path.display()))
    }
}

/// Load the config file from an explicit path or the config directory
pub fn load(explicit: Option<&Path>) -> Result<Loaded> {
    let path = paths::config_file(explicit)?;
    let config = load_from(&path)?;
    Ok(Loaded { path, config })
}

/// Parse a config file
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).with_context(|| {
        format!(
            "Could not read {} (run 'seedkeep config init' to create it)",
            path.display()
        )
    })?;
    toml::from_str(&content).with_context(|| format!("Invalid config format in {}", path.display()))
}

/// Write the default template, refusing to clobber unless `force`
pub fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;
    }
    fs::write(path, TEMPLATE).with_context(|| format!("Could not write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim::units::GB;
    use reclaim::{FreeSpaceSource, Item, Listing};
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_and_compiles() {
        let config: Config = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(
            config.disk.free_space,
            FreeSpaceSource::Capacity { total: 140 * GB }
        );
        let policies = config.compile().unwrap();
        assert!(policies.accept.accept(&Listing::new("[Movies] Film-CHD", 10 * GB)));
        assert!(policies
            .expiry
            .window_for(&Item::new("x@CHDWEB", GB).with_category("chdbits"))
            .is_some());
    }

    #[test]
    fn test_write_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        write_template(&path, false).unwrap();
        assert!(write_template(&path, false).is_err());
        write_template(&path, true).unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.path, path);
        assert!(loaded.compile().is_ok());
    }

    #[test]
    fn test_load_missing_file_mentions_init() {
        let temp = TempDir::new().unwrap();
        let err = load_from(&temp.path().join("absent.toml")).err().unwrap();
        assert!(format!("{err:#}").contains("config init"));
    }

    #[test]
    fn test_invalid_pattern_reported_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let content = TEMPLATE.replace(r"'^\[Movies\]'", r"'^[Movies'");
        fs::write(&path, content).unwrap();

        let loaded = load(Some(&path)).unwrap();
        let err = loaded.compile().err().unwrap();
        let message = format!("{err:#}");
        assert!(message.contains("config.toml"));
        assert!(message.contains("accept rule 'movies'"));
    }
}
