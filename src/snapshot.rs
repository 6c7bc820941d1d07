//! Reading snapshots exported by the download manager

use anyhow::{Context, Result};
use reclaim::Snapshot;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Load a snapshot from a JSON file, or from stdin when `path` is "-"
pub fn load(path: &Path) -> Result<Snapshot> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read snapshot from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Could not read snapshot {}", path.display()))?
    };

    let snapshot = parse(&content)
        .with_context(|| format!("Invalid snapshot in {}", path.display()))?;
    log::debug!(
        "Loaded snapshot with {} items, {} bytes used",
        snapshot.items().len(),
        snapshot.used_space
    );
    Ok(snapshot)
}

/// Parse snapshot JSON
pub fn parse(content: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_client_field_names() {
        let snapshot = parse(
            r#"{
                "torrents": [
                    {"name": "a", "completed": 1024, "uploadSpeed": 10, "progress": 1.0}
                ],
                "usedSpace": 2048,
                "freeSpaceOnDisk": 4096
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.items().len(), 1);
        assert_eq!(snapshot.items()[0].upload_speed, 10);
        assert_eq!(snapshot.used_space, 2048);
        assert_eq!(snapshot.free_space, Some(4096));
    }

    #[test]
    fn test_parse_missing_items() {
        let snapshot = parse(r#"{"used_space": 100}"#).unwrap();
        assert!(snapshot.items.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"items": [], "used_space": 0}}"#).unwrap();
        let snapshot = load(file.path()).unwrap();
        assert!(snapshot.items().is_empty());
    }

    #[test]
    fn test_load_invalid_mentions_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load(file.path()).err().unwrap();
        assert!(format!("{err:#}").contains("Invalid snapshot"));
    }
}
