use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed download as reported by the download manager.
///
/// Field names follow snake_case; the camelCase names used by the download
/// manager's API are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity of the item (unique within a snapshot)
    pub name: String,
    /// Total size in bytes
    #[serde(default)]
    pub size: u64,
    /// Bytes already on disk
    #[serde(default)]
    pub completed: u64,
    /// Current upload throughput in bytes per second
    #[serde(default, alias = "uploadSpeed")]
    pub upload_speed: u64,
    /// Lifetime uploaded bytes
    #[serde(default)]
    pub uploaded: u64,
    /// Download progress in [0, 1]
    #[serde(default)]
    pub progress: f64,
    /// When the item was added to the download manager, if reported
    #[serde(
        default,
        alias = "addedTime",
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub added_on: Option<DateTime<Utc>>,
    /// Category tag assigned by the download manager
    #[serde(default)]
    pub category: String,
}

impl Item {
    /// Create an item with the given name and bytes on disk.
    ///
    /// Size defaults to the completed bytes; the item is idle and has no
    /// added time until the builder methods say otherwise.
    pub fn new(name: impl Into<String>, completed: u64) -> Self {
        Self {
            name: name.into(),
            size: completed,
            completed,
            upload_speed: 0,
            uploaded: 0,
            progress: 0.0,
            added_on: None,
            category: String::new(),
        }
    }

    /// Set the total size
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the current upload throughput
    pub fn with_speed(mut self, upload_speed: u64) -> Self {
        self.upload_speed = upload_speed;
        self
    }

    /// Set lifetime uploaded bytes
    pub fn with_uploaded(mut self, uploaded: u64) -> Self {
        self.uploaded = uploaded;
        self
    }

    /// Set download progress
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    /// Mark as fully downloaded
    pub fn complete(self) -> Self {
        self.with_progress(1.0)
    }

    /// Set the time the item was added
    pub fn with_added_on(mut self, added_on: DateTime<Utc>) -> Self {
        self.added_on = Some(added_on);
        self
    }

    /// Set the category tag
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Returns true if the item has any bytes on disk
    pub fn has_data(&self) -> bool {
        self.completed > 0
    }

    /// Returns true if the download has finished
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// The download manager's view of all items and disk usage for one cycle.
///
/// `items` is `None` when the manager failed to report its item list; the
/// decision function treats that as an upstream collection failure rather
/// than as an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Managed items, absent when collection failed
    #[serde(default, alias = "torrents")]
    pub items: Option<Vec<Item>>,
    /// Aggregate bytes used by all items
    #[serde(default, alias = "usedSpace")]
    pub used_space: u64,
    /// Free space reported by the download manager, may lag the device
    #[serde(default, alias = "freeSpaceOnDisk")]
    pub free_space: Option<u64>,
}

impl Snapshot {
    /// Build a snapshot from items, deriving used space from their completed bytes
    pub fn from_items(items: Vec<Item>) -> Self {
        let used_space = items.iter().fold(0u64, |acc, i| acc.saturating_add(i.completed));
        Self {
            items: Some(items),
            used_space,
            free_space: None,
        }
    }

    /// A snapshot whose item list could not be collected
    pub fn missing_items(used_space: u64) -> Self {
        Self {
            items: None,
            used_space,
            free_space: None,
        }
    }

    /// Set the reported free space
    pub fn with_free_space(mut self, free_space: u64) -> Self {
        self.free_space = Some(free_space);
        self
    }

    /// Set the aggregate used space
    pub fn with_used_space(mut self, used_space: u64) -> Self {
        self.used_space = used_space;
        self
    }

    /// Items in the snapshot, empty when collection failed
    pub fn items(&self) -> &[Item] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Number of items with data on disk
    pub fn eligible_count(&self) -> usize {
        self.items().iter().filter(|i| i.has_data()).count()
    }
}

/// A weighted, valued record the reclamation solver chooses among.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    /// Name of the item this candidate stands for
    pub name: String,
    /// Size on disk in weight units
    pub weight: u64,
    /// Current upload throughput, the benefit lost by deleting
    pub value: u64,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(name: impl Into<String>, weight: u64, value: u64) -> Self {
        Self {
            name: name.into(),
            weight,
            value,
        }
    }
}

/// What an indexer feed announces about a release before it is downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Release name including any category prefix and group marker
    pub name: String,
    /// Declared size in bytes
    pub size: u64,
}

impl Listing {
    /// Create a new listing
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}
