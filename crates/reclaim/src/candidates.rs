//! Candidate builder: items with data on disk become weight/value records.

use crate::types::{Candidate, Item};

/// Build solver candidates from a snapshot's items.
///
/// Items with no completed bytes are skipped. Weight is the completed size
/// rounded half-up to the nearest `weight_unit`; value is the current upload
/// throughput.
pub fn build(items: &[Item], weight_unit: u64) -> Vec<Candidate> {
    items
        .iter()
        .filter(|item| item.has_data())
        .map(|item| Candidate::new(&item.name, to_units(item.completed, weight_unit), item.upload_speed))
        .collect()
}

/// Round a byte count to the nearest whole weight unit
pub fn to_units(bytes: u64, weight_unit: u64) -> u64 {
    let unit = weight_unit.max(1);
    bytes / unit + u64::from(bytes % unit >= unit - unit / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{GB, MB};

    #[test]
    fn test_to_units_rounds_half_up() {
        assert_eq!(to_units(0, GB), 0);
        assert_eq!(to_units(GB / 2 - 1, GB), 0);
        assert_eq!(to_units(GB / 2, GB), 1);
        assert_eq!(to_units(GB + GB / 2, GB), 2);
        assert_eq!(to_units(60 * GB, GB), 60);
        assert_eq!(to_units(7, 1), 7);
    }

    #[test]
    fn test_build_skips_items_without_data() {
        let items = vec![
            Item::new("started", 3 * GB).with_speed(4 * MB),
            Item::new("queued", 0).with_speed(0),
            Item::new("small", 100 * MB).with_speed(1),
        ];

        let candidates = build(&items, GB);

        assert_eq!(
            candidates,
            vec![
                Candidate::new("started", 3, 4 * MB),
                Candidate::new("small", 0, 1),
            ]
        );
    }

    #[test]
    fn test_build_preserves_snapshot_order() {
        let items = vec![Item::new("b", GB), Item::new("a", 2 * GB)];
        let names: Vec<_> = build(&items, GB).into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
