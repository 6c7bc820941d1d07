//! Byte-size constants, formatting and parsing.
//!
//! All multiples are binary (1 KB = 1024 B), matching how download managers
//! report sizes and speeds.

use crate::error::{Error, Result};

/// One kibibyte
pub const KB: u64 = 1024;
/// One mebibyte
pub const MB: u64 = KB * 1024;
/// One gibibyte
pub const GB: u64 = MB * 1024;
/// One tebibyte
pub const TB: u64 = GB * 1024;

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a signed byte count, used for free space that may be a deficit
pub fn format_signed_size(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_size(bytes.unsigned_abs()))
    } else {
        format_size(bytes as u64)
    }
}

/// Format a throughput in bytes per second
pub fn format_speed(bytes_per_sec: u64) -> String {
    format!("{}/s", format_size(bytes_per_sec))
}

/// Parse human-readable size string (e.g., "100MB", "1GB", "500")
///
/// Supports suffixes: B, KB, MB, GB, TB (case-insensitive), also accepting
/// the `KiB`/`MiB`/`GiB`/`TiB` spellings.
pub fn parse_size(size_str: &str) -> Result<u64> {
    let normalized = size_str.trim().to_uppercase().replace("IB", "B");

    if normalized.is_empty() {
        return Err(invalid(size_str, "empty size string"));
    }

    let (num_str, multiplier) = if let Some(num) = normalized.strip_suffix("TB") {
        (num, TB)
    } else if let Some(num) = normalized.strip_suffix("GB") {
        (num, GB)
    } else if let Some(num) = normalized.strip_suffix("MB") {
        (num, MB)
    } else if let Some(num) = normalized.strip_suffix("KB") {
        (num, KB)
    } else if let Some(num) = normalized.strip_suffix('B') {
        (num, 1u64)
    } else {
        (normalized.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| invalid(size_str, &format!("invalid number '{}'", num_str.trim())))?;

    if num < 0.0 || !num.is_finite() {
        return Err(invalid(size_str, "size cannot be negative"));
    }

    Ok((num * multiplier as f64) as u64)
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidSize {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Serde adapter for byte quantities written either as integers or as
/// human-readable strings.
pub mod serde_size {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeRepr {
        Bytes(u64),
        Text(String),
    }

    /// Write the byte count as an integer
    pub fn serialize<S: Serializer>(bytes: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*bytes)
    }

    /// Read an integer byte count or a size string
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match SizeRepr::deserialize(deserializer)? {
            SizeRepr::Bytes(bytes) => Ok(bytes),
            SizeRepr::Text(text) => super::parse_size(&text).map_err(de::Error::custom),
        }
    }
}

/// Serde adapter for optional byte quantities
pub mod serde_size_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write the byte count as an integer when present
    pub fn serialize<S: Serializer>(bytes: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(bytes),
            None => serializer.serialize_none(),
        }
    }

    /// Read an optional integer byte count or size string
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::serde_size")] u64);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(bytes)| bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(100 * MB), "100.0 MB");
        assert_eq!(format_size(140 * GB), "140.0 GB");
        assert_eq!(format_size(2 * TB), "2.00 TB");
    }

    #[test]
    fn test_format_signed_size() {
        assert_eq!(format_signed_size(-(GB as i64)), "-1.0 GB");
        assert_eq!(format_signed_size(512), "512 B");
    }

    #[test]
    fn test_parse_size_suffixes() {
        assert_eq!(parse_size("500").unwrap(), 500);
        assert_eq!(parse_size("1KB").unwrap(), KB);
        assert_eq!(parse_size("150MiB").unwrap(), 150 * MB);
        assert_eq!(parse_size(" 140 gb ").unwrap(), 140 * GB);
        assert_eq!(parse_size("1.5MB").unwrap(), (1.5 * MB as f64) as u64);
        assert_eq!(parse_size("1TiB").unwrap(), TB);
    }

    #[test]
    fn test_parse_size_errors() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("GB").is_err());
        assert!(parse_size("-1GB").is_err());
    }

    #[test]
    fn test_serde_size_accepts_both_forms() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(with = "serde_size")]
            a: u64,
            #[serde(with = "serde_size")]
            b: u64,
            #[serde(default, with = "serde_size_opt")]
            c: Option<u64>,
        }

        let probe: Probe = toml::from_str("a = 1024\nb = \"2GB\"\n").unwrap();
        assert_eq!(probe.a, 1024);
        assert_eq!(probe.b, 2 * GB);
        assert_eq!(probe.c, None);

        let probe: Probe = toml::from_str("a = 1\nb = 2\nc = \"15GB\"\n").unwrap();
        assert_eq!(probe.c, Some(15 * GB));
    }
}
