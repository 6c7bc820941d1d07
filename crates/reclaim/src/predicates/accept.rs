//! Acceptance predicate: should a newly announced release be downloaded?
//!
//! Classification is table-driven. A listing is first checked against the
//! size bounds, then matched against category rules in order; the first rule
//! whose pattern matches decides. Official releases are recognised by a
//! shared set of group markers.

use crate::error::{Error, Result};
use crate::types::Listing;
use crate::units::{GB, serde_size};
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

/// Raw acceptance settings as stored in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptConfig {
    /// Smallest acceptable release
    #[serde(with = "serde_size", default = "default_min_size")]
    pub min_size: u64,
    /// Largest acceptable release
    #[serde(with = "serde_size", default = "default_max_size")]
    pub max_size: u64,
    /// Patterns identifying an official release group
    #[serde(default = "default_official_markers")]
    pub official_markers: Vec<String>,
    /// Category rules, first match wins
    #[serde(default = "default_rules", rename = "rule")]
    pub rules: Vec<AcceptRule>,
}

/// One category rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptRule {
    /// Rule name for diagnostics
    pub name: String,
    /// Pattern a release name must match for this rule to apply
    pub pattern: String,
    /// Accept official releases
    #[serde(default = "yes")]
    pub official: bool,
    /// Accept unofficial releases
    #[serde(default)]
    pub unofficial: bool,
    /// Patterns that disqualify an otherwise accepted unofficial release
    #[serde(default)]
    pub unofficial_exclude: Vec<String>,
}

fn yes() -> bool {
    true
}

fn default_min_size() -> u64 {
    GB
}

fn default_max_size() -> u64 {
    100 * GB
}

fn default_official_markers() -> Vec<String> {
    ["(-|@)CHDWEB", "(-|@)CHDBits", "(-|@)CHD"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_rules() -> Vec<AcceptRule> {
    vec![
        AcceptRule {
            name: "movies".to_string(),
            pattern: r"^\[Movies\]".to_string(),
            official: true,
            unofficial: true,
            unofficial_exclude: vec!["WEB-DL".to_string()],
        },
        AcceptRule {
            name: "tv".to_string(),
            pattern: r"^\[TV Series\]".to_string(),
            official: true,
            unofficial: false,
            unofficial_exclude: Vec::new(),
        },
    ]
}

impl Default for AcceptConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            official_markers: default_official_markers(),
            rules: default_rules(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    pattern: Regex,
    official: bool,
    unofficial: bool,
    unofficial_exclude: RegexSet,
}

/// How a release name was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Name of the rule that matched
    pub rule: &'a str,
    /// Whether the release carries an official group marker
    pub official: bool,
}

/// Compiled acceptance rules.
#[derive(Debug, Clone)]
pub struct AcceptPolicy {
    min_size: u64,
    max_size: u64,
    official: RegexSet,
    rules: Vec<CompiledRule>,
}

impl AcceptPolicy {
    /// Validate and compile an [`AcceptConfig`]
    pub fn compile(config: &AcceptConfig) -> Result<Self> {
        if config.min_size > config.max_size {
            return Err(Error::InvalidConfig(format!(
                "accept.min_size ({}) exceeds accept.max_size ({})",
                config.min_size, config.max_size
            )));
        }

        let official = compile_set(&config.official_markers, "accept.official_markers")?;
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                let context = format!("accept rule '{}'", rule.name);
                Ok(CompiledRule {
                    name: rule.name.clone(),
                    pattern: compile(&rule.pattern, &context)?,
                    official: rule.official,
                    unofficial: rule.unofficial,
                    unofficial_exclude: compile_set(&rule.unofficial_exclude, &context)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            min_size: config.min_size,
            max_size: config.max_size,
            official,
            rules,
        })
    }

    /// Inclusive size bounds in bytes
    pub fn size_bounds(&self) -> (u64, u64) {
        (self.min_size, self.max_size)
    }

    /// Returns true if the name carries an official group marker
    pub fn is_official(&self, name: &str) -> bool {
        self.official.is_match(name)
    }

    /// Find the rule that applies to a release name
    pub fn classify(&self, name: &str) -> Option<Classification<'_>> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(name))
            .map(|rule| Classification {
                rule: &rule.name,
                official: self.is_official(name),
            })
    }

    /// Should this listing be downloaded?
    pub fn accept(&self, listing: &Listing) -> bool {
        if listing.size < self.min_size || listing.size > self.max_size {
            log::debug!("reject '{}': size {} out of bounds", listing.name, listing.size);
            return false;
        }

        let Some(rule) = self.rules.iter().find(|rule| rule.pattern.is_match(&listing.name)) else {
            log::debug!("reject '{}': no matching rule", listing.name);
            return false;
        };

        let accepted = if self.is_official(&listing.name) {
            rule.official
        } else {
            rule.unofficial && !rule.unofficial_exclude.is_match(&listing.name)
        };
        log::debug!(
            "{} '{}' by rule '{}'",
            if accepted { "accept" } else { "reject" },
            listing.name,
            rule.name
        );
        accepted
    }
}

fn compile(pattern: &str, context: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        context: context.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_set(patterns: &[String], context: &str) -> Result<RegexSet> {
    // Compile individually first so the error names the bad pattern
    for pattern in patterns {
        compile(pattern, context)?;
    }
    RegexSet::new(patterns).map_err(|source| Error::InvalidPattern {
        context: context.to_string(),
        pattern: patterns.join(" | "),
        source,
    })
}
