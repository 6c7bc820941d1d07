use thiserror::Error;

/// Errors raised while building or validating engine configuration.
///
/// The decision operations themselves never fail; every path through
/// them resolves to a boolean. Only turning a raw [`Config`](crate::Config)
/// into compiled policies can go wrong.
#[derive(Debug, Error)]
pub enum Error {
    /// A rule-table pattern is not a valid regular expression
    #[error("invalid pattern '{pattern}' in {context}: {source}")]
    InvalidPattern {
        /// Where the pattern was declared (e.g. "accept rule 'movies'")
        context: String,
        /// The offending pattern text
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// A human-readable size string could not be parsed
    #[error("invalid size '{input}': {reason}")]
    InvalidSize {
        /// The text that failed to parse
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A configuration value is out of range or inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true if this error originated from a rule-table pattern
    pub fn is_pattern_error(&self) -> bool {
        matches!(self, Error::InvalidPattern { .. })
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let source = regex::Regex::new("(").unwrap_err();
        let pattern = Error::InvalidPattern {
            context: "accept rule 'movies'".to_string(),
            pattern: "(".to_string(),
            source,
        };
        assert!(pattern.is_pattern_error());
        assert!(pattern.to_string().contains("accept rule 'movies'"));

        let config = Error::InvalidConfig("weight unit must be positive".to_string());
        assert!(!config.is_pattern_error());
    }
}
