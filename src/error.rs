/// Errors reported while building or validating [`crate::ConversionOptions`].
///
/// These are always raised before any conversion starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OptionsError {
    #[error("`strip` and `convert` cannot both be set")]
    ConflictingTagFilters,
    #[error("{field} must be {allowed}, got \"{value}\"")]
    InvalidOption {
        field: String,
        allowed: String,
        value: String,
    },
    #[error("unknown option key \"{0}\"")]
    UnknownKey(String),
}

impl OptionsError {
    pub(crate) fn invalid(field: &str, allowed: &str, value: impl ToString) -> Self {
        OptionsError::InvalidOption {
            field: field.to_string(),
            allowed: allowed.to_string(),
            value: value.to_string(),
        }
    }
}

/// Errors that can occur during HTML-to-Markdown conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
    /// A rule (usually a caller-supplied one) failed.
    #[error("rule for <{tag}> failed: {source}")]
    Rule {
        tag: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConvertError {
    /// Wrap an error raised inside the rule for `tag`.
    pub fn rule(
        tag: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ConvertError::Rule {
            tag: tag.into(),
            source: source.into(),
        }
    }
}
