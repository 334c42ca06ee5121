use crate::version::InvalidVersionError;

/// Failure of a single migration rule.
///
/// A rule returning one of these is rolled back; the manager never propagates it.
#[crate::prefcore_error]
pub enum MigrationError {
    /// A version string read by the rule did not parse
    #[error(transparent)]
    InvalidVersion(#[from] InvalidVersionError),

    /// A field the rule depends on is absent
    #[error("missing field: {path}")]
    MissingField {
        /// Dotted path of the absent field
        path: String,
    },

    /// A field the rule depends on has an unusable value
    #[error("invalid data at {path}: {message}")]
    InvalidData {
        /// Dotted path of the offending field
        path: String,
        /// What was wrong with it
        message: String,
    },

    /// The rule lowered the declared settings version
    #[error("version regression: {from} -> {to}")]
    VersionRegression {
        /// Version declared before the rule ran
        from: String,
        /// Version declared after the rule ran
        to: String,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {message}")]
    Json {
        /// The error message from `serde_json`
        message: String,
    },
}

impl From<serde_json::Error> for MigrationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}
