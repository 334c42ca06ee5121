use serde::Serialize;
use serde_json::Value;

use crate::migration::{MigrationError, MigrationRuleMeta};

/// Step of a rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    /// `condition` returned an error
    Condition,
    /// `execute` returned an error
    Execute,
    /// `execute` succeeded but its result lowered, removed or corrupted the declared version
    VersionGuard,
}

impl RuleStage {
    /// Returns the string representation of the stage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Execute => "execute",
            Self::VersionGuard => "version_guard",
        }
    }
}

/// A contained rule failure.
#[derive(Debug)]
pub struct MigrationErrorReport {
    /// Metadata of the failing rule
    pub rule: MigrationRuleMeta,
    /// What went wrong
    pub error: MigrationError,
    /// Working copy as it was right before the rule ran
    pub data: Value,
    /// Which step failed
    pub stage: RuleStage,
}

/// Outcome of [`MigrationManager::migrate`](crate::migration::MigrationManager::migrate).
#[derive(Debug)]
pub struct MigrationReport {
    /// At least one rule was applied and none failed
    pub is_succeeded: bool,
    /// At least one rule was applied
    pub is_executed: bool,
    /// At least one rule failed
    pub has_error: bool,
    /// Metadata of every rule that was applied, in execution order.
    ///
    /// Rules applied before a failure are still listed even though their effect is
    /// discarded from [`MigrationReport::data`].
    pub applied_rules: Vec<MigrationRuleMeta>,
    /// Every contained failure, in execution order
    pub error_reports: Vec<MigrationErrorReport>,
    /// The migrated settings, or the untouched input when any rule failed
    pub data: Value,
}
