use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::migration::MigrationError;

/// Release window a rule belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleVersionSpan {
    /// First release that ships the rule (e.g. "1.4.0")
    pub introduced: String,
    /// Release from which the rule no longer applies, if any
    pub obsoleted: Option<String>,
}

/// Descriptive metadata of a [`MigrationRule`], reported back as-is in
/// [`MigrationReport`](crate::migration::MigrationReport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRuleMeta {
    /// Who wrote the rule
    pub author: String,
    /// Why the schema changed
    pub reason: String,
    /// Dotted path (or area) of the settings the rule touches
    pub target: String,
    /// Short verb describing the change, e.g. "split", "add", "stamp"
    pub action: String,
    /// When the rule was written
    pub authored: NaiveDate,
    /// Release window of the rule
    pub version: RuleVersionSpan,
}

/// Input handed to [`MigrationRule::condition`] and [`MigrationRule::execute`].
///
/// Both fields are deep clones owned by the rule: nothing a rule does to them leaks
/// into the working copy unless it is part of the returned value.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationArgs {
    /// The settings as left by the previous rules
    pub data: Value,
    /// The default settings template
    pub default_values: Value,
}

/// An atomic, conditionally applied transformation of the settings schema.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use chrono::NaiveDate;
/// use prefcore::migration::{
///     MigrationArgs, MigrationError, MigrationRule, MigrationRuleMeta, RuleVersionSpan,
/// };
/// use serde_json::Value;
///
/// struct DropLegacyBadge {
///     meta: MigrationRuleMeta,
/// }
///
/// #[async_trait]
/// impl MigrationRule for DropLegacyBadge {
///     fn meta(&self) -> &MigrationRuleMeta {
///         &self.meta
///     }
///
///     fn order(&self) -> i32 {
///         30
///     }
///
///     async fn condition(&self, args: &MigrationArgs) -> Result<bool, MigrationError> {
///         Ok(args.data.get("badge").is_some())
///     }
///
///     async fn execute(&self, mut args: MigrationArgs) -> Result<Value, MigrationError> {
///         if let Some(map) = args.data.as_object_mut() {
///             map.remove("badge");
///         }
///         Ok(args.data)
///     }
/// }
/// ```
#[async_trait]
pub trait MigrationRule: Send + Sync {
    /// Metadata reported when the rule is applied or fails.
    fn meta(&self) -> &MigrationRuleMeta;

    /// Position in the rule sequence; lower runs first.
    fn order(&self) -> i32;

    /// Whether the rule applies to `args.data`.
    ///
    /// # Errors
    /// Any error is treated as a rule failure: logged, reported and rolled back.
    async fn condition(&self, args: &MigrationArgs) -> Result<bool, MigrationError>;

    /// Produces the migrated settings. Only called when [`MigrationRule::condition`]
    /// returned `Ok(true)`.
    ///
    /// # Errors
    /// Any error is treated as a rule failure: logged, reported and rolled back.
    async fn execute(&self, args: MigrationArgs) -> Result<Value, MigrationError>;
}
