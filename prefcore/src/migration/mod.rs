//! Settings migration
//!
//! Upgrades a persisted settings object written by any prior release to the current
//! schema, one atomic rule at a time.
//!
//! # Overview
//!
//! - [`MigrationRule`]: trait implemented by every schema change
//! - [`MigrationManager`]: runs the rules in ascending order with per-rule rollback
//! - [`MigrationReport`]: what was applied, what failed, and the resulting settings
//! - [`rules`]: the rule set shipped with the current release
//!
//! # Guarantees
//!
//! - Rules never run concurrently; each one sees the effects of every earlier rule.
//! - A rule gets its own clone of the settings. A failure in `condition` or `execute`
//!   discards that rule's effect and the run moves on (or stops with
//!   [`MigrateOptions::fail_fast`]).
//! - When any rule failed, the report carries the untouched input. Rules that did succeed
//!   are still listed in [`MigrationReport::applied_rules`] for diagnostics.
//! - With [`MigrationManager::with_version_guard`] no rule may lower the declared version.
//!
//! # Adding a rule
//!
//! 1. Implement [`MigrationRule`] in `rules/`, with an `order` above every existing rule
//!    and below the version stamp.
//! 2. Register it in [`rules::default_rules`].
//! 3. Bump [`CURRENT_SETTINGS_VERSION`](crate::settings::CURRENT_SETTINGS_VERSION) and the
//!    default template if the rule introduces new fields.
//!
//! ```rust,ignore
//! let manager = MigrationManager::new(rules::default_rules("version")).with_version_guard("version");
//! let report = manager.migrate(&stored, &default_settings(), MigrateOptions::default()).await;
//! if report.is_succeeded {
//!     persist(&report.data)?;
//! }
//! ```

mod error;
mod manager;
mod report;
mod rule;

/// Rule set shipped with the current release
pub mod rules;

pub use error::MigrationError;
pub use manager::{MigrateOptions, MigrationManager};
pub use report::{MigrationErrorReport, MigrationReport, RuleStage};
pub use rule::{MigrationArgs, MigrationRule, MigrationRuleMeta, RuleVersionSpan};
