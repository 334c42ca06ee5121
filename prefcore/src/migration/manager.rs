use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::migration::report::{MigrationErrorReport, MigrationReport, RuleStage};
use crate::migration::rule::{MigrationArgs, MigrationRule, MigrationRuleMeta};
use crate::migration::MigrationError;
use crate::path;
use crate::primitives::logger::{default_logger, LogLevel, Logger};
use crate::version;

/// Per-call knobs of [`MigrationManager::migrate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrateOptions {
    /// Stop at the first failing rule instead of moving on to the next one
    pub fail_fast: bool,
}

/// Applies an ordered list of [`MigrationRule`]s to a settings object.
///
/// Rules run one at a time in ascending [`MigrationRule::order`]; rules sharing an order
/// keep their registration order. The caller's value is never touched: the manager works
/// on its own clone, takes a snapshot before every rule and rolls the working copy back
/// when a rule fails. If any rule failed, [`MigrationReport::data`] is the untouched
/// input, never a partially migrated hybrid.
pub struct MigrationManager {
    rules: Vec<Arc<dyn MigrationRule>>,
    logger: Arc<dyn Logger>,
    version_path: Option<String>,
}

impl MigrationManager {
    /// Creates a manager for `rules`, sorted by order.
    #[must_use]
    pub fn new(mut rules: Vec<Arc<dyn MigrationRule>>) -> Self {
        rules.sort_by_key(|rule| rule.order());
        Self {
            rules,
            logger: default_logger(),
            version_path: None,
        }
    }

    /// Routes run diagnostics to `logger` instead of the log facade.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Rejects any rule result that lowers, removes or corrupts the semantic version
    /// stored at `version_path`, when the pre-rule value was a valid version.
    #[must_use]
    pub fn with_version_guard(mut self, version_path: impl Into<String>) -> Self {
        self.version_path = Some(version_path.into());
        self
    }

    /// The registered rules in execution order.
    #[must_use]
    pub fn rules(&self) -> &[Arc<dyn MigrationRule>] {
        &self.rules
    }

    /// Checks the rule set for authoring mistakes.
    ///
    /// Reports duplicate orders, version spans that do not parse and spans whose
    /// `obsoleted` release is not above `introduced`. An empty list means the set is sound.
    #[must_use]
    pub fn audit_rules(&self) -> Vec<String> {
        let mut findings = Vec::new();
        let mut seen: HashMap<i32, &str> = HashMap::new();

        for rule in &self.rules {
            let meta = rule.meta();

            if let Some(previous) = seen.insert(rule.order(), &meta.target) {
                findings.push(format!(
                    "duplicate order {}: {} and {}",
                    rule.order(),
                    previous,
                    meta.target
                ));
            }

            let introduced = match version::parse(&meta.version.introduced) {
                Ok(v) => Some(v),
                Err(e) => {
                    findings.push(format!("{}: introduced version: {e}", meta.target));
                    None
                }
            };

            if let Some(obsoleted) = &meta.version.obsoleted {
                match version::parse(obsoleted) {
                    Ok(obsoleted) => {
                        if introduced.is_some_and(|introduced| obsoleted <= introduced) {
                            findings.push(format!(
                                "{}: obsoleted {} is not above introduced {}",
                                meta.target, obsoleted, meta.version.introduced
                            ));
                        }
                    }
                    Err(e) => findings.push(format!("{}: obsoleted version: {e}", meta.target)),
                }
            }
        }

        findings
    }

    /// Runs every rule against a clone of `data`.
    ///
    /// Never fails and never mutates `data` or `default_values`; failures are contained
    /// in [`MigrationReport::error_reports`].
    pub async fn migrate(
        &self,
        data: &Value,
        default_values: &Value,
        options: MigrateOptions,
    ) -> MigrationReport {
        let run_start_time = Utc::now();
        self.logger.log(
            LogLevel::Info,
            format!(
                "migration_run.started total_rules={} fail_fast={} timestamp={}",
                self.rules.len(),
                options.fail_fast,
                run_start_time.to_rfc3339()
            ),
        );

        let mut working = data.clone();
        let mut applied_rules = Vec::new();
        let mut error_reports = Vec::new();

        for rule in &self.rules {
            let snapshot = working.clone();
            let rule_start_time = Utc::now();

            match self.run_rule(rule.as_ref(), &snapshot, default_values).await {
                Ok(None) => {
                    self.logger.log(
                        LogLevel::Debug,
                        format!(
                            "migration_rule.skipped target={} order={}",
                            rule.meta().target,
                            rule.order()
                        ),
                    );
                }
                Ok(Some(migrated)) => {
                    working = migrated;
                    applied_rules.push(rule.meta().clone());
                    self.logger.log(
                        LogLevel::Info,
                        format!(
                            "migration_rule.applied target={} action={} order={} duration_ms={} timestamp={}",
                            rule.meta().target,
                            rule.meta().action,
                            rule.order(),
                            (Utc::now() - rule_start_time).num_milliseconds(),
                            Utc::now().to_rfc3339()
                        ),
                    );
                }
                Err((stage, error)) => {
                    self.logger.log(
                        LogLevel::Error,
                        format!(
                            "migration_rule.failed target={} order={} stage={} error={} rule={} duration_ms={} timestamp={}",
                            rule.meta().target,
                            rule.order(),
                            stage.as_str(),
                            error,
                            serde_json::to_string(rule.meta()).unwrap_or_default(),
                            (Utc::now() - rule_start_time).num_milliseconds(),
                            Utc::now().to_rfc3339()
                        ),
                    );
                    error_reports.push(MigrationErrorReport {
                        rule: rule.meta().clone(),
                        error,
                        data: snapshot.clone(),
                        stage,
                    });
                    working = snapshot;

                    if options.fail_fast {
                        break;
                    }
                }
            }
        }

        let is_executed = !applied_rules.is_empty();
        let has_error = !error_reports.is_empty();
        let data = if has_error { data.clone() } else { working };

        self.logger.log(
            if has_error { LogLevel::Warn } else { LogLevel::Info },
            format!(
                "migration_run.completed applied={} failed={} rolled_back={} duration_ms={} timestamp={}",
                applied_rules.len(),
                error_reports.len(),
                has_error,
                (Utc::now() - run_start_time).num_milliseconds(),
                Utc::now().to_rfc3339()
            ),
        );

        MigrationReport {
            is_succeeded: is_executed && !has_error,
            is_executed,
            has_error,
            applied_rules,
            error_reports,
            data,
        }
    }

    /// `Ok(None)` when the rule does not apply, `Ok(Some(result))` when it ran.
    async fn run_rule(
        &self,
        rule: &dyn MigrationRule,
        snapshot: &Value,
        default_values: &Value,
    ) -> Result<Option<Value>, (RuleStage, MigrationError)> {
        let args = MigrationArgs {
            data: snapshot.clone(),
            default_values: default_values.clone(),
        };

        let applies = rule
            .condition(&args)
            .await
            .map_err(|e| (RuleStage::Condition, e))?;
        if !applies {
            return Ok(None);
        }

        let migrated = rule
            .execute(args)
            .await
            .map_err(|e| (RuleStage::Execute, e))?;

        self.check_version_guard(rule.meta(), snapshot, &migrated)
            .map_err(|e| (RuleStage::VersionGuard, e))?;

        Ok(Some(migrated))
    }

    fn check_version_guard(
        &self,
        meta: &MigrationRuleMeta,
        before: &Value,
        after: &Value,
    ) -> Result<(), MigrationError> {
        let Some(version_path) = &self.version_path else {
            return Ok(());
        };

        // Nothing to protect when the stored version was already unreadable
        let Some(from) = path::get(before, version_path).and_then(|v| version::parse_value(v).ok())
        else {
            return Ok(());
        };

        let Some(raw) = path::get(after, version_path) else {
            return Err(MigrationError::VersionRegression {
                from: from.to_string(),
                to: "missing".to_string(),
            });
        };

        let to = version::parse_value(raw)?;
        if to < from {
            return Err(MigrationError::VersionRegression {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        if to > from {
            self.logger.log(
                LogLevel::Debug,
                format!("migration_rule.version_raised target={} from={from} to={to}", meta.target),
            );
        }

        Ok(())
    }
}
