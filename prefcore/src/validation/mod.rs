//! Leaf-by-leaf validation and repair of a settings object.
//!
//! A rule set is a flat list of [`ValidationRule`]s, one per leaf path, with extra
//! "is this an object" rules for containers. Container and child rules overlap on
//! purpose: a container that is replaced by its fallback and a child that is repaired
//! individually are two independent guarantees.
//!
//! Nothing here fails. A leaf that is absent or fails its predicate is logged at warn
//! level and overwritten with the rule's fallback; a settings object that is absent or
//! empty is replaced by the defaults wholesale.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::path;
use crate::primitives::logger::{default_logger, LogContext, LogLevel, Logger};
use crate::version::json_type_name;

/// Array-of-objects validation.
pub mod array;

/// Predicate constructors and combinators.
pub mod predicates;

/// Validity check for one leaf.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Lazily computed replacement for an invalid leaf.
pub type Fallback = Arc<dyn Fn() -> Value + Send + Sync>;

/// `(property, rule, fail)`: the leaf at `property` must satisfy `rule`, otherwise it
/// is replaced by `fail()`.
#[derive(Clone)]
pub struct ValidationRule {
    property: String,
    rule: Predicate,
    fail: Fallback,
}

impl ValidationRule {
    /// Creates a rule for the dotted `property` path.
    ///
    /// `fail` is evaluated only when the leaf needs repair, so it may read live state.
    pub fn new(
        property: impl Into<String>,
        rule: Predicate,
        fail: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            property: property.into(),
            rule,
            fail: Arc::new(fail),
        }
    }

    /// The dotted path this rule guards.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Runs the predicate against `value`.
    #[must_use]
    pub fn check(&self, value: &Value) -> bool {
        (self.rule)(value)
    }

    /// Computes the replacement value.
    #[must_use]
    pub fn fallback(&self) -> Value {
        (self.fail)()
    }
}

impl std::fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

/// What [`SchemaValidator::verify`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    /// The repaired settings.
    pub data: Value,
    /// Paths that were replaced by their fallback, in rule order.
    pub repaired: Vec<String>,
    /// The input was absent or empty and `data` is the full default template.
    pub reset_to_defaults: bool,
}

impl VerifyReport {
    /// Whether `data` differs from what was passed in.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.reset_to_defaults || !self.repaired.is_empty()
    }
}

/// Applies a [`ValidationRule`] list to settings objects.
pub struct SchemaValidator {
    defaults: Value,
    logger: Arc<dyn Logger>,
}

impl SchemaValidator {
    /// Creates a validator that resets to `defaults` when the input is unusable.
    #[must_use]
    pub fn new(defaults: Value) -> Self {
        Self {
            defaults,
            logger: default_logger(),
        }
    }

    /// Routes repair diagnostics to `logger` instead of the log facade.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Validates and repairs `config` against `rules`.
    ///
    /// An absent config, a non-object or an empty object is not repaired field by field:
    /// the default template is returned as is.
    #[must_use]
    pub fn verify(&self, config: Option<&Value>, rules: &[ValidationRule]) -> VerifyReport {
        let _ctx = LogContext::new("SchemaValidator");

        let mut data = match config {
            Some(Value::Object(map)) if !map.is_empty() => Value::Object(map.clone()),
            other => {
                self.logger.log(
                    LogLevel::Warn,
                    format!(
                        "settings.reset_to_defaults found={} timestamp={}",
                        other.map_or("missing", json_type_name),
                        Utc::now().to_rfc3339()
                    ),
                );
                return VerifyReport {
                    data: self.defaults.clone(),
                    repaired: Vec::new(),
                    reset_to_defaults: true,
                };
            }
        };

        let mut repaired = Vec::new();
        for rule in rules {
            let current = path::get(&data, rule.property());
            if current.is_some_and(|value| rule.check(value)) {
                continue;
            }

            self.logger.log(
                LogLevel::Warn,
                format!(
                    "settings.repaired path={} found={} timestamp={}",
                    rule.property(),
                    current.map_or("missing", json_type_name),
                    Utc::now().to_rfc3339()
                ),
            );
            path::set(&mut data, rule.property(), rule.fallback());
            repaired.push(rule.property().to_string());
        }

        VerifyReport {
            data,
            repaired,
            reset_to_defaults: false,
        }
    }
}
