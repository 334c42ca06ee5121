//! Per-item validation of homogeneous arrays of objects, such as filter rule lists.
//!
//! Two modes. Lenient mode never fails on item problems and reports every violation
//! it finds; this is what production runs. Strict mode fails fast on items that are not
//! objects or that lack declared keys, and is meant for development builds.

use serde::Serialize;
use serde_json::Value;

use crate::validation::Predicate;
use crate::version::json_type_name;

/// Pseudo field name used for violations that concern the item as a whole.
pub const ITEM_FIELD: &str = "$item";

/// Rule name reported when an item is not a plain object.
pub const RULE_PLAIN_OBJECT: &str = "plain_object";

/// Rule name reported when an item lacks a declared key.
pub const RULE_REQUIRED: &str = "required";

/// A named check on one field of every item.
///
/// Several rules may target the same field; each failing one is reported separately.
#[derive(Clone)]
pub struct FieldRule {
    field: String,
    rule: String,
    predicate: Predicate,
}

impl FieldRule {
    /// Creates a rule named `rule` checking `field` with `predicate`.
    pub fn new(field: impl Into<String>, rule: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            predicate,
        }
    }

    /// The field this rule checks.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The name reported in a [`Violation`].
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

/// Knobs for [`ArrayItemValidator::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayValidationOptions {
    /// Result for an empty array.
    pub allow_empty_array: bool,
    /// Report a non-object item as a violation instead of failing.
    pub continue_on_array_type_mismatch: bool,
    /// Report missing declared keys as violations instead of failing.
    pub continue_on_missing_keys: bool,
}

impl ArrayValidationOptions {
    /// Self-reporting mode used in production.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            allow_empty_array: true,
            continue_on_array_type_mismatch: true,
            continue_on_missing_keys: true,
        }
    }

    /// Fail-fast mode for development builds.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            allow_empty_array: true,
            continue_on_array_type_mismatch: false,
            continue_on_missing_keys: false,
        }
    }

    /// Sets [`ArrayValidationOptions::allow_empty_array`].
    #[must_use]
    pub const fn allow_empty_array(mut self, allow: bool) -> Self {
        self.allow_empty_array = allow;
        self
    }
}

impl Default for ArrayValidationOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

/// One failed check on one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Offending field, or [`ITEM_FIELD`].
    pub field: String,
    /// Name of the failed rule.
    pub rule: String,
}

impl Violation {
    fn new(field: &str, rule: &str) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
        }
    }
}

/// An item with at least one violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidItem {
    /// Position in the array.
    pub index: usize,
    /// The item as found.
    pub item: Value,
    /// Every violation found on the item.
    pub violations: Vec<Violation>,
}

/// Aggregate outcome of a lenient validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayValidationResult {
    /// No item had a violation (or the array was empty and that is allowed).
    pub is_all_valid: bool,
    /// Items with violations, in array order.
    pub invalid_items: Vec<InvalidItem>,
}

/// Failures raised instead of being reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayValidationError {
    /// The input is not an array. Raised in every mode.
    #[error("expected an array, found {found}")]
    NotAnArray {
        /// JSON type of the input.
        found: String,
    },
    /// Strict mode: an item is not a plain object.
    #[error("item {index} is not a plain object (found {found})")]
    ItemNotObject {
        /// Position in the array.
        index: usize,
        /// JSON type of the item.
        found: String,
    },
    /// Strict mode: an item lacks declared keys.
    #[error("item {index} is missing keys: {}", keys.join(", "))]
    MissingKeys {
        /// Position in the array.
        index: usize,
        /// The missing keys, in declaration order.
        keys: Vec<String>,
    },
}

/// Validates every element of an array against a set of [`FieldRule`]s.
pub struct ArrayItemValidator;

impl ArrayItemValidator {
    /// Validates `array` item by item.
    ///
    /// For each item: it must be a plain object, it must carry every field named in
    /// `rules`, and every rule whose field is present must pass.
    ///
    /// A missing field is reported once, as `required`. Its predicates are not run
    /// against the absent value.
    ///
    /// # Errors
    /// - [`ArrayValidationError::NotAnArray`] when `array` is not an array
    /// - [`ArrayValidationError::ItemNotObject`] unless `continue_on_array_type_mismatch`
    /// - [`ArrayValidationError::MissingKeys`] unless `continue_on_missing_keys`
    pub fn validate(
        array: &Value,
        rules: &[FieldRule],
        options: ArrayValidationOptions,
    ) -> Result<ArrayValidationResult, ArrayValidationError> {
        let Value::Array(items) = array else {
            return Err(ArrayValidationError::NotAnArray {
                found: json_type_name(array).to_string(),
            });
        };

        if items.is_empty() {
            return Ok(ArrayValidationResult {
                is_all_valid: options.allow_empty_array,
                invalid_items: Vec::new(),
            });
        }

        let mut declared: Vec<&str> = Vec::new();
        for rule in rules {
            if !declared.contains(&rule.field()) {
                declared.push(rule.field());
            }
        }

        let mut invalid_items = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let violations = Self::item_violations(index, item, &declared, rules, options)?;
            if !violations.is_empty() {
                invalid_items.push(InvalidItem {
                    index,
                    item: item.clone(),
                    violations,
                });
            }
        }

        Ok(ArrayValidationResult {
            is_all_valid: invalid_items.is_empty(),
            invalid_items,
        })
    }

    fn item_violations(
        index: usize,
        item: &Value,
        declared: &[&str],
        rules: &[FieldRule],
        options: ArrayValidationOptions,
    ) -> Result<Vec<Violation>, ArrayValidationError> {
        let Value::Object(fields) = item else {
            if !options.continue_on_array_type_mismatch {
                return Err(ArrayValidationError::ItemNotObject {
                    index,
                    found: json_type_name(item).to_string(),
                });
            }
            return Ok(vec![Violation::new(ITEM_FIELD, RULE_PLAIN_OBJECT)]);
        };

        let missing: Vec<&str> = declared
            .iter()
            .copied()
            .filter(|key| !fields.contains_key(*key))
            .collect();
        if !missing.is_empty() && !options.continue_on_missing_keys {
            return Err(ArrayValidationError::MissingKeys {
                index,
                keys: missing.iter().map(ToString::to_string).collect(),
            });
        }

        let mut violations: Vec<Violation> = missing
            .iter()
            .map(|key| Violation::new(key, RULE_REQUIRED))
            .collect();

        // Missing fields already carry `required`
        for rule in rules {
            if let Some(value) = fields.get(rule.field()) {
                if !(rule.predicate)(value) {
                    violations.push(Violation::new(rule.field(), rule.rule()));
                }
            }
        }

        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::predicates::{is_bool, is_non_empty_string, one_of};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn filter_rules() -> Vec<FieldRule> {
        vec![
            FieldRule::new("pattern", "non_empty_string", is_non_empty_string()),
            FieldRule::new("kind", "known_kind", one_of(&["domain", "prefix", "regex"])),
            FieldRule::new("enabled", "boolean", is_bool()),
        ]
    }

    #[test]
    fn test_empty_array_follows_allow_empty() {
        let allowed = ArrayItemValidator::validate(
            &json!([]),
            &filter_rules(),
            ArrayValidationOptions::lenient().allow_empty_array(true),
        )
        .unwrap();
        assert_eq!(
            allowed,
            ArrayValidationResult {
                is_all_valid: true,
                invalid_items: vec![]
            }
        );

        let denied = ArrayItemValidator::validate(
            &json!([]),
            &filter_rules(),
            ArrayValidationOptions::lenient().allow_empty_array(false),
        )
        .unwrap();
        assert!(!denied.is_all_valid);
        assert!(denied.invalid_items.is_empty());
    }

    #[test]
    fn test_rejects_non_array_in_every_mode() {
        for options in [ArrayValidationOptions::lenient(), ArrayValidationOptions::strict()] {
            let err = ArrayItemValidator::validate(&json!({ "0": {} }), &filter_rules(), options)
                .unwrap_err();
            assert_eq!(
                err,
                ArrayValidationError::NotAnArray {
                    found: "object".to_string()
                }
            );
        }
    }

    #[test]
    fn test_valid_items() {
        let result = ArrayItemValidator::validate(
            &json!([
                { "pattern": "example.com", "kind": "domain", "enabled": true },
                { "pattern": "https://intra", "kind": "prefix", "enabled": false, "note": "extra keys are fine" }
            ]),
            &filter_rules(),
            ArrayValidationOptions::default(),
        )
        .unwrap();
        assert!(result.is_all_valid);
        assert!(result.invalid_items.is_empty());
    }

    #[test]
    fn test_lenient_mode_collects_structured_violations() {
        let result = ArrayItemValidator::validate(
            &json!([
                { "pattern": "ok.com", "kind": "domain", "enabled": true },
                "not an object",
                { "pattern": "", "kind": "glob" },
                null
            ]),
            &filter_rules(),
            ArrayValidationOptions::lenient(),
        )
        .unwrap();

        assert!(!result.is_all_valid);
        assert_eq!(
            result.invalid_items,
            vec![
                InvalidItem {
                    index: 1,
                    item: json!("not an object"),
                    violations: vec![Violation::new(ITEM_FIELD, RULE_PLAIN_OBJECT)],
                },
                InvalidItem {
                    index: 2,
                    item: json!({ "pattern": "", "kind": "glob" }),
                    violations: vec![
                        Violation::new("enabled", RULE_REQUIRED),
                        Violation::new("pattern", "non_empty_string"),
                        Violation::new("kind", "known_kind"),
                    ],
                },
                InvalidItem {
                    index: 3,
                    item: Value::Null,
                    violations: vec![Violation::new(ITEM_FIELD, RULE_PLAIN_OBJECT)],
                },
            ]
        );
    }

    #[test]
    fn test_missing_field_skips_its_predicates() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let rules = vec![
            FieldRule::new("pattern", "non_empty_string", is_non_empty_string()),
            FieldRule::new(
                "enabled",
                "boolean",
                Arc::new(move |value: &Value| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    value.is_boolean()
                }),
            ),
        ];

        let result = ArrayItemValidator::validate(
            &json!([{ "pattern": "a.com" }, { "pattern": "b.com", "enabled": "yes" }]),
            &rules,
            ArrayValidationOptions::lenient(),
        )
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            result.invalid_items[0].violations,
            vec![Violation::new("enabled", RULE_REQUIRED)]
        );
        assert_eq!(
            result.invalid_items[1].violations,
            vec![Violation::new("enabled", "boolean")]
        );
    }

    #[test]
    fn test_arrays_are_not_plain_objects() {
        let result = ArrayItemValidator::validate(
            &json!([[1, 2]]),
            &filter_rules(),
            ArrayValidationOptions::lenient(),
        )
        .unwrap();
        assert_eq!(
            result.invalid_items[0].violations,
            vec![Violation::new(ITEM_FIELD, RULE_PLAIN_OBJECT)]
        );
    }

    #[test]
    fn test_strict_mode_throws_on_missing_keys() {
        let options = ArrayValidationOptions {
            continue_on_missing_keys: false,
            ..ArrayValidationOptions::lenient()
        };
        let err = ArrayItemValidator::validate(
            &json!([
                { "pattern": "a.com", "kind": "domain", "enabled": true },
                { "pattern": "b.com" }
            ]),
            &filter_rules(),
            options,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ArrayValidationError::MissingKeys {
                index: 1,
                keys: vec!["kind".to_string(), "enabled".to_string()],
            }
        );
        assert_eq!(err.to_string(), "item 1 is missing keys: kind, enabled");
    }

    #[test]
    fn test_strict_mode_throws_on_type_mismatch() {
        let err = ArrayItemValidator::validate(
            &json!([42]),
            &filter_rules(),
            ArrayValidationOptions::strict(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ArrayValidationError::ItemNotObject {
                index: 0,
                found: "number".to_string()
            }
        );
    }

    #[test]
    fn test_strict_mode_still_reports_predicate_failures() {
        let result = ArrayItemValidator::validate(
            &json!([{ "pattern": "a.com", "kind": "domain", "enabled": "yes" }]),
            &filter_rules(),
            ArrayValidationOptions::strict(),
        )
        .unwrap();
        assert!(!result.is_all_valid);
        assert_eq!(
            result.invalid_items[0].violations,
            vec![Violation::new("enabled", "boolean")]
        );
    }
}
