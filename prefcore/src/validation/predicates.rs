//! Composable `(value) -> bool` predicates for validation rules.

use std::sync::Arc;

use serde_json::Value;

use crate::validation::array::{
    ArrayItemValidator, ArrayValidationError, ArrayValidationOptions, FieldRule,
};
use crate::validation::Predicate;
use crate::version;

/// `true` or `false`.
#[must_use]
pub fn is_bool() -> Predicate {
    Arc::new(Value::is_boolean)
}

/// Any string, including the empty one.
#[must_use]
pub fn is_string() -> Predicate {
    Arc::new(Value::is_string)
}

/// A string with at least one non-whitespace character.
#[must_use]
pub fn is_non_empty_string() -> Predicate {
    Arc::new(|value: &Value| value.as_str().is_some_and(|s| !s.trim().is_empty()))
}

/// Any JSON number.
#[must_use]
pub fn is_number() -> Predicate {
    Arc::new(Value::is_number)
}

/// A number without a fractional part.
#[must_use]
pub fn is_integer() -> Predicate {
    Arc::new(|value: &Value| value.is_i64() || value.is_u64())
}

/// A number within `min..=max`.
#[must_use]
pub fn in_range(min: f64, max: f64) -> Predicate {
    Arc::new(move |value: &Value| value.as_f64().is_some_and(|n| (min..=max).contains(&n)))
}

/// A plain object: not `null`, not an array.
#[must_use]
pub fn is_object() -> Predicate {
    Arc::new(Value::is_object)
}

/// Any array.
#[must_use]
pub fn is_array() -> Predicate {
    Arc::new(Value::is_array)
}

/// One of the listed strings.
#[must_use]
pub fn one_of(allowed: &[&str]) -> Predicate {
    let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
    Arc::new(move |value: &Value| {
        value
            .as_str()
            .is_some_and(|s| allowed.iter().any(|candidate| candidate == s))
    })
}

/// A string that parses as a semantic version.
#[must_use]
pub fn is_semver() -> Predicate {
    Arc::new(|value: &Value| version::parse_value(value).is_ok())
}

/// An array whose items all pass `rules`, checked by [`ArrayItemValidator`].
///
/// Strict-mode failures are logged and count as invalid; the predicate never panics.
#[must_use]
pub fn array_of(rules: Vec<FieldRule>, options: ArrayValidationOptions) -> Predicate {
    Arc::new(move |value: &Value| match ArrayItemValidator::validate(value, &rules, options) {
        Ok(result) => {
            if !result.is_all_valid {
                crate::debug!(
                    "array_validation.invalid_items count={} items={}",
                    result.invalid_items.len(),
                    serde_json::to_string(&result.invalid_items).unwrap_or_default()
                );
            }
            result.is_all_valid
        }
        Err(ArrayValidationError::NotAnArray { .. }) => false,
        Err(e) => {
            crate::error!("array_validation.strict_failure error={e}");
            false
        }
    })
}

/// Passes when every predicate passes. An empty list passes.
#[must_use]
pub fn all_of(predicates: Vec<Predicate>) -> Predicate {
    Arc::new(move |value: &Value| predicates.iter().all(|p| p(value)))
}

/// Passes when at least one predicate passes. An empty list fails.
#[must_use]
pub fn any_of(predicates: Vec<Predicate>) -> Predicate {
    Arc::new(move |value: &Value| predicates.iter().any(|p| p(value)))
}

/// Negation.
#[must_use]
pub fn not(predicate: Predicate) -> Predicate {
    Arc::new(move |value: &Value| !predicate(value))
}
