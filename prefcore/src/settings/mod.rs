//! The settings payload of the current release: the default template and the flat
//! validation rule set that guards every leaf of it.
//!
//! The engine in [`crate::migration`] and [`crate::validation`] is payload-agnostic;
//! everything specific to the extension's settings shape lives here and in
//! [`crate::migration::rules`].

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::path;
use crate::primitives::config::current_environment;
use crate::validation::array::{ArrayValidationOptions, FieldRule};
use crate::validation::predicates::{
    all_of, array_of, in_range, is_bool, is_integer, is_non_empty_string, is_object, is_semver,
    is_string, one_of,
};
use crate::validation::ValidationRule;

/// Schema version of [`default_settings`].
pub const CURRENT_SETTINGS_VERSION: &str = "1.4.0";

static DEFAULT_SETTINGS: Lazy<Value> = Lazy::new(|| {
    json!({
        "version": CURRENT_SETTINGS_VERSION,
        "Text": {
            "mode": "title_url",
            "format": "[$title]($url)",
            "trimWhitespace": true
        },
        "Tab": {
            "scope": "current_window",
            "includePinned": true,
            "templateId": "markdown",
            "TaskControl": {
                "enable": false,
                "closeAfterCopy": false,
                "groupByWindow": true
            }
        },
        "Filtering": {
            "Copy": { "enable": false, "rules": [] },
            "Paste": { "enable": false, "rules": [] }
        },
        "Popup": {
            "theme": "system",
            "showNotification": true,
            "width": 360
        },
        "Templates": [
            { "id": "markdown", "name": "Markdown", "format": "[$title]($url)" },
            { "id": "html", "name": "HTML", "format": "<a href=\"$url\">$title</a>" },
            { "id": "plain", "name": "Plain text", "format": "$title $url" }
        ]
    })
});

/// The default settings template. Written as-is on first install.
#[must_use]
pub fn default_settings() -> Value {
    DEFAULT_SETTINGS.clone()
}

/// [`default_settings`] that also declares [`CURRENT_SETTINGS_VERSION`] at `version_path`.
#[must_use]
pub fn default_settings_at(version_path: &str) -> Value {
    let mut defaults = default_settings();
    path::set(&mut defaults, version_path, json!(CURRENT_SETTINGS_VERSION));
    defaults
}

/// Requires a semantic version at `version_path`, falling back to the current one.
#[must_use]
pub fn version_rule(version_path: &str) -> ValidationRule {
    ValidationRule::new(version_path, is_semver(), || json!(CURRENT_SETTINGS_VERSION))
}

/// Lazily reads the default at `property`.
fn default_at(property: &'static str) -> impl Fn() -> Value + Send + Sync + 'static {
    move || path::get(&DEFAULT_SETTINGS, property).cloned().unwrap_or(Value::Null)
}

fn rule(property: &'static str, predicate: crate::validation::Predicate) -> ValidationRule {
    ValidationRule::new(property, predicate, default_at(property))
}

fn filter_rule_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::new("pattern", "non_empty_string", is_non_empty_string()),
        FieldRule::new("kind", "one_of(domain, prefix, regex)", one_of(&["domain", "prefix", "regex"])),
        FieldRule::new("enabled", "bool", is_bool()),
    ]
}

fn template_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::new("id", "non_empty_string", is_non_empty_string()),
        FieldRule::new("name", "non_empty_string", is_non_empty_string()),
        FieldRule::new("format", "non_empty_string", is_non_empty_string()),
    ]
}

/// The flat validation rule set for [`default_settings`].
///
/// Containers are checked before their children. Array leaves are validated item by item
/// in the mode selected by the configured environment.
#[must_use]
pub fn validation_rules() -> Vec<ValidationRule> {
    validation_rules_with(current_environment().array_validation())
}

/// [`validation_rules`] with an explicit array validation mode.
#[must_use]
pub fn validation_rules_with(array_options: ArrayValidationOptions) -> Vec<ValidationRule> {
    vec![
        version_rule("version"),
        rule("Text", is_object()),
        rule("Text.mode", one_of(&["title_url", "url", "title", "custom"])),
        rule("Text.format", is_string()),
        rule("Text.trimWhitespace", is_bool()),
        rule("Tab", is_object()),
        rule("Tab.scope", one_of(&["current_window", "all_windows", "selected"])),
        rule("Tab.includePinned", is_bool()),
        rule("Tab.templateId", is_non_empty_string()),
        rule("Tab.TaskControl", is_object()),
        rule("Tab.TaskControl.enable", is_bool()),
        rule("Tab.TaskControl.closeAfterCopy", is_bool()),
        rule("Tab.TaskControl.groupByWindow", is_bool()),
        rule("Filtering", is_object()),
        rule("Filtering.Copy", is_object()),
        rule("Filtering.Copy.enable", is_bool()),
        rule("Filtering.Copy.rules", array_of(filter_rule_fields(), array_options)),
        rule("Filtering.Paste", is_object()),
        rule("Filtering.Paste.enable", is_bool()),
        rule("Filtering.Paste.rules", array_of(filter_rule_fields(), array_options)),
        rule("Popup", is_object()),
        rule("Popup.theme", one_of(&["system", "light", "dark"])),
        rule("Popup.showNotification", is_bool()),
        rule("Popup.width", all_of(vec![is_integer(), in_range(240.0, 800.0)])),
        rule(
            "Templates",
            array_of(template_fields(), array_options.allow_empty_array(false)),
        ),
    ]
}
