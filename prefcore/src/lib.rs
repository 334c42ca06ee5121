#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

//! `prefcore` is the settings core shared by every entry surface of the extension
//! (background worker, popup, options page).
//!
//! On every boot a persisted settings blob is upgraded through an ordered list of
//! versioned migration rules and then repaired leaf by leaf against a declarative
//! validation rule set, so the rest of the application only ever sees well-typed settings.

/// Low level primitives: logging and pipeline configuration.
pub mod primitives;

/// Error helpers shared by the modules of this crate.
pub mod error;

/// Semantic version parsing and precedence comparison.
pub mod version;

/// Dotted-path access into nested JSON values.
pub mod path;

/// Declarative validation and repair of settings leaves.
pub mod validation;

/// Ordered, all-or-nothing migration of persisted settings.
pub mod migration;

/// The bundled settings payload: default template and validation rule set.
pub mod settings;

/// Boot sequence tying storage, migration and validation together.
pub mod boot;

#[cfg(test)]
mod test_utils;

pub use prefcore_macros::{prefcore_error, prefcore_export};

uniffi::setup_scaffolding!("prefcore");
