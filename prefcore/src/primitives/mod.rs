/// Logging functionality that can be integrated with foreign language bindings.
pub mod logger;

/// Process-wide pipeline configuration.
pub mod config;
