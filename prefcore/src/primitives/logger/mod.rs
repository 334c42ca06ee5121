use std::{sync::Arc, sync::OnceLock};

/// Sink for every diagnostic emitted by the settings pipeline.
///
/// The host installs one process-wide through [`set_logger`]. Pipeline components
/// (the migration manager, the schema validator) also hold an `Arc<dyn Logger>` of
/// their own so a caller can observe exactly what a single run reported.
///
/// # Examples
///
/// ```rust
/// use prefcore::primitives::logger::{LogLevel, Logger};
///
/// struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Kotlin
///
/// ```kotlin
/// class ExtensionLogger : Logger {
///     override fun log(level: LogLevel, message: String) {
///         Log.println(level.toPriority(), "prefcore", message)
///     }
/// }
///
/// setLogger(ExtensionLogger()) // once, at startup
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very low priority, often extremely detailed messages.
    Trace,
    /// Lower priority debugging information.
    Debug,
    /// Progress of the pipeline (rules applied, runs finished).
    Info,
    /// Self-healed problems (a leaf replaced by its fallback).
    Warn,
    /// Failures that were contained (a rule rolled back).
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

/// Default [`Logger`] for pipeline components.
///
/// Forwards to the `log` facade through the context-aware macros, so messages end up
/// in whatever logger the host installed with [`set_logger`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Trace => crate::trace!("{message}"),
            LogLevel::Debug => crate::debug!("{message}"),
            LogLevel::Info => crate::info!("{message}"),
            LogLevel::Warn => crate::warn!("{message}"),
            LogLevel::Error => crate::error!("{message}"),
        }
    }
}

/// Returns the logger pipeline components use when none is injected.
#[must_use]
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(LogFacade)
}

/// Bridges the `log` facade to the foreign [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let is_record_from_prefcore = record
            .module_path()
            .is_some_and(|module_path| module_path.starts_with("prefcore"));

        let is_debug_or_trace_level =
            record.level() == log::Level::Debug || record.level() == log::Level::Trace;

        // Verbose output from dependencies is noise for the host
        if is_debug_or_trace_level && !is_record_from_prefcore {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs the process-wide logger.
///
/// Only the first call has an effect; later calls are reported on stderr and ignored.
#[allow(clippy::module_name_repetitions)]
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to install the log facade: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Logs a trace-level message prefixed with the active [`LogContext`].
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        if let Some(ctx) = $crate::primitives::logger::get_context() {
            log::trace!("{} {}", ctx, format_args!($($arg)*))
        } else {
            log::trace!($($arg)*)
        }
    };
}

/// Logs a debug-level message prefixed with the active [`LogContext`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if let Some(ctx) = $crate::primitives::logger::get_context() {
            log::debug!("{} {}", ctx, format_args!($($arg)*))
        } else {
            log::debug!($($arg)*)
        }
    };
}

/// Logs an info-level message prefixed with the active [`LogContext`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if let Some(ctx) = $crate::primitives::logger::get_context() {
            log::info!("{} {}", ctx, format_args!($($arg)*))
        } else {
            log::info!($($arg)*)
        }
    };
}

/// Logs a warning-level message prefixed with the active [`LogContext`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        if let Some(ctx) = $crate::primitives::logger::get_context() {
            log::warn!("{} {}", ctx, format_args!($($arg)*))
        } else {
            log::warn!($($arg)*)
        }
    };
}

/// Logs an error-level message prefixed with the active [`LogContext`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        if let Some(ctx) = $crate::primitives::logger::get_context() {
            log::error!("{} {}", ctx, format_args!($($arg)*))
        } else {
            log::error!($($arg)*)
        }
    };
}

/// Scoped, nestable logging context.
pub mod context;
pub use context::{get_context, LogContext};
