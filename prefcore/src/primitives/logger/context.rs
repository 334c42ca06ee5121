use std::cell::RefCell;

thread_local! {
    static LOG_CONTEXT: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Scope guard that pushes a `[Module]` segment onto the logging context.
///
/// Nested guards stack: inside a `SettingsBoot` scope a `MigrationManager` scope logs
/// with the prefix `[SettingsBoot][MigrationManager]`. The segment is popped on drop.
///
/// ```rust
/// use prefcore::primitives::logger::{get_context, LogContext};
///
/// {
///     let _boot = LogContext::new("SettingsBoot");
///     let _manager = LogContext::new("MigrationManager");
///     assert_eq!(get_context().as_deref(), Some("[SettingsBoot][MigrationManager]"));
/// }
/// assert_eq!(get_context(), None);
/// ```
pub struct LogContext {
    depth: usize,
}

impl LogContext {
    /// Enters a new logging scope named `module`.
    #[must_use]
    pub fn new(module: &str) -> Self {
        let depth = LOG_CONTEXT.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            let depth = ctx.len();
            ctx.push(format!("[{module}]"));
            depth
        });

        Self { depth }
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        LOG_CONTEXT.with(|ctx| ctx.borrow_mut().truncate(self.depth));
    }
}

/// Gets the current logging context prefix, if any scope is active.
#[must_use]
pub fn get_context() -> Option<String> {
    LOG_CONTEXT.with(|ctx| {
        let ctx = ctx.borrow();
        if ctx.is_empty() {
            None
        } else {
            Some(ctx.concat())
        }
    })
}
