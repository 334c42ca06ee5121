//! Error helpers.
//!
//! Typed `thiserror` enums live next to the module that raises them. Enums that cross
//! the foreign boundary are declared with [`prefcore_error`](crate::prefcore_error), which
//! adds a `Generic { message }` variant fed by `anyhow` errors through [`AnyhowErrorExt`].

/// Renders an `anyhow` error together with its cause chain.
pub trait AnyhowErrorExt {
    /// `outer (caused by: middle -> root)`, or just `outer` when there is no chain.
    fn to_generic_message(&self) -> String;

    /// Same as [`AnyhowErrorExt::to_generic_message`] with `prefix: ` in front.
    fn to_generic_message_with_prefix(&self, prefix: &str) -> String;
}

impl AnyhowErrorExt for anyhow::Error {
    fn to_generic_message(&self) -> String {
        let mut message = self.to_string();

        let chain: Vec<String> = self.chain().skip(1).map(ToString::to_string).collect();
        if !chain.is_empty() {
            message.push_str(" (caused by: ");
            message.push_str(&chain.join(" -> "));
            message.push(')');
        }

        message
    }

    fn to_generic_message_with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}: {}", self.to_generic_message())
    }
}
