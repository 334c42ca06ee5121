use thiserror::Error;

/// Errors reported by the host's [`SettingsStore`]
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error, uniffi::Error)]
pub enum StoreError {
    /// Nothing is stored under the key
    #[error("key not found")]
    KeyNotFound,
    /// The stored value could not be read back
    #[error("failed to parse value")]
    ParsingFailure,
    /// The value could not be written
    #[error("failed to update value")]
    UpdateFailure,
    /// An unexpected error occurred in the foreign callback
    #[error("unexpected error in foreign callback: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StoreError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(e.reason)
    }
}

/// Persistent key-value storage for the settings blob, implemented by the host
/// (e.g. on top of the extension's local storage area).
///
/// Values are JSON strings. The store is the only sequencing point between entry
/// surfaces booting at the same time: the last write wins.
///
/// ## Kotlin
///
/// ```kotlin
/// class PrefsSettingsStore(private val prefs: SharedPreferences) : SettingsStore {
///     override fun get(key: String): String =
///         prefs.getString(key, null) ?: throw StoreException.KeyNotFound()
///
///     override fun set(key: String, value: String) {
///         if (!prefs.edit().putString(key, value).commit()) throw StoreException.UpdateFailure()
///     }
/// }
/// ```
#[uniffi::export(with_foreign)]
pub trait SettingsStore: Send + Sync {
    /// Reads the value stored under `key`
    ///
    /// # Errors
    /// - `StoreError::KeyNotFound` if nothing is stored under `key`
    /// - `StoreError::ParsingFailure` if the stored value cannot be read back
    fn get(&self, key: String) -> Result<String, StoreError>;

    /// Writes `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// - `StoreError::UpdateFailure` if something goes wrong while writing
    fn set(&self, key: String, value: String) -> Result<(), StoreError>;
}
