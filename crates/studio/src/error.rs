use serde::Serialize;
use vendora_core::error::CoreError;

/// Studio-level error type.
///
/// Wraps [`CoreError`] for domain and collaborator failures and adds the
/// variants only the stateful layer can produce.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// A domain-level error from `vendora_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transform persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An environment variable held a value that could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type StudioResult<T> = Result<T, StudioError>;

/// Tagged outcome of an operation that crosses the catalog boundary.
///
/// Failures are reported here instead of as `Err` so callers can surface
/// `message` without unwinding their own state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResult<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Failure carrying the error's display text verbatim.
    pub fn from_error(error: &impl std::fmt::Display) -> Self {
        Self::failed(error.to_string())
    }
}
