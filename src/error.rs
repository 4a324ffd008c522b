//! Error types for cartomark.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CartomarkError>;

/// Errors surfaced by the marker engine.
///
/// Invalid entities inside a snapshot are *not* errors: they are skipped and
/// logged so a single bad record cannot abort a whole reconciliation pass.
/// Presenter callback failures, on the other hand, are always propagated to
/// the caller; a stuck attach is a user-visible defect that must not be
/// silently hidden.
#[derive(Error, Debug)]
pub enum CartomarkError {
    /// Input failed validation (non-finite or out-of-range coordinates,
    /// nonsensical configuration values).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A viewport rectangle with inverted or non-finite bounds.
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    /// A presentation-layer callback failed while attaching, detaching or
    /// constructing a marker handle.
    #[error("Presenter {action} failed for '{id}': {message}")]
    Presenter {
        action: &'static str,
        id: String,
        message: String,
    },

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CartomarkError {
    /// Convenience constructor for presentation-layer failures.
    pub fn presenter(
        action: &'static str,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Presenter {
            action,
            id: id.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CartomarkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
