use serde::Serialize;
use thiserror::Error;

/// Errors raised by the generator, the stores and the repositories.
///
/// Nothing below the use-case layer catches these; the use cases turn every
/// one of them into a [`Failure`].
#[derive(Debug, Error)]
pub enum LottoError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("generation error: {0}")]
    Generation(String),

    #[error("sqlite: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, LottoError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NotFound,
    Unexpected,
}

/// What a use case reports back when an operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Validation,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NotFound,
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unexpected,
            message: message.into(),
        }
    }

    /// Validation and not-found errors keep their own message, everything
    /// else is reported with `fallback`.
    pub fn from_error(error: &LottoError, fallback: &str) -> Self {
        match error {
            LottoError::Validation(message) => Self::validation(message.clone()),
            LottoError::NotFound(message) => Self::not_found(message.clone()),
            _ => Self::unexpected(fallback),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

/// Result type returned by every use case.
pub type Outcome<T> = std::result::Result<T, Failure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_keeps_its_message() {
        let failure = Failure::from_error(
            &LottoError::Validation("Name cannot be blank".to_string()),
            "Failed to save",
        );
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.message, "Name cannot be blank");
    }

    #[test]
    fn storage_errors_use_the_fallback() {
        let failure = Failure::from_error(
            &LottoError::Storage(rusqlite::Error::QueryReturnedNoRows),
            "Failed to clear history",
        );
        assert_eq!(failure.kind, FailureKind::Unexpected);
        assert_eq!(failure.to_string(), "Failed to clear history");
    }
}
