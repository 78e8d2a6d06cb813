//! Crate error type.
//!
//! Setup problems (invalid input, invalid parameters) are reported before a
//! run starts. [`Error::Invariant`] marks a programming defect detected while
//! evolving; the engine aborts the run when it sees one.

use crate::validation::ValidationError;

/// Errors produced by the timetabling engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A GA, population or stop-criterion parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scheduling input failed validation.
    #[error("invalid input: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A chromosome no longer places every instance exactly once.
    #[error("chromosome invariant violated: {0}")]
    Invariant(String),

    /// The requested operation needs an idle engine.
    #[error("engine is running")]
    AlreadyRunning,

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to parse seed solution: {0}")]
    SeedParse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_message_joins_all_errors() {
        let err = Error::Validation(vec![
            ValidationError {
                kind: ValidationErrorKind::NoTutors,
                message: "no tutors".into(),
            },
            ValidationError {
                kind: ValidationErrorKind::NoSubjects,
                message: "no subjects".into(),
            },
        ]);
        assert_eq!(err.to_string(), "invalid input: no tutors; no subjects");
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config("workers must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid configuration: workers must be at least 1"
        );
    }
}
