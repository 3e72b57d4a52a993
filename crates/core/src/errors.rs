use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("category label must not be empty")]
    EmptyCategory,
    #[error("no default template exists for prompt `{0}`")]
    UnknownPrompt(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure taxonomy shared by the orchestration layer and its collaborators.
///
/// Only `Configuration` is fatal. Backend, parse and storage-read failures are
/// recovered where they happen and reach a caller at most as a diagnostic.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("backend call failed: {0}")]
    BackendCall(String),
    #[error("could not parse model output: {0}")]
    Parse(String),
    #[error("could not read stored data: {0}")]
    StorageRead(String),
    #[error("could not write stored data: {0}")]
    StorageWrite(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Configuration(_) => "config_validation",
            Self::BackendCall(_) => "backend_call",
            Self::Parse(_) => "parse",
            Self::StorageRead(_) => "storage_read",
            Self::StorageWrite(_) => "storage_write",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Configuration(_) => "The assistant is misconfigured. Check provider settings.",
            Self::BackendCall(_) => "The language model could not be reached.",
            Self::Parse(_) => "The language model returned an unexpected answer.",
            Self::StorageRead(_) | Self::StorageWrite(_) => "Local data could not be accessed.",
        }
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn config_error_maps_to_configuration_class() {
        let error = ApplicationError::from(ConfigError::UnsupportedProvider("bard".to_owned()));

        assert_eq!(error.error_class(), "config_validation");
        assert!(error.to_string().contains("bard"));
    }

    #[test]
    fn domain_error_has_user_safe_message() {
        let error = ApplicationError::from(DomainError::EmptyCategory);

        assert_eq!(error.error_class(), "domain_validation");
        assert_eq!(
            error.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn storage_errors_share_user_message() {
        let read = ApplicationError::StorageRead("emails.json: corrupt".to_owned());
        let write = ApplicationError::StorageWrite("drafts.json: permission denied".to_owned());

        assert_eq!(read.user_message(), write.user_message());
        assert_ne!(read.error_class(), write.error_class());
    }
}
