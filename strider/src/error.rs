use strider_domain::DomainError;
use thiserror::Error;

/// Failures of the dispatch layer. All of them are permanent: nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Unsupported argument type: {0}")]
    UnsupportedArgumentType(String),
    #[error("Unsupported argument count: {0}")]
    UnsupportedArgumentCount(String),
    #[error("Unsupported arguments: {0}")]
    UnsupportedArguments(String),
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    #[error("Unsupported expression type: {0}")]
    UnsupportedExprType(String),
}

impl From<DomainError> for BackendError {
    fn from(value: DomainError) -> Self {
        BackendError::UnsupportedExprType(value.to_string())
    }
}

impl BackendError {
    pub(crate) fn arity(op: impl std::fmt::Display, expected: &str, got: usize) -> Self {
        BackendError::UnsupportedArgumentCount(format!(
            "{op} takes {expected} arguments, got {got}"
        ))
    }
}
