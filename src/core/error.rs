use thiserror::Error;

/// Errors raised by the calculation engine.
///
/// Every failure is deterministic for a given input, so callers should report
/// it rather than retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FinanceError {
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
}

impl FinanceError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FinanceError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FinanceError>;
