//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// malformed identifiers). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more values failed validation.
    ///
    /// The message is the concatenation of every violated rule, in rule order.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Turn a list of violation messages into a result.
    ///
    /// An empty list is success; anything else becomes a single `Validation`
    /// error carrying every message joined together.
    pub fn from_violations(violations: Vec<String>) -> DomainResult<()> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(violations.concat()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_violations_is_ok() {
        assert_eq!(DomainError::from_violations(vec![]), Ok(()));
    }

    #[test]
    fn violations_are_concatenated_in_order() {
        let err = DomainError::from_violations(vec!["first. ".into(), "second. ".into()]).unwrap_err();
        assert_eq!(err, DomainError::Validation("first. second. ".into()));
    }
}
