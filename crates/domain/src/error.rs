//! Unified error types for the domain layer
//!
//! Every entity check and payload check in this crate reports through
//! [`DomainError`], so adapters and the service can branch on the variant
//! instead of inspecting message text.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed a structural check. `field` names the offending field.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Object containment was zero-set or multi-set.
    #[error("invalid containment: object must be in exactly one place")]
    InvalidContainment,

    /// Exit from-location and to-location are the same.
    #[error("exit cannot reference its own location")]
    SelfReferentialExit,

    #[error("invalid location type: {0}")]
    InvalidLocationType(String),

    #[error("invalid exit visibility: {0}")]
    InvalidVisibility(String),

    #[error("invalid lock type: {0}")]
    InvalidLockType(String),

    #[error("invalid participant role: {0}")]
    InvalidParticipantRole(String),

    #[error("invalid property visibility: {0}")]
    InvalidPropertyVisibility(String),

    #[error("invalid parent type: {0}")]
    InvalidParentType(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for a named field.
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("name", "cannot be empty"));
    /// }
    /// ```
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// The offending field, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::InvalidContainment => Some("containment"),
            Self::SelfReferentialExit => Some("to_location_id"),
            Self::InvalidLocationType(_) => Some("type"),
            Self::InvalidVisibility(_) => Some("visibility"),
            Self::InvalidLockType(_) => Some("lock_type"),
            Self::InvalidParticipantRole(_) => Some("role"),
            Self::InvalidPropertyVisibility(_) => Some("visibility"),
            Self::InvalidParentType(_) => Some("parent_type"),
            Self::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name", "cannot be empty");
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(err.to_string(), "name: cannot be empty");
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_containment_error_names_field() {
        let err = DomainError::InvalidContainment;
        assert_eq!(err.field(), Some("containment"));
        assert!(err.to_string().contains("exactly one place"));
    }

    #[test]
    fn test_parse_error_has_no_field() {
        let err = DomainError::parse("bad input");
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "Parse error: bad input");
    }
}
