//! Store error types
//!
//! Errors raised by write operations against the document store. Read
//! operations report absence through `Option`/`bool` rather than an error;
//! the handler layer decides whether a missing document is a failure.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error raised by document store write operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Payload failed entity validation; the message is surfaced to the
    /// caller unmodified.
    #[error("{0}")]
    Validation(String),

    /// A unique field already holds this value in the collection
    #[error("Duplicate field value: {value}. Please use another value!")]
    Duplicate {
        /// The unique field that collided
        field: String,
        /// The offending value, rendered for the error message
        value: String,
    },
}

impl StoreError {
    /// Build a validation error from individual constraint messages
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation(format!("Invalid input data. {}", messages.join(". ")))
    }

    /// Build a duplicate-field error
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_joins_messages() {
        let err = StoreError::validation(vec![
            "A tour must have a name".to_string(),
            "A tour must have a price".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid input data. A tour must have a name. A tour must have a price"
        );
    }

    #[test]
    fn test_duplicate_message() {
        let err = StoreError::duplicate("name", "\"The Forest Hiker\"");
        assert_eq!(
            err.to_string(),
            "Duplicate field value: \"The Forest Hiker\". Please use another value!"
        );
    }
}
