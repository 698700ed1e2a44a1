use thiserror::Error;

use crate::domain::validation::FieldErrors;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Registration not found: {id}")]
    NotFound { id: String },

    #[error("Validation failed: {errors}")]
    Validation { errors: FieldErrors },

    /// The document disappeared between lookup and replace (concurrent delete).
    #[error("Registration {id} was removed while being updated")]
    Vanished { id: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation { errors }
    }

    pub fn vanished(id: impl Into<String>) -> Self {
        Self::Vanished { id: id.into() }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
