use std::collections::BTreeMap;

use thiserror::Error;

/// Errors that are safe to expose to other crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationsError {
    #[error("Registration not found: {id}")]
    NotFound { id: String },

    #[error("Registration {id} was removed while being updated")]
    Conflict { id: String },

    #[error("Validation error on {} field(s)", errors.len())]
    Validation { errors: BTreeMap<String, String> },

    #[error("Internal error")]
    Internal,
}

impl RegistrationsError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn conflict(id: impl Into<String>) -> Self {
        Self::Conflict { id: id.into() }
    }

    pub fn validation(errors: BTreeMap<String, String>) -> Self {
        Self::Validation { errors }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for RegistrationsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            NotFound { id } => Self::not_found(id),
            Vanished { id } => Self::conflict(id),
            Validation { errors } => Self::validation(errors.into_map()),
            Database { .. } => Self::internal(),
        }
    }
}
