//! Domain Errors
//!
//! Error types for client operations. Every remote failure is converted
//! into one of these values at the adapter boundary.

use thiserror::Error;

use crate::domain::value_objects::ValidationErrorSet;

/// Domain layer errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Invalid fields: {0}")]
    InvalidFields(ValidationErrorSet),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Report failed: {0}")]
    ReportFailed(String),
}

impl DomainError {
    pub fn api<T: Into<String>>(status: Option<u16>, message: T) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn not_found<T: AsRef<str>>(entity_type: T, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    /// Message suitable for a blocking user notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
