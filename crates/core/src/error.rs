use serde::Serialize;

use crate::types::DbId;

/// A validation failure scoped to a single form field.
///
/// The renderer uses `field` to focus and highlight the offending control,
/// so these are never merged into one generic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unknown element type: '{0}'")]
    UnknownElementType(String),

    #[error("Template has not been saved yet; save it before publishing")]
    TemplateNotSaved,

    #[error("Element '{element_id}' references unknown pricing variable '{reference}'")]
    DanglingReference {
        element_id: String,
        reference: String,
    },

    #[error("{} field(s) failed validation", .0.len())]
    FieldValidation(Vec<FieldError>),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
