use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Message suitable for display next to the offending form field.
    ///
    /// Validation errors show their bare message; everything else keeps the
    /// full `Display` output.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}
