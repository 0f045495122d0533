use thiserror::Error;

/// Unified result type for the page builder crate.
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Errors surfaced by the page builder engine.
///
/// None of these are fatal: every failing operation leaves the layout store
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("field `{0}` cannot be edited")]
    ImmutableField(String),
    #[error("invalid value for field `{field}`: {reason}")]
    InvalidFieldValue { field: String, reason: String },
    #[error("item `{0}` is static and cannot be dragged")]
    StaticItem(String),
    #[error("item `{0}` not found")]
    ItemNotFound(String),
    #[error("page `{0}` not found")]
    PageNotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuilderError {
    pub(crate) fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
