/// Core document and configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid {field}: {value}")]
    InvalidDate { field: String, value: String },

    #[error("invalid status list index: {0}")]
    InvalidStatusIndex(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
