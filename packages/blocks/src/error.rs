use thiserror::Error;

/// Errors raised while building block metadata or decoding pages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    #[error("Unknown block type: {0}")]
    UnknownKind(String),

    #[error("Invalid registry configuration: {0}")]
    InvalidRegistry(String),

    #[error("Invalid page payload: {0}")]
    InvalidPayload(String),
}

impl From<serde_json::Error> for BlockError {
    fn from(e: serde_json::Error) -> Self {
        BlockError::InvalidPayload(e.to_string())
    }
}
