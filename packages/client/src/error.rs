use pagecraft_blocks::{BlockError, BlockId};
use pagecraft_editor::EditorError;
use thiserror::Error;

use crate::versions::Tier;

/// Failures talking to the page backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network, DNS, TLS or timeout failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid page payload: {0}")]
    Page(#[from] BlockError),

    /// Injected or simulated outage
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Version limit reached: {tier} plans keep at most {limit} versions")]
    CapReached { tier: Tier, limit: usize },

    #[error("Version name must not be empty")]
    EmptyName,

    #[error("Version service unavailable: {0}")]
    ServiceUnavailable(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("No page loaded")]
    NotLoaded,

    #[error("Another upload is already in progress")]
    Busy,

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Block {0} is not a checkout block")]
    NotCheckout(BlockId),

    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    #[error("Field {key} of block {block_id} rejected the generated copy")]
    FieldRejected { block_id: BlockId, key: String },
}

impl BuilderError {
    /// Whether the failure came from the backend rather than local validation
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            BuilderError::Api(_) | BuilderError::Version(VersionError::ServiceUnavailable(_))
        )
    }
}
