//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Page error: {0}")]
    Block(#[from] pagecraft_blocks::BlockError),
}

impl EditorError {
    /// Validation failures are recoverable and shown as notices
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Mutation(_))
    }
}
