//! # Block Mutations
//!
//! Serializable commands over the block tree. UIs, scripts and the WASM
//! bridge all funnel edits through [`Mutation::apply`], which validates the
//! command and delegates to the pure functions in [`crate::operations`].
//!
//! ## Mutation Semantics
//!
//! ### AddBlock
//! - Appends to the root with registry defaults
//! - Fails with `ProRequired` when the kind is gated and the owner is not Pro
//! - Fails with `LimitReached` when the kind's per-page cap is already met
//!
//! ### SetField / ToggleField
//! - Atomic replacement of one attribute (last write wins)
//! - Envelope keys (`id`, `type`, ...) are refused
//! - Values are checked against the kind's field schema; keys outside the
//!   schema are stored untouched
//!
//! ### Moves and relocations
//! - Never fail; unknown ids and boundary moves return the tree unchanged

use chrono::{DateTime, Utc};
use pagecraft_blocks::{
    field_spec, is_reserved_key, BlockId, BlockKind, BlockRegistry, BlockTree, FieldKind, IdSource,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::operations::{self, Entitlement};

/// Semantic edits on a page's block tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Append a new block of `kind` to the root sequence
    AddBlock { kind: BlockKind },

    /// Remove a block (and a container's children)
    RemoveBlock { block_id: BlockId },

    /// Replace one attribute
    SetField {
        block_id: BlockId,
        key: String,
        value: Value,
    },

    /// Flip a boolean attribute
    ToggleField { block_id: BlockId, key: String },

    /// Show or hide the block on the live page
    SetEnabled { block_id: BlockId, enabled: bool },

    /// Fold or unfold the block's form (editor only)
    ToggleCollapsed { block_id: BlockId },

    MoveUp { block_id: BlockId },

    MoveDown { block_id: BlockId },

    /// Drop at `index` within the current sibling sequence
    MoveToIndex { block_id: BlockId, index: usize },

    RelocateToContainer {
        block_id: BlockId,
        container_id: BlockId,
    },

    RelocateToRoot {
        container_id: BlockId,
        block_id: BlockId,
    },

    AddFaqItem { block_id: BlockId },

    RemoveFaqItem { block_id: BlockId, item_id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Only {limit} {kind} block(s) allowed per page")]
    LimitReached { kind: BlockKind, limit: usize },

    #[error("{0} blocks require a Pro plan")]
    ProRequired(BlockKind),

    #[error("Field is managed by the editor: {0}")]
    ReservedField(String),

    #[error("Invalid value for {kind}.{key}")]
    InvalidFieldValue { kind: BlockKind, key: String },
}

impl MutationError {
    /// Entitlement failures are shown as upgrade prompts, not validation errors
    pub fn is_entitlement(&self) -> bool {
        matches!(self, MutationError::ProRequired(_))
    }
}

/// Everything a mutation may need besides the tree itself
pub struct MutationContext<'a> {
    pub registry: &'a BlockRegistry,
    pub entitlement: Entitlement,
    pub ids: &'a mut dyn IdSource,
    pub now: DateTime<Utc>,
}

impl Mutation {
    /// Apply to a tree, producing the next tree
    pub fn apply(&self, tree: &BlockTree, ctx: &mut MutationContext<'_>) -> Result<BlockTree, MutationError> {
        self.validate(tree)?;

        let next = match self {
            Mutation::AddBlock { kind } => {
                operations::add_block(tree, *kind, ctx.registry, ctx.entitlement, &mut ctx.ids, ctx.now)?
            }
            Mutation::RemoveBlock { block_id } => operations::remove_block(tree, block_id),
            Mutation::SetField { block_id, key, value } => {
                operations::update_field(tree, block_id, key, value.clone())
            }
            Mutation::ToggleField { block_id, key } => operations::toggle_field(tree, block_id, key),
            Mutation::SetEnabled { block_id, enabled } => {
                operations::set_enabled(tree, block_id, *enabled)
            }
            Mutation::ToggleCollapsed { block_id } => operations::toggle_collapsed(tree, block_id),
            Mutation::MoveUp { block_id } => operations::move_up(tree, block_id),
            Mutation::MoveDown { block_id } => operations::move_down(tree, block_id),
            Mutation::MoveToIndex { block_id, index } => {
                operations::move_to_index(tree, block_id, *index)
            }
            Mutation::RelocateToContainer { block_id, container_id } => {
                operations::relocate_to_container(tree, block_id, container_id)
            }
            Mutation::RelocateToRoot { container_id, block_id } => {
                operations::relocate_to_root(tree, container_id, block_id)
            }
            Mutation::AddFaqItem { block_id } => {
                operations::insert_faq_item(tree, block_id, &mut ctx.ids)
            }
            Mutation::RemoveFaqItem { block_id, item_id } => {
                operations::remove_faq_item(tree, block_id, item_id)
            }
        };

        Ok(next)
    }

    /// Validate without applying
    pub fn validate(&self, tree: &BlockTree) -> Result<(), MutationError> {
        match self {
            Mutation::SetField { block_id, key, value } => {
                if is_reserved_key(key) {
                    return Err(MutationError::ReservedField(key.clone()));
                }
                check_field(tree, block_id, key, |kind| kind.accepts(value))
            }

            Mutation::ToggleField { block_id, key } => {
                if is_reserved_key(key) {
                    return Err(MutationError::ReservedField(key.clone()));
                }
                check_field(tree, block_id, key, |kind| matches!(kind, FieldKind::Toggle))
            }

            _ => Ok(()),
        }
    }

    /// Block the mutation targets, if any
    pub fn target(&self) -> Option<&BlockId> {
        match self {
            Mutation::AddBlock { .. } => None,
            Mutation::RemoveBlock { block_id }
            | Mutation::SetField { block_id, .. }
            | Mutation::ToggleField { block_id, .. }
            | Mutation::SetEnabled { block_id, .. }
            | Mutation::ToggleCollapsed { block_id }
            | Mutation::MoveUp { block_id }
            | Mutation::MoveDown { block_id }
            | Mutation::MoveToIndex { block_id, .. }
            | Mutation::RelocateToContainer { block_id, .. }
            | Mutation::RelocateToRoot { block_id, .. }
            | Mutation::AddFaqItem { block_id }
            | Mutation::RemoveFaqItem { block_id, .. } => Some(block_id),
        }
    }

    /// Short name used in history descriptions and logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddBlock { .. } => "add_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::SetField { .. } => "set_field",
            Mutation::ToggleField { .. } => "toggle_field",
            Mutation::SetEnabled { .. } => "set_enabled",
            Mutation::ToggleCollapsed { .. } => "toggle_collapsed",
            Mutation::MoveUp { .. } => "move_up",
            Mutation::MoveDown { .. } => "move_down",
            Mutation::MoveToIndex { .. } => "move_to_index",
            Mutation::RelocateToContainer { .. } => "relocate_to_container",
            Mutation::RelocateToRoot { .. } => "relocate_to_root",
            Mutation::AddFaqItem { .. } => "add_faq_item",
            Mutation::RemoveFaqItem { .. } => "remove_faq_item",
        }
    }
}

/// Schema check for a field write. Unknown blocks and off-schema keys pass.
fn check_field(
    tree: &BlockTree,
    block_id: &BlockId,
    key: &str,
    accepts: impl Fn(&FieldKind) -> bool,
) -> Result<(), MutationError> {
    let Some(block) = tree.find(block_id) else {
        return Ok(());
    };

    match field_spec(block.kind(), key) {
        Some(spec) if !accepts(&spec.kind) => Err(MutationError::InvalidFieldValue {
            kind: block.kind(),
            key: key.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Result of applying a mutation to a document
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    /// False when the mutation was a no-op
    pub changed: bool,
}
