//! # Pagecraft Editor
//!
//! Core editing engine for landing pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ blocks: JSON → LandingPage + BlockTree      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Pure tree operations (operations)        │
//! │  - Serializable commands with validation    │
//! │  - Undo/redo history                        │
//! │  - Session notices and selection            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: BlockTree → form model + preview  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: forms and previews are derived views
//! 2. **Immutable updates**: every operation returns a new tree
//! 3. **Ids are identity**: reorders and relocations never touch `id`/`type`
//! 4. **Nothing is fatal**: failures become notices, edits stay in memory
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{EditSession, Entitlement, Mutation, PageDocument};
//!
//! let doc = PageDocument::from_json(&json, BlockRegistry::new(), Entitlement::Free)?;
//! let mut session = EditSession::new("builder", doc);
//!
//! session.apply(Mutation::AddBlock { kind: BlockKind::Heading });
//! session.undo();
//! ```

mod document;
mod errors;
mod mutations;
pub mod operations;
mod session;
mod undo_stack;

pub use document::PageDocument;
pub use errors::EditorError;
pub use mutations::{Mutation, MutationContext, MutationError, MutationResult};
pub use operations::{AddBlockError, Entitlement};
pub use session::{EditSession, Notice, NoticeLevel};
pub use undo_stack::{MutationBatch, UndoStack};
