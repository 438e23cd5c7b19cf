//! # Page Document
//!
//! The builder's in-memory copy of one landing page and its editing state.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Normalize → Edit → Save
//!   ↓        ↓         ↓       ↓
//! JSON   BlockTree  Mutations  PUT
//! ```
//!
//! The document is the single owner of the current tree. Mutations replace
//! it wholesale; the version counter only moves when the tree changes.

use chrono::{DateTime, Utc};
use pagecraft_blocks::{BlockRegistry, BlockTree, IdSource, LandingPage, PageContent, UuidIds};
use tracing::debug;

use crate::mutations::MutationContext;
use crate::operations::Entitlement;
use crate::{EditorError, Mutation, MutationResult};

/// Editable landing page
pub struct PageDocument {
    page: LandingPage,

    /// Current version number (increments on each effective change)
    version: u64,

    /// Unsaved changes since load or the last save
    dirty: bool,

    registry: BlockRegistry,
    entitlement: Entitlement,
    ids: Box<dyn IdSource + Send>,
}

impl PageDocument {
    /// Wrap an already loaded page (random block ids)
    pub fn new(page: LandingPage, registry: BlockRegistry, entitlement: Entitlement) -> Self {
        Self {
            page,
            version: 0,
            dirty: false,
            registry,
            entitlement,
            ids: Box::new(UuidIds),
        }
    }

    /// Use a different id source for new blocks and FAQ items
    pub fn with_ids(mut self, ids: impl IdSource + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Decode a page as served by the backend
    pub fn from_json(json: &str, registry: BlockRegistry, entitlement: Entitlement) -> Result<Self, EditorError> {
        let mut ids = UuidIds;
        let page = LandingPage::from_json(json, &mut ids)?;
        Ok(Self::new(page, registry, entitlement))
    }

    pub fn page(&self) -> &LandingPage {
        &self.page
    }

    pub fn tree(&self) -> &BlockTree {
        self.page.blocks()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn entitlement(&self) -> Entitlement {
        self.entitlement
    }

    /// Entitlement may change mid-session (upgrade, downgrade)
    pub fn set_entitlement(&mut self, entitlement: Entitlement) {
        self.entitlement = entitlement;
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        self.apply_at(mutation, Utc::now())
    }

    /// Apply a mutation with an explicit clock (countdown defaults depend on it)
    pub fn apply_at(&mut self, mutation: &Mutation, now: DateTime<Utc>) -> Result<MutationResult, EditorError> {
        let mut ctx = MutationContext {
            registry: &self.registry,
            entitlement: self.entitlement,
            ids: &mut *self.ids,
            now,
        };

        let next = mutation.apply(self.page.blocks(), &mut ctx)?;
        let changed = &next != self.page.blocks();

        if changed {
            self.page.content.content_blocks = next;
            self.version += 1;
            self.dirty = true;
        }

        debug!(
            op = mutation.name(),
            changed,
            version = self.version,
            "Applied mutation"
        );

        Ok(MutationResult {
            version: self.version,
            changed,
        })
    }

    /// Swap in a whole tree (undo/redo)
    pub fn restore_tree(&mut self, tree: BlockTree) {
        if &tree != self.page.blocks() {
            self.page.content.content_blocks = tree;
            self.version += 1;
            self.dirty = true;
        }
    }

    /// Overwrite every content field (applying a version snapshot)
    pub fn replace_content(&mut self, mut content: PageContent) {
        content.content_blocks.normalize(&mut self.ids);
        self.page.apply_content(content);
        self.version += 1;
        self.dirty = true;
    }

    /// Mutable access to page-level settings (theme, fonts, motion)
    pub fn content_mut(&mut self) -> &mut PageContent {
        self.version += 1;
        self.dirty = true;
        &mut self.page.content
    }

    /// Called after a successful full-page save
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
