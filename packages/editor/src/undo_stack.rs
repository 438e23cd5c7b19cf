//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each effective mutation records the tree as it was before
//! - Undo restores that tree and moves the step to the redo stack
//! - Redo restores the tree as it was after the step
//! - New mutations clear the redo stack
//! - No-op mutations are not recorded
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.apply(&Mutation::AddBlock { kind: BlockKind::Heading }, &mut doc)?;
//! stack.undo(&mut doc);
//! stack.redo(&mut doc);
//! ```

use pagecraft_blocks::BlockTree;

use crate::{EditorError, Mutation, MutationResult, PageDocument};

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Tree before the first mutation
    pub before: BlockTree,

    /// Tree after the last mutation
    pub after: BlockTree,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, before: BlockTree, after: BlockTree) -> Self {
        Self {
            description: Some(mutation.name().to_string()),
            mutations: vec![mutation],
            before,
            after,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Pending batch: the starting tree is captured on the first recorded step
#[derive(Debug, Default)]
struct OpenBatch {
    steps: Option<MutationBatch>,
    description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<OpenBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: &Mutation, doc: &mut PageDocument) -> Result<MutationResult, EditorError> {
        let before = doc.tree().clone();
        let result = doc.apply(mutation)?;

        if !result.changed {
            return Ok(result);
        }

        let after = doc.tree().clone();
        match &mut self.current_batch {
            Some(open) => match &mut open.steps {
                Some(batch) => {
                    batch.mutations.push(mutation.clone());
                    batch.after = after;
                }
                None => open.steps = Some(MutationBatch::single(mutation.clone(), before, after)),
            },
            None => self.push_batch(MutationBatch::single(mutation.clone(), before, after)),
        }

        Ok(result)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(OpenBatch::default());
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(open) = self.current_batch.take() {
            if let Some(batch) = open.steps {
                let batch = match open.description {
                    Some(description) => batch.with_description(description),
                    None => batch,
                };
                self.push_batch(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(open) = &mut self.current_batch {
            open.description = Some(description.into());
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates the future
        self.redo_stack.clear();
    }

    /// Undo the most recent mutation/batch
    pub fn undo(&mut self, doc: &mut PageDocument) -> bool {
        self.end_batch();
        match self.undo_stack.pop() {
            Some(batch) => {
                doc.restore_tree(batch.before.clone());
                self.redo_stack.push(batch);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone mutation/batch
    pub fn redo(&mut self, doc: &mut PageDocument) -> bool {
        match self.redo_stack.pop() {
            Some(batch) => {
                doc.restore_tree(batch.after.clone());
                self.undo_stack.push(batch);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history (e.g. after applying a version)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Entitlement;
    use pagecraft_blocks::{BlockKind, BlockRegistry, LandingPage, SequentialIds};
    use serde_json::json;

    fn document() -> PageDocument {
        PageDocument::new(LandingPage::new("p1", "ada"), BlockRegistry::new(), Entitlement::Free)
            .with_ids(SequentialIds::new("b"))
    }

    fn set_text(text: &str) -> Mutation {
        Mutation::SetField {
            block_id: "b-1".into(),
            key: "text".to_string(),
            value: json!(text),
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_and_undo() {
        let mut doc = document();
        let mut stack = UndoStack::new();

        stack.apply(&Mutation::AddBlock { kind: BlockKind::Heading }, &mut doc).unwrap();
        stack.apply(&set_text("Hello"), &mut doc).unwrap();
        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo_description(), Some("set_field"));

        assert!(stack.undo(&mut doc));
        assert_eq!(doc.tree().blocks()[0].text("text"), "");
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc));
        assert_eq!(doc.tree().blocks()[0].text("text"), "Hello");
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_noop_not_recorded() {
        let mut doc = document();
        let mut stack = UndoStack::new();

        stack.apply(&Mutation::AddBlock { kind: BlockKind::Heading }, &mut doc).unwrap();
        stack.apply(&Mutation::MoveDown { block_id: "b-1".into() }, &mut doc).unwrap();
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_batched_mutations() {
        let mut doc = document();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.set_batch_description("Add title");
        stack.apply(&Mutation::AddBlock { kind: BlockKind::Heading }, &mut doc).unwrap();
        stack.apply(&set_text("Welcome"), &mut doc).unwrap();
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Add title"));

        stack.undo(&mut doc);
        assert!(doc.tree().is_empty());

        stack.redo(&mut doc);
        assert_eq!(doc.tree().blocks()[0].text("text"), "Welcome");
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut doc = document();
        let mut stack = UndoStack::new();

        stack.apply(&Mutation::AddBlock { kind: BlockKind::Heading }, &mut doc).unwrap();
        stack.apply(&set_text("World"), &mut doc).unwrap();
        stack.undo(&mut doc);
        assert_eq!(stack.redo_levels(), 1);

        stack.apply(&set_text("Everyone"), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = document();
        let mut stack = UndoStack::with_max_levels(2);

        stack.apply(&Mutation::AddBlock { kind: BlockKind::Heading }, &mut doc).unwrap();
        for i in 0..3 {
            stack.apply(&set_text(&format!("Text {}", i)), &mut doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }
}
