//! # Edit Session Management
//!
//! One user's builder session: the page document, its history, the selected
//! block and a queue of transient notices. Nothing that goes wrong here is
//! fatal; errors become notices and editing continues in memory.

use pagecraft_blocks::BlockId;
use serde::Serialize;
use tracing::warn;

use crate::{EditorError, Mutation, MutationResult, PageDocument, UndoStack};

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    /// Entitlement missing; UIs offer an upgrade
    Upgrade,
    Error,
}

/// Transient, dismissable message for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Single edit session
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    pub document: PageDocument,

    history: UndoStack,

    /// Block whose form is focused
    selected: Option<BlockId>,

    notices: Vec<Notice>,
    next_notice: u64,
}

impl EditSession {
    pub fn new(id: impl Into<String>, document: PageDocument) -> Self {
        Self {
            id: id.into(),
            document,
            history: UndoStack::new(),
            selected: None,
            notices: Vec::new(),
            next_notice: 0,
        }
    }

    /// Apply a mutation with undo support. Failures become notices and
    /// leave the tree as it was.
    pub fn apply(&mut self, mutation: Mutation) -> Option<MutationResult> {
        match self.history.apply(&mutation, &mut self.document) {
            Ok(result) => {
                let stale = self
                    .selected
                    .as_ref()
                    .is_some_and(|id| !self.document.tree().contains(id));
                if stale {
                    self.selected = None;
                }
                Some(result)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Group the following mutations into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.document)
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Forget history (the tree was replaced from outside)
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn select(&mut self, block_id: Option<BlockId>) {
        self.selected = block_id.filter(|id| self.document.tree().contains(id));
    }

    pub fn selected(&self) -> Option<&BlockId> {
        self.selected.as_ref()
    }

    /// Queue a notice; returns its id for dismissal
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.next_notice += 1;
        self.notices.push(Notice {
            id: self.next_notice,
            level,
            message: message.into(),
        });
        self.next_notice
    }

    /// Turn an editor error into a notice
    pub fn report(&mut self, err: &EditorError) -> u64 {
        let level = match err {
            EditorError::Mutation(m) if m.is_entitlement() => NoticeLevel::Upgrade,
            EditorError::Mutation(_) => NoticeLevel::Warning,
            EditorError::Block(_) => NoticeLevel::Error,
        };
        warn!(session = %self.id, error = %err, "Edit rejected");
        self.notify(level, err.to_string())
    }

    pub fn dismiss(&mut self, notice_id: u64) {
        self.notices.retain(|n| n.id != notice_id);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }
}
