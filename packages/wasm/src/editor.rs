//! JSON-in / JSON-out editing state behind the wasm bindings.
//!
//! Errors are plain strings here; `lib.rs` turns them into `JsValue`s.

use chrono::Utc;
use pagecraft_blocks::{BlockKind, BlockRegistry, FieldBag, UuidIds};
use pagecraft_editor::{EditSession, Entitlement, Mutation, Notice, PageDocument};
use pagecraft_renderer::{
    page_to_html, render_editor, render_page, to_html, FormNode, HtmlOptions, MediaArbiter, ThemeContext,
};
use serde::Serialize;

/// Outcome of one applied mutation, as sent back to the page script
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub applied: bool,
    pub changed: bool,
    pub version: u64,
    pub dirty: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub struct EditorCore {
    session: EditSession,
    media: MediaArbiter,
}

impl EditorCore {
    pub fn new(page_json: &str, pro: bool) -> Result<Self, String> {
        let document = PageDocument::from_json(page_json, BlockRegistry::new(), Entitlement::from_flag(pro))
            .map_err(|e| e.to_string())?;
        Ok(Self {
            session: EditSession::new("wasm", document),
            media: MediaArbiter::new(),
        })
    }

    pub fn apply(&mut self, mutation_json: &str) -> Result<ApplyOutcome, String> {
        let mutation: Mutation =
            serde_json::from_str(mutation_json).map_err(|e| format!("Invalid mutation: {}", e))?;
        let result = self.session.apply(mutation);
        Ok(self.outcome(result.is_some(), result.is_some_and(|r| r.changed)))
    }

    pub fn undo(&mut self) -> ApplyOutcome {
        let changed = self.session.undo();
        self.outcome(changed, changed)
    }

    pub fn redo(&mut self) -> ApplyOutcome {
        let changed = self.session.redo();
        self.outcome(changed, changed)
    }

    fn outcome(&self, applied: bool, changed: bool) -> ApplyOutcome {
        let history = self.session.history();
        ApplyOutcome {
            applied,
            changed,
            version: self.session.document.version(),
            dirty: self.session.document.is_dirty(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        }
    }

    pub fn forms(&self) -> Vec<FormNode> {
        render_editor(self.session.document.tree())
    }

    /// Body of the live page, for the side-by-side preview pane
    pub fn preview_html(&self) -> String {
        let page = self.session.document.page();
        let theme = ThemeContext::from_content(&page.content, self.media.clone());
        to_html(&render_page(page, &theme), HtmlOptions::compact())
    }

    pub fn document_html(&self) -> String {
        page_to_html(self.session.document.page(), MediaArbiter::new(), HtmlOptions::default())
    }

    pub fn page_json(&self) -> Result<String, String> {
        self.session.document.page().to_json().map_err(|e| e.to_string())
    }

    pub fn mark_saved(&mut self) {
        self.session.document.mark_saved();
    }

    pub fn notices(&self) -> &[Notice] {
        self.session.notices()
    }

    pub fn dismiss(&mut self, notice_id: u64) {
        self.session.dismiss(notice_id);
    }

    /// Start a media block's player; returns the block id of the player it paused
    pub fn play(&self, block_id: &str) -> Option<String> {
        let handle = self.media.register(block_id);
        self.media
            .claim(&handle)
            .and_then(|paused| paused.as_str().strip_prefix("media-").map(str::to_string))
    }

    pub fn pause(&self, block_id: &str) {
        let handle = self.media.register(block_id);
        self.media.release(&handle);
    }
}

/// Default fields for a new block of `kind` (wire name)
pub fn block_defaults(kind: &str) -> Result<FieldBag, String> {
    let kind = kind.parse::<BlockKind>().map_err(|e| e.to_string())?;
    Ok(BlockRegistry::new().defaults(kind, Utc::now(), &mut UuidIds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = r#"{ "id": "p1", "username": "ada", "content_blocks": [] }"#;

    #[test]
    fn test_apply_and_undo() {
        let mut core = EditorCore::new(PAGE, false).unwrap();

        let outcome = core.apply(r#"{ "op": "add_block", "kind": "heading" }"#).unwrap();
        assert!(outcome.applied && outcome.changed && outcome.dirty);
        assert_eq!(outcome.version, 1);
        assert!(outcome.can_undo);

        let forms = core.forms();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].kind, BlockKind::Heading);

        let undone = core.undo();
        assert!(undone.changed);
        assert!(undone.can_redo);
        assert!(core.forms().is_empty());
    }

    #[test]
    fn test_rejected_mutation_becomes_notice() {
        let mut core = EditorCore::new(PAGE, false).unwrap();
        let outcome = core.apply(r#"{ "op": "add_block", "kind": "stripe_checkout" }"#).unwrap();
        assert!(!outcome.applied);
        assert_eq!(core.notices().len(), 1);

        let id = core.notices()[0].id;
        core.dismiss(id);
        assert!(core.notices().is_empty());

        assert!(core.apply(r#"{ "op": "explode" }"#).is_err());
    }

    #[test]
    fn test_preview_follows_edits() {
        let mut core = EditorCore::new(PAGE, true).unwrap();
        core.apply(r#"{ "op": "add_block", "kind": "heading" }"#).unwrap();
        let id = core.forms()[0].block_id.clone();

        let edit = json!({ "op": "set_field", "block_id": id, "key": "text", "value": "Launch day" });
        core.apply(&edit.to_string()).unwrap();

        assert!(core.preview_html().contains(">Launch day</h2>"));
        assert!(core.document_html().starts_with("<!DOCTYPE html>"));
        assert!(core.page_json().unwrap().contains("Launch day"));

        core.mark_saved();
        assert!(!core.outcome(false, false).dirty);
    }

    #[test]
    fn test_single_player_at_a_time() {
        let core = EditorCore::new(PAGE, true).unwrap();
        assert_eq!(core.play("a"), None);
        assert_eq!(core.play("b"), Some("a".to_string()));
        core.pause("b");
        assert_eq!(core.play("a"), None);
    }

    #[test]
    fn test_block_defaults() {
        let fields = block_defaults("divider").unwrap();
        assert_eq!(fields["style"], json!("solid"));
        assert!(block_defaults("hologram").is_err());
    }
}
