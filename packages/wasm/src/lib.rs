use wasm_bindgen::prelude::*;

mod editor;

pub use editor::{block_defaults, ApplyOutcome, EditorCore};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Builder session for one landing page
#[wasm_bindgen]
pub struct PageEditor {
    core: EditorCore,
}

#[wasm_bindgen]
impl PageEditor {
    /// Load a page as served by the backend
    #[wasm_bindgen(constructor)]
    pub fn new(page_json: &str, pro: bool) -> Result<PageEditor, JsValue> {
        let core = EditorCore::new(page_json, pro).map_err(to_js)?;
        Ok(PageEditor { core })
    }

    /// Apply one mutation (`{"op": "...", ...}`); returns the outcome as JSON
    #[wasm_bindgen(js_name = applyMutation)]
    pub fn apply_mutation(&mut self, mutation_json: &str) -> Result<String, JsValue> {
        let outcome = self.core.apply(mutation_json).map_err(to_js)?;
        json(&outcome)
    }

    pub fn undo(&mut self) -> Result<String, JsValue> {
        json(&self.core.undo())
    }

    pub fn redo(&mut self) -> Result<String, JsValue> {
        json(&self.core.redo())
    }

    /// Form model for the editor pane
    #[wasm_bindgen(js_name = renderEditor)]
    pub fn render_editor(&self) -> Result<String, JsValue> {
        json(&self.core.forms())
    }

    /// Live preview markup
    #[wasm_bindgen(js_name = renderPreview)]
    pub fn render_preview(&self) -> String {
        self.core.preview_html()
    }

    /// Standalone HTML document for export
    #[wasm_bindgen(js_name = renderDocument)]
    pub fn render_document(&self) -> String {
        self.core.document_html()
    }

    /// Page JSON for saving
    #[wasm_bindgen(js_name = pageJson)]
    pub fn page_json(&self) -> Result<String, JsValue> {
        self.core.page_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = markSaved)]
    pub fn mark_saved(&mut self) {
        self.core.mark_saved();
    }

    pub fn notices(&self) -> Result<String, JsValue> {
        json(&self.core.notices())
    }

    #[wasm_bindgen(js_name = dismissNotice)]
    pub fn dismiss_notice(&mut self, notice_id: u64) {
        self.core.dismiss(notice_id);
    }

    /// Start a player; returns the block id of the player to pause, if any
    pub fn play(&self, block_id: &str) -> Option<String> {
        self.core.play(block_id)
    }

    pub fn pause(&self, block_id: &str) {
        self.core.pause(block_id);
    }
}

/// Default fields of a new block, as JSON
#[wasm_bindgen(js_name = blockDefaults)]
pub fn block_defaults_js(kind: &str) -> Result<String, JsValue> {
    let fields = block_defaults(kind).map_err(to_js)?;
    json(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_round_trip() {
        let mut editor = PageEditor::new(r#"{ "id": "p1", "username": "ada" }"#, false).unwrap();

        let outcome = editor.apply_mutation(r#"{ "op": "add_block", "kind": "paragraph" }"#).unwrap();
        assert!(outcome.contains("\"changed\":true"));

        let forms = editor.render_editor().unwrap();
        assert!(forms.contains("\"kind\":\"paragraph\""));
        assert!(editor.page_json().unwrap().contains("\"content_blocks\""));
        assert!(editor.render_preview().contains("data-block=\"paragraph\""));
    }

    #[test]
    fn test_block_defaults_json() {
        let defaults = block_defaults_js("faq").unwrap();
        assert!(defaults.contains("\"title\":\"Frequently Asked Questions\""));
    }
}
