//! # Landing Page Aggregate
//!
//! A page is an owner-facing envelope (`id`, `username`, attached asset)
//! plus [`PageContent`], the themeable/content fields that version
//! snapshots capture and restore wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::BlockError;
use crate::id_generator::IdSource;
use crate::tree::BlockTree;

/// Per-heading-level and paragraph colour overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontColors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
}

/// Page-level scroll animation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotionSettings {
    pub enabled: bool,
    pub preset: String,
    /// Seconds
    pub duration: f64,
    /// Seconds before the first block animates
    pub delay: f64,
    /// Extra delay per block index, seconds
    pub stagger: f64,
    pub easing_curve: String,
    pub viewport_once: bool,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: "fade-up".to_string(),
            duration: 0.6,
            delay: 0.0,
            stagger: 0.1,
            easing_curve: "easeOut".to_string(),
            viewport_once: true,
        }
    }
}

/// Everything a version snapshot captures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_file_url: Option<String>,
    /// Named theme or raw CSS gradient/hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_theme: Option<String>,
    #[serde(default)]
    pub font_colors: FontColors,
    #[serde(default)]
    pub motion_settings: MotionSettings,
    #[serde(default)]
    pub show_download_button: bool,
    #[serde(rename = "content_blocks", default)]
    pub content_blocks: BlockTree,
}

impl PageContent {
    /// Decode a snapshot payload and repair its block tree
    pub fn from_value(value: Value, ids: &mut impl IdSource) -> Result<Self, BlockError> {
        let mut content: PageContent = serde_json::from_value(value)?;
        content.content_blocks.normalize(ids);
        Ok(content)
    }
}

/// A user's landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPage {
    #[serde(default)]
    pub id: String,

    /// Subdomain slug
    #[serde(default)]
    pub username: String,

    /// Downloadable asset offered by the free-download form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    #[serde(flatten)]
    pub content: PageContent,

    /// Fields this version does not model, kept for round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LandingPage {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// Decode a page as served by the backend and normalize its blocks
    pub fn from_json(json: &str, ids: &mut impl IdSource) -> Result<Self, BlockError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value, ids)
    }

    pub fn from_value(value: Value, ids: &mut impl IdSource) -> Result<Self, BlockError> {
        let mut page: LandingPage = serde_json::from_value(value)?;
        let repairs = page.content.content_blocks.normalize(ids);
        info!(
            page_id = %page.id,
            blocks = page.content.content_blocks.total_count(),
            opaque = page.content.content_blocks.opaque_count(),
            repairs,
            "Loaded landing page"
        );
        Ok(page)
    }

    pub fn to_json(&self) -> Result<String, BlockError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn blocks(&self) -> &BlockTree {
        &self.content.content_blocks
    }

    /// Overwrite every content field with a snapshot (no merge)
    pub fn apply_content(&mut self, content: PageContent) {
        self.content = content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::SequentialIds;
    use serde_json::json;

    #[test]
    fn test_page_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "id": "p1",
            "username": "ada",
            "logoUrl": "https://cdn/logo.png",
            "backgroundTheme": "sunset",
            "fontColors": {"h1": "#111"},
            "showDownloadButton": true,
            "content_blocks": [{"id": "b1", "type": "heading", "text": "Hi", "glow": 3}],
            "communityEnabled": true
        });

        let page = LandingPage::from_value(raw, &mut SequentialIds::new("x")).unwrap();
        assert_eq!(page.content.logo_url.as_deref(), Some("https://cdn/logo.png"));
        assert_eq!(page.content.font_colors.h1.as_deref(), Some("#111"));
        assert!(page.content.show_download_button);
        assert_eq!(page.blocks().len(), 1);

        let back = serde_json::to_value(&page).unwrap();
        assert_eq!(back["communityEnabled"], json!(true));
        assert_eq!(back["content_blocks"][0]["glow"], json!(3));
    }

    #[test]
    fn test_stringified_blocks_and_missing_motion() {
        let raw = json!({
            "id": "p1",
            "content_blocks": "[{\"id\":\"a\",\"type\":\"divider\"}]"
        });
        let page = LandingPage::from_value(raw, &mut SequentialIds::new("x")).unwrap();
        assert_eq!(page.blocks().len(), 1);
        assert_eq!(page.content.motion_settings, MotionSettings::default());
    }

    #[test]
    fn test_unparseable_blocks_load_as_empty_page() {
        let raw = json!({"id": "p1", "content_blocks": "{{{"});
        let page = LandingPage::from_value(raw, &mut SequentialIds::new("x")).unwrap();
        assert!(page.blocks().is_empty());
    }

    #[test]
    fn test_apply_content_overwrites() {
        let mut page = LandingPage::new("p1", "ada");
        page.content.font_name = Some("Inter".into());

        let snapshot = PageContent {
            background_theme: Some("ocean".into()),
            ..Default::default()
        };
        page.apply_content(snapshot);

        assert_eq!(page.content.font_name, None);
        assert_eq!(page.content.background_theme.as_deref(), Some("ocean"));
        assert_eq!(page.id, "p1");
    }
}
