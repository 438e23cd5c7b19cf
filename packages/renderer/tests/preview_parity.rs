//! The editor form and the preview must agree on every field of every kind.

use chrono::{TimeZone, Utc};
use pagecraft_blocks::{Block, BlockKind, BlockRegistry, BlockTree, FieldKind, PageContent, SequentialIds};
use pagecraft_editor::operations::{add_block, toggle_collapsed, update_field};
use pagecraft_editor::Entitlement;
use pagecraft_renderer::{
    page_to_html, render_editable, render_preview, to_html, BlockPosition, HtmlOptions, MediaArbiter,
    ThemeContext,
};
use serde_json::{json, Value};

fn theme() -> ThemeContext {
    ThemeContext::from_content(&PageContent::default(), MediaArbiter::new())
}

fn preview_html(block: &Block) -> String {
    render_preview(block, &theme())
        .map(|node| to_html(&node, HtmlOptions::compact()))
        .unwrap_or_default()
}

fn fresh(kind: BlockKind) -> BlockTree {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let mut ids = SequentialIds::new("blk");
    add_block(&BlockTree::new(), kind, &BlockRegistry::new(), Entitlement::Pro, &mut ids, now).unwrap()
}

/// A value different from `current`, plus text that must then show up in the HTML
fn edited_value(key: &str, kind: FieldKind, current: &Value) -> (Value, Option<String>) {
    match kind {
        FieldKind::Text | FieldKind::LongText => {
            let text = format!("zq-{}", key);
            (json!(text), Some(text))
        }
        FieldKind::Url => {
            let url = format!("https://example.test/{}", key);
            (json!(url), Some(url))
        }
        FieldKind::Color => (json!("#123456"), Some("#123456".into())),
        FieldKind::Number => (json!(77), Some("77".into())),
        FieldKind::DateTime => (json!("2031-05-06T07:08:09Z"), Some("2031-05-06T07:08:09Z".into())),
        FieldKind::Toggle => (json!(!current.as_bool().unwrap_or(false)), None),
        FieldKind::Select(options) => {
            let other = options
                .iter()
                .find(|option| current.as_str() != Some(**option))
                .unwrap();
            (json!(other), None)
        }
        FieldKind::FaqItems => (
            json!([{"id": "zq", "q": "zq-question", "a": "zq-answer", "open": true}]),
            Some("zq-answer".into()),
        ),
        FieldKind::LinkList => (
            json!([{"platform": "zq-platform", "url": "https://zq.test/me"}]),
            Some("https://zq.test/me".into()),
        ),
    }
}

#[test]
fn test_every_editable_field_reaches_the_preview() {
    for kind in BlockKind::ALL {
        let tree = fresh(kind);
        let block = &tree.blocks()[0];
        let form = render_editable(block, &BlockPosition::default());
        assert!(!form.fields.is_empty(), "{} has no fields", kind);

        let before = preview_html(block);
        for field in &form.fields {
            let (value, expected) = edited_value(field.key, field.kind, &field.value);
            let edited = update_field(&tree, block.id(), field.key, value);
            let after = preview_html(&edited.blocks()[0]);

            assert_ne!(before, after, "{}.{} does not affect the preview", kind, field.key);
            if let Some(expected) = expected {
                assert!(
                    after.contains(&expected),
                    "{}.{} value missing from preview: {}",
                    kind,
                    field.key,
                    after
                );
            }
        }
    }
}

#[test]
fn test_collapsing_never_changes_the_preview() {
    for kind in BlockKind::ALL {
        let tree = fresh(kind);
        let id = tree.blocks()[0].id().clone();
        let collapsed = toggle_collapsed(&tree, &id);

        assert!(collapsed.blocks()[0].collapsed);
        assert_eq!(preview_html(&tree.blocks()[0]), preview_html(&collapsed.blocks()[0]));

        let form = render_editable(&collapsed.blocks()[0], &BlockPosition::default());
        assert!(form.fields.is_empty());
    }
}

#[test]
fn test_new_heading_then_text_update() {
    let tree = fresh(BlockKind::Heading);
    let id = tree.blocks()[0].id().clone();
    assert_eq!(preview_html(&tree.blocks()[0]), "<h2 data-block-id=\"blk-1\" data-block=\"heading\" style=\"color: #111827; text-align: center;\"></h2>");

    let tree = update_field(&tree, &id, "text", json!("Hello"));
    assert!(preview_html(&tree.blocks()[0]).contains(">Hello</h2>"));
}

#[test]
fn test_user_text_is_escaped() {
    let tree = fresh(BlockKind::Paragraph);
    let id = tree.blocks()[0].id().clone();
    let tree = update_field(&tree, &id, "text", json!("<script>alert(1)</script>"));

    let html = preview_html(&tree.blocks()[0]);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[test]
fn test_disabled_children_vanish_from_page() {
    let page_json = json!({
        "id": "p1",
        "username": "ada",
        "content_blocks": [
            {"id": "c", "type": "container", "title": "Bonus", "children": [
                {"id": "a", "type": "paragraph", "text": "shown"},
                {"id": "b", "type": "paragraph", "text": "hidden", "enabled": false}
            ]}
        ]
    });
    let page = pagecraft_blocks::LandingPage::from_value(page_json, &mut SequentialIds::new("x")).unwrap();
    let html = page_to_html(&page, MediaArbiter::new(), HtmlOptions::compact());

    assert!(html.contains(">Bonus</h3>"));
    assert!(html.contains(">shown</p>"));
    assert!(!html.contains("hidden"));
}
