//! # Pagecraft Renderer
//!
//! Two views over the same block tree:
//!
//! - **editable**: form model with field inputs and controls, each control
//!   carrying the [`pagecraft_editor::Mutation`] it dispatches
//! - **preview**: read-only node tree of the published page, serialized to
//!   HTML by [`to_html`] / [`page_to_html`]
//!
//! Both views read field definitions from [`pagecraft_blocks::schema`], so a
//! field the editor shows is always a field the preview renders.
//!
//! ```rust,ignore
//! use pagecraft_renderer::{page_to_html, render_editor, HtmlOptions, MediaArbiter};
//!
//! let forms = render_editor(page.blocks());
//! let html = page_to_html(&page, MediaArbiter::new(), HtmlOptions::default());
//! ```

pub mod editable;
pub mod error;
pub mod html;
pub mod media;
pub mod motion;
pub mod preview;
pub mod theme;
pub mod vnode;

pub use editable::{render_editable, render_editor, Affordance, AffordanceKind, BlockPosition, FormField, FormNode};
pub use error::RenderError;
pub use html::{escape_html, to_html, HtmlOptions};
pub use media::{MediaArbiter, MediaHandle, PlayerState};
pub use motion::{resolve_transition, transition_for_block, Easing, Keyframe, Preset, TransitionDescriptor};
pub use preview::{render_page, render_preview};
pub use theme::{resolve_background, ThemeContext};
pub use vnode::VNode;

use pagecraft_blocks::LandingPage;

use html::{write_node, Context};

/// Render a page as a complete HTML document
pub fn page_to_html(page: &LandingPage, media: MediaArbiter, options: HtmlOptions) -> String {
    let theme = ThemeContext::from_content(&page.content, media);
    let body = render_page(page, &theme);

    let mut ctx = Context::new(options);
    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html lang=\"en\">");
    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!("<title>{}</title>", escape_html(&page.username)));

    if let (Some(name), Some(url)) = (theme.font_name.as_deref(), theme.font_file_url.as_deref()) {
        if !name.is_empty() && !url.is_empty() {
            ctx.add_line("<style>");
            ctx.indent();
            ctx.add_line(&format!(
                "@font-face {{ font-family: '{}'; src: url('{}'); font-display: swap; }}",
                css_string(name),
                css_string(url)
            ));
            ctx.dedent();
            ctx.add_line("</style>");
        }
    }

    ctx.dedent();
    ctx.add_line("</head>");
    ctx.add_line("<body>");
    ctx.indent();
    write_node(&body, &mut ctx);
    ctx.dedent();
    ctx.add_line("</body>");
    ctx.add_line("</html>");

    ctx.get_output()
}

fn css_string(value: &str) -> String {
    value.replace(['\'', '\\', '<', '>'], "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_blocks::{Block, BlockKind, FieldBag};

    #[test]
    fn test_page_document_shell() {
        let mut page = LandingPage::new("p1", "ada");
        page.content.font_name = Some("Inter".into());
        page.content.font_file_url = Some("https://cdn/inter.woff2".into());
        page.content.content_blocks =
            vec![Block::new("h", BlockKind::Heading, FieldBag::new()).with_field("text", "Welcome")].into();

        let html = page_to_html(&page, MediaArbiter::new(), HtmlOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>ada</title>"));
        assert!(html.contains("@font-face { font-family: 'Inter'; src: url('https://cdn/inter.woff2');"));
        assert!(html.contains(">Welcome</h2>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
