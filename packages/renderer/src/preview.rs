//! # Preview Renderer
//!
//! Read-only rendering of blocks as they will appear on the published
//! page. Every field a kind declares in its schema is consumed here; the
//! parity tests hold this module to that.
//!
//! Editor-only state (`collapsed`) is never read. Disabled blocks render
//! to nothing.

use pagecraft_blocks::{Block, BlockKind, LandingPage};
use tracing::debug;

use crate::motion::transition_for_block;
use crate::theme::ThemeContext;
use crate::vnode::VNode;

/// Render one block, `None` when it is disabled
pub fn render_preview(block: &Block, theme: &ThemeContext) -> Option<VNode> {
    if !block.enabled {
        return None;
    }

    let node = match block.kind() {
        BlockKind::Heading => heading(block, theme),
        BlockKind::Paragraph => paragraph(block, theme),
        BlockKind::Image => image(block),
        BlockKind::Video => video(block, theme),
        BlockKind::Divider => divider(block),
        BlockKind::Faq => faq(block, theme),
        BlockKind::Countdown => countdown(block),
        BlockKind::StripeCheckout => stripe_checkout(block),
        BlockKind::Container => container(block, theme),
        BlockKind::ButtonUrl => button_url(block),
        BlockKind::SocialLinks => social_links(block),
        BlockKind::AudioPlayer => audio_player(block, theme),
        BlockKind::ProfileCard => profile_card(block, theme),
        BlockKind::SingleOffer => single_offer(block),
        BlockKind::MiniOffer => mini_offer(block),
        BlockKind::SecureCheckout => secure_checkout(block),
        BlockKind::ScrollArrow => scroll_arrow(block),
        BlockKind::OfferBanner => offer_banner(block),
        BlockKind::ReferralButton => referral_button(block),
    };

    Some(
        node.with_key(block.id().as_str())
            .with_attr("data-block", block.kind().as_str()),
    )
}

/// Render the whole page body: theme, header images, every visible block
/// with its scroll-in transition, and the optional download form
pub fn render_page(page: &LandingPage, theme: &ThemeContext) -> VNode {
    let content = &page.content;
    let mut main = VNode::element("main")
        .with_attr("class", "pc-page")
        .with_style("background", theme.background.as_str())
        .with_style("color", theme.text_color.as_str())
        .with_style("font-family", theme.font_family())
        .with_style("min-height", "100vh");

    let logo = content.logo_url.as_deref().unwrap_or("");
    let cover = content.cover_image_url.as_deref().unwrap_or("");
    if !logo.is_empty() || !cover.is_empty() {
        let mut header = VNode::element("header").with_attr("class", "pc-header");
        if !cover.is_empty() {
            header = header.with_child(
                VNode::element("img")
                    .with_attr("class", "pc-cover")
                    .with_attr("src", cover)
                    .with_attr("alt", ""),
            );
        }
        if !logo.is_empty() {
            header = header.with_child(
                VNode::element("img")
                    .with_attr("class", "pc-logo")
                    .with_attr("src", logo)
                    .with_attr("alt", page.username.as_str()),
            );
        }
        main = main.with_child(header);
    }

    let visible = page.blocks().blocks().iter().filter(|b| b.enabled);
    let mut rendered = 0;
    for (index, block) in visible.enumerate() {
        if let Some(mut node) = render_preview(block, theme) {
            if let Some(transition) = transition_for_block(&content.motion_settings, block, index) {
                for (key, value) in transition.to_attributes() {
                    node = node.with_attr(key, value);
                }
            }
            main = main.with_child(node);
            rendered += 1;
        }
    }

    if content.show_download_button {
        if let Some(pdf) = page.pdf_url.as_deref().filter(|p| !p.is_empty()) {
            main = main.with_child(download_form(pdf));
        }
    }

    debug!(page_id = %page.id, blocks = rendered, "Rendered page preview");
    main
}

fn download_form(pdf_url: &str) -> VNode {
    VNode::element("form")
        .with_attr("class", "pc-download")
        .with_attr("data-pdf-url", pdf_url)
        .with_child(
            VNode::element("input")
                .with_attr("type", "email")
                .with_attr("name", "email")
                .with_attr("placeholder", "Your email")
                .with_attr("required", "required"),
        )
        .with_child(
            VNode::with_text("button", "Get the free download").with_attr("type", "submit"),
        )
}

fn heading(block: &Block, theme: &ThemeContext) -> VNode {
    let level = match block.text("level") {
        "h1" => "h1",
        "h3" => "h3",
        _ => "h2",
    };
    VNode::with_text(level, block.text("text"))
        .with_style("text-align", alignment(block, "center"))
        .with_style("color", theme.color_for(level))
}

fn paragraph(block: &Block, theme: &ThemeContext) -> VNode {
    VNode::with_text("p", block.text("text"))
        .with_style("text-align", alignment(block, "left"))
        .with_style("color", theme.color_for("p"))
        .with_style("white-space", "pre-line")
}

fn image(block: &Block) -> VNode {
    let img = VNode::element("img")
        .with_attr("src", block.text("url"))
        .with_attr("alt", block.text("alt"))
        .with_style("max-width", "100%");

    let img = match block.text("linkUrl") {
        "" => img,
        href => VNode::element("a")
            .with_attr("href", href)
            .with_attr("rel", "noopener")
            .with_child(img),
    };

    let mut figure = VNode::element("figure").with_child(img);
    if !block.text("caption").is_empty() {
        figure = figure.with_child(VNode::with_text("figcaption", block.text("caption")));
    }
    figure
}

fn video(block: &Block, theme: &ThemeContext) -> VNode {
    let slot = theme.media.register(block.id().as_str());
    let mut node = VNode::element("div").with_attr("class", "pc-video").with_child(
        VNode::element("iframe")
            .with_attr("src", block.text("url"))
            .with_attr("allowfullscreen", "true")
            .with_attr("data-media-slot", slot.as_str()),
    );
    if !block.text("caption").is_empty() {
        node = node.with_child(VNode::with_text("p", block.text("caption")).with_attr("class", "pc-caption"));
    }
    node
}

fn divider(block: &Block) -> VNode {
    let style = match block.text("style") {
        "dashed" => "dashed",
        "dotted" => "dotted",
        _ => "solid",
    };
    let spacing = block.number("spacing").unwrap_or(24.0);
    VNode::element("hr")
        .with_style("border", "none")
        .with_style("border-top", format!("1px {} {}", style, or(block.text("color"), "#e5e7eb")))
        .with_style("margin", format!("{}px 0", spacing))
}

fn faq(block: &Block, theme: &ThemeContext) -> VNode {
    let items = block.faq_items().into_iter().map(|item| {
        let details = VNode::element("details")
            .with_attr("data-item-id", item.id.as_str())
            .with_child(VNode::with_text("summary", item.q.as_str()))
            .with_child(VNode::with_text("p", item.a.as_str()));
        if item.open {
            details.with_attr("open", "open")
        } else {
            details
        }
    });

    VNode::element("section")
        .with_attr("class", "pc-faq")
        .with_child(VNode::with_text("h3", block.text("title")).with_style("color", theme.color_for("h3")))
        .with_children(items)
}

fn countdown(block: &Block) -> VNode {
    let variant = match block.text("styleVariant") {
        "boxed" => "boxed",
        "bold" => "bold",
        _ => "minimal",
    };
    let units = ["days", "hours", "minutes", "seconds"].into_iter().map(|unit| {
        VNode::element("span")
            .with_attr("class", "pc-countdown-unit")
            .with_attr("data-unit", unit)
            .with_child(VNode::text("00"))
    });

    VNode::element("div")
        .with_attr("class", format!("pc-countdown pc-countdown--{}", variant))
        .with_style("text-align", alignment(block, "center"))
        .with_child(VNode::with_text("p", block.text("text")))
        .with_child(
            VNode::element("time")
                .with_attr("datetime", block.text("targetDate"))
                .with_children(units),
        )
}

fn stripe_checkout(block: &Block) -> VNode {
    let mut node = VNode::element("div")
        .with_attr("class", "pc-checkout")
        .with_attr_opt("data-pdf-url", block.text("pdfUrl"));
    if !block.text("productName").is_empty() {
        node = node.with_child(VNode::with_text("p", block.text("productName")).with_attr("class", "pc-product"));
    }
    node.with_child(
        VNode::element("button")
            .with_attr("type", "button")
            .with_attr("data-price", block.text("price"))
            .with_style("background", or(block.text("buttonColor"), "#6366f1"))
            .with_style("color", or(block.text("textColor"), "#ffffff"))
            .with_child(VNode::text(format!("{} · {}", block.text("text"), block.text("price")))),
    )
}

fn container(block: &Block, theme: &ThemeContext) -> VNode {
    let layout = match block.text("layout") {
        "grid" => "grid",
        _ => "stack",
    };
    let padding = block.number("padding").unwrap_or(16.0);

    let mut node = VNode::element("div")
        .with_attr("class", "pc-container")
        .with_attr("data-layout", layout)
        .with_style("background", or(block.text("backgroundColor"), "transparent"))
        .with_style("padding", format!("{}px", padding));
    if layout == "grid" {
        node = node
            .with_style("display", "grid")
            .with_style("grid-template-columns", "repeat(2, minmax(0, 1fr))");
    }
    if !block.text("title").is_empty() {
        node = node.with_child(VNode::with_text("h3", block.text("title")).with_style("color", theme.color_for("h3")));
    }
    node.with_children(block.children().iter().filter_map(|child| render_preview(child, theme)))
}

fn button_url(block: &Block) -> VNode {
    let node = VNode::element("a")
        .with_attr("class", "pc-button")
        .with_attr("href", or(block.text("url"), "#"))
        .with_style("background", or(block.text("buttonColor"), "#111827"))
        .with_style("color", or(block.text("textColor"), "#ffffff"))
        .with_child(VNode::text(block.text("text")));
    if block.flag("openInNewTab") {
        node.with_attr("target", "_blank").with_attr("rel", "noopener noreferrer")
    } else {
        node
    }
}

fn social_links(block: &Block) -> VNode {
    let color = or(block.text("iconColor"), "#111827");
    let links = block.social_links().into_iter().map(|link| {
        VNode::element("a")
            .with_attr("href", link.url.as_str())
            .with_attr("data-platform", link.platform.as_str())
            .with_attr("rel", "noopener")
            .with_style("color", color)
            .with_child(VNode::text(link.platform.as_str()))
    });
    VNode::element("nav")
        .with_attr("class", "pc-social")
        .with_style("color", color)
        .with_style("text-align", alignment(block, "center"))
        .with_children(links)
}

fn audio_player(block: &Block, theme: &ThemeContext) -> VNode {
    let slot = theme.media.register(block.id().as_str());
    let mut node = VNode::element("div").with_attr("class", "pc-audio");
    if !block.text("coverUrl").is_empty() {
        node = node.with_child(
            VNode::element("img")
                .with_attr("class", "pc-audio-cover")
                .with_attr("src", block.text("coverUrl"))
                .with_attr("alt", block.text("title")),
        );
    }
    node.with_child(VNode::with_text("p", block.text("title")).with_attr("class", "pc-audio-title"))
        .with_child(VNode::with_text("p", block.text("artist")).with_attr("class", "pc-audio-artist"))
        .with_child(
            VNode::element("audio")
                .with_attr("src", block.text("url"))
                .with_attr("controls", "controls")
                .with_attr("preload", "none")
                .with_attr("data-media-slot", slot.as_str()),
        )
}

fn profile_card(block: &Block, theme: &ThemeContext) -> VNode {
    let mut name = VNode::element("h2")
        .with_style("color", theme.color_for("h2"))
        .with_child(VNode::text(block.text("name")));
    if block.flag("verified") {
        name = name.with_child(
            VNode::with_text("span", "✓")
                .with_attr("class", "pc-verified")
                .with_attr("title", "Verified"),
        );
    }

    let mut node = VNode::element("div").with_attr("class", "pc-profile");
    if !block.text("avatarUrl").is_empty() {
        node = node.with_child(
            VNode::element("img")
                .with_attr("class", "pc-avatar")
                .with_attr("src", block.text("avatarUrl"))
                .with_attr("alt", block.text("name")),
        );
    }
    node.with_child(name)
        .with_child(VNode::with_text("p", block.text("bio")).with_style("color", theme.color_for("p")))
}

fn single_offer(block: &Block) -> VNode {
    let mut node = VNode::element("article").with_attr("class", "pc-offer");
    if !block.text("imageUrl").is_empty() {
        node = node.with_child(
            VNode::element("img")
                .with_attr("src", block.text("imageUrl"))
                .with_attr("alt", block.text("title")),
        );
    }
    node.with_child(VNode::with_text("h3", block.text("title")))
        .with_child(VNode::with_text("p", block.text("description")))
        .with_child(VNode::with_text("p", block.text("price")).with_attr("class", "pc-price"))
        .with_child(
            VNode::with_text("a", block.text("buttonText"))
                .with_attr("class", "pc-button")
                .with_attr("href", or(block.text("buttonUrl"), "#")),
        )
}

fn mini_offer(block: &Block) -> VNode {
    let mut node = VNode::element("a")
        .with_attr("class", "pc-mini-offer")
        .with_attr("href", or(block.text("buttonUrl"), "#"));
    if !block.text("imageUrl").is_empty() {
        node = node.with_child(
            VNode::element("img")
                .with_attr("src", block.text("imageUrl"))
                .with_attr("alt", ""),
        );
    }
    node.with_child(VNode::with_text("span", block.text("title")).with_attr("class", "pc-mini-title"))
        .with_child(VNode::with_text("span", block.text("price")).with_attr("class", "pc-price"))
}

fn secure_checkout(block: &Block) -> VNode {
    let mut node = VNode::element("section")
        .with_attr("class", "pc-secure-checkout")
        .with_child(VNode::with_text("h3", block.text("title")))
        .with_child(VNode::with_text("p", block.text("productName")).with_attr("class", "pc-product"))
        .with_child(VNode::with_text("p", block.text("price")).with_attr("class", "pc-price"))
        .with_child(
            VNode::with_text("button", block.text("buttonText"))
                .with_attr("type", "button")
                .with_attr("data-price", block.text("price")),
        );
    if block.flag("showGuarantee") {
        node = node.with_child(VNode::with_text("p", block.text("guaranteeText")).with_attr("class", "pc-guarantee"));
    }
    node
}

fn scroll_arrow(block: &Block) -> VNode {
    let (style, glyph) = match block.text("style") {
        "arrow" => ("arrow", "↓"),
        "double" => ("double", "⇊"),
        _ => ("chevron", "⌄"),
    };
    VNode::element("a")
        .with_attr("class", format!("pc-scroll pc-scroll--{}", style))
        .with_attr("href", "#next")
        .with_style_opt("color", block.text("color"))
        .with_child(VNode::with_text("span", block.text("text")))
        .with_child(VNode::with_text("span", glyph).with_attr("aria-hidden", "true"))
}

fn offer_banner(block: &Block) -> VNode {
    let text = match block.text("linkUrl") {
        "" => VNode::with_text("span", block.text("text")),
        href => VNode::with_text("a", block.text("text"))
            .with_attr("href", href)
            .with_style("color", "inherit"),
    };
    VNode::element("div")
        .with_attr("class", "pc-banner")
        .with_style("background", or(block.text("backgroundColor"), "#ef4444"))
        .with_style("color", or(block.text("textColor"), "#ffffff"))
        .with_child(text)
}

fn referral_button(block: &Block) -> VNode {
    let code = block.text("referralCode");
    let href = if code.is_empty() {
        "#".to_string()
    } else {
        format!("?ref={}", code)
    };
    let mut node = VNode::element("div").with_attr("class", "pc-referral").with_child(
        VNode::with_text("a", block.text("text"))
            .with_attr("class", "pc-button")
            .with_attr("href", href)
            .with_attr_opt("data-referral-code", code),
    );
    if !block.text("reward").is_empty() {
        node = node.with_child(VNode::with_text("p", block.text("reward")).with_attr("class", "pc-reward"));
    }
    node
}

fn alignment<'a>(block: &'a Block, default: &'a str) -> &'a str {
    match block.text("alignment") {
        a @ ("left" | "center" | "right") => a,
        _ => default,
    }
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_blocks::{BlockMotion, FieldBag, PageContent};
    use serde_json::json;

    fn theme() -> ThemeContext {
        ThemeContext::from_content(&PageContent::default(), Default::default())
    }

    #[test]
    fn test_heading_uses_text_and_level() {
        let block = Block::new("h", BlockKind::Heading, FieldBag::new())
            .with_field("text", "Hello")
            .with_field("level", "h1");
        let node = render_preview(&block, &theme()).unwrap();
        assert_eq!(node.tag(), Some("h1"));
        assert_eq!(node.text_content(), "Hello");
        assert_eq!(node.attr("data-block"), Some("heading"));
    }

    #[test]
    fn test_disabled_block_renders_nothing() {
        let mut block = Block::new("h", BlockKind::Heading, FieldBag::new());
        block.enabled = false;
        assert!(render_preview(&block, &theme()).is_none());
    }

    #[test]
    fn test_collapsed_does_not_change_output() {
        let mut block = Block::new("p", BlockKind::Paragraph, FieldBag::new()).with_field("text", "x");
        let open = render_preview(&block, &theme());
        block.collapsed = true;
        assert_eq!(render_preview(&block, &theme()), open);
    }

    #[test]
    fn test_container_recurses_in_order_skipping_disabled() {
        let mut hidden = Block::new("b", BlockKind::Paragraph, FieldBag::new()).with_field("text", "B");
        hidden.enabled = false;
        let block = Block::new("c", BlockKind::Container, FieldBag::new()).with_children(vec![
            Block::new("a", BlockKind::Paragraph, FieldBag::new()).with_field("text", "A"),
            hidden,
            Block::new("z", BlockKind::Paragraph, FieldBag::new()).with_field("text", "Z"),
        ]);
        let node = render_preview(&block, &theme()).unwrap();
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.text_content(), "AZ");
    }

    #[test]
    fn test_media_blocks_share_arbiter() {
        let theme = theme();
        let audio = Block::new("a", BlockKind::AudioPlayer, FieldBag::new()).with_field("url", "https://x/a.mp3");
        let node = render_preview(&audio, &theme).unwrap();
        let player = node.find(&|n| n.tag() == Some("audio")).unwrap();
        let slot = player.attr("data-media-slot").unwrap();

        let handle = theme.media.register("a");
        assert_eq!(handle.as_str(), slot);
    }

    #[test]
    fn test_page_applies_motion_and_download_form() {
        let mut page = LandingPage::new("p1", "ada");
        page.pdf_url = Some("https://cdn/guide.pdf".into());
        page.content.show_download_button = true;

        let mut still = Block::new("b", BlockKind::Paragraph, FieldBag::new());
        still.motion = Some(BlockMotion {
            preset: None,
            disabled: true,
        });
        page.content.content_blocks = vec![Block::new("a", BlockKind::Heading, FieldBag::new()), still].into();

        let node = render_page(&page, &theme());
        let heading = node.find(&|n| n.attr("data-block") == Some("heading")).unwrap();
        assert_eq!(heading.attr("data-motion"), Some("fade-up"));

        let paragraph = node.find(&|n| n.attr("data-block") == Some("paragraph")).unwrap();
        assert_eq!(paragraph.attr("data-motion"), None);

        let form = node.find(&|n| n.tag() == Some("form")).unwrap();
        assert_eq!(form.attr("data-pdf-url"), Some("https://cdn/guide.pdf"));
    }

    #[test]
    fn test_faq_items_render_open_state() {
        let block = Block::new("f", BlockKind::Faq, FieldBag::new()).with_field(
            "items",
            json!([{"id": "1", "q": "Why?", "a": "Because", "open": true}]),
        );
        let node = render_preview(&block, &theme()).unwrap();
        let details = node.find(&|n| n.tag() == Some("details")).unwrap();
        assert_eq!(details.attr("open"), Some("open"));
        assert!(node.text_content().contains("Because"));
    }
}
