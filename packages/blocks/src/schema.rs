//! # Block Field Schema
//!
//! Every block kind declares its editable fields exactly once. The registry
//! derives default values from this table, the editor derives its form
//! fields from it, and field updates are validated against it. Keeping all
//! three on one table is what stops the editor and the preview from
//! drifting apart.

use serde::Serialize;
use serde_json::Value;

use crate::kind::BlockKind;

const ALIGNMENTS: &[&str] = &["left", "center", "right"];
const HEADING_LEVELS: &[&str] = &["h1", "h2", "h3"];
const DIVIDER_STYLES: &[&str] = &["solid", "dashed", "dotted"];
const COUNTDOWN_STYLES: &[&str] = &["minimal", "boxed", "bold"];
const CONTAINER_LAYOUTS: &[&str] = &["stack", "grid"];
const ARROW_STYLES: &[&str] = &["arrow", "chevron", "double"];

/// Input widget / value shape of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Url,
    Color,
    Number,
    Toggle,
    DateTime,
    Select(&'static [&'static str]),
    /// `[{id, q, a, open}]`
    FaqItems,
    /// `[{platform, url}]`
    LinkList,
}

impl FieldKind {
    /// Check that a JSON value has the shape this field stores
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text
            | FieldKind::LongText
            | FieldKind::Url
            | FieldKind::Color
            | FieldKind::DateTime => value.is_string(),
            FieldKind::Select(options) => value
                .as_str()
                .map(|s| options.contains(&s))
                .unwrap_or(false),
            FieldKind::Number => value.is_number(),
            FieldKind::Toggle => value.is_boolean(),
            FieldKind::FaqItems | FieldKind::LinkList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_object))
                .unwrap_or(false),
        }
    }
}

/// How the registry seeds a field on a freshly added block
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Number(f64),
    Toggle(bool),
    /// RFC 3339 timestamp this many days after creation
    DaysFromNow(i64),
    /// One starter question with a fresh item id
    StarterFaq,
    EmptyList,
}

/// One editable field of a block kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
}

const fn field(
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
    default: FieldDefault,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        default,
    }
}

const HEADING: &[FieldSpec] = &[
    field("text", "Text", FieldKind::Text, FieldDefault::Text("")),
    field("level", "Level", FieldKind::Select(HEADING_LEVELS), FieldDefault::Text("h2")),
    field("alignment", "Alignment", FieldKind::Select(ALIGNMENTS), FieldDefault::Text("center")),
];

const PARAGRAPH: &[FieldSpec] = &[
    field("text", "Text", FieldKind::LongText, FieldDefault::Text("")),
    field("alignment", "Alignment", FieldKind::Select(ALIGNMENTS), FieldDefault::Text("left")),
];

const IMAGE: &[FieldSpec] = &[
    field("url", "Image URL", FieldKind::Url, FieldDefault::Text("")),
    field("alt", "Alt Text", FieldKind::Text, FieldDefault::Text("")),
    field("caption", "Caption", FieldKind::Text, FieldDefault::Text("")),
    field("linkUrl", "Link URL", FieldKind::Url, FieldDefault::Text("")),
];

const VIDEO: &[FieldSpec] = &[
    field("url", "Video URL", FieldKind::Url, FieldDefault::Text("")),
    field("caption", "Caption", FieldKind::Text, FieldDefault::Text("")),
];

const DIVIDER: &[FieldSpec] = &[
    field("style", "Style", FieldKind::Select(DIVIDER_STYLES), FieldDefault::Text("solid")),
    field("color", "Color", FieldKind::Color, FieldDefault::Text("#e5e7eb")),
    field("spacing", "Spacing", FieldKind::Number, FieldDefault::Number(24.0)),
];

const FAQ: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, FieldDefault::Text("Frequently Asked Questions")),
    field("items", "Questions", FieldKind::FaqItems, FieldDefault::StarterFaq),
];

const COUNTDOWN: &[FieldSpec] = &[
    field("text", "Label", FieldKind::Text, FieldDefault::Text("Offer Ends In:")),
    field("targetDate", "Ends At", FieldKind::DateTime, FieldDefault::DaysFromNow(7)),
    field("alignment", "Alignment", FieldKind::Select(ALIGNMENTS), FieldDefault::Text("center")),
    field("styleVariant", "Style", FieldKind::Select(COUNTDOWN_STYLES), FieldDefault::Text("minimal")),
];

const STRIPE_CHECKOUT: &[FieldSpec] = &[
    field("text", "Button Text", FieldKind::Text, FieldDefault::Text("Buy Now")),
    field("price", "Price", FieldKind::Text, FieldDefault::Text("$19.99")),
    field("productName", "Product Name", FieldKind::Text, FieldDefault::Text("")),
    field("pdfUrl", "Product File", FieldKind::Url, FieldDefault::Text("")),
    field("buttonColor", "Button Color", FieldKind::Color, FieldDefault::Text("#6366f1")),
    field("textColor", "Text Color", FieldKind::Color, FieldDefault::Text("#ffffff")),
];

const CONTAINER: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, FieldDefault::Text("")),
    field("backgroundColor", "Background", FieldKind::Color, FieldDefault::Text("transparent")),
    field("padding", "Padding", FieldKind::Number, FieldDefault::Number(16.0)),
    field("layout", "Layout", FieldKind::Select(CONTAINER_LAYOUTS), FieldDefault::Text("stack")),
];

const BUTTON_URL: &[FieldSpec] = &[
    field("text", "Button Text", FieldKind::Text, FieldDefault::Text("Visit")),
    field("url", "URL", FieldKind::Url, FieldDefault::Text("")),
    field("buttonColor", "Button Color", FieldKind::Color, FieldDefault::Text("#111827")),
    field("textColor", "Text Color", FieldKind::Color, FieldDefault::Text("#ffffff")),
    field("openInNewTab", "Open In New Tab", FieldKind::Toggle, FieldDefault::Toggle(true)),
];

const SOCIAL_LINKS: &[FieldSpec] = &[
    field("links", "Links", FieldKind::LinkList, FieldDefault::EmptyList),
    field("alignment", "Alignment", FieldKind::Select(ALIGNMENTS), FieldDefault::Text("center")),
    field("iconColor", "Icon Color", FieldKind::Color, FieldDefault::Text("#111827")),
];

const AUDIO_PLAYER: &[FieldSpec] = &[
    field("url", "Audio URL", FieldKind::Url, FieldDefault::Text("")),
    field("title", "Title", FieldKind::Text, FieldDefault::Text("")),
    field("artist", "Artist", FieldKind::Text, FieldDefault::Text("")),
    field("coverUrl", "Cover Image", FieldKind::Url, FieldDefault::Text("")),
];

const PROFILE_CARD: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text, FieldDefault::Text("")),
    field("bio", "Bio", FieldKind::LongText, FieldDefault::Text("")),
    field("avatarUrl", "Avatar", FieldKind::Url, FieldDefault::Text("")),
    field("verified", "Verified Badge", FieldKind::Toggle, FieldDefault::Toggle(false)),
];

const SINGLE_OFFER: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, FieldDefault::Text("My Offer")),
    field("description", "Description", FieldKind::LongText, FieldDefault::Text("")),
    field("price", "Price", FieldKind::Text, FieldDefault::Text("$49")),
    field("imageUrl", "Image", FieldKind::Url, FieldDefault::Text("")),
    field("buttonText", "Button Text", FieldKind::Text, FieldDefault::Text("Get It Now")),
    field("buttonUrl", "Button URL", FieldKind::Url, FieldDefault::Text("")),
];

const MINI_OFFER: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, FieldDefault::Text("")),
    field("price", "Price", FieldKind::Text, FieldDefault::Text("")),
    field("imageUrl", "Image", FieldKind::Url, FieldDefault::Text("")),
    field("buttonUrl", "Button URL", FieldKind::Url, FieldDefault::Text("")),
];

const SECURE_CHECKOUT: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, FieldDefault::Text("Secure Checkout")),
    field("price", "Price", FieldKind::Text, FieldDefault::Text("$29.99")),
    field("productName", "Product Name", FieldKind::Text, FieldDefault::Text("")),
    field("buttonText", "Button Text", FieldKind::Text, FieldDefault::Text("Complete Purchase")),
    field("showGuarantee", "Show Guarantee", FieldKind::Toggle, FieldDefault::Toggle(true)),
    field(
        "guaranteeText",
        "Guarantee Text",
        FieldKind::Text,
        FieldDefault::Text("30-day money-back guarantee"),
    ),
];

const SCROLL_ARROW: &[FieldSpec] = &[
    field("text", "Label", FieldKind::Text, FieldDefault::Text("Scroll")),
    field("color", "Color", FieldKind::Color, FieldDefault::Text("#111827")),
    field("style", "Style", FieldKind::Select(ARROW_STYLES), FieldDefault::Text("chevron")),
];

const OFFER_BANNER: &[FieldSpec] = &[
    field("text", "Text", FieldKind::Text, FieldDefault::Text("Limited time offer!")),
    field("backgroundColor", "Background", FieldKind::Color, FieldDefault::Text("#ef4444")),
    field("textColor", "Text Color", FieldKind::Color, FieldDefault::Text("#ffffff")),
    field("linkUrl", "Link URL", FieldKind::Url, FieldDefault::Text("")),
];

const REFERRAL_BUTTON: &[FieldSpec] = &[
    field("text", "Button Text", FieldKind::Text, FieldDefault::Text("Refer a friend")),
    field("referralCode", "Referral Code", FieldKind::Text, FieldDefault::Text("")),
    field("reward", "Reward", FieldKind::Text, FieldDefault::Text("")),
];

/// Editable fields of a block kind, in form order
pub fn schema(kind: BlockKind) -> &'static [FieldSpec] {
    match kind {
        BlockKind::Heading => HEADING,
        BlockKind::Paragraph => PARAGRAPH,
        BlockKind::Image => IMAGE,
        BlockKind::Video => VIDEO,
        BlockKind::Divider => DIVIDER,
        BlockKind::Faq => FAQ,
        BlockKind::Countdown => COUNTDOWN,
        BlockKind::StripeCheckout => STRIPE_CHECKOUT,
        BlockKind::Container => CONTAINER,
        BlockKind::ButtonUrl => BUTTON_URL,
        BlockKind::SocialLinks => SOCIAL_LINKS,
        BlockKind::AudioPlayer => AUDIO_PLAYER,
        BlockKind::ProfileCard => PROFILE_CARD,
        BlockKind::SingleOffer => SINGLE_OFFER,
        BlockKind::MiniOffer => MINI_OFFER,
        BlockKind::SecureCheckout => SECURE_CHECKOUT,
        BlockKind::ScrollArrow => SCROLL_ARROW,
        BlockKind::OfferBanner => OFFER_BANNER,
        BlockKind::ReferralButton => REFERRAL_BUTTON,
    }
}

/// Look up a single field spec
pub fn field_spec(kind: BlockKind, key: &str) -> Option<&'static FieldSpec> {
    schema(kind).iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_keys_unique_per_kind() {
        for kind in BlockKind::ALL {
            let keys: HashSet<_> = schema(kind).iter().map(|f| f.key).collect();
            assert_eq!(keys.len(), schema(kind).len(), "duplicate key in {}", kind);
        }
    }

    #[test]
    fn test_schema_never_declares_reserved_keys() {
        for kind in BlockKind::ALL {
            for spec in schema(kind) {
                assert!(
                    !matches!(spec.key, "id" | "type" | "enabled" | "collapsed" | "children" | "motion"),
                    "{} declares reserved key {}",
                    kind,
                    spec.key
                );
            }
        }
    }

    #[test]
    fn test_select_accepts_only_options() {
        let kind = FieldKind::Select(ALIGNMENTS);
        assert!(kind.accepts(&json!("center")));
        assert!(!kind.accepts(&json!("justify")));
        assert!(!kind.accepts(&json!(1)));
    }

    #[test]
    fn test_list_fields_require_objects() {
        assert!(FieldKind::FaqItems.accepts(&json!([{"q": "a"}])));
        assert!(!FieldKind::FaqItems.accepts(&json!(["a"])));
        assert!(!FieldKind::LinkList.accepts(&json!("x")));
    }

    #[test]
    fn test_countdown_defaults_described() {
        let spec = field_spec(BlockKind::Countdown, "targetDate").unwrap();
        assert_eq!(spec.default, FieldDefault::DaysFromNow(7));
        assert!(field_spec(BlockKind::Countdown, "nope").is_none());
    }
}
