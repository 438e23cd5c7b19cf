use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BlockError;

/// Closed set of block types a landing page can contain.
///
/// Serialized as the snake_case `type` discriminator of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    Image,
    Video,
    Divider,
    Faq,
    Countdown,
    StripeCheckout,
    Container,
    ButtonUrl,
    SocialLinks,
    AudioPlayer,
    ProfileCard,
    SingleOffer,
    MiniOffer,
    SecureCheckout,
    ScrollArrow,
    OfferBanner,
    ReferralButton,
}

impl BlockKind {
    /// Every kind, in palette order
    pub const ALL: [BlockKind; 19] = [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Divider,
        BlockKind::Faq,
        BlockKind::Countdown,
        BlockKind::StripeCheckout,
        BlockKind::Container,
        BlockKind::ButtonUrl,
        BlockKind::SocialLinks,
        BlockKind::AudioPlayer,
        BlockKind::ProfileCard,
        BlockKind::SingleOffer,
        BlockKind::MiniOffer,
        BlockKind::SecureCheckout,
        BlockKind::ScrollArrow,
        BlockKind::OfferBanner,
        BlockKind::ReferralButton,
    ];

    /// Wire name used in the `type` field
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Divider => "divider",
            BlockKind::Faq => "faq",
            BlockKind::Countdown => "countdown",
            BlockKind::StripeCheckout => "stripe_checkout",
            BlockKind::Container => "container",
            BlockKind::ButtonUrl => "button_url",
            BlockKind::SocialLinks => "social_links",
            BlockKind::AudioPlayer => "audio_player",
            BlockKind::ProfileCard => "profile_card",
            BlockKind::SingleOffer => "single_offer",
            BlockKind::MiniOffer => "mini_offer",
            BlockKind::SecureCheckout => "secure_checkout",
            BlockKind::ScrollArrow => "scroll_arrow",
            BlockKind::OfferBanner => "offer_banner",
            BlockKind::ReferralButton => "referral_button",
        }
    }

    /// Human readable name shown in the block palette
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Heading => "Heading",
            BlockKind::Paragraph => "Paragraph",
            BlockKind::Image => "Image",
            BlockKind::Video => "Video",
            BlockKind::Divider => "Divider",
            BlockKind::Faq => "FAQ",
            BlockKind::Countdown => "Countdown Timer",
            BlockKind::StripeCheckout => "Checkout Button",
            BlockKind::Container => "Container",
            BlockKind::ButtonUrl => "Link Button",
            BlockKind::SocialLinks => "Social Links",
            BlockKind::AudioPlayer => "Audio Player",
            BlockKind::ProfileCard => "Profile Card",
            BlockKind::SingleOffer => "Single Offer",
            BlockKind::MiniOffer => "Mini Offer",
            BlockKind::SecureCheckout => "Secure Checkout",
            BlockKind::ScrollArrow => "Scroll Arrow",
            BlockKind::OfferBanner => "Offer Banner",
            BlockKind::ReferralButton => "Referral Button",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, BlockKind::Container)
    }

    /// Kinds that play media and must coordinate playback
    pub fn is_media(self) -> bool {
        matches!(self, BlockKind::AudioPlayer | BlockKind::Video)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BlockError::UnknownKind(s.to_string()))
    }
}
