//! # Block Registry
//!
//! Static metadata per block kind: default field values, per-page instance
//! caps, and which kinds require the "Pro" entitlement.
//!
//! The kind set is closed (see [`BlockKind`]), so unknown kinds can only
//! appear in configuration. They are rejected when the registry is built,
//! never when it is queried.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::block::{Block, FieldBag};
use crate::error::BlockError;
use crate::id_generator::IdSource;
use crate::kind::BlockKind;
use crate::schema::{schema, FieldDefault};

/// Kinds that may appear at most once per page
const SINGLETON_KINDS: &[BlockKind] = &[
    BlockKind::AudioPlayer,
    BlockKind::ProfileCard,
    BlockKind::ScrollArrow,
    BlockKind::SecureCheckout,
    BlockKind::OfferBanner,
    BlockKind::ReferralButton,
];

const PRO_KINDS: &[BlockKind] = &[
    BlockKind::StripeCheckout,
    BlockKind::AudioPlayer,
    BlockKind::SingleOffer,
    BlockKind::MiniOffer,
    BlockKind::SecureCheckout,
    BlockKind::OfferBanner,
    BlockKind::ReferralButton,
];

/// Registry of per-kind defaults, caps and entitlement gates
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRegistry {
    limits: BTreeMap<BlockKind, usize>,
    pro_only: BTreeSet<BlockKind>,
}

impl BlockRegistry {
    /// Registry with the stock caps and Pro gates
    pub fn new() -> Self {
        Self {
            limits: SINGLETON_KINDS.iter().map(|kind| (*kind, 1)).collect(),
            pro_only: PRO_KINDS.iter().copied().collect(),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            registry: Self::new(),
            errors: Vec::new(),
        }
    }

    /// Fresh field bag for a kind. `now` seeds time-relative defaults.
    pub fn defaults(&self, kind: BlockKind, now: DateTime<Utc>, ids: &mut impl IdSource) -> FieldBag {
        let mut bag = FieldBag::new();
        for spec in schema(kind) {
            let value = match spec.default {
                FieldDefault::Text(text) => Value::String(text.to_string()),
                FieldDefault::Number(n) => json!(n),
                FieldDefault::Toggle(b) => Value::Bool(b),
                FieldDefault::DaysFromNow(days) => Value::String(
                    (now + Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                FieldDefault::StarterFaq => json!([{
                    "id": ids.new_id(),
                    "q": "What will I get?",
                    "a": "",
                    "open": false,
                }]),
                FieldDefault::EmptyList => Value::Array(Vec::new()),
            };
            bag.insert(spec.key.to_string(), value);
        }
        bag
    }

    /// Construct a new block with registry defaults and a fresh id
    pub fn create_block(&self, kind: BlockKind, now: DateTime<Utc>, ids: &mut impl IdSource) -> Block {
        let id = ids.new_id();
        let fields = self.defaults(kind, now, ids);
        Block::new(id, kind, fields)
    }

    /// Maximum instances per page (root and containers combined), `None` = unlimited
    pub fn limit(&self, kind: BlockKind) -> Option<usize> {
        self.limits.get(&kind).copied()
    }

    pub fn is_pro_only(&self, kind: BlockKind) -> bool {
        self.pro_only.contains(&kind)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for registries customised from configuration
#[derive(Debug)]
pub struct RegistryBuilder {
    registry: BlockRegistry,
    errors: Vec<String>,
}

impl RegistryBuilder {
    pub fn limit(mut self, kind: BlockKind, limit: Option<usize>) -> Self {
        match limit {
            Some(n) => {
                self.registry.limits.insert(kind, n);
            }
            None => {
                self.registry.limits.remove(&kind);
            }
        }
        self
    }

    /// Limit keyed by wire name, as found in config files
    pub fn limit_named(self, name: &str, limit: Option<usize>) -> Self {
        match name.parse::<BlockKind>() {
            Ok(kind) => self.limit(kind, limit),
            Err(e) => self.reject(e),
        }
    }

    /// Replace the Pro-gated set
    pub fn pro_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            match name.as_ref().parse::<BlockKind>() {
                Ok(kind) => {
                    set.insert(kind);
                }
                Err(e) => self.errors.push(e.to_string()),
            }
        }
        self.registry.pro_only = set;
        self
    }

    fn reject(mut self, error: BlockError) -> Self {
        self.errors.push(error.to_string());
        self
    }

    pub fn build(self) -> Result<BlockRegistry, BlockError> {
        if self.errors.is_empty() {
            Ok(self.registry)
        } else {
            Err(BlockError::InvalidRegistry(self.errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::SequentialIds;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_heading_defaults_to_empty_text() {
        let registry = BlockRegistry::new();
        let bag = registry.defaults(BlockKind::Heading, now(), &mut SequentialIds::new("t"));
        assert_eq!(bag["text"], json!(""));
        assert_eq!(bag["level"], json!("h2"));
    }

    #[test]
    fn test_countdown_targets_seven_days_out() {
        let registry = BlockRegistry::new();
        let bag = registry.defaults(BlockKind::Countdown, now(), &mut SequentialIds::new("t"));
        assert_eq!(bag["text"], json!("Offer Ends In:"));
        assert_eq!(bag["targetDate"], json!("2026-01-08T12:00:00Z"));
        assert_eq!(bag["alignment"], json!("center"));
        assert_eq!(bag["styleVariant"], json!("minimal"));
    }

    #[test]
    fn test_defaults_cover_whole_schema() {
        let registry = BlockRegistry::new();
        let mut ids = SequentialIds::new("t");
        for kind in BlockKind::ALL {
            let bag = registry.defaults(kind, now(), &mut ids);
            for spec in schema(kind) {
                let value = bag.get(spec.key).unwrap();
                assert!(spec.kind.accepts(value), "{}.{} default rejected", kind, spec.key);
            }
        }
    }

    #[test]
    fn test_create_block_uses_fresh_ids() {
        let registry = BlockRegistry::new();
        let mut ids = SequentialIds::new("blk");
        let faq = registry.create_block(BlockKind::Faq, now(), &mut ids);
        assert_eq!(faq.id().as_str(), "blk-1");
        assert_eq!(faq.faq_items()[0].id, "blk-2");
    }

    #[test]
    fn test_stock_limits_and_gates() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.limit(BlockKind::AudioPlayer), Some(1));
        assert_eq!(registry.limit(BlockKind::Heading), None);
        assert!(registry.is_pro_only(BlockKind::StripeCheckout));
        assert!(!registry.is_pro_only(BlockKind::Heading));
    }

    #[test]
    fn test_builder_rejects_unknown_kind_names() {
        let result = BlockRegistry::builder()
            .limit_named("carousel", Some(2))
            .pro_only(["heading", "spinner"])
            .build();

        match result {
            Err(BlockError::InvalidRegistry(msg)) => {
                assert!(msg.contains("carousel"));
                assert!(msg.contains("spinner"));
            }
            other => panic!("expected InvalidRegistry, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_overrides() {
        let registry = BlockRegistry::builder()
            .limit_named("heading", Some(3))
            .limit(BlockKind::AudioPlayer, None)
            .pro_only(Vec::<String>::new())
            .build()
            .unwrap();

        assert_eq!(registry.limit(BlockKind::Heading), Some(3));
        assert_eq!(registry.limit(BlockKind::AudioPlayer), None);
        assert!(!registry.is_pro_only(BlockKind::StripeCheckout));
    }
}
