use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::kind::BlockKind;

/// Type-specific attribute bag of a block.
///
/// Unknown keys are kept as-is so that saving never drops data written by a
/// newer builder.
pub type FieldBag = Map<String, Value>;

/// Keys owned by the block envelope; never stored in the attribute bag
pub const RESERVED_KEYS: &[&str] = &["id", "type", "enabled", "collapsed", "motion", "children"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Stable block identity. Never reassigned once a block exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        BlockId(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        BlockId(s)
    }
}

impl PartialEq<str> for BlockId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BlockId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Per-block animation override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMotion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(default)]
    pub disabled: bool,
}

/// One content unit on a landing page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "BlockRecord")]
pub struct Block {
    id: BlockId,

    kind: BlockKind,

    /// Visible on the live page
    pub enabled: bool,

    /// Editor-only: form is folded in the builder
    pub collapsed: bool,

    pub motion: Option<BlockMotion>,

    /// Only containers carry children
    pub children: Option<Vec<Block>>,

    pub fields: FieldBag,

    /// Persisted children this build cannot decode
    opaque_children: Vec<OpaqueBlock>,
}

/// A persisted block that does not decode as a [`Block`] (typically a type
/// written by a newer builder). It is kept verbatim and written back on save;
/// renderers and mutations never see it.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueBlock {
    /// Number of decoded siblings that precede it
    pub slot: usize,
    pub raw: Value,
}

/// Decode a persisted block sequence one entry at a time
pub(crate) fn decode_sequence(items: Vec<Value>) -> (Vec<Block>, Vec<OpaqueBlock>) {
    let mut blocks = Vec::with_capacity(items.len());
    let mut opaque = Vec::new();
    for item in items {
        match Block::deserialize(&item) {
            Ok(block) => blocks.push(block),
            Err(err) => {
                let kind = item.get("type").and_then(Value::as_str).unwrap_or("?");
                warn!(error = %err, kind, "Keeping undecodable block as-is");
                opaque.push(OpaqueBlock {
                    slot: blocks.len(),
                    raw: item,
                });
            }
        }
    }
    (blocks, opaque)
}

#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum StoredRef<'a> {
    Block(&'a Block),
    Opaque(&'a Value),
}

/// Merge opaque entries back between `blocks` at their slots. Slots past the
/// end land after the last block.
pub(crate) fn interleave<'a>(blocks: &'a [Block], opaque: &'a [OpaqueBlock]) -> Vec<StoredRef<'a>> {
    let mut out = Vec::with_capacity(blocks.len() + opaque.len());
    let mut pending = opaque.iter().peekable();
    for (index, block) in blocks.iter().enumerate() {
        while let Some(entry) = pending.next_if(|entry| entry.slot <= index) {
            out.push(StoredRef::Opaque(&entry.raw));
        }
        out.push(StoredRef::Block(block));
    }
    out.extend(pending.map(|entry| StoredRef::Opaque(&entry.raw)));
    out
}

/// Wire shape of a block as read from the backend
#[derive(Deserialize)]
struct BlockRecord {
    #[serde(default)]
    id: BlockId,

    #[serde(rename = "type")]
    kind: BlockKind,

    #[serde(default = "default_enabled")]
    enabled: bool,

    #[serde(default)]
    collapsed: bool,

    #[serde(default)]
    motion: Option<BlockMotion>,

    #[serde(default)]
    children: Option<Vec<Value>>,

    #[serde(flatten)]
    fields: FieldBag,
}

impl From<BlockRecord> for Block {
    fn from(record: BlockRecord) -> Self {
        let (children, opaque_children) = match record.children {
            Some(items) => {
                let (blocks, opaque) = decode_sequence(items);
                (Some(blocks), opaque)
            }
            None => (None, Vec::new()),
        };
        Self {
            id: record.id,
            kind: record.kind,
            enabled: record.enabled,
            collapsed: record.collapsed,
            motion: record.motion,
            children,
            fields: record.fields,
            opaque_children,
        }
    }
}

/// Wire shape of a block as written back
#[derive(Serialize)]
struct BlockOut<'a> {
    id: &'a BlockId,

    #[serde(rename = "type")]
    kind: BlockKind,

    enabled: bool,

    collapsed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    motion: Option<&'a BlockMotion>,

    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<StoredRef<'a>>>,

    #[serde(flatten)]
    fields: &'a FieldBag,
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let children = if self.children.is_none() && self.opaque_children.is_empty() {
            None
        } else {
            Some(interleave(self.children(), &self.opaque_children))
        };
        BlockOut {
            id: &self.id,
            kind: self.kind,
            enabled: self.enabled,
            collapsed: self.collapsed,
            motion: self.motion.as_ref(),
            children,
            fields: &self.fields,
        }
        .serialize(serializer)
    }
}

fn default_enabled() -> bool {
    true
}

impl Block {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind, fields: FieldBag) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: true,
            collapsed: false,
            motion: None,
            children: kind.is_container().then(Vec::new),
            fields,
            opaque_children: Vec::new(),
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Assign an id to a block that arrived without a usable one.
    /// Only load normalization may call this.
    pub fn assign_missing_id(&mut self, id: BlockId) {
        self.id = id;
    }

    pub fn children(&self) -> &[Block] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        self.children.as_mut()
    }

    /// Undecodable children kept for saving
    pub fn opaque_children(&self) -> &[OpaqueBlock] {
        &self.opaque_children
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field, empty when missing or not a string
    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn list(&self, key: &str) -> &[Value] {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Set an attribute. Envelope keys are refused.
    pub fn set_field(&mut self, key: &str, value: Value) -> bool {
        if is_reserved_key(key) {
            return false;
        }
        self.fields.insert(key.to_string(), value);
        true
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set_field(key, value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        if self.is_container() {
            self.children = Some(children);
        }
        self
    }

    pub fn faq_items(&self) -> Vec<FaqItem> {
        decode_list(self.list("items"))
    }

    pub fn social_links(&self) -> Vec<SocialLink> {
        decode_list(self.list("links"))
    }

    /// Walk this block and its children depth-first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Block)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

fn decode_list<T: for<'de> Deserialize<'de>>(values: &[Value]) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}

/// Question/answer pair of a FAQ block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub open: bool,
}

/// Entry of a social links block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": "b1",
            "type": "heading",
            "text": "Hi",
            "experimentalGlow": {"radius": 4}
        });

        let block: Block = serde_json::from_value(raw).unwrap();
        assert_eq!(block.kind(), BlockKind::Heading);
        assert!(block.enabled);
        assert_eq!(block.text("text"), "Hi");

        let back = serde_json::to_value(&block).unwrap();
        assert_eq!(back["experimentalGlow"], json!({"radius": 4}));
        assert_eq!(back["type"], json!("heading"));
    }

    #[test]
    fn test_reserved_keys_refused() {
        let mut block = Block::new("b1", BlockKind::Paragraph, FieldBag::new());
        assert!(!block.set_field("id", json!("other")));
        assert!(!block.set_field("type", json!("image")));
        assert_eq!(block.id(), &BlockId::from("b1"));
        assert!(block.set_field("text", json!("ok")));
    }

    #[test]
    fn test_container_gets_children() {
        let container = Block::new("c", BlockKind::Container, FieldBag::new());
        assert_eq!(container.children, Some(vec![]));

        let leaf = Block::new("l", BlockKind::Image, FieldBag::new())
            .with_children(vec![Block::new("x", BlockKind::Divider, FieldBag::new())]);
        assert!(leaf.children.is_none());
    }

    #[test]
    fn test_faq_items_decode_leniently() {
        let block = Block::new("f", BlockKind::Faq, FieldBag::new())
            .with_field("items", json!([{"id": "1", "q": "Why?", "a": "Because"}, {"q": 3}]));
        let items = block.faq_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].q, "Why?");
        assert!(!items[0].open);
    }
}
