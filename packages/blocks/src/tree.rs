//! # Block Tree
//!
//! The page body: an ordered root sequence where `container` blocks hold one
//! more ordered sequence. Ids share one space across both levels.
//!
//! Decoding is lenient. `content_blocks` may arrive as an array, as a string
//! holding an array, or as garbage; garbage decodes to an empty tree.
//! Individual entries that do not decode (an unknown `type`, a field of the
//! wrong shape) are kept verbatim at their position, at either level, and are
//! written back on save. Only decoded blocks are visible through the tree API.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::block::{decode_sequence, interleave, Block, BlockId, OpaqueBlock};
use crate::id_generator::IdSource;
use crate::kind::BlockKind;

/// Where a block sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLocation {
    Root { index: usize },
    Nested { container: usize, index: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTree {
    blocks: Vec<Block>,
    opaque: Vec<OpaqueBlock>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            opaque: Vec::new(),
        }
    }

    /// Decode a persisted `content_blocks` value
    pub fn from_value(raw: Value) -> Self {
        let items = match raw {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Array(items)) => items,
                Ok(_) | Err(_) => {
                    warn!(len = text.len(), "content_blocks string is not a JSON array, using empty page");
                    Vec::new()
                }
            },
            other => {
                warn!(found = %value_kind(&other), "content_blocks has unexpected shape, using empty page");
                Vec::new()
            }
        };

        let (blocks, opaque) = decode_sequence(items);
        Self { blocks, opaque }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Raw access for the mutation engine
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Undecodable root entries kept for saving
    pub fn opaque(&self) -> &[OpaqueBlock] {
        &self.opaque
    }

    /// Undecodable entries at both levels
    pub fn opaque_count(&self) -> usize {
        self.opaque.len() + self.blocks.iter().map(|b| b.opaque_children().len()).sum::<usize>()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block, depth-first (containers before their children)
    pub fn iter_all(&self) -> impl Iterator<Item = &Block> {
        let mut all = Vec::new();
        for block in &self.blocks {
            block.walk(&mut |b| all.push(b));
        }
        all.into_iter()
    }

    pub fn total_count(&self) -> usize {
        self.iter_all().count()
    }

    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.iter_all().filter(|b| b.kind() == kind).count()
    }

    pub fn locate(&self, id: &BlockId) -> Option<BlockLocation> {
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id() == id {
                return Some(BlockLocation::Root { index });
            }
            if let Some(child) = block.children().iter().position(|c| c.id() == id) {
                return Some(BlockLocation::Nested {
                    container: index,
                    index: child,
                });
            }
        }
        None
    }

    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        match self.locate(id)? {
            BlockLocation::Root { index } => self.blocks.get(index),
            BlockLocation::Nested { container, index } => {
                self.blocks.get(container)?.children().get(index)
            }
        }
    }

    pub fn find_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        match self.locate(id)? {
            BlockLocation::Root { index } => self.blocks.get_mut(index),
            BlockLocation::Nested { container, index } => {
                self.blocks.get_mut(container)?.children_mut()?.get_mut(index)
            }
        }
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.locate(id).is_some()
    }

    /// Root index of a block that sits directly in the root sequence
    pub fn root_position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    /// Ids of every container, in root order
    pub fn container_ids(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.is_container())
            .map(|b| b.id().clone())
            .collect()
    }

    /// Repair a freshly loaded tree so the structural invariants hold:
    /// containers do not nest, only containers own children, and every
    /// id is present and unique. Returns the number of repairs made.
    pub fn normalize(&mut self, ids: &mut impl IdSource) -> usize {
        let mut repairs = 0;

        let mut flat = Vec::with_capacity(self.blocks.len());
        let mut starts = Vec::with_capacity(self.blocks.len() + 1);
        for block in std::mem::take(&mut self.blocks) {
            starts.push(flat.len());
            repairs += hoist(block, &mut flat);
        }
        starts.push(flat.len());
        self.blocks = flat;

        // Hoisting shifts root indices; opaque entries follow the block they preceded
        for entry in &mut self.opaque {
            if let Some(&start) = starts.get(entry.slot).or(starts.last()) {
                entry.slot = start;
            }
        }

        let mut seen = HashSet::new();
        for block in &mut self.blocks {
            repairs += repair_id(block, &mut seen, ids);
            if let Some(children) = block.children_mut() {
                for child in children {
                    repairs += repair_id(child, &mut seen, ids);
                }
            }
        }

        if repairs > 0 {
            debug!(repairs, "Normalized block tree");
        }
        repairs
    }
}

impl Serialize for BlockTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(interleave(&self.blocks, &self.opaque))
    }
}

impl<'de> Deserialize<'de> for BlockTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(BlockTree::from_value(raw))
    }
}

impl From<Vec<Block>> for BlockTree {
    fn from(blocks: Vec<Block>) -> Self {
        Self::from_blocks(blocks)
    }
}

/// Push `block` to `out`, moving any illegally nested blocks to the root
/// right after it. Returns the number of blocks moved.
fn hoist(mut block: Block, out: &mut Vec<Block>) -> usize {
    let children = block.children.take().unwrap_or_default();
    let mut moved = 0;
    let mut hoisted = Vec::new();

    if block.is_container() {
        let mut kept = Vec::with_capacity(children.len());
        for mut child in children {
            if child.is_container() {
                hoisted.push(child);
            } else {
                if let Some(grand) = child.children.take() {
                    hoisted.extend(grand);
                }
                kept.push(child);
            }
        }
        block.children = Some(kept);
    } else {
        hoisted = children;
    }

    out.push(block);
    for h in hoisted {
        moved += 1 + hoist(h, out);
    }
    moved
}

fn repair_id(block: &mut Block, seen: &mut HashSet<BlockId>, ids: &mut impl IdSource) -> usize {
    if block.id().is_empty() || seen.contains(block.id()) {
        let fresh = BlockId::new(ids.new_id());
        warn!(old = %block.id(), new = %fresh, "Reassigning missing or duplicate block id");
        block.assign_missing_id(fresh);
        seen.insert(block.id().clone());
        1
    } else {
        seen.insert(block.id().clone());
        0
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
