//! # Mutation Engine
//!
//! Pure operations on a [`BlockTree`]. Every function takes the current tree
//! by reference and returns a new one; the input is never touched.
//!
//! ## Semantics
//!
//! - Ids and types never change; only membership and position do
//! - Unknown ids are silent no-ops (the returned tree equals the input)
//! - `move_up` / `move_down` stop at the boundary, they never wrap
//! - Containers never end up inside containers
//! - Only [`add_block`] can fail, and only with a validation error

use chrono::{DateTime, Utc};
use pagecraft_blocks::{
    is_reserved_key, Block, BlockId, BlockKind, BlockLocation, BlockRegistry, BlockTree, IdSource,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::mutations::MutationError;

/// Failures of [`add_block`]: `LimitReached` or `ProRequired`
pub type AddBlockError = MutationError;

/// Whether the page owner holds the "Pro" entitlement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    #[default]
    Free,
    Pro,
}

impl Entitlement {
    pub fn from_flag(pro: bool) -> Self {
        if pro {
            Entitlement::Pro
        } else {
            Entitlement::Free
        }
    }

    pub fn is_pro(self) -> bool {
        matches!(self, Entitlement::Pro)
    }
}

/// Check entitlement and per-kind cap without building anything
pub fn can_add(
    tree: &BlockTree,
    kind: BlockKind,
    registry: &BlockRegistry,
    entitlement: Entitlement,
) -> Result<(), AddBlockError> {
    if registry.is_pro_only(kind) && !entitlement.is_pro() {
        return Err(MutationError::ProRequired(kind));
    }

    if let Some(limit) = registry.limit(kind) {
        if tree.count_kind(kind) >= limit {
            return Err(MutationError::LimitReached { kind, limit });
        }
    }

    Ok(())
}

/// Append a new block with registry defaults to the root sequence
pub fn add_block(
    tree: &BlockTree,
    kind: BlockKind,
    registry: &BlockRegistry,
    entitlement: Entitlement,
    ids: &mut impl IdSource,
    now: DateTime<Utc>,
) -> Result<BlockTree, AddBlockError> {
    can_add(tree, kind, registry, entitlement)?;

    let mut next = tree.clone();
    next.blocks_mut().push(registry.create_block(kind, now, ids));
    Ok(next)
}

/// Remove a block wherever it is. Removing a container removes its children.
pub fn remove_block(tree: &BlockTree, id: &BlockId) -> BlockTree {
    let mut next = tree.clone();
    match tree.locate(id) {
        Some(BlockLocation::Root { index }) => {
            next.blocks_mut().remove(index);
        }
        Some(BlockLocation::Nested { container, index }) => {
            if let Some(children) = next.blocks_mut()[container].children_mut() {
                children.remove(index);
            }
        }
        None => {}
    }
    next
}

/// Replace one attribute of a block. Envelope keys are ignored.
pub fn update_field(tree: &BlockTree, id: &BlockId, key: &str, value: Value) -> BlockTree {
    update_field_with(tree, id, key, |_| value)
}

/// Functional update: the new value is computed from the previous one
pub fn update_field_with(
    tree: &BlockTree,
    id: &BlockId,
    key: &str,
    update: impl FnOnce(Option<&Value>) -> Value,
) -> BlockTree {
    let mut next = tree.clone();
    if is_reserved_key(key) {
        return next;
    }
    if let Some(block) = next.find_mut(id) {
        let value = update(block.field(key));
        block.set_field(key, value);
    }
    next
}

/// Flip a boolean attribute (missing counts as `false`)
pub fn toggle_field(tree: &BlockTree, id: &BlockId, key: &str) -> BlockTree {
    update_field_with(tree, id, key, |prev| {
        Value::Bool(!prev.and_then(Value::as_bool).unwrap_or(false))
    })
}

/// Show or hide a block on the live page
pub fn set_enabled(tree: &BlockTree, id: &BlockId, enabled: bool) -> BlockTree {
    let mut next = tree.clone();
    if let Some(block) = next.find_mut(id) {
        block.enabled = enabled;
    }
    next
}

/// Fold or unfold the block's form in the builder
pub fn toggle_collapsed(tree: &BlockTree, id: &BlockId) -> BlockTree {
    let mut next = tree.clone();
    if let Some(block) = next.find_mut(id) {
        block.collapsed = !block.collapsed;
    }
    next
}

/// Swap with the previous sibling. No-op for the first sibling.
pub fn move_up(tree: &BlockTree, id: &BlockId) -> BlockTree {
    let mut next = tree.clone();
    if let Some((siblings, index)) = siblings_of(&mut next, id) {
        if index > 0 {
            siblings.swap(index - 1, index);
        }
    }
    next
}

/// Swap with the next sibling. No-op for the last sibling.
pub fn move_down(tree: &BlockTree, id: &BlockId) -> BlockTree {
    let mut next = tree.clone();
    if let Some((siblings, index)) = siblings_of(&mut next, id) {
        if index + 1 < siblings.len() {
            siblings.swap(index, index + 1);
        }
    }
    next
}

/// Reorder within the current sibling sequence (drag-and-drop drop target).
/// The target index is clamped to the sequence.
pub fn move_to_index(tree: &BlockTree, id: &BlockId, target: usize) -> BlockTree {
    let mut next = tree.clone();
    if let Some((siblings, index)) = siblings_of(&mut next, id) {
        let target = target.min(siblings.len() - 1);
        if target != index {
            let block = siblings.remove(index);
            siblings.insert(target, block);
        }
    }
    next
}

/// Move a leaf block to the end of a container's children.
///
/// The container's root position is looked up again after the block has
/// been detached, so a block that sat before the container in the root
/// sequence does not shift the target by one.
pub fn relocate_to_container(tree: &BlockTree, id: &BlockId, container_id: &BlockId) -> BlockTree {
    if id == container_id {
        return tree.clone();
    }

    let movable = tree.find(id).map(|b| !b.is_container()).unwrap_or(false);
    let target_ok = tree
        .root_position(container_id)
        .map(|i| tree.blocks()[i].is_container())
        .unwrap_or(false);
    if !movable || !target_ok {
        return tree.clone();
    }

    // Already the container's child: nothing to do
    if let Some(BlockLocation::Nested { container, .. }) = tree.locate(id) {
        if tree.blocks()[container].id() == container_id {
            return tree.clone();
        }
    }

    let mut next = tree.clone();
    let Some(block) = detach(&mut next, id) else {
        return tree.clone();
    };

    match next.root_position(container_id) {
        Some(target) => {
            if let Some(children) = next.blocks_mut()[target].children_mut() {
                children.push(block);
                return next;
            }
            tree.clone()
        }
        None => tree.clone(),
    }
}

/// Move a container's child back to the root, right after the container
pub fn relocate_to_root(tree: &BlockTree, container_id: &BlockId, id: &BlockId) -> BlockTree {
    let Some(container_index) = tree.root_position(container_id) else {
        return tree.clone();
    };
    let Some(child_index) = tree.blocks()[container_index]
        .children()
        .iter()
        .position(|c| c.id() == id)
    else {
        return tree.clone();
    };

    let mut next = tree.clone();
    let blocks = next.blocks_mut();
    let block = match blocks[container_index].children_mut() {
        Some(children) => children.remove(child_index),
        None => return tree.clone(),
    };
    blocks.insert(container_index + 1, block);
    next
}

/// Append an empty question to a FAQ block
pub fn insert_faq_item(tree: &BlockTree, id: &BlockId, ids: &mut impl IdSource) -> BlockTree {
    match tree.find(id) {
        Some(block) if block.kind() == BlockKind::Faq => {
            let item = json!({"id": ids.new_id(), "q": "", "a": "", "open": false});
            update_field_with(tree, id, "items", |prev| {
                let mut items = prev.and_then(Value::as_array).cloned().unwrap_or_default();
                items.push(item);
                Value::Array(items)
            })
        }
        _ => tree.clone(),
    }
}

/// Remove a question from a FAQ block by item id
pub fn remove_faq_item(tree: &BlockTree, id: &BlockId, item_id: &str) -> BlockTree {
    match tree.find(id) {
        Some(block) if block.kind() == BlockKind::Faq => {
            let present = block
                .list("items")
                .iter()
                .any(|item| item.get("id").and_then(Value::as_str) == Some(item_id));
            if !present {
                return tree.clone();
            }
            update_field_with(tree, id, "items", |prev| {
                let items = prev
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter(|item| item.get("id").and_then(Value::as_str) != Some(item_id))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                Value::Array(items)
            })
        }
        _ => tree.clone(),
    }
}

/// Sibling sequence containing `id` and the block's index in it
fn siblings_of<'a>(
    tree: &'a mut BlockTree,
    id: &BlockId,
) -> Option<(&'a mut Vec<Block>, usize)> {
    match tree.locate(id)? {
        BlockLocation::Root { index } => Some((tree.blocks_mut(), index)),
        BlockLocation::Nested { container, index } => {
            let children = tree.blocks_mut().get_mut(container)?.children_mut()?;
            Some((children, index))
        }
    }
}

fn detach(tree: &mut BlockTree, id: &BlockId) -> Option<Block> {
    let (siblings, index) = siblings_of(tree, id)?;
    Some(siblings.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_blocks::{FieldBag, SequentialIds};

    fn leaf(id: &str, kind: BlockKind) -> Block {
        Block::new(id, kind, FieldBag::new())
    }

    fn ids(tree: &BlockTree) -> Vec<&str> {
        tree.blocks().iter().map(|b| b.id().as_str()).collect()
    }

    #[test]
    fn test_can_add_checks_entitlement_first() {
        let registry = BlockRegistry::new();
        let tree = BlockTree::new();
        assert_eq!(
            can_add(&tree, BlockKind::AudioPlayer, &registry, Entitlement::Free),
            Err(MutationError::ProRequired(BlockKind::AudioPlayer))
        );
        assert!(can_add(&tree, BlockKind::AudioPlayer, &registry, Entitlement::Pro).is_ok());
    }

    #[test]
    fn test_limit_counts_nested_blocks() {
        let registry = BlockRegistry::new();
        let tree = BlockTree::from_blocks(vec![
            leaf("c", BlockKind::Container).with_children(vec![leaf("p", BlockKind::ProfileCard)])
        ]);
        assert_eq!(
            can_add(&tree, BlockKind::ProfileCard, &registry, Entitlement::Pro),
            Err(MutationError::LimitReached {
                kind: BlockKind::ProfileCard,
                limit: 1
            })
        );
    }

    #[test]
    fn test_update_field_ignores_reserved_keys() {
        let tree = BlockTree::from_blocks(vec![leaf("a", BlockKind::Heading)]);
        let next = update_field(&tree, &"a".into(), "type", json!("image"));
        assert_eq!(next, tree);
    }

    #[test]
    fn test_move_to_index_clamps() {
        let tree = BlockTree::from_blocks(vec![
            leaf("a", BlockKind::Heading),
            leaf("b", BlockKind::Heading),
            leaf("c", BlockKind::Heading),
        ]);
        assert_eq!(ids(&move_to_index(&tree, &"a".into(), 99)), vec!["b", "c", "a"]);
        assert_eq!(ids(&move_to_index(&tree, &"c".into(), 0)), vec!["c", "a", "b"]);
        assert_eq!(move_to_index(&tree, &"b".into(), 1), tree);
    }

    #[test]
    fn test_container_cannot_enter_container() {
        let tree = BlockTree::from_blocks(vec![
            leaf("c1", BlockKind::Container),
            leaf("c2", BlockKind::Container),
        ]);
        assert_eq!(relocate_to_container(&tree, &"c1".into(), &"c2".into()), tree);
    }

    #[test]
    fn test_relocate_between_containers() {
        let tree = BlockTree::from_blocks(vec![
            leaf("c1", BlockKind::Container).with_children(vec![leaf("x", BlockKind::Image)]),
            leaf("c2", BlockKind::Container),
        ]);
        let next = relocate_to_container(&tree, &"x".into(), &"c2".into());
        assert!(next.blocks()[0].children().is_empty());
        assert_eq!(next.blocks()[1].children()[0].id().as_str(), "x");
    }

    #[test]
    fn test_faq_items_insert_and_remove() {
        let tree = BlockTree::from_blocks(vec![leaf("f", BlockKind::Faq)]);
        let mut gen = SequentialIds::new("q");

        let next = insert_faq_item(&tree, &"f".into(), &mut gen);
        let next = insert_faq_item(&next, &"f".into(), &mut gen);
        assert_eq!(next.find(&"f".into()).unwrap().faq_items().len(), 2);

        let next = remove_faq_item(&next, &"f".into(), "q-1");
        let items = next.find(&"f".into()).unwrap().faq_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "q-2");

        assert_eq!(remove_faq_item(&next, &"f".into(), "missing"), next);
    }

    #[test]
    fn test_input_tree_is_untouched() {
        let tree = BlockTree::from_blocks(vec![leaf("a", BlockKind::Heading), leaf("b", BlockKind::Divider)]);
        let before = tree.clone();
        let _ = move_down(&tree, &"a".into());
        let _ = remove_block(&tree, &"b".into());
        let _ = toggle_collapsed(&tree, &"a".into());
        assert_eq!(tree, before);
    }
}
