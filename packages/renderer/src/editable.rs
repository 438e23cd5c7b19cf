//! # Editable Renderer
//!
//! Builds the editor-side form model of a block tree. Each field input
//! comes from the kind's schema, the same table the preview consumes, and
//! every control carries the [`Mutation`] it dispatches.
//!
//! A collapsed block keeps its header controls but omits its field list
//! and, for containers, its nested forms.

use pagecraft_blocks::{schema, Block, BlockId, BlockKind, BlockTree, FieldKind};
use pagecraft_editor::Mutation;
use serde::Serialize;
use serde_json::Value;

/// Where a block sits, as far as its controls care
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockPosition {
    /// Enclosing container, `None` at the root
    pub parent: Option<BlockId>,
    pub index: usize,
    pub sibling_count: usize,
    /// Containers the block may be moved into
    pub containers: Vec<(BlockId, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceKind {
    ToggleCollapsed,
    ToggleEnabled,
    Remove,
    MoveUp,
    MoveDown,
    MoveOut,
    MoveInto,
    AddFaqItem,
    RemoveFaqItem,
}

/// A control on a block form and the edit it dispatches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Affordance {
    pub kind: AffordanceKind,
    pub label: String,
    pub mutation: Mutation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Current value, `null` when the block lacks the field
    pub value: Value,
}

impl FormField {
    /// Edit that replaces this field's value
    pub fn update(&self, block_id: &BlockId, value: Value) -> Mutation {
        Mutation::SetField {
            block_id: block_id.clone(),
            key: self.key.to_string(),
            value,
        }
    }
}

/// Editor form for one block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormNode {
    pub block_id: BlockId,
    pub kind: BlockKind,
    pub label: &'static str,
    pub enabled: bool,
    pub collapsed: bool,
    pub fields: Vec<FormField>,
    pub affordances: Vec<Affordance>,
    pub children: Vec<FormNode>,
}

impl FormNode {
    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn affordance(&self, kind: AffordanceKind) -> Option<&Affordance> {
        self.affordances.iter().find(|a| a.kind == kind)
    }

    pub fn affordances_of(&self, kind: AffordanceKind) -> impl Iterator<Item = &Affordance> {
        self.affordances.iter().filter(move |a| a.kind == kind)
    }
}

/// Forms for every root block, in order
pub fn render_editor(tree: &BlockTree) -> Vec<FormNode> {
    let containers: Vec<(BlockId, String)> = tree
        .blocks()
        .iter()
        .filter(|b| b.is_container())
        .enumerate()
        .map(|(n, b)| (b.id().clone(), container_label(b, n)))
        .collect();

    let count = tree.len();
    tree.blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| {
            render_editable(
                block,
                &BlockPosition {
                    parent: None,
                    index,
                    sibling_count: count,
                    containers: containers.clone(),
                },
            )
        })
        .collect()
}

/// Form for one block at `position`
pub fn render_editable(block: &Block, position: &BlockPosition) -> FormNode {
    let id = block.id();
    let mut node = FormNode {
        block_id: id.clone(),
        kind: block.kind(),
        label: block.kind().label(),
        enabled: block.enabled,
        collapsed: block.collapsed,
        fields: Vec::new(),
        affordances: header_affordances(block, position),
        children: Vec::new(),
    };

    if block.collapsed {
        return node;
    }

    node.fields = schema(block.kind())
        .iter()
        .map(|spec| FormField {
            key: spec.key,
            label: spec.label,
            kind: spec.kind,
            value: block.field(spec.key).cloned().unwrap_or(Value::Null),
        })
        .collect();

    if block.kind() == BlockKind::Faq {
        node.affordances.push(affordance(
            AffordanceKind::AddFaqItem,
            "Add question",
            Mutation::AddFaqItem { block_id: id.clone() },
        ));
        for item in block.faq_items() {
            node.affordances.push(affordance(
                AffordanceKind::RemoveFaqItem,
                format!("Remove \"{}\"", item.q),
                Mutation::RemoveFaqItem {
                    block_id: id.clone(),
                    item_id: item.id,
                },
            ));
        }
    }

    if block.is_container() {
        let siblings = block.children();
        let targets: Vec<(BlockId, String)> = position
            .containers
            .iter()
            .filter(|(container, _)| container != id)
            .cloned()
            .collect();

        node.children = siblings
            .iter()
            .enumerate()
            .map(|(index, child)| {
                render_editable(
                    child,
                    &BlockPosition {
                        parent: Some(id.clone()),
                        index,
                        sibling_count: siblings.len(),
                        containers: targets.clone(),
                    },
                )
            })
            .collect();
    }

    node
}

fn header_affordances(block: &Block, position: &BlockPosition) -> Vec<Affordance> {
    let id = block.id();
    let mut controls = vec![
        affordance(
            AffordanceKind::ToggleCollapsed,
            if block.collapsed { "Expand" } else { "Collapse" },
            Mutation::ToggleCollapsed { block_id: id.clone() },
        ),
        affordance(
            AffordanceKind::ToggleEnabled,
            if block.enabled { "Hide" } else { "Show" },
            Mutation::SetEnabled {
                block_id: id.clone(),
                enabled: !block.enabled,
            },
        ),
        affordance(
            AffordanceKind::Remove,
            "Delete",
            Mutation::RemoveBlock { block_id: id.clone() },
        ),
    ];

    if position.index > 0 {
        controls.push(affordance(
            AffordanceKind::MoveUp,
            "Move up",
            Mutation::MoveUp { block_id: id.clone() },
        ));
    }
    if position.index + 1 < position.sibling_count {
        controls.push(affordance(
            AffordanceKind::MoveDown,
            "Move down",
            Mutation::MoveDown { block_id: id.clone() },
        ));
    }

    if let Some(parent) = &position.parent {
        controls.push(affordance(
            AffordanceKind::MoveOut,
            "Move out of container",
            Mutation::RelocateToRoot {
                container_id: parent.clone(),
                block_id: id.clone(),
            },
        ));
    }

    if !block.is_container() {
        for (container, label) in &position.containers {
            controls.push(affordance(
                AffordanceKind::MoveInto,
                format!("Move into {}", label),
                Mutation::RelocateToContainer {
                    block_id: id.clone(),
                    container_id: container.clone(),
                },
            ));
        }
    }

    controls
}

fn affordance(kind: AffordanceKind, label: impl Into<String>, mutation: Mutation) -> Affordance {
    Affordance {
        kind,
        label: label.into(),
        mutation,
    }
}

fn container_label(block: &Block, n: usize) -> String {
    match block.text("title") {
        "" => format!("Container {}", n + 1),
        title => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_blocks::FieldBag;
    use serde_json::json;

    fn block(id: &str, kind: BlockKind) -> Block {
        Block::new(id, kind, FieldBag::new())
    }

    fn tree() -> BlockTree {
        vec![
            block("a", BlockKind::Heading).with_field("text", "Hi"),
            block("c", BlockKind::Container).with_children(vec![block("x", BlockKind::Paragraph)]),
            block("b", BlockKind::Paragraph),
        ]
        .into()
    }

    #[test]
    fn test_fields_follow_schema() {
        let forms = render_editor(&tree());
        let heading = &forms[0];
        let keys: Vec<_> = heading.fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["text", "level", "alignment"]);
        assert_eq!(heading.field("text").unwrap().value, json!("Hi"));
        assert_eq!(heading.field("level").unwrap().value, Value::Null);
    }

    #[test]
    fn test_boundary_moves_are_not_offered() {
        let forms = render_editor(&tree());
        assert!(forms[0].affordance(AffordanceKind::MoveUp).is_none());
        assert!(forms[0].affordance(AffordanceKind::MoveDown).is_some());
        assert!(forms[2].affordance(AffordanceKind::MoveDown).is_none());
    }

    #[test]
    fn test_relocation_affordances() {
        let forms = render_editor(&tree());

        let into = forms[0].affordance(AffordanceKind::MoveInto).unwrap();
        assert_eq!(into.label, "Move into Container 1");
        assert_eq!(
            into.mutation,
            Mutation::RelocateToContainer {
                block_id: "a".into(),
                container_id: "c".into(),
            }
        );

        // containers never go into containers
        assert!(forms[1].affordance(AffordanceKind::MoveInto).is_none());

        let nested = &forms[1].children[0];
        assert_eq!(
            nested.affordance(AffordanceKind::MoveOut).unwrap().mutation,
            Mutation::RelocateToRoot {
                container_id: "c".into(),
                block_id: "x".into(),
            }
        );
        assert!(nested.affordance(AffordanceKind::MoveInto).is_none());
    }

    #[test]
    fn test_collapsed_hides_fields_not_controls() {
        let mut collapsed = block("c", BlockKind::Container).with_children(vec![block("x", BlockKind::Paragraph)]);
        collapsed.collapsed = true;
        let node = render_editable(&collapsed, &BlockPosition::default());

        assert!(node.fields.is_empty());
        assert!(node.children.is_empty());
        assert_eq!(node.affordance(AffordanceKind::ToggleCollapsed).unwrap().label, "Expand");
    }

    #[test]
    fn test_faq_item_controls() {
        let faq = block("f", BlockKind::Faq).with_field(
            "items",
            json!([{"id": "q1", "q": "Refunds?", "a": "Yes", "open": false}]),
        );
        let node = render_editable(&faq, &BlockPosition::default());
        let remove: Vec<_> = node.affordances_of(AffordanceKind::RemoveFaqItem).collect();
        assert_eq!(remove.len(), 1);
        assert_eq!(
            remove[0].mutation,
            Mutation::RemoveFaqItem {
                block_id: "f".into(),
                item_id: "q1".into(),
            }
        );
        assert!(node.affordance(AffordanceKind::AddFaqItem).is_some());
    }

    #[test]
    fn test_field_update_mutation() {
        let forms = render_editor(&tree());
        let field = forms[0].field("text").unwrap();
        assert_eq!(
            field.update(&forms[0].block_id, json!("Bye")),
            Mutation::SetField {
                block_id: "a".into(),
                key: "text".into(),
                value: json!("Bye"),
            }
        );
    }
}
