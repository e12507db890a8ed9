//! # Block Tree Mutations
//!
//! Every edit to the block tree goes through [`Mutation::apply`].
//!
//! ## Mutation Semantics
//!
//! ### Lookup
//! - Targets are found by searching the tree for their id on every call
//! - A missing id is a no-op ([`MutationOutcome::Noop`]), not an error: the UI
//!   may commit against a block that a concurrent action already removed
//!
//! ### Insert / Relocate
//! - Indices are clamped to `[0, container.len()]`
//! - Relocating within the same container accounts for the removal shift
//! - A block can never be relocated into its own subtree
//!
//! ### Duplicate / Detach
//! - Copies receive fresh ids for every block and column below them

use crate::defaults::default_block;
use crate::tree::{self, ContainerRef};
use blockmail_model::visitor::{walk_block_mut, walk_column_mut};
use blockmail_model::{
    Block, BlockId, BlockKind, BlockTree, BlockType, Column, IdGenerator, Variant, VisitorMut,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Semantic mutations over the block tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Create a block of `block_type` with defaults; appends when `index` is absent
    Insert {
        block_type: BlockType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<Variant>,
        #[serde(default)]
        target: ContainerRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Insert a deep copy of `block` with fresh ids
    InsertBlock {
        block: Block,
        #[serde(default)]
        target: ContainerRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Swap with the adjacent sibling
    Move { id: BlockId, direction: Direction },

    /// Remove from the owning container and insert into `target` at `index`
    Relocate {
        id: BlockId,
        target: ContainerRef,
        index: usize,
    },

    Delete { id: BlockId },

    /// Deep copy inserted right after the original
    Duplicate { id: BlockId },

    /// Replace a fragment reference with copies of its cached blocks
    DetachFragment { id: BlockId },

    /// Set a type-specific field by its persisted (camelCase) name
    UpdateField {
        id: BlockId,
        field: String,
        value: serde_json::Value,
    },

    /// Set or clear (`None` / empty) one style property
    UpdateStyle {
        id: BlockId,
        property: String,
        #[serde(default)]
        value: Option<String>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Field cannot be edited: {0}")]
    ProtectedField(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Block is not a fragment: {0}")]
    NotAFragment(BlockId),

    #[error("Would move block {0} into its own subtree")]
    CycleDetected(BlockId),
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The tree changed. `selection` is the block the UI should select next,
    /// if the mutation implies one.
    Applied { selection: Option<BlockId> },

    /// Nothing to do (stale id, bounds, missing container)
    Noop,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }

    fn applied() -> Self {
        MutationOutcome::Applied { selection: None }
    }

    fn select(id: BlockId) -> Self {
        MutationOutcome::Applied {
            selection: Some(id),
        }
    }
}

impl Mutation {
    /// Apply to `tree`, minting any new ids from `ids`.
    pub fn apply(
        &self,
        tree: &mut BlockTree,
        ids: &mut IdGenerator,
    ) -> Result<MutationOutcome, MutationError> {
        let outcome = match self {
            Mutation::Insert {
                block_type,
                variant,
                target,
                index,
            } => {
                let block = default_block(*block_type, variant.as_ref(), ids);
                Self::apply_insert(tree, block, target, *index)
            }

            Mutation::InsertBlock {
                block,
                target,
                index,
            } => {
                let mut copy = block.clone();
                reassign_ids(&mut copy, ids);
                Self::apply_insert(tree, copy, target, *index)
            }

            Mutation::Move { id, direction } => Self::apply_move(tree, id, *direction),

            Mutation::Relocate { id, target, index } => {
                Self::apply_relocate(tree, id, target, *index)?
            }

            Mutation::Delete { id } => Self::apply_delete(tree, id),

            Mutation::Duplicate { id } => Self::apply_duplicate(tree, id, ids),

            Mutation::DetachFragment { id } => Self::apply_detach(tree, id, ids)?,

            Mutation::UpdateField { id, field, value } => {
                Self::apply_update_field(tree, id, field, value)?
            }

            Mutation::UpdateStyle {
                id,
                property,
                value,
            } => Self::apply_update_style(tree, id, property, value.as_deref()),
        };

        if outcome == MutationOutcome::Noop {
            debug!(mutation = ?self, "Mutation had no effect");
        }
        Ok(outcome)
    }

    fn apply_insert(
        tree: &mut BlockTree,
        block: Block,
        target: &ContainerRef,
        index: Option<usize>,
    ) -> MutationOutcome {
        let Some(blocks) = tree::container_mut(&mut tree.blocks, target) else {
            return MutationOutcome::Noop;
        };
        let index = index.unwrap_or(blocks.len()).min(blocks.len());
        let id = block.id.clone();
        blocks.insert(index, block);
        MutationOutcome::select(id)
    }

    fn apply_move(tree: &mut BlockTree, id: &BlockId, direction: Direction) -> MutationOutcome {
        let Some(location) = tree::locate(&tree.blocks, id) else {
            return MutationOutcome::Noop;
        };
        let Some(blocks) = tree::container_mut(&mut tree.blocks, &location.container) else {
            return MutationOutcome::Noop;
        };

        let other = match direction {
            Direction::Up if location.index > 0 => location.index - 1,
            Direction::Down if location.index + 1 < blocks.len() => location.index + 1,
            _ => return MutationOutcome::Noop,
        };
        blocks.swap(location.index, other);
        MutationOutcome::applied()
    }

    fn apply_relocate(
        tree: &mut BlockTree,
        id: &BlockId,
        target: &ContainerRef,
        index: usize,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(source) = tree::locate(&tree.blocks, id) else {
            return Ok(MutationOutcome::Noop);
        };
        if let ContainerRef::Column(column) = target {
            let moving = tree::find_block(&tree.blocks, id);
            if moving.is_some_and(|block| tree::owns_column(block, column)) {
                return Err(MutationError::CycleDetected(id.clone()));
            }
        }
        if tree::container(&tree.blocks, target).is_none() {
            return Ok(MutationOutcome::Noop);
        }

        let Some(blocks) = tree::container_mut(&mut tree.blocks, &source.container) else {
            return Ok(MutationOutcome::Noop);
        };
        let block = blocks.remove(source.index);

        // Removal shifted everything after the source one slot left
        let index = if &source.container == target && index > source.index {
            index - 1
        } else {
            index
        };

        let Some(blocks) = tree::container_mut(&mut tree.blocks, target) else {
            return Ok(MutationOutcome::Noop);
        };
        let index = index.min(blocks.len());
        blocks.insert(index, block);
        Ok(MutationOutcome::select(id.clone()))
    }

    fn apply_delete(tree: &mut BlockTree, id: &BlockId) -> MutationOutcome {
        let Some(location) = tree::locate(&tree.blocks, id) else {
            return MutationOutcome::Noop;
        };
        match tree::container_mut(&mut tree.blocks, &location.container) {
            Some(blocks) => {
                blocks.remove(location.index);
                MutationOutcome::applied()
            }
            None => MutationOutcome::Noop,
        }
    }

    fn apply_duplicate(tree: &mut BlockTree, id: &BlockId, ids: &mut IdGenerator) -> MutationOutcome {
        let Some(location) = tree::locate(&tree.blocks, id) else {
            return MutationOutcome::Noop;
        };
        let Some(blocks) = tree::container_mut(&mut tree.blocks, &location.container) else {
            return MutationOutcome::Noop;
        };

        let mut copy = blocks[location.index].clone();
        reassign_ids(&mut copy, ids);
        let copy_id = copy.id.clone();
        blocks.insert(location.index + 1, copy);
        MutationOutcome::select(copy_id)
    }

    fn apply_detach(
        tree: &mut BlockTree,
        id: &BlockId,
        ids: &mut IdGenerator,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(location) = tree::locate(&tree.blocks, id) else {
            return Ok(MutationOutcome::Noop);
        };
        let Some(blocks) = tree::container_mut(&mut tree.blocks, &location.container) else {
            return Ok(MutationOutcome::Noop);
        };

        let BlockKind::Fragment {
            fragment_blocks, ..
        } = &blocks[location.index].kind
        else {
            return Err(MutationError::NotAFragment(id.clone()));
        };

        let detached: Vec<Block> = fragment_blocks
            .iter()
            .map(|cached| {
                let mut copy = cached.clone();
                reassign_ids(&mut copy, ids);
                copy
            })
            .collect();
        let selection = detached.first().map(|block| block.id.clone());

        blocks.splice(location.index..=location.index, detached);
        Ok(MutationOutcome::Applied { selection })
    }

    fn apply_update_field(
        tree: &mut BlockTree,
        id: &BlockId,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<MutationOutcome, MutationError> {
        if matches!(field, "id" | "type") {
            return Err(MutationError::ProtectedField(field.to_string()));
        }
        let Some(block) = tree::find_block_mut(&mut tree.blocks, id) else {
            return Ok(MutationOutcome::Noop);
        };
        // Unrecognized blocks and preserved extras stay editable; anything else
        // the type does not model has nowhere to go.
        let known_type = block.block_type().is_some();
        if known_type && !block.models_field(field) && !block.extra.contains_key(field) {
            debug!(block = %id, field, "Field not modelled by block type, ignoring");
            return Ok(MutationOutcome::Noop);
        }

        let invalid = |reason: String| MutationError::InvalidField {
            field: field.to_string(),
            reason,
        };

        let mut json = serde_json::to_value(&*block).map_err(|e| invalid(e.to_string()))?;
        let Some(object) = json.as_object_mut() else {
            return Err(invalid("block is not an object".to_string()));
        };
        if value.is_null() {
            object.remove(field);
        } else {
            object.insert(field.to_string(), value.clone());
        }

        let updated: Block = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        if updated.block_type() != block.block_type() {
            return Err(invalid("field changes the block type".to_string()));
        }
        if updated == *block {
            return Ok(MutationOutcome::Noop);
        }
        *block = updated;
        Ok(MutationOutcome::applied())
    }

    fn apply_update_style(
        tree: &mut BlockTree,
        id: &BlockId,
        property: &str,
        value: Option<&str>,
    ) -> MutationOutcome {
        let Some(block) = tree::find_block_mut(&mut tree.blocks, id) else {
            return MutationOutcome::Noop;
        };
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => {
                block.style.insert(property.to_string(), value.to_string());
            }
            None => {
                block.style.remove(property);
            }
        }
        MutationOutcome::applied()
    }
}

/// Give `block` and everything under it fresh block and column ids.
pub fn reassign_ids(block: &mut Block, ids: &mut IdGenerator) {
    struct Reassign<'a> {
        ids: &'a mut IdGenerator,
    }

    impl VisitorMut for Reassign<'_> {
        fn visit_block_mut(&mut self, block: &mut Block) {
            block.id = self.ids.block_id();
            walk_block_mut(self, block);
        }

        fn visit_column_mut(&mut self, column: &mut Column) {
            column.id = self.ids.column_id();
            walk_column_mut(self, column);
        }
    }

    Reassign { ids }.visit_block_mut(block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_model::{collect_block_ids, ColumnId};
    use serde_json::json;

    fn text(id: &str, content: &str) -> Block {
        Block::new(
            BlockId::from(id),
            BlockKind::Text {
                content: content.to_string(),
            },
        )
    }

    fn ids() -> IdGenerator {
        IdGenerator::with_prefix("t")
    }

    fn root_ids(tree: &BlockTree) -> Vec<&str> {
        tree.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "")]);
        let outcome = Mutation::Insert {
            block_type: BlockType::Divider,
            variant: None,
            target: ContainerRef::Root,
            index: Some(99),
        }
        .apply(&mut tree, &mut ids())
        .unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(
            outcome,
            MutationOutcome::Applied {
                selection: Some(tree.blocks[1].id.clone())
            }
        );
    }

    #[test]
    fn test_insert_into_missing_column_is_noop() {
        let mut tree = BlockTree::new();
        let outcome = Mutation::Insert {
            block_type: BlockType::Text,
            variant: None,
            target: ContainerRef::Column(ColumnId::from("gone")),
            index: None,
        }
        .apply(&mut tree, &mut ids())
        .unwrap();
        assert_eq!(outcome, MutationOutcome::Noop);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_move_up_and_bounds() {
        let mut tree = BlockTree::from_blocks(vec![text("a", ""), text("b", "")]);
        let mut ids = ids();

        let up = Mutation::Move {
            id: BlockId::from("b"),
            direction: Direction::Up,
        };
        assert!(up.apply(&mut tree, &mut ids).unwrap().is_applied());
        assert_eq!(root_ids(&tree), vec!["b", "a"]);

        assert_eq!(up.apply(&mut tree, &mut ids).unwrap(), MutationOutcome::Noop);
    }

    #[test]
    fn test_missing_id_is_noop() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "")]);
        let before = tree.clone();
        let mut ids = ids();
        for mutation in [
            Mutation::Delete { id: BlockId::from("x") },
            Mutation::Duplicate { id: BlockId::from("x") },
            Mutation::DetachFragment { id: BlockId::from("x") },
            Mutation::UpdateStyle {
                id: BlockId::from("x"),
                property: "color".to_string(),
                value: Some("red".to_string()),
            },
        ] {
            assert_eq!(mutation.apply(&mut tree, &mut ids).unwrap(), MutationOutcome::Noop);
        }
        assert_eq!(tree, before);
    }

    #[test]
    fn test_relocate_within_same_container_adjusts_index() {
        let mut tree =
            BlockTree::from_blocks(vec![text("a", ""), text("b", ""), text("c", "")]);
        // Drop "a" at slot 2 (between b and c)
        Mutation::Relocate {
            id: BlockId::from("a"),
            target: ContainerRef::Root,
            index: 2,
        }
        .apply(&mut tree, &mut ids())
        .unwrap();
        assert_eq!(root_ids(&tree), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_update_field_roundtrips_through_json() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "old")]);
        Mutation::UpdateField {
            id: BlockId::from("a"),
            field: "content".to_string(),
            value: json!("new"),
        }
        .apply(&mut tree, &mut ids())
        .unwrap();
        assert_eq!(
            tree.blocks[0].kind,
            BlockKind::Text {
                content: "new".to_string()
            }
        );
    }

    #[test]
    fn test_update_field_without_change_is_noop() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "same")]);
        let update = |field: &str, value: serde_json::Value| Mutation::UpdateField {
            id: BlockId::from("a"),
            field: field.to_string(),
            value,
        };

        let outcome = update("src", json!("https://cdn.test/x.png"))
            .apply(&mut tree, &mut ids())
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Noop);
        assert!(tree.blocks[0].extra.is_empty());

        let outcome = update("content", json!("same"))
            .apply(&mut tree, &mut ids())
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Noop);
    }

    #[test]
    fn test_update_field_edits_preserved_extras() {
        let block: Block = serde_json::from_value(
            json!({"id": "i", "type": "image", "src": "a.png", "alt": "", "width": "300px"}),
        )
        .unwrap();
        let mut tree = BlockTree::from_blocks(vec![block]);
        let outcome = Mutation::UpdateField {
            id: BlockId::from("i"),
            field: "width".to_string(),
            value: json!("480px"),
        }
        .apply(&mut tree, &mut ids())
        .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(tree.blocks[0].extra["width"], "480px");
    }

    #[test]
    fn test_update_field_rejects_protected_and_invalid() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "old")]);
        let err = Mutation::UpdateField {
            id: BlockId::from("a"),
            field: "type".to_string(),
            value: json!("image"),
        }
        .apply(&mut tree, &mut ids())
        .unwrap_err();
        assert_eq!(err, MutationError::ProtectedField("type".to_string()));

        let err = Mutation::UpdateField {
            id: BlockId::from("a"),
            field: "content".to_string(),
            value: json!(42),
        }
        .apply(&mut tree, &mut ids())
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidField { .. }));
    }

    #[test]
    fn test_update_style_sets_and_clears() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "")]);
        let mut ids = ids();
        let set = |value: Option<&str>| Mutation::UpdateStyle {
            id: BlockId::from("a"),
            property: "color".to_string(),
            value: value.map(str::to_string),
        };

        set(Some("#ff0000")).apply(&mut tree, &mut ids).unwrap();
        assert_eq!(tree.blocks[0].style.get("color").map(String::as_str), Some("#ff0000"));

        set(Some("  ")).apply(&mut tree, &mut ids).unwrap();
        assert!(tree.blocks[0].style.is_empty());
    }

    #[test]
    fn test_detach_requires_fragment() {
        let mut tree = BlockTree::from_blocks(vec![text("a", "")]);
        let err = Mutation::DetachFragment { id: BlockId::from("a") }
            .apply(&mut tree, &mut ids())
            .unwrap_err();
        assert_eq!(err, MutationError::NotAFragment(BlockId::from("a")));
    }

    #[test]
    fn test_reassign_ids_covers_columns() {
        let mut ids = ids();
        let mut structure = default_block(BlockType::Structure, None, &mut ids);
        if let Some(columns) = structure.columns_mut() {
            columns[0].blocks.push(text("inner", ""));
        }
        let before = collect_block_ids(&BlockTree::from_blocks(vec![structure.clone()]));

        reassign_ids(&mut structure, &mut ids);
        let after = collect_block_ids(&BlockTree::from_blocks(vec![structure]));

        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|id| !before.contains(id)));
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation: Mutation = serde_json::from_value(json!({
            "op": "insert",
            "blockType": "structure",
            "variant": "1-2-left",
            "target": { "column": "col-1" },
            "index": 0
        }))
        .unwrap();
        assert_eq!(
            mutation,
            Mutation::Insert {
                block_type: BlockType::Structure,
                variant: Some(Variant::parse("1-2-left")),
                target: ContainerRef::Column(ColumnId::from("col-1")),
                index: Some(0),
            }
        );
    }
}
