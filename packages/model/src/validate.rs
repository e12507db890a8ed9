//! Structural checks over a block tree.
//!
//! None of these are enforced by the types. The editor keeps them true for
//! trees it builds; persisted documents may violate them and still render.

use crate::block::{Block, BlockKind, BlockTree};
use crate::ids::{BlockId, ColumnId};
use crate::visitor::{walk_block, walk_column, Visitor};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum TreeIssue {
    DuplicateBlockId { id: BlockId },
    DuplicateColumnId { id: ColumnId },
    /// A structure somewhere inside another structure's columns.
    NestedStructure { id: BlockId, ancestor: BlockId },
    ColumnCountMismatch { id: BlockId, expected: usize, actual: usize },
}

impl fmt::Display for TreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeIssue::DuplicateBlockId { id } => write!(f, "duplicate block id '{id}'"),
            TreeIssue::DuplicateColumnId { id } => write!(f, "duplicate column id '{id}'"),
            TreeIssue::NestedStructure { id, ancestor } => {
                write!(f, "structure '{id}' is nested inside structure '{ancestor}'")
            }
            TreeIssue::ColumnCountMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "block '{id}' has {actual} column(s), its layout expects {expected}"
            ),
        }
    }
}

#[derive(Default)]
struct Validator {
    block_ids: HashSet<BlockId>,
    column_ids: HashSet<ColumnId>,
    structures: Vec<BlockId>,
    issues: Vec<TreeIssue>,
}

impl Visitor for Validator {
    fn visit_block(&mut self, block: &Block) {
        if !self.block_ids.insert(block.id.clone()) {
            self.issues.push(TreeIssue::DuplicateBlockId {
                id: block.id.clone(),
            });
        }

        match &block.kind {
            BlockKind::Structure { variant, columns } => {
                if let Some(ancestor) = self.structures.last() {
                    self.issues.push(TreeIssue::NestedStructure {
                        id: block.id.clone(),
                        ancestor: ancestor.clone(),
                    });
                }
                if columns.len() != variant.column_count() {
                    self.issues.push(TreeIssue::ColumnCountMismatch {
                        id: block.id.clone(),
                        expected: variant.column_count(),
                        actual: columns.len(),
                    });
                }
                self.structures.push(block.id.clone());
                walk_block(self, block);
                self.structures.pop();
            }
            BlockKind::Container { columns } => {
                if columns.len() != 1 {
                    self.issues.push(TreeIssue::ColumnCountMismatch {
                        id: block.id.clone(),
                        expected: 1,
                        actual: columns.len(),
                    });
                }
                walk_block(self, block);
            }
            _ => walk_block(self, block),
        }
    }

    fn visit_column(&mut self, column: &crate::block::Column) {
        if !self.column_ids.insert(column.id.clone()) {
            self.issues.push(TreeIssue::DuplicateColumnId {
                id: column.id.clone(),
            });
        }
        walk_column(self, column);
    }
}

/// All structural issues, in document order.
pub fn validate_tree(tree: &BlockTree) -> Vec<TreeIssue> {
    let mut validator = Validator::default();
    validator.visit_tree(tree);
    validator.issues
}
