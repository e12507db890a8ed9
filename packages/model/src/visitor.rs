use crate::block::{Block, BlockTree, Column};

/// Visitor pattern for traversing the block tree immutably
///
/// Default implementations walk the entire tree in document order.
/// Fragment caches are not part of the document and are not walked;
/// override `visit_fragment_cache` to reach them.
pub trait Visitor: Sized {
    fn visit_tree(&mut self, tree: &BlockTree) {
        walk_tree(self, tree);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_column(&mut self, column: &Column) {
        walk_column(self, column);
    }

    fn visit_fragment_cache(&mut self, _blocks: &[Block]) {
        // Cache, not document content
    }
}

/// Mutable visitor pattern for transforming the block tree
pub trait VisitorMut: Sized {
    fn visit_blocks_mut(&mut self, blocks: &mut [Block]) {
        walk_blocks_mut(self, blocks);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_column_mut(&mut self, column: &mut Column) {
        walk_column_mut(self, column);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_tree<V: Visitor>(visitor: &mut V, tree: &BlockTree) {
    for block in &tree.blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    if let Some(columns) = block.columns() {
        for column in columns {
            visitor.visit_column(column);
        }
    }
    if let crate::block::BlockKind::Fragment {
        fragment_blocks, ..
    } = &block.kind
    {
        visitor.visit_fragment_cache(fragment_blocks);
    }
}

pub fn walk_column<V: Visitor>(visitor: &mut V, column: &Column) {
    for block in &column.blocks {
        visitor.visit_block(block);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_blocks_mut<V: VisitorMut>(visitor: &mut V, blocks: &mut [Block]) {
    for block in blocks {
        visitor.visit_block_mut(block);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    if let Some(columns) = block.columns_mut() {
        for column in columns {
            visitor.visit_column_mut(column);
        }
    }
}

pub fn walk_column_mut<V: VisitorMut>(visitor: &mut V, column: &mut Column) {
    for block in &mut column.blocks {
        visitor.visit_block_mut(block);
    }
}

/// Every block id in document order, nested ones included.
pub fn collect_block_ids(tree: &BlockTree) -> Vec<crate::ids::BlockId> {
    struct Ids(Vec<crate::ids::BlockId>);

    impl Visitor for Ids {
        fn visit_block(&mut self, block: &Block) {
            self.0.push(block.id.clone());
            walk_block(self, block);
        }
    }

    let mut ids = Ids(Vec::new());
    ids.visit_tree(tree);
    ids.0
}

/// Every column id in document order.
pub fn collect_column_ids(tree: &BlockTree) -> Vec<crate::ids::ColumnId> {
    struct Ids(Vec<crate::ids::ColumnId>);

    impl Visitor for Ids {
        fn visit_column(&mut self, column: &Column) {
            self.0.push(column.id.clone());
            walk_column(self, column);
        }
    }

    let mut ids = Ids(Vec::new());
    ids.visit_tree(tree);
    ids.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::ids::{BlockId, ColumnId};

    fn text(id: &str) -> Block {
        Block::new(BlockId::from(id), BlockKind::Text { content: id.to_string() })
    }

    #[test]
    fn test_collects_nested_ids_in_order() {
        let mut column = Column::new(ColumnId::from("c1"));
        column.blocks.push(text("inner"));
        let container = Block::new(
            BlockId::from("box"),
            BlockKind::Container {
                columns: vec![column],
            },
        );
        let tree = BlockTree::from_blocks(vec![text("a"), container, text("z")]);

        let ids: Vec<String> = collect_block_ids(&tree).into_iter().map(|i| i.0).collect();
        assert_eq!(ids, vec!["a", "box", "inner", "z"]);
        assert_eq!(collect_column_ids(&tree), vec![ColumnId::from("c1")]);
    }

    #[test]
    fn test_fragment_cache_is_not_walked() {
        let fragment = Block::new(
            BlockId::from("f"),
            BlockKind::Fragment {
                fragment_id: "lib-1".to_string(),
                fragment_name: String::new(),
                fragment_version: None,
                fragment_blocks: vec![text("cached")],
                fragment_html: None,
                fragment_locked: true,
            },
        );
        let tree = BlockTree::from_blocks(vec![fragment]);
        let ids: Vec<String> = collect_block_ids(&tree).into_iter().map(|i| i.0).collect();
        assert_eq!(ids, vec!["f"]);
    }
}
