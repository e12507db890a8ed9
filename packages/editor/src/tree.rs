//! Lookup by id.
//!
//! Blocks keep no parent pointers. Every operation searches the tree for the
//! id it needs and gets back the owning container plus an index, so a lookup
//! is always consistent with whatever the tree looks like right now.
//! Fragment caches are not searched.

use blockmail_model::{Block, BlockId, Column, ColumnId};
use serde::{Deserialize, Serialize};

/// A block list: the document root or one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRef {
    #[default]
    Root,
    Column(ColumnId),
}

/// Where a block lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub container: ContainerRef,
    pub index: usize,
}

pub fn locate(blocks: &[Block], id: &BlockId) -> Option<Location> {
    locate_in(blocks, id, &ContainerRef::Root)
}

fn locate_in(blocks: &[Block], id: &BlockId, container: &ContainerRef) -> Option<Location> {
    for (index, block) in blocks.iter().enumerate() {
        if &block.id == id {
            return Some(Location {
                container: container.clone(),
                index,
            });
        }
        for column in block.columns().unwrap_or_default() {
            let inner = ContainerRef::Column(column.id.clone());
            if let Some(found) = locate_in(&column.blocks, id, &inner) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_block<'a>(blocks: &'a [Block], id: &BlockId) -> Option<&'a Block> {
    for block in blocks {
        if &block.id == id {
            return Some(block);
        }
        for column in block.columns().unwrap_or_default() {
            if let Some(found) = find_block(&column.blocks, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_block_mut<'a>(blocks: &'a mut [Block], id: &BlockId) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if &block.id == id {
            return Some(block);
        }
        if let Some(columns) = block.columns_mut() {
            for column in columns.iter_mut() {
                if let Some(found) = find_block_mut(&mut column.blocks, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

pub fn find_column<'a>(blocks: &'a [Block], id: &ColumnId) -> Option<&'a Column> {
    for block in blocks {
        for column in block.columns().unwrap_or_default() {
            if &column.id == id {
                return Some(column);
            }
            if let Some(found) = find_column(&column.blocks, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_column_mut<'a>(blocks: &'a mut [Block], id: &ColumnId) -> Option<&'a mut Column> {
    for block in blocks.iter_mut() {
        if let Some(columns) = block.columns_mut() {
            for column in columns.iter_mut() {
                if &column.id == id {
                    return Some(column);
                }
                if let Some(found) = find_column_mut(&mut column.blocks, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// The block list behind `container`, if it still exists.
pub fn container<'a>(blocks: &'a [Block], container: &ContainerRef) -> Option<&'a [Block]> {
    match container {
        ContainerRef::Root => Some(blocks),
        ContainerRef::Column(id) => find_column(blocks, id).map(|c| c.blocks.as_slice()),
    }
}

pub fn container_mut<'a>(
    blocks: &'a mut Vec<Block>,
    container: &ContainerRef,
) -> Option<&'a mut Vec<Block>> {
    match container {
        ContainerRef::Root => Some(blocks),
        ContainerRef::Column(id) => find_column_mut(blocks, id).map(|c| &mut c.blocks),
    }
}

/// Blocks owning `column`, outermost first.
pub fn column_ancestors<'a>(blocks: &'a [Block], column: &ColumnId) -> Vec<&'a Block> {
    let mut path = Vec::new();
    if ancestors_into(blocks, column, &mut path) {
        path
    } else {
        Vec::new()
    }
}

fn ancestors_into<'a>(blocks: &'a [Block], column: &ColumnId, path: &mut Vec<&'a Block>) -> bool {
    for block in blocks {
        let Some(columns) = block.columns() else {
            continue;
        };
        path.push(block);
        for candidate in columns {
            if &candidate.id == column || ancestors_into(&candidate.blocks, column, path) {
                return true;
            }
        }
        path.pop();
    }
    false
}

/// Whether `column` sits anywhere under `block`.
pub fn owns_column(block: &Block, column: &ColumnId) -> bool {
    block
        .columns()
        .map(|columns| {
            columns
                .iter()
                .any(|c| &c.id == column || c.blocks.iter().any(|b| owns_column(b, column)))
        })
        .unwrap_or(false)
}
