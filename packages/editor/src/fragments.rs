//! Fragment library cache.
//!
//! Fragments are named, versioned block subtrees kept outside the document.
//! Inserting one places a reference block carrying a cached copy.

use blockmail_model::{Block, BlockKind, IdGenerator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl FragmentRecord {
    /// A reference block for this fragment, locked against in-place edits.
    pub fn to_block(&self, ids: &mut IdGenerator) -> Block {
        Block::new(
            ids.block_id(),
            BlockKind::Fragment {
                fragment_id: self.id.clone(),
                fragment_name: self.name.clone(),
                fragment_version: Some(self.version),
                fragment_blocks: self.blocks.clone(),
                fragment_html: self.html.clone(),
                fragment_locked: true,
            },
        )
    }
}

/// Registered fragments by id
#[derive(Debug, Clone, Default)]
pub struct FragmentLibrary {
    records: BTreeMap<String, FragmentRecord>,
}

impl FragmentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace. Returns the previous record under the same id.
    pub fn register(&mut self, record: FragmentRecord) -> Option<FragmentRecord> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&FragmentRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_model::BlockId;

    #[test]
    fn test_reference_block_carries_cache() {
        let record = FragmentRecord {
            id: "footer".to_string(),
            name: "Footer".to_string(),
            version: 3,
            blocks: vec![Block::new(BlockId::from("f1"), BlockKind::Divider)],
            html: None,
        };
        let mut ids = IdGenerator::with_prefix("t");
        let block = record.to_block(&mut ids);

        match block.kind {
            BlockKind::Fragment {
                fragment_id,
                fragment_version,
                fragment_blocks,
                fragment_locked,
                ..
            } => {
                assert_eq!(fragment_id, "footer");
                assert_eq!(fragment_version, Some(3));
                assert_eq!(fragment_blocks.len(), 1);
                assert!(fragment_locked);
            }
            other => panic!("expected fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut library = FragmentLibrary::new();
        let record = FragmentRecord {
            id: "a".to_string(),
            name: String::new(),
            version: 1,
            blocks: Vec::new(),
            html: None,
        };
        assert!(library.register(record.clone()).is_none());
        assert_eq!(library.register(record).map(|r| r.version), Some(1));
        assert_eq!(library.len(), 1);
    }
}
