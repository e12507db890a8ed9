//! Opaque identifiers for blocks and columns.
//!
//! Ids are generated once at creation time and never reused. A generator
//! combines a per-session random prefix with a monotonic counter, so two ids
//! minted by the same generator can never collide and ids minted by different
//! sessions collide only if their UUID prefixes do.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a block, unique within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

/// Stable identifier of a column, unique within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub String);

impl BlockId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ColumnId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Mints fresh block and column ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    /// Generator with a random session prefix.
    pub fn new() -> Self {
        let session = uuid::Uuid::new_v4().simple().to_string();
        Self::with_prefix(&session[..12])
    }

    /// Generator with a fixed prefix (deterministic ids for tests and tooling).
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: 1,
        }
    }

    pub fn block_id(&mut self) -> BlockId {
        let n = self.bump();
        BlockId(format!("blk-{}-{}", self.prefix, n))
    }

    pub fn column_id(&mut self) -> ColumnId {
        let n = self.bump();
        ColumnId(format!("col-{}-{}", self.prefix, n))
    }

    fn bump(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
