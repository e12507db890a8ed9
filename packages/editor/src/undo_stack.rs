//! # Undo/Redo History
//!
//! A linear log of whole-document snapshots with a cursor.
//!
//! ## Design
//!
//! - Snapshots are owned copies; later edits to the live tree cannot reach them
//! - Pushing while the cursor is behind the tail discards the redo tail
//! - Pushing is a no-op while locked, so restoring a snapshot never records itself
//! - Optional cap (0 = unbounded) evicts from the front
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(100);
//! history.push(snapshot_a);
//! history.push(snapshot_b);
//!
//! let restored = history.undo();   // Some(snapshot_a)
//! let again = history.redo();      // Some(snapshot_b)
//! ```

use blockmail_model::{BlockTree, BodyStyle, Document};
use tracing::debug;

/// Captured document state
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub blocks: BlockTree,
    pub body_style: BodyStyle,
    pub html_override: Option<String>,
}

impl HistorySnapshot {
    pub fn capture(document: &Document) -> Self {
        Self {
            blocks: document.blocks.clone(),
            body_style: document.body_style.clone(),
            html_override: document.html_override.clone(),
        }
    }

    pub fn restore_into(&self, document: &mut Document) {
        document.blocks = self.blocks.clone();
        document.body_style = self.body_style.clone();
        document.html_override = self.html_override.clone();
    }
}

/// Snapshot history for one editing session
#[derive(Debug)]
pub struct History {
    entries: Vec<HistorySnapshot>,

    /// `None` only while empty
    cursor: Option<usize>,

    /// Suppresses `push` during restores
    locked: bool,

    /// Maximum number of snapshots kept (0 = unlimited)
    max_entries: usize,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            locked: false,
            max_entries,
        }
    }

    /// Record `snapshot` as the newest state. Returns `false` when locked.
    pub fn push(&mut self, snapshot: HistorySnapshot) -> bool {
        if self.locked {
            debug!("History locked, snapshot skipped");
            return false;
        }

        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(snapshot);

        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }

        self.cursor = Some(self.entries.len() - 1);
        true
    }

    /// Step back, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<HistorySnapshot> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                self.entries.get(cursor - 1).cloned()
            }
            _ => None,
        }
    }

    /// Step forward, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<HistorySnapshot> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.cursor = Some(cursor + 1);
                self.entries.get(cursor + 1).cloned()
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
