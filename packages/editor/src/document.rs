//! # Document Handle
//!
//! Persisted `{ blocks, bodyStyle, htmlOverride? }` documents.
//!
//! A handle is either:
//! - **Memory-backed**: hydrated from a JSON string, for tests and previews
//! - **File-backed**: loaded from disk and saved back explicitly
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit (EditorState) → Replace → Save
//!   ↓          ↓                 ↓        ↓
//! JSON     BlockTree          Document   JSON
//! ```

use crate::EditorError;
use blockmail_model::Document;
use std::path::{Path, PathBuf};
use tracing::info;

/// Persisted blockmail document
#[derive(Debug)]
pub struct DocumentHandle {
    /// Path to the JSON file (if any)
    pub path: Option<PathBuf>,

    /// Increments every time the document is replaced
    pub version: u64,

    storage: DocumentStorage,
}

/// Storage backend for a document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only
    Memory { document: Document },

    /// File-backed
    File { document: Document, dirty: bool },
}

impl DocumentHandle {
    /// Hydrate from JSON (memory-backed)
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        let document = Document::from_json(source)?;
        Ok(Self {
            path: None,
            version: 0,
            storage: DocumentStorage::Memory { document },
        })
    }

    /// Load from a JSON file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        let document = Document::from_json(&source)?;
        info!(path = %path.display(), blocks = document.blocks.len(), "Loaded document");

        Ok(Self {
            path: Some(path),
            version: 0,
            storage: DocumentStorage::File {
                document,
                dirty: false,
            },
        })
    }

    pub fn document(&self) -> &Document {
        match &self.storage {
            DocumentStorage::Memory { document } | DocumentStorage::File { document, .. } => {
                document
            }
        }
    }

    /// Swap in the editor's latest state
    pub fn replace(&mut self, next: Document) {
        self.version += 1;
        match &mut self.storage {
            DocumentStorage::Memory { document } => *document = next,
            DocumentStorage::File { document, dirty } => {
                *document = next;
                *dirty = true;
            }
        }
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let Some(path) = &self.path else {
            return Err(EditorError::NotFileBacked);
        };
        match &mut self.storage {
            DocumentStorage::File { document, dirty } => {
                std::fs::write(path, document.to_json()?)?;
                *dirty = false;
                info!(path = %path.display(), version = self.version, "Saved document");
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.document().to_json()?)
    }
}
