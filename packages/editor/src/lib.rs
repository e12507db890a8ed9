//! # Blockmail Editor
//!
//! Block-tree editing engine: mutations, drop resolution, history and the
//! session state that ties them to the renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Document, BlockTree, ids, variants   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorState                          │
//! │  - Mutations located by id on every call     │
//! │  - Drop resolution from measured geometry    │
//! │  - Snapshot history with redo truncation     │
//! │  - Load/save persisted documents             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: canvas + preview HTML        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockmail_editor::{ContainerRef, DocumentHandle, EditorConfig, EditorState};
//! use blockmail_model::{BlockType, Variant};
//!
//! let mut handle = DocumentHandle::load("welcome.json")?;
//! let mut state = EditorState::new(handle.document().clone(), EditorConfig::default());
//!
//! state.insert(BlockType::Structure, Some(Variant::parse("2-2")), ContainerRef::Root, None)?;
//! state.undo();
//! state.redo();
//!
//! handle.replace(state.to_document());
//! handle.save()?;
//! ```

mod defaults;
mod document;
mod drop;
mod errors;
mod fragments;
mod mutations;
mod session;
mod tree;
mod undo_stack;

pub use defaults::default_block;
pub use document::{DocumentHandle, DocumentStorage};
pub use drop::{plan_drop, resolve_drop_index, DragPayload, DropZone, ItemBounds, Placement};
pub use errors::EditorError;
pub use fragments::{FragmentLibrary, FragmentRecord};
pub use mutations::{reassign_ids, Direction, Mutation, MutationError, MutationOutcome};
pub use session::{EditorConfig, EditorState};
pub use tree::{find_block, locate, ContainerRef, Location};
pub use undo_stack::{History, HistorySnapshot};
