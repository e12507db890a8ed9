//! # Blockmail Model
//!
//! The document model shared by the editor, the renderer and the resolvers.
//!
//! ```text
//! Document
//!  ├─ blocks: BlockTree ── Block ── kind: structure | container ── Column ── Block ...
//!  │                              └─ kind: text | image | button | offer | fragment ...
//!  ├─ bodyStyle: BodyStyle
//!  └─ htmlOverride?
//! ```
//!
//! Ids are opaque strings minted by [`IdGenerator`] and unique across the whole
//! document, nested blocks and columns included.

pub mod block;
pub mod document;
pub mod ids;
pub mod markers;
pub mod style;
pub mod validate;
pub mod variant;
pub mod visitor;

pub use block::{Block, BlockKind, BlockTree, BlockType, Column, FormField};
pub use document::{Document, ModelError};
pub use ids::{BlockId, ColumnId, IdGenerator};
pub use markers::{offer_marker, OFFER_MARKER_PATTERN};
pub use style::{Alignment, BodyStyle, BodyStylePatch, Style, Theme};
pub use validate::{validate_tree, TreeIssue};
pub use variant::Variant;
pub use visitor::{collect_block_ids, collect_column_ids, Visitor, VisitorMut};
