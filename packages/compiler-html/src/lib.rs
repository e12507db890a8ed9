//! HTML renderer for blockmail documents.
//!
//! The same entry points serve the editable canvas (with editor affordances),
//! the simulated preview and the sendable export.

mod blocks;
mod compiler;
pub mod placeholders;
pub mod styles;

pub use compiler::{escape_html, render, render_blocks, render_document, RenderOptions};
pub use styles::{resolve_block_style, to_css, StyleLayers};
