//! # Drop Resolution
//!
//! Pure geometry plus the one structural rule the editor enforces
//! procedurally: structures never nest inside structures.
//!
//! The view layer measures the rendered children of the container under the
//! pointer and passes their vertical bounds in; nothing here touches a DOM.

use crate::fragments::FragmentLibrary;
use crate::tree::{self, ContainerRef};
use blockmail_model::visitor::walk_block;
use blockmail_model::{Block, BlockId, BlockKind, BlockType, Variant, Visitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vertical extent of one rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemBounds {
    pub top: f64,
    pub height: f64,
}

impl ItemBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Insertion index for a pointer over a list of rendered items.
///
/// The first item whose midpoint lies below the pointer receives the drop in
/// front of it; past the last midpoint the drop appends.
pub fn resolve_drop_index(pointer_y: f64, items: &[ItemBounds]) -> usize {
    items
        .iter()
        .position(|item| pointer_y < item.midpoint())
        .unwrap_or(items.len())
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DragPayload {
    /// Palette item
    New {
        #[serde(rename = "type")]
        block_type: BlockType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<Variant>,
    },
    /// Existing block being relocated
    Move { block_id: BlockId },
    /// Library fragment
    Fragment { fragment_id: String },
    /// Uploaded image asset
    Asset { url: String },
}

impl DragPayload {
    /// Whether dropping this payload would place a structure anywhere in the
    /// target, including one carried inside a moved container or a fragment.
    pub fn places_structure(&self, blocks: &[Block], fragments: &FragmentLibrary) -> bool {
        match self {
            DragPayload::New { block_type, .. } => *block_type == BlockType::Structure,
            DragPayload::Move { block_id } => tree::find_block(blocks, block_id)
                .is_some_and(|block| contains_structure(std::slice::from_ref(block))),
            DragPayload::Fragment { fragment_id } => fragments
                .get(fragment_id)
                .is_some_and(|record| contains_structure(&record.blocks)),
            DragPayload::Asset { .. } => false,
        }
    }
}

/// Stops at the first structure; fragment caches count since they render inline.
#[derive(Default)]
struct StructureFinder {
    found: bool,
}

impl Visitor for StructureFinder {
    fn visit_block(&mut self, block: &Block) {
        if self.found || block.is_structure() {
            self.found = true;
            return;
        }
        walk_block(self, block);
    }

    fn visit_fragment_cache(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.visit_block(block);
        }
    }
}

fn contains_structure(blocks: &[Block]) -> bool {
    let mut finder = StructureFinder::default();
    for block in blocks {
        finder.visit_block(block);
    }
    finder.found
}

/// Geometry of a drop, as measured by the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropZone {
    /// Container whose drop zone is under the pointer
    pub container: ContainerRef,
    pub pointer_y: f64,
    /// Rendered children of `container`, in order
    #[serde(default)]
    pub items: Vec<ItemBounds>,
    /// Bounds of the structure owning `container`, when it is a column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ItemBounds>,
    /// Block directly under the pointer, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_block: Option<BlockId>,
}

impl DropZone {
    pub fn new(container: ContainerRef, pointer_y: f64, items: Vec<ItemBounds>) -> Self {
        Self {
            container,
            pointer_y,
            items,
            owner: None,
            over_block: None,
        }
    }

    pub fn with_owner(mut self, owner: ItemBounds) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn over(mut self, block: BlockId) -> Self {
        self.over_block = Some(block);
        self
    }
}

/// Resolved insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub container: ContainerRef,
    pub index: usize,
}

/// Where `payload` lands when released over `zone`.
///
/// A structure released inside any structure's column becomes a sibling of
/// the outermost enclosing structure instead: before it when the pointer is in
/// its upper half, after it otherwise.
pub fn plan_drop(
    blocks: &[Block],
    fragments: &FragmentLibrary,
    zone: &DropZone,
    payload: &DragPayload,
) -> Placement {
    let placement = Placement {
        container: zone.container.clone(),
        index: resolve_drop_index(zone.pointer_y, &zone.items),
    };

    let ContainerRef::Column(column) = &zone.container else {
        return placement;
    };
    if !payload.places_structure(blocks, fragments) {
        return placement;
    }

    let ancestors = tree::column_ancestors(blocks, column);
    let Some(outer) = ancestors.into_iter().find(|block| block.is_structure()) else {
        return placement;
    };
    let Some(location) = tree::locate(blocks, &outer.id) else {
        return placement;
    };

    let after = zone
        .owner
        .map(|bounds| zone.pointer_y >= bounds.midpoint())
        .unwrap_or(true);
    debug!(structure = %outer.id, after, "Redirecting structure drop out of column");

    Placement {
        container: location.container,
        index: location.index + usize::from(after),
    }
}

/// Whether an asset dropped over `block` should replace its image source.
pub fn accepts_asset(block: &Block) -> bool {
    matches!(block.kind, BlockKind::Image { .. })
}
