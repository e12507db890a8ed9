//! # Editor State
//!
//! The single owner of everything one editing session touches: the document,
//! the selection, the history and the last rendered canvas and preview.
//!
//! Every committed edit runs the same pipeline, start to finish, before the
//! next one is accepted:
//!
//! ```text
//! Mutation → BlockTree → render canvas + preview → history snapshot
//! ```
//!
//! Live edits (sliders, keystrokes) skip the snapshot; [`EditorState::commit`]
//! records one when the input settles.

use crate::defaults::image_block;
use crate::drop::{self, DragPayload, DropZone};
use crate::fragments::{FragmentLibrary, FragmentRecord};
use crate::mutations::{Direction, Mutation, MutationError, MutationOutcome};
use crate::tree::{self, ContainerRef};
use crate::undo_stack::{History, HistorySnapshot};
use crate::EditorError;
use blockmail_compiler_html::{render, render_document, RenderOptions};
use blockmail_model::{
    BlockId, BlockTree, BlockType, BodyStyle, BodyStylePatch, Document, IdGenerator, Theme,
    Variant,
};
use tracing::{debug, info, warn};

/// Library-level editor settings
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Maximum history snapshots (0 = unbounded)
    pub history_limit: usize,
    /// Fill empty fields with placeholder content in the preview pass
    pub simulate_content: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            simulate_content: true,
        }
    }
}

/// One editing session
pub struct EditorState {
    document: Document,
    selection: Option<BlockId>,
    history: History,
    ids: IdGenerator,
    theme: Option<Theme>,
    fragments: FragmentLibrary,
    config: EditorConfig,
    canvas_html: String,
    preview_html: String,
}

impl EditorState {
    pub fn new(document: Document, config: EditorConfig) -> Self {
        Self::with_ids(document, config, IdGenerator::new())
    }

    /// Session minting ids from `ids` (fixed prefixes make ids predictable)
    pub fn with_ids(document: Document, config: EditorConfig, ids: IdGenerator) -> Self {
        let mut state = Self {
            document,
            selection: None,
            history: History::new(config.history_limit),
            ids,
            theme: None,
            fragments: FragmentLibrary::new(),
            config,
            canvas_html: String::new(),
            preview_html: String::new(),
        };
        state.refresh();
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn blocks(&self) -> &BlockTree {
        &self.document.blocks
    }

    pub fn body_style(&self) -> &BodyStyle {
        &self.document.body_style
    }

    pub fn selection(&self) -> Option<&BlockId> {
        self.selection.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Last canvas render (with editor affordances)
    pub fn canvas_html(&self) -> &str {
        &self.canvas_html
    }

    /// Last preview render, the input to personalization and offer resolution
    pub fn preview_html(&self) -> &str {
        &self.preview_html
    }

    /// Standalone sendable page
    pub fn export_html(&self) -> String {
        render_document(
            &self.document,
            &RenderOptions::export().with_theme(self.theme.clone()),
        )
    }

    /// Owned copy of the persisted shape
    pub fn to_document(&self) -> Document {
        self.document.clone()
    }

    // Mutations

    /// Apply and record a history snapshot.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, MutationError> {
        let outcome = self.apply_inner(&mutation)?;
        if outcome.is_applied() {
            self.refresh();
        }
        Ok(outcome)
    }

    /// Apply and re-render without touching history.
    pub fn apply_live(&mut self, mutation: Mutation) -> Result<MutationOutcome, MutationError> {
        let outcome = self.apply_inner(&mutation)?;
        if outcome.is_applied() {
            self.render();
        }
        Ok(outcome)
    }

    fn apply_inner(&mut self, mutation: &Mutation) -> Result<MutationOutcome, MutationError> {
        let outcome = mutation.apply(&mut self.document.blocks, &mut self.ids)?;
        if let MutationOutcome::Applied { selection } = &outcome {
            if selection.is_some() {
                self.selection = selection.clone();
            }
            self.prune_selection();
            debug!(mutation = ?mutation, "Mutation applied");
        }
        Ok(outcome)
    }

    pub fn insert(
        &mut self,
        block_type: BlockType,
        variant: Option<Variant>,
        target: ContainerRef,
        index: Option<usize>,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::Insert {
            block_type,
            variant,
            target,
            index,
        })
    }

    pub fn move_block(&mut self, id: &BlockId, direction: Direction) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::Move {
            id: id.clone(),
            direction,
        })
    }

    pub fn delete(&mut self, id: &BlockId) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::Delete { id: id.clone() })
    }

    pub fn duplicate(&mut self, id: &BlockId) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::Duplicate { id: id.clone() })
    }

    pub fn detach_fragment(&mut self, id: &BlockId) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::DetachFragment { id: id.clone() })
    }

    pub fn update_field(
        &mut self,
        id: &BlockId,
        field: &str,
        value: serde_json::Value,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::UpdateField {
            id: id.clone(),
            field: field.to_string(),
            value,
        })
    }

    pub fn update_field_live(
        &mut self,
        id: &BlockId,
        field: &str,
        value: serde_json::Value,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply_live(Mutation::UpdateField {
            id: id.clone(),
            field: field.to_string(),
            value,
        })
    }

    pub fn update_style(
        &mut self,
        id: &BlockId,
        property: &str,
        value: Option<&str>,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::UpdateStyle {
            id: id.clone(),
            property: property.to_string(),
            value: value.map(str::to_string),
        })
    }

    pub fn update_style_live(
        &mut self,
        id: &BlockId,
        property: &str,
        value: Option<&str>,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply_live(Mutation::UpdateStyle {
            id: id.clone(),
            property: property.to_string(),
            value: value.map(str::to_string),
        })
    }

    /// Record the current state if it differs from the snapshot under the cursor.
    ///
    /// Closes a run of live edits.
    pub fn commit(&mut self) -> bool {
        let snapshot = HistorySnapshot::capture(&self.document);
        if self.history.current() == Some(&snapshot) {
            return false;
        }
        self.history.push(snapshot)
    }

    // Drag and drop

    /// Resolve and apply a drop.
    pub fn handle_drop(
        &mut self,
        zone: &DropZone,
        payload: DragPayload,
    ) -> Result<MutationOutcome, EditorError> {
        if let (DragPayload::Asset { url }, Some(over)) = (&payload, &zone.over_block) {
            let accepts = tree::find_block(&self.document.blocks.blocks, over)
                .is_some_and(drop::accepts_asset);
            if accepts {
                debug!(block = %over, "Asset dropped on image, replacing source");
                return Ok(self.update_field(over, "src", serde_json::Value::String(url.clone()))?);
            }
        }

        let placement = drop::plan_drop(&self.document.blocks.blocks, &self.fragments, zone, &payload);
        let target = placement.container;
        let index = Some(placement.index);

        let mutation = match payload {
            DragPayload::New {
                block_type,
                variant,
            } => Mutation::Insert {
                block_type,
                variant,
                target,
                index,
            },
            DragPayload::Move { block_id } => Mutation::Relocate {
                id: block_id,
                target,
                index: placement.index,
            },
            DragPayload::Fragment { fragment_id } => match self.fragments.get(&fragment_id) {
                Some(record) => Mutation::InsertBlock {
                    block: record.to_block(&mut self.ids),
                    target,
                    index,
                },
                None => {
                    warn!(fragment = %fragment_id, "Dropped fragment is not registered");
                    return Ok(MutationOutcome::Noop);
                }
            },
            DragPayload::Asset { url } => Mutation::InsertBlock {
                block: image_block(&url, &mut self.ids),
                target,
                index,
            },
        };

        Ok(self.apply(mutation)?)
    }

    pub fn register_fragment(&mut self, record: FragmentRecord) {
        info!(fragment = %record.id, version = record.version, "Registered fragment");
        self.fragments.register(record);
    }

    pub fn fragments(&self) -> &FragmentLibrary {
        &self.fragments
    }

    // History

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                debug!(cursor = ?self.history.cursor(), "Undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                debug!(cursor = ?self.history.cursor(), "Redo");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, snapshot: &HistorySnapshot) {
        self.history.lock();
        snapshot.restore_into(&mut self.document);
        self.prune_selection();
        self.refresh();
        self.history.unlock();
    }

    // Document-level edits

    pub fn set_body_style(&mut self, body_style: BodyStyle) {
        self.document.body_style = body_style;
        self.refresh();
    }

    pub fn set_body_style_live(&mut self, body_style: BodyStyle) {
        self.document.body_style = body_style;
        self.render();
    }

    /// Apply a theme's body patch onto the stored body style.
    pub fn apply_body_patch(&mut self, patch: &BodyStylePatch) {
        let next = self.document.body_style.patched(patch);
        self.set_body_style(next);
    }

    pub fn set_html_override(&mut self, html: Option<String>) {
        self.document.html_override = html;
        self.refresh();
    }

    /// Change the render-time theme. Stored styles are untouched.
    pub fn set_theme(&mut self, theme: Option<Theme>) {
        self.theme = theme;
        self.render();
    }

    /// Select a block; ids no longer in the tree clear the selection.
    pub fn select(&mut self, id: Option<BlockId>) {
        self.selection = id;
        self.prune_selection();
        self.render();
    }

    // Pipeline

    fn prune_selection(&mut self) {
        let stale = self
            .selection
            .as_ref()
            .is_some_and(|id| tree::find_block(&self.document.blocks.blocks, id).is_none());
        if stale {
            self.selection = None;
        }
    }

    /// Re-render, then snapshot (skipped while history is locked).
    fn refresh(&mut self) {
        self.render();
        self.history.push(HistorySnapshot::capture(&self.document));
    }

    fn render(&mut self) {
        let blocks = &self.document.blocks;
        let body = &self.document.body_style;

        let canvas = RenderOptions::canvas(self.selection.clone())
            .with_simulated_content(self.config.simulate_content)
            .with_theme(self.theme.clone());
        self.canvas_html = render(blocks, body, &canvas);

        let preview = if self.config.simulate_content {
            RenderOptions::preview()
        } else {
            RenderOptions::export()
        };
        self.preview_html = render(blocks, body, &preview.with_theme(self.theme.clone()));
    }
}
