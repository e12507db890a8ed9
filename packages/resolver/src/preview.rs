//! Preview pipeline: render, merge personalization, resolve offers.
//!
//! ```text
//! Document ──render(preview)──> HTML ──merge(profile)──> HTML ──offers──> PreviewOutput
//! ```
//!
//! Merging runs first so offer content is never scanned for tokens.

use crate::offers::{OfferBlockResolver, ResolveOutcome};
use crate::personalization::merge;
use crate::Profile;
use blockmail_compiler_html::{render_document, RenderOptions};
use blockmail_model::{Document, Theme};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct PreviewState {
    version: u64,
    html: String,
}

/// Last applied preview. Results older than the applied one are ignored.
#[derive(Debug, Default)]
pub struct PreviewOutput {
    state: Mutex<PreviewState>,
}

impl PreviewOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `html` produced by pass `version`. Returns `false` if a newer
    /// pass already landed.
    pub fn apply(&self, version: u64, html: String) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if version < state.version {
            debug!(version, applied = state.version, "Ignoring older preview");
            return false;
        }
        state.version = version;
        state.html = html;
        true
    }

    pub fn version(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .version
    }

    pub fn html(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .html
            .clone()
    }
}

pub struct Previewer {
    resolver: OfferBlockResolver,
}

impl Previewer {
    pub fn new(resolver: OfferBlockResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &OfferBlockResolver {
        &self.resolver
    }

    /// Personalize and resolve already-rendered HTML into `output`.
    pub async fn preview(
        &self,
        html: &str,
        profile: Option<&Profile>,
        output: &PreviewOutput,
    ) -> ResolveOutcome {
        let merged = merge(html, profile);
        let outcome = self.resolver.resolve_offer_markers(&merged, profile).await;
        if let ResolveOutcome::Current { version, html } = &outcome {
            output.apply(*version, html.clone());
        }
        outcome
    }

    /// Render `document` in preview mode, then run [`Previewer::preview`].
    pub async fn preview_document(
        &self,
        document: &Document,
        theme: Option<&Theme>,
        profile: Option<&Profile>,
        output: &PreviewOutput,
    ) -> ResolveOutcome {
        let options = RenderOptions::preview().with_theme(theme.cloned());
        let html = render_document(document, &options);
        self.preview(&html, profile, output).await
    }
}
