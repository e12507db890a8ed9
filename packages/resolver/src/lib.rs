//! # Blockmail Resolver
//!
//! Turns preview HTML into what a specific contact would see:
//!
//! - **Personalization**: `{{table.field}}` tokens merged from a test profile
//! - **Offers**: `OFFER_BLOCK` markers resolved against a decisioning engine
//!
//! Both collaborators are traits ([`ProfileSource`], [`OfferSource`]) so the
//! editor can run against live services or JSON fixtures. Collaborator failures
//! never fail a pass; they surface as diagnostics inside the HTML.

mod config;
mod errors;
mod offers;
mod personalization;
mod preview;
mod profile;

pub use config::{ResolverConfig, DEFAULT_TIMEOUT_MS};
pub use errors::ResolveError;
pub use offers::{
    find_markers, select_offer, DecisionRequest, DecisionResponse, Offer, OfferBlockResolver,
    OfferContent, OfferDiagnostic, OfferMarker, OfferSource, PlacementResult, ResolveOutcome,
    StaticOfferSource,
};
pub use personalization::{merge, tokens, TOKEN_PATTERN};
pub use preview::{PreviewOutput, Previewer};
pub use profile::{load_profile, Profile, ProfileSource, StaticProfileSource};
