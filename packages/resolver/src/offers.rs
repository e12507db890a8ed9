//! # Offer Marker Resolution
//!
//! Rendered HTML carries offer blocks as comment markers:
//!
//! ```text
//! <!-- OFFER_BLOCK:decision=5&placement=9 -->fallback<!-- /OFFER_BLOCK -->
//! ```
//!
//! A resolution pass finds every marker, asks the decisioning collaborator
//! once per distinct decision id (in parallel, each call bounded by the
//! configured timeout), and splices in the top-ranked offer for each
//! placement. Anything that prevents that is rendered as a diagnostic naming
//! the specific reason.
//!
//! Every pass takes a new version from a monotonic counter. A pass that
//! finishes after a newer one has started reports [`ResolveOutcome::Superseded`]
//! and its HTML is discarded.

use crate::config::with_timeout;
use crate::{Profile, ResolveError, ResolverConfig};
use async_trait::async_trait;
use blockmail_compiler_html::escape_html;
use blockmail_model::OFFER_MARKER_PATTERN;
use futures::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument, warn};

/// Renderable offer payload, discriminated by `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "lowercase")]
pub enum OfferContent {
    Html {
        #[serde(default)]
        html: String,
    },
    Image {
        #[serde(default)]
        url: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    Json {
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl OfferContent {
    /// HTML for the content, or `None` when there is nothing to show.
    pub fn to_html(&self) -> Option<String> {
        let html = match self {
            OfferContent::Html { html } => html.clone(),
            OfferContent::Image { url, alt, link } => {
                if url.trim().is_empty() {
                    return None;
                }
                let img = format!(
                    "<img src=\"{}\" alt=\"{}\" style=\"max-width: 100%; height: auto; border: 0;\" />",
                    escape_html(url),
                    escape_html(alt)
                );
                match link.as_deref().filter(|l| !l.trim().is_empty()) {
                    Some(href) => format!("<a href=\"{}\" target=\"_blank\">{}</a>", escape_html(href), img),
                    None => img,
                }
            }
            OfferContent::Text { text } => {
                if text.trim().is_empty() {
                    return None;
                }
                format!("<p>{}</p>", escape_html(text))
            }
            OfferContent::Json { data } => {
                if data.is_null() {
                    return None;
                }
                let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
                format!("<pre class=\"bm-offer-json\">{}</pre>", escape_html(&pretty))
            }
        };
        Some(html).filter(|html| !html.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default)]
    pub offer_name: String,
    #[serde(default)]
    pub content: Option<OfferContent>,
}

/// Ranked offers for one placement, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub placement_id: u64,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub fallback_used: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(default)]
    pub placements: Vec<PlacementResult>,
}

impl DecisionResponse {
    pub fn placement(&self, placement_id: u64) -> Option<&PlacementResult> {
        self.placements
            .iter()
            .find(|placement| placement.placement_id == placement_id)
    }
}

/// One call to the decisioning collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRequest {
    pub decision_id: u64,
    pub contact_id: String,
    /// Placements referenced in the document for this decision
    pub placement_ids: Vec<u64>,
    /// The test profile, passed through as decisioning context
    pub context: serde_json::Value,
}

/// External offer-decisioning engine.
///
/// Calls may fail or hang; the resolver bounds them with a timeout.
#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn resolve_decision(&self, request: &DecisionRequest) -> Result<DecisionResponse, ResolveError>;
}

/// Decisions loaded from a JSON object `{ "<decision id>": DecisionResponse }`.
#[derive(Debug, Clone, Default)]
pub struct StaticOfferSource {
    decisions: BTreeMap<u64, DecisionResponse>,
}

impl StaticOfferSource {
    pub fn from_json(source: &str) -> Result<Self, ResolveError> {
        let decisions = serde_json::from_str(source)?;
        Ok(Self { decisions })
    }

    pub fn insert(&mut self, decision_id: u64, response: DecisionResponse) {
        self.decisions.insert(decision_id, response);
    }
}

#[async_trait]
impl OfferSource for StaticOfferSource {
    async fn resolve_decision(&self, request: &DecisionRequest) -> Result<DecisionResponse, ResolveError> {
        self.decisions
            .get(&request.decision_id)
            .cloned()
            .ok_or_else(|| ResolveError::Http {
                status: 404,
                message: format!("decision {} not found", request.decision_id),
            })
    }
}

/// Why a marker could not be replaced with offer content.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferDiagnostic {
    NoProfile,
    RequestFailed(ResolveError),
    NoQualifiedOffers,
    NoContent { offer_name: String },
    FallbackEmpty,
    PlacementMissing { decision_id: u64, placement_id: u64 },
}

impl OfferDiagnostic {
    pub fn reason(&self) -> &'static str {
        match self {
            OfferDiagnostic::NoProfile => "no-profile",
            OfferDiagnostic::RequestFailed(ResolveError::Timeout) => "timeout",
            OfferDiagnostic::RequestFailed(_) => "request-failed",
            OfferDiagnostic::NoQualifiedOffers => "no-qualified-offers",
            OfferDiagnostic::NoContent { .. } => "no-content",
            OfferDiagnostic::FallbackEmpty => "fallback-empty",
            OfferDiagnostic::PlacementMissing { .. } => "placement-missing",
        }
    }

    pub fn message(&self) -> String {
        match self {
            OfferDiagnostic::NoProfile => {
                "Select a test profile to preview this offer.".to_string()
            }
            OfferDiagnostic::RequestFailed(err) => format!("Offer request failed: {}", err),
            OfferDiagnostic::NoQualifiedOffers => {
                "No offers qualified for this contact.".to_string()
            }
            OfferDiagnostic::NoContent { offer_name } => format!(
                "Offer \"{}\" has no content for this placement.",
                offer_name
            ),
            OfferDiagnostic::FallbackEmpty => {
                "The fallback offer was used, but it has no content.".to_string()
            }
            OfferDiagnostic::PlacementMissing {
                decision_id,
                placement_id,
            } => format!(
                "Placement {} is not part of decision {}.",
                placement_id, decision_id
            ),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"bm-offer-diagnostic\" data-reason=\"{}\" style=\"padding: 12px; border: 1px dashed #d97706; color: #92400e; background-color: #fffbeb; font-family: Arial, sans-serif; font-size: 13px;\">{}</div>",
            self.reason(),
            escape_html(&self.message())
        )
    }
}

/// Pick the content for one placement, or say why there is none.
pub fn select_offer(
    response: &DecisionResponse,
    decision_id: u64,
    placement_id: u64,
) -> Result<String, OfferDiagnostic> {
    let Some(placement) = response.placement(placement_id) else {
        return Err(OfferDiagnostic::PlacementMissing {
            decision_id,
            placement_id,
        });
    };

    let top = placement.offers.first();
    let html = top
        .and_then(|offer| offer.content.as_ref())
        .and_then(OfferContent::to_html);

    match (html, top, placement.fallback_used) {
        (Some(html), _, _) => Ok(html),
        (None, _, true) => Err(OfferDiagnostic::FallbackEmpty),
        (None, None, false) => Err(OfferDiagnostic::NoQualifiedOffers),
        (None, Some(offer), false) => Err(OfferDiagnostic::NoContent {
            offer_name: offer.offer_name.clone(),
        }),
    }
}

/// One marker span in rendered HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferMarker {
    pub span: Range<usize>,
    pub decision_id: u64,
    pub placement_id: u64,
    pub fallback_html: String,
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(OFFER_MARKER_PATTERN).expect("offer marker pattern is valid"))
}

/// Every well-formed marker, in document order. Ids that overflow are skipped.
pub fn find_markers(html: &str) -> Vec<OfferMarker> {
    marker_regex()
        .captures_iter(html)
        .filter_map(|caps| {
            let span = caps.get(0)?.range();
            Some(OfferMarker {
                span,
                decision_id: caps["decision"].parse().ok()?,
                placement_id: caps["placement"].parse().ok()?,
                fallback_html: caps["fallback"].to_string(),
            })
        })
        .collect()
}

/// Result of one resolution pass
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Still the newest pass; `html` may be applied
    Current { version: u64, html: String },
    /// A newer pass started while this one was in flight
    Superseded { version: u64 },
}

impl ResolveOutcome {
    pub fn version(&self) -> u64 {
        match self {
            ResolveOutcome::Current { version, .. } | ResolveOutcome::Superseded { version } => {
                *version
            }
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, ResolveOutcome::Current { .. })
    }

    pub fn into_html(self) -> Option<String> {
        match self {
            ResolveOutcome::Current { html, .. } => Some(html),
            ResolveOutcome::Superseded { .. } => None,
        }
    }
}

/// Versioned, asynchronous offer marker resolver
pub struct OfferBlockResolver {
    source: Arc<dyn OfferSource>,
    config: ResolverConfig,
    version: AtomicU64,
}

impl OfferBlockResolver {
    pub fn new(source: Arc<dyn OfferSource>, config: ResolverConfig) -> Self {
        Self {
            source,
            config,
            version: AtomicU64::new(0),
        }
    }

    /// Version of the newest pass started so far
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Supersede any in-flight pass without starting a new one.
    pub fn invalidate(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace every offer marker in `html`.
    #[instrument(skip_all, fields(version = tracing::field::Empty))]
    pub async fn resolve_offer_markers(&self, html: &str, profile: Option<&Profile>) -> ResolveOutcome {
        let version = self.invalidate();
        tracing::Span::current().record("version", version);

        let markers = find_markers(html);
        if markers.is_empty() {
            return ResolveOutcome::Current {
                version,
                html: html.to_string(),
            };
        }

        let contact_id = profile.and_then(Profile::contact_id);
        let responses = match (&contact_id, profile) {
            (Some(contact_id), Some(profile)) => {
                self.fetch_decisions(&markers, contact_id, profile).await
            }
            _ => HashMap::new(),
        };

        if self.version() != version {
            debug!(version, current = self.version(), "Dropping stale offer resolution");
            return ResolveOutcome::Superseded { version };
        }

        let mut out = String::with_capacity(html.len());
        let mut cursor = 0;
        for marker in &markers {
            out.push_str(&html[cursor..marker.span.start]);
            let replacement = match (&contact_id, responses.get(&marker.decision_id)) {
                (None, _) => Err(OfferDiagnostic::NoProfile),
                (Some(_), Some(Ok(response))) => {
                    select_offer(response, marker.decision_id, marker.placement_id)
                }
                (Some(_), Some(Err(err))) => Err(OfferDiagnostic::RequestFailed(err.clone())),
                (Some(_), None) => Err(OfferDiagnostic::RequestFailed(ResolveError::Transport(
                    "decision was not requested".to_string(),
                ))),
            };
            match replacement {
                Ok(content) => out.push_str(&content),
                Err(diagnostic) => {
                    debug!(
                        decision = marker.decision_id,
                        placement = marker.placement_id,
                        reason = diagnostic.reason(),
                        "Offer rendered as diagnostic"
                    );
                    out.push_str(&diagnostic.to_html());
                }
            }
            cursor = marker.span.end;
        }
        out.push_str(&html[cursor..]);

        ResolveOutcome::Current { version, html: out }
    }

    /// One call per distinct decision id, all in flight together.
    async fn fetch_decisions(
        &self,
        markers: &[OfferMarker],
        contact_id: &str,
        profile: &Profile,
    ) -> HashMap<u64, Result<DecisionResponse, ResolveError>> {
        let mut placements: BTreeMap<u64, BTreeSet<u64>> = BTreeMap::new();
        for marker in markers {
            placements
                .entry(marker.decision_id)
                .or_default()
                .insert(marker.placement_id);
        }
        info!(decisions = placements.len(), markers = markers.len(), "Resolving offers");

        let context = serde_json::to_value(profile).unwrap_or_default();
        let calls = placements.into_iter().map(|(decision_id, placement_ids)| {
            let request = DecisionRequest {
                decision_id,
                contact_id: contact_id.to_string(),
                placement_ids: placement_ids.into_iter().collect(),
                context: context.clone(),
            };
            async move {
                let result =
                    with_timeout(self.config.timeout, self.source.resolve_decision(&request)).await;
                if let Err(err) = &result {
                    warn!(decision = decision_id, error = %err, "Offer decision failed");
                }
                (decision_id, result)
            }
        });

        join_all(calls).await.into_iter().collect()
    }
}
