//! Offer marker wire format.
//!
//! ```text
//! <!-- OFFER_BLOCK:decision=<int>&placement=<int> -->...fallback...<!-- /OFFER_BLOCK -->
//! ```
//!
//! Downstream send-time renderers locate markers with the same syntax, so the
//! exact spelling must not change.

/// Regex matching one marker span. Captures: `decision`, `placement`, `fallback`.
pub const OFFER_MARKER_PATTERN: &str = r"(?s)<!-- OFFER_BLOCK:decision=(?P<decision>\d+)&placement=(?P<placement>\d+) -->(?P<fallback>.*?)<!-- /OFFER_BLOCK -->";

pub fn offer_marker_open(decision_id: u64, placement_id: u64) -> String {
    format!("<!-- OFFER_BLOCK:decision={decision_id}&placement={placement_id} -->")
}

pub const OFFER_MARKER_CLOSE: &str = "<!-- /OFFER_BLOCK -->";

/// Full marker span wrapping `fallback_html`.
pub fn offer_marker(decision_id: u64, placement_id: u64, fallback_html: &str) -> String {
    format!(
        "{}{}{}",
        offer_marker_open(decision_id, placement_id),
        fallback_html,
        OFFER_MARKER_CLOSE
    )
}
