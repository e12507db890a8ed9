use async_trait::async_trait;
use blockmail_model::{offer_marker, Document};
use blockmail_resolver::{
    DecisionRequest, DecisionResponse, OfferBlockResolver, OfferSource, PreviewOutput, Previewer,
    Profile, ResolveError, ResolveOutcome, ResolverConfig, StaticOfferSource,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const OFFERS: &str = r#"{
    "5": {
        "placements": [
            {
                "placement_id": 9,
                "offers": [
                    { "offer_name": "Spring", "content": { "content_type": "html", "html": "<b>Spring sale, {{contacts.first_name}}</b>" } },
                    { "offer_name": "Backup", "content": { "content_type": "text", "text": "backup" } }
                ],
                "fallback_used": false
            },
            { "placement_id": 10, "offers": [], "fallback_used": true }
        ]
    }
}"#;

fn contact() -> Profile {
    Profile::from_value(json!({ "id": "c-1", "first_name": "Ana" })).unwrap()
}

fn static_resolver() -> OfferBlockResolver {
    let source = StaticOfferSource::from_json(OFFERS).unwrap();
    OfferBlockResolver::new(Arc::new(source), ResolverConfig::default())
}

/// Fails every call and records each request.
#[derive(Default)]
struct RecordingSource {
    calls: AtomicUsize,
    requests: Mutex<Vec<DecisionRequest>>,
}

#[async_trait]
impl OfferSource for RecordingSource {
    async fn resolve_decision(&self, request: &DecisionRequest) -> Result<DecisionResponse, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Err(ResolveError::Transport("connection refused".to_string()))
    }
}

/// Answers with an empty response after a per-decision delay.
struct DelayedSource {
    delays: HashMap<u64, Duration>,
}

#[async_trait]
impl OfferSource for DelayedSource {
    async fn resolve_decision(&self, request: &DecisionRequest) -> Result<DecisionResponse, ResolveError> {
        if let Some(delay) = self.delays.get(&request.decision_id) {
            tokio::time::sleep(*delay).await;
        }
        Ok(DecisionResponse::default())
    }
}

fn offer_document(decision: Option<u64>, placement: Option<u64>) -> Document {
    let mut block = json!({ "id": "o1", "type": "offer" });
    if let Some(decision) = decision {
        block["decisionId"] = json!(decision);
    }
    if let Some(placement) = placement {
        block["placementId"] = json!(placement);
    }
    Document::from_json(&json!({ "blocks": [block], "bodyStyle": {} }).to_string()).unwrap()
}

#[tokio::test]
async fn test_failed_offer_differs_from_unset_decision() {
    let source = Arc::new(RecordingSource::default());
    let previewer = Previewer::new(OfferBlockResolver::new(source.clone(), ResolverConfig::default()));
    let profile = contact();

    let configured = previewer
        .preview_document(&offer_document(Some(5), Some(9)), None, Some(&profile), &PreviewOutput::new())
        .await
        .into_html()
        .unwrap();
    let unset = previewer
        .preview_document(&offer_document(None, Some(9)), None, Some(&profile), &PreviewOutput::new())
        .await
        .into_html()
        .unwrap();

    assert!(configured.contains("data-reason=\"request-failed\""));
    assert!(configured.contains("connection refused"));
    assert!(!configured.contains("OFFER_BLOCK"));
    assert!(unset.contains("bm-offer-placeholder"));
    assert!(!unset.contains("bm-offer-diagnostic"));
    assert_ne!(configured, unset);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_one_call_per_distinct_decision() {
    let source = Arc::new(RecordingSource::default());
    let resolver = OfferBlockResolver::new(source.clone(), ResolverConfig::default());
    let html = format!(
        "{}{}{}",
        offer_marker(5, 1, ""),
        offer_marker(7, 1, ""),
        offer_marker(5, 2, "")
    );

    let html = resolver
        .resolve_offer_markers(&html, Some(&contact()))
        .await
        .into_html()
        .unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(html.matches("bm-offer-diagnostic").count(), 3);

    let requests = source.requests.lock().unwrap();
    let five = requests.iter().find(|r| r.decision_id == 5).unwrap();
    assert_eq!(five.placement_ids, vec![1, 2]);
    assert_eq!(five.contact_id, "c-1");
    assert_eq!(five.context["first_name"], "Ana");
}

#[tokio::test]
async fn test_top_offer_and_fallback_placements() {
    let html = format!("<p>before</p>{}<p>after</p>{}", offer_marker(5, 9, "<i>fb</i>"), offer_marker(5, 10, ""));
    let html = static_resolver()
        .resolve_offer_markers(&html, Some(&contact()))
        .await
        .into_html()
        .unwrap();

    assert!(html.starts_with("<p>before</p><b>Spring sale, {{contacts.first_name}}</b><p>after</p>"));
    assert!(!html.contains("backup"));
    assert!(!html.contains("<i>fb</i>"));
    assert!(html.contains("data-reason=\"fallback-empty\""));
}

#[tokio::test]
async fn test_failing_decision_does_not_affect_others() {
    let html = format!("{}{}", offer_marker(5, 9, ""), offer_marker(6, 1, ""));
    let html = static_resolver()
        .resolve_offer_markers(&html, Some(&contact()))
        .await
        .into_html()
        .unwrap();

    assert!(html.contains("<b>Spring sale"));
    assert!(html.contains("data-reason=\"request-failed\""));
    assert!(html.contains("decision 6 not found"));
}

#[tokio::test]
async fn test_missing_profile_skips_requests() {
    let source = Arc::new(RecordingSource::default());
    let resolver = OfferBlockResolver::new(source.clone(), ResolverConfig::default());

    let no_contact = Profile::from_value(json!({ "first_name": "Ana" })).unwrap();
    for profile in [None, Some(&no_contact)] {
        let html = resolver
            .resolve_offer_markers(&offer_marker(5, 9, ""), profile)
            .await
            .into_html()
            .unwrap();
        assert!(html.contains("data-reason=\"no-profile\""));
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_slow_decision_times_out() {
    let source = DelayedSource {
        delays: HashMap::from([(5, Duration::from_millis(500))]),
    };
    let resolver = OfferBlockResolver::new(Arc::new(source), ResolverConfig::with_timeout_ms(20));

    let html = format!("{}{}", offer_marker(5, 9, ""), offer_marker(6, 1, ""));
    let html = resolver
        .resolve_offer_markers(&html, Some(&contact()))
        .await
        .into_html()
        .unwrap();

    assert!(html.contains("data-reason=\"timeout\""));
    assert!(html.contains("request timed out"));
    // decision 6 answered with no placements
    assert!(html.contains("data-reason=\"placement-missing\""));
}

#[tokio::test]
async fn test_newer_pass_supersedes_older() {
    let source = DelayedSource {
        delays: HashMap::from([(1, Duration::from_millis(150))]),
    };
    let previewer = Previewer::new(OfferBlockResolver::new(Arc::new(source), ResolverConfig::default()));
    let output = PreviewOutput::new();
    let profile = contact();

    let marker = offer_marker(1, 1, "");
    let slow = previewer.preview(&marker, Some(&profile), &output);
    let fast = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        previewer.preview("<p>latest</p>", Some(&profile), &output).await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow, ResolveOutcome::Superseded { version: 1 });
    assert_eq!(
        fast,
        ResolveOutcome::Current {
            version: 2,
            html: "<p>latest</p>".to_string()
        }
    );
    assert_eq!(output.html(), "<p>latest</p>");
    assert_eq!(output.version(), 2);
}

#[tokio::test]
async fn test_preview_merges_before_offers() {
    let previewer = Previewer::new(static_resolver());
    let output = PreviewOutput::new();
    let profile = contact();
    let html = format!("<p>Hi {{{{contacts.first_name}}}}</p>{}", offer_marker(5, 9, ""));

    let outcome = previewer.preview(&html, Some(&profile), &output).await;

    assert!(outcome.is_current());
    let html = output.html();
    assert!(html.starts_with("<p>Hi Ana</p>"));
    // offer content arrives after merging and keeps its token
    assert!(html.contains("Spring sale, {{contacts.first_name}}"));
}
