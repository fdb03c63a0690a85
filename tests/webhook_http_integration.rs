//! Integration tests for the FastSpring webhook endpoint.
//!
//! These tests drive the full router with in-memory adapters:
//! 1. Signed batches are verified, processed and acknowledged
//! 2. Redelivered events are acknowledged without being reprocessed
//! 3. Failed events are left out of the acknowledgement

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use cashier_fastspring::adapters::http::{webhook_router, WebhookAppState};
use cashier_fastspring::adapters::memory::{
    InMemorySubscriptionPeriodRepository, InMemorySubscriptionRepository, InMemoryUserDirectory,
    InMemoryWebhookEventRepository,
};
use cashier_fastspring::application::{SubscriptionActivatedHandler, SubscriptionEventRouter};
use cashier_fastspring::domain::fastspring::{
    FastSpringWebhookVerifier, IdempotentWebhookProcessor, SIGNATURE_HEADER,
};
use cashier_fastspring::domain::foundation::UserId;
use cashier_fastspring::ports::{
    ProcessingOutcome, SubscriptionPeriodRepository, WebhookEventRepository,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SECRET: &str = "whsec_integration";

struct Harness {
    router: Router,
    subscriptions: Arc<InMemorySubscriptionRepository>,
    periods: Arc<InMemorySubscriptionPeriodRepository>,
    webhook_events: Arc<InMemoryWebhookEventRepository>,
}

impl Harness {
    async fn new() -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        users.link("acct_1", UserId::new("user-1").unwrap()).await;
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let periods = Arc::new(InMemorySubscriptionPeriodRepository::new());
        let webhook_events = Arc::new(InMemoryWebhookEventRepository::new());

        let handler = SubscriptionActivatedHandler::new(
            users,
            subscriptions.clone(),
            periods.clone(),
        );
        let dispatcher = SubscriptionEventRouter::new().register(Arc::new(handler));
        let processor = IdempotentWebhookProcessor::new(webhook_events.clone(), Arc::new(dispatcher));
        let state = WebhookAppState {
            processor: Arc::new(processor),
            verifier: Some(Arc::new(verifier())),
        };

        Self {
            router: webhook_router().with_state(state),
            subscriptions,
            periods,
            webhook_events,
        }
    }

    async fn deliver(&self, batch: Value) -> (StatusCode, Vec<String>) {
        let body = batch.to_string();
        let signature = verifier().sign(body.as_bytes()).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/fastspring")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let acked = String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (status, acked)
    }
}

fn verifier() -> FastSpringWebhookVerifier {
    FastSpringWebhookVerifier::new(SecretString::new(SECRET.to_string()))
}

fn subscription_event(id: &str, event_type: &str, account: &str, state: &str) -> Value {
    json!({
        "id": id,
        "type": event_type,
        "live": false,
        "processed": false,
        "created": 1700000000000i64,
        "data": {
            "id": "sub_99",
            "account": {"id": account},
            "tags": {"name": "pro"},
            "product": {"product": "pro-monthly"},
            "state": state,
            "currency": "USD",
            "quantity": 1,
            "intervalUnit": "month",
            "intervalLength": 1,
            "instructions": [{
                "periodStartDateInSeconds": 1699966800,
                "periodEndDateInSeconds": 1702558800
            }]
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn activation_creates_subscription_and_period() {
    let harness = Harness::new().await;

    let (status, acked) = harness
        .deliver(json!({"events": [subscription_event("evt_1", "subscription.activated", "acct_1", "active")]}))
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(acked, vec!["evt_1"]);

    let subscriptions = harness.subscriptions.all().await;
    assert_eq!(subscriptions.len(), 1);
    let subscription = &subscriptions[0];
    assert_eq!(subscription.name, "pro");
    assert_eq!(subscription.fastspring_id, "sub_99");
    assert_eq!(subscription.plan, "pro-monthly");

    let periods = harness
        .periods
        .list_for_subscription(&subscription.id)
        .await
        .unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].start_date, NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
    assert_eq!(periods[0].end_date, NaiveDate::from_ymd_opt(2023, 12, 14).unwrap());
}

#[tokio::test]
async fn redelivered_event_is_acknowledged_without_reprocessing() {
    let harness = Harness::new().await;
    let batch = json!({"events": [subscription_event("evt_1", "subscription.activated", "acct_1", "active")]});

    harness.deliver(batch.clone()).await;
    let (status, acked) = harness.deliver(batch).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(acked, vec!["evt_1"]);
    assert_eq!(harness.subscriptions.all().await.len(), 1);
    assert_eq!(harness.periods.count().await, 1);
}

#[tokio::test]
async fn mixed_batch_acknowledges_only_settled_events() {
    let harness = Harness::new().await;

    let (status, acked) = harness
        .deliver(json!({"events": [
            subscription_event("evt_ok", "subscription.activated", "acct_1", "active"),
            subscription_event("evt_orphan", "subscription.activated", "acct_missing", "active"),
            {"id": "evt_order", "type": "order.completed", "data": {}}
        ]}))
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(acked, vec!["evt_ok", "evt_order"]);

    let ignored = harness
        .webhook_events
        .find_by_event_id("evt_order")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ignored.outcome, ProcessingOutcome::Ignored);
    assert!(harness
        .webhook_events
        .find_by_event_id("evt_orphan")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn cancellation_updates_existing_subscription() {
    let harness = Harness::new().await;

    harness
        .deliver(json!({"events": [subscription_event("evt_1", "subscription.activated", "acct_1", "active")]}))
        .await;
    let (_, acked) = harness
        .deliver(json!({"events": [subscription_event("evt_2", "subscription.canceled", "acct_1", "canceled")]}))
        .await;

    assert_eq!(acked, vec!["evt_2"]);
    let subscriptions = harness.subscriptions.all().await;
    assert_eq!(subscriptions.len(), 1);
    assert!(subscriptions[0].is_canceled());
    assert_eq!(harness.periods.count().await, 1);
}

#[tokio::test]
async fn tampered_body_is_rejected_before_processing() {
    let harness = Harness::new().await;
    let signed = json!({"events": []}).to_string();
    let signature = verifier().sign(signed.as_bytes()).unwrap();
    let tampered = json!({"events": [subscription_event("evt_1", "subscription.activated", "acct_1", "active")]});

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/fastspring")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(tampered.to_string()))
        .unwrap();
    let response = harness.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(harness.subscriptions.all().await.is_empty());
}
