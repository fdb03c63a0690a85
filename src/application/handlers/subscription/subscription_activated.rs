//! SubscriptionActivatedHandler - Reconciles one FastSpring subscription event.
//!
//! Used for every subscription lifecycle event that carries the full
//! subscription object: activation, cancellation, deactivation and overdue
//! payment. Each of them overwrites the local record with the provider's
//! current view and adds any billing periods not yet stored.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::fastspring::{
    FastSpringEvent, FastSpringEventType, SubscriptionPayload, WebhookError, WebhookEventHandler,
};
use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::{
    NewSubscriptionPeriod, Subscription, SubscriptionError, DEFAULT_SUBSCRIPTION_NAME,
};
use crate::ports::{SubscriptionPeriodRepository, SubscriptionRepository, UserDirectory};

/// Command to apply a subscription event.
#[derive(Debug, Clone)]
pub struct SubscriptionActivatedCommand {
    /// FastSpring event id, for log correlation.
    pub event_id: String,
    pub payload: SubscriptionPayload,
}

/// Result of applying a subscription event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionActivatedResult {
    pub subscription_id: SubscriptionId,
    /// True when no subscription existed for the (user, name) pair.
    pub created: bool,
    pub periods_created: usize,
    pub periods_existing: usize,
    /// Instructions dropped for lacking a boundary.
    pub periods_skipped: usize,
}

/// Handler for subscription lifecycle events.
pub struct SubscriptionActivatedHandler {
    users: Arc<dyn UserDirectory>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    periods: Arc<dyn SubscriptionPeriodRepository>,
    default_name: String,
}

impl SubscriptionActivatedHandler {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        periods: Arc<dyn SubscriptionPeriodRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            periods,
            default_name: DEFAULT_SUBSCRIPTION_NAME.to_string(),
        }
    }

    /// Overrides the name used when an event carries no `tags.name`.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    pub async fn handle(
        &self,
        cmd: SubscriptionActivatedCommand,
    ) -> Result<SubscriptionActivatedResult, SubscriptionError> {
        let payload = &cmd.payload;

        // 1. Resolve the owning user
        let account_id = &payload.account.id;
        let user_id = self
            .users
            .find_by_fastspring_id(account_id)
            .await?
            .ok_or_else(|| SubscriptionError::user_not_found(account_id))?;

        // 2. Find or instantiate the subscription for (user, name)
        let name = payload.subscription_name(&self.default_name);
        let terms = payload.billing_terms();
        let (subscription, created) = match self
            .subscriptions
            .find_by_user_and_name(&user_id, &name)
            .await?
        {
            Some(mut existing) => {
                existing.apply_terms(terms);
                (existing, false)
            }
            None => (
                Subscription::create(SubscriptionId::new(), user_id.clone(), name, terms),
                true,
            ),
        };

        // 3. Validate every period before writing anything
        let mut keys = Vec::new();
        let mut periods_skipped = 0;
        for instruction in payload.instructions() {
            match instruction.bounds() {
                Some((start, end)) => keys.push(NewSubscriptionPeriod::from_fastspring_secs(
                    subscription.id,
                    start,
                    end,
                )?),
                None => periods_skipped += 1,
            }
        }

        // 4. Persist the subscription; a concurrent writer may own the row
        let stored = self.subscriptions.save(&subscription).await?;
        let created = created && stored.id == subscription.id;

        // 5. Find-or-create each period against the stored identity
        let mut periods_created = 0;
        let mut periods_existing = 0;
        for key in keys {
            let key = NewSubscriptionPeriod {
                subscription_id: stored.id,
                ..key
            };
            if self.periods.find_or_create(&key).await?.was_created() {
                periods_created += 1;
            } else {
                periods_existing += 1;
            }
        }

        tracing::info!(
            event_id = %cmd.event_id,
            subscription_id = %stored.id,
            user_id = %stored.user_id,
            name = %stored.name,
            state = %stored.state,
            created,
            periods_created,
            periods_existing,
            periods_skipped,
            "Subscription synchronised"
        );

        Ok(SubscriptionActivatedResult {
            subscription_id: stored.id,
            created,
            periods_created,
            periods_existing,
            periods_skipped,
        })
    }
}

#[async_trait]
impl WebhookEventHandler for SubscriptionActivatedHandler {
    fn handles(&self) -> Vec<FastSpringEventType> {
        vec![
            FastSpringEventType::SubscriptionActivated,
            FastSpringEventType::SubscriptionCanceled,
            FastSpringEventType::SubscriptionDeactivated,
            FastSpringEventType::SubscriptionPaymentOverdue,
        ]
    }

    async fn handle(&self, event: &FastSpringEvent) -> Result<(), WebhookError> {
        let payload = SubscriptionPayload::from_value(&event.data)?;
        let cmd = SubscriptionActivatedCommand {
            event_id: event.id.clone(),
            payload,
        };
        SubscriptionActivatedHandler::handle(self, cmd).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemorySubscriptionPeriodRepository, InMemorySubscriptionRepository,
        InMemoryUserDirectory,
    };
    use crate::domain::foundation::{DomainError, ErrorCode, UserId};
    use crate::domain::subscription::{FindOrCreate, PeriodSource, SubscriptionPeriod};
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    // ════════════════════════════════════════════════════════════════════════════
    // Test Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        users: Arc<InMemoryUserDirectory>,
        subscriptions: Arc<InMemorySubscriptionRepository>,
        periods: Arc<InMemorySubscriptionPeriodRepository>,
        handler: SubscriptionActivatedHandler,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserDirectory::new());
        users.link("acct_1", user()).await;
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let periods = Arc::new(InMemorySubscriptionPeriodRepository::new());
        let handler =
            SubscriptionActivatedHandler::new(users.clone(), subscriptions.clone(), periods.clone());
        Fixture {
            users,
            subscriptions,
            periods,
            handler,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn activation_data() -> Value {
        json!({
            "account": {"id": "acct_1"},
            "tags": {},
            "id": "sub_99",
            "product": {"product": "pro-plan"},
            "state": "active",
            "currency": "USD",
            "quantity": 1,
            "intervalUnit": "month",
            "intervalLength": 1,
            "instructions": [
                {"periodStartDateInSeconds": 1700000000, "periodEndDateInSeconds": 1702592000}
            ]
        })
    }

    fn command(data: Value) -> SubscriptionActivatedCommand {
        SubscriptionActivatedCommand {
            event_id: "evt_1".to_string(),
            payload: SubscriptionPayload::from_value(&data).unwrap(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Subscription Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn end_to_end_activation_creates_subscription_and_period() {
        let f = fixture().await;

        let result = f.handler.handle(command(activation_data())).await.unwrap();

        let subs = f.subscriptions.all().await;
        assert_eq!(subs.len(), 1);
        let sub = &subs[0];
        assert_eq!(sub.id, result.subscription_id);
        assert_eq!(sub.user_id, user());
        assert_eq!(sub.name, "default");
        assert_eq!(sub.fastspring_id, "sub_99");
        assert_eq!(sub.plan, "pro-plan");
        assert_eq!(sub.state, "active");
        assert_eq!(sub.currency, "USD");
        assert_eq!(sub.quantity, 1);
        assert_eq!(sub.interval_unit, "month");
        assert_eq!(sub.interval_length, 1);

        let periods = f.periods.list_for_subscription(&sub.id).await.unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].source, PeriodSource::FastSpring);
        assert_eq!(periods[0].source.as_str(), "fastspring");
        assert_eq!(periods[0].start_date.to_string(), "2023-11-14");
        assert_eq!(periods[0].end_date.to_string(), "2023-12-14");

        assert!(result.created);
        assert_eq!(result.periods_created, 1);
        assert_eq!(result.periods_existing, 0);
        assert_eq!(result.periods_skipped, 0);
    }

    #[tokio::test]
    async fn tag_name_is_used_when_present() {
        let f = fixture().await;
        let mut data = activation_data();
        data["tags"] = json!({"name": "seats"});

        f.handler.handle(command(data)).await.unwrap();

        assert_eq!(f.subscriptions.all().await[0].name, "seats");
    }

    #[tokio::test]
    async fn configured_default_name_applies_without_tag() {
        let f = fixture().await;
        let handler = SubscriptionActivatedHandler::new(
            f.users.clone(),
            f.subscriptions.clone(),
            f.periods.clone(),
        )
        .with_default_name("main");

        handler.handle(command(activation_data())).await.unwrap();

        assert_eq!(f.subscriptions.all().await[0].name, "main");
    }

    #[tokio::test]
    async fn existing_subscription_is_updated_in_place() {
        let f = fixture().await;
        let first = f.handler.handle(command(activation_data())).await.unwrap();

        let mut data = activation_data();
        data["id"] = json!("sub_100");
        data["product"] = json!({"product": "team-plan"});
        data["state"] = json!("canceled");
        data["currency"] = json!("EUR");
        data["quantity"] = json!(5);
        data["intervalUnit"] = json!("year");
        data["intervalLength"] = json!(2);
        let second = f.handler.handle(command(data)).await.unwrap();

        let subs = f.subscriptions.all().await;
        assert_eq!(subs.len(), 1);
        assert_eq!(second.subscription_id, first.subscription_id);
        assert!(!second.created);
        let sub = &subs[0];
        assert_eq!(sub.fastspring_id, "sub_100");
        assert_eq!(sub.plan, "team-plan");
        assert_eq!(sub.state, "canceled");
        assert_eq!(sub.currency, "EUR");
        assert_eq!(sub.quantity, 5);
        assert_eq!(sub.interval_unit, "year");
        assert_eq!(sub.interval_length, 2);
    }

    #[tokio::test]
    async fn different_name_creates_second_subscription() {
        let f = fixture().await;
        f.handler.handle(command(activation_data())).await.unwrap();

        let mut data = activation_data();
        data["tags"] = json!({"name": "seats"});
        let result = f.handler.handle(command(data)).await.unwrap();

        assert!(result.created);
        assert_eq!(f.subscriptions.list_for_user(&user()).await.unwrap().len(), 2);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Period Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn instruction_with_null_boundary_is_skipped() {
        let f = fixture().await;
        let mut data = activation_data();
        data["instructions"] = json!([
            {"periodStartDateInSeconds": null, "periodEndDateInSeconds": 1702592000},
            {"periodStartDateInSeconds": 1700000000},
            {"periodStartDateInSeconds": 1700000000, "periodEndDateInSeconds": 1702592000}
        ]);

        let result = f.handler.handle(command(data)).await.unwrap();

        assert_eq!(result.periods_skipped, 2);
        assert_eq!(result.periods_created, 1);
        assert_eq!(f.periods.count().await, 1);
    }

    #[tokio::test]
    async fn missing_instructions_create_no_periods() {
        let f = fixture().await;
        let mut data = activation_data();
        data.as_object_mut().unwrap().remove("instructions");

        let result = f.handler.handle(command(data)).await.unwrap();

        assert!(result.created);
        assert_eq!(result.periods_created, 0);
        assert_eq!(f.periods.count().await, 0);
    }

    #[tokio::test]
    async fn repeated_payload_creates_no_extra_periods() {
        let f = fixture().await;
        f.handler.handle(command(activation_data())).await.unwrap();
        let before = f.subscriptions.all().await[0].clone();

        let result = f.handler.handle(command(activation_data())).await.unwrap();

        assert_eq!(result.periods_created, 0);
        assert_eq!(result.periods_existing, 1);
        assert_eq!(f.periods.count().await, 1);
        let after = &f.subscriptions.all().await[0];
        assert_eq!(after.id, before.id);
        assert_eq!(after.terms(), before.terms());
    }

    #[tokio::test]
    async fn new_period_is_added_alongside_existing_one() {
        let f = fixture().await;
        f.handler.handle(command(activation_data())).await.unwrap();

        let mut data = activation_data();
        data["instructions"] = json!([
            {"periodStartDateInSeconds": 1700000000, "periodEndDateInSeconds": 1702592000},
            {"periodStartDateInSeconds": 1702592000, "periodEndDateInSeconds": 1705270400}
        ]);
        let result = f.handler.handle(command(data)).await.unwrap();

        assert_eq!(result.periods_created, 1);
        assert_eq!(result.periods_existing, 1);
        let periods = f
            .periods
            .list_for_subscription(&result.subscription_id)
            .await
            .unwrap();
        assert_eq!(periods[1].start_date, date(2023, 12, 14));
        assert_eq!(periods[1].end_date, date(2024, 1, 14));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_account_is_user_not_found() {
        let f = fixture().await;
        let mut data = activation_data();
        data["account"] = json!({"id": "acct_unknown"});

        let result = f.handler.handle(command(data)).await;

        assert_eq!(
            result.unwrap_err(),
            SubscriptionError::user_not_found("acct_unknown")
        );
        assert!(f.subscriptions.all().await.is_empty());
    }

    #[tokio::test]
    async fn unrepresentable_timestamp_is_malformed_and_writes_nothing() {
        let f = fixture().await;
        let mut data = activation_data();
        data["instructions"] = json!([
            {"periodStartDateInSeconds": i64::MAX, "periodEndDateInSeconds": 1702592000}
        ]);

        let result = f.handler.handle(command(data)).await;

        assert!(matches!(
            result,
            Err(SubscriptionError::MalformedPayload { ref field, .. }) if field == "periodStartDateInSeconds"
        ));
        assert!(f.subscriptions.all().await.is_empty());
    }

    /// Misses every lookup, as if a concurrent delivery created the row
    /// between our read and our write.
    struct StaleLookupRepository(Arc<InMemorySubscriptionRepository>);

    #[async_trait]
    impl SubscriptionRepository for StaleLookupRepository {
        async fn find_by_user_and_name(
            &self,
            _user_id: &UserId,
            _name: &str,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(None)
        }

        async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
            self.0.list_for_user(user_id).await
        }

        async fn save(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
            self.0.save(subscription).await
        }
    }

    #[tokio::test]
    async fn lost_create_race_attaches_periods_to_existing_row() {
        let f = fixture().await;
        let first = f.handler.handle(command(activation_data())).await.unwrap();
        let racing = SubscriptionActivatedHandler::new(
            f.users.clone(),
            Arc::new(StaleLookupRepository(f.subscriptions.clone())),
            f.periods.clone(),
        );
        let mut data = activation_data();
        data["instructions"] = json!([
            {"periodStartDateInSeconds": 1702592000, "periodEndDateInSeconds": 1705270400}
        ]);

        let second = racing.handle(command(data)).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.subscription_id, first.subscription_id);
        assert_eq!(f.subscriptions.all().await.len(), 1);
        let periods = f
            .periods
            .list_for_subscription(&first.subscription_id)
            .await
            .unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(f.periods.count().await, 2);
        assert_eq!(periods[1].start_date, date(2023, 12, 14));
    }

    struct FailingPeriodRepository;

    #[async_trait]
    impl SubscriptionPeriodRepository for FailingPeriodRepository {
        async fn find_or_create(
            &self,
            _key: &NewSubscriptionPeriod,
        ) -> Result<FindOrCreate<SubscriptionPeriod>, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "connection reset"))
        }

        async fn list_for_subscription(
            &self,
            _subscription_id: &SubscriptionId,
        ) -> Result<Vec<SubscriptionPeriod>, DomainError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn storage_failure_is_infrastructure_error() {
        let f = fixture().await;
        let handler = SubscriptionActivatedHandler::new(
            f.users.clone(),
            f.subscriptions.clone(),
            Arc::new(FailingPeriodRepository),
        );

        let err = handler.handle(command(activation_data())).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::Infrastructure(_)));
        assert!(err.is_retryable());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn event(event_type: &str, data: Value) -> FastSpringEvent {
        serde_json::from_value(json!({
            "id": "evt_42",
            "type": event_type,
            "live": false,
            "processed": false,
            "created": 1700000000000i64,
            "data": data
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn handles_all_subscription_lifecycle_types() {
        let f = fixture().await;
        let handles = f.handler.handles();

        assert_eq!(handles.len(), 4);
        assert!(handles.contains(&FastSpringEventType::SubscriptionActivated));
        assert!(handles.contains(&FastSpringEventType::SubscriptionCanceled));
        assert!(handles.contains(&FastSpringEventType::SubscriptionDeactivated));
        assert!(handles.contains(&FastSpringEventType::SubscriptionPaymentOverdue));
    }

    #[tokio::test]
    async fn webhook_event_applies_payload() {
        let f = fixture().await;
        let mut data = activation_data();
        data["state"] = json!("overdue");

        WebhookEventHandler::handle(&f.handler, &event("subscription.payment.overdue", data))
            .await
            .unwrap();

        assert!(f.subscriptions.all().await[0].is_overdue());
    }

    #[tokio::test]
    async fn webhook_event_with_missing_field_is_malformed() {
        let f = fixture().await;
        let mut data = activation_data();
        data.as_object_mut().unwrap().remove("currency");

        let err = WebhookEventHandler::handle(&f.handler, &event("subscription.activated", data))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn webhook_event_for_unknown_account_is_retryable() {
        let f = fixture().await;
        let mut data = activation_data();
        data["account"] = json!({"id": "acct_later"});

        let err = WebhookEventHandler::handle(&f.handler, &event("subscription.activated", data))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::UserNotFound(ref a) if a == "acct_later"));
        assert!(err.is_retryable());
    }
}
