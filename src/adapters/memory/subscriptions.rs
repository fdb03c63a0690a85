use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SubscriptionId, SubscriptionPeriodId, UserId};
use crate::domain::subscription::{
    FindOrCreate, NewSubscriptionPeriod, Subscription, SubscriptionPeriod,
};
use crate::ports::{SubscriptionPeriodRepository, SubscriptionRepository};

/// Subscriptions stored in insertion order.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: RwLock<Vec<Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored subscription.
    pub async fn all(&self) -> Vec<Subscription> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_user_and_name(
        &self,
        user_id: &UserId,
        name: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|s| &s.user_id == user_id && s.name == name)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|s| &s.user_id == user_id).cloned().collect())
    }

    async fn save(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows
            .iter_mut()
            .find(|s| s.user_id == subscription.user_id && s.name == subscription.name)
        {
            existing.apply_terms(subscription.terms());
            existing.updated_at = subscription.updated_at;
            return Ok(existing.clone());
        }
        rows.push(subscription.clone());
        Ok(subscription.clone())
    }
}

/// Billing periods indexed by their full key.
#[derive(Default)]
pub struct InMemorySubscriptionPeriodRepository {
    rows: RwLock<HashMap<NewSubscriptionPeriod, SubscriptionPeriod>>,
}

impl InMemorySubscriptionPeriodRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored periods across all subscriptions.
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl SubscriptionPeriodRepository for InMemorySubscriptionPeriodRepository {
    async fn find_or_create(
        &self,
        key: &NewSubscriptionPeriod,
    ) -> Result<FindOrCreate<SubscriptionPeriod>, DomainError> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.get(key) {
            return Ok(FindOrCreate::Found(existing.clone()));
        }
        let period = SubscriptionPeriod::from_new(SubscriptionPeriodId::new(), *key);
        rows.insert(*key, period.clone());
        Ok(FindOrCreate::Created(period))
    }

    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<SubscriptionPeriod>, DomainError> {
        let rows = self.rows.read().await;
        let mut periods: Vec<_> = rows
            .values()
            .filter(|p| &p.subscription_id == subscription_id)
            .cloned()
            .collect();
        periods.sort_by_key(|p| (p.start_date, p.end_date));
        Ok(periods)
    }
}
