//! PostgreSQL implementation of SubscriptionRepository.
//!
//! The (user_id, name) unique constraint backs `save`: it is a single
//! `INSERT ... ON CONFLICT DO UPDATE`, so concurrent first deliveries for
//! the same pair end up on one row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, name, fastspring_id, plan, state, currency, \
     quantity, interval_unit, interval_length, created_at, updated_at";

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    fastspring_id: String,
    plan: String,
    state: String,
    currency: String,
    quantity: i32,
    interval_unit: String,
    interval_length: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id.to_string()).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            name: row.name,
            fastspring_id: row.fastspring_id,
            plan: row.plan,
            state: row.state,
            currency: row.currency,
            quantity: row.quantity,
            interval_unit: row.interval_unit,
            interval_length: row.interval_length,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_user_id_as_uuid(user_id: &UserId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        DomainError::validation("user_id", format!("User ID must be a valid UUID: {}", e))
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_user_and_name(
        &self,
        user_id: &UserId,
        name: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 AND name = $2",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_uuid)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 ORDER BY created_at, name",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list subscriptions", e))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn save(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let user_uuid = parse_user_id_as_uuid(&subscription.user_id)?;

        let row: SubscriptionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO subscriptions (
                id, user_id, name, fastspring_id, plan, state, currency,
                quantity, interval_unit, interval_length, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id, name) DO UPDATE SET
                fastspring_id = EXCLUDED.fastspring_id,
                plan = EXCLUDED.plan,
                state = EXCLUDED.state,
                currency = EXCLUDED.currency,
                quantity = EXCLUDED.quantity,
                interval_unit = EXCLUDED.interval_unit,
                interval_length = EXCLUDED.interval_length,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(subscription.id.as_uuid())
        .bind(user_uuid)
        .bind(&subscription.name)
        .bind(&subscription.fastspring_id)
        .bind(&subscription.plan)
        .bind(&subscription.state)
        .bind(&subscription.currency)
        .bind(subscription.quantity)
        .bind(&subscription.interval_unit)
        .bind(subscription.interval_length)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return DomainError::new(
                        ErrorCode::UserNotFound,
                        format!("User {} does not exist", subscription.user_id),
                    );
                }
            }
            DomainError::database("Failed to save subscription", e)
        })?;

        Subscription::try_from(row)
    }
}
