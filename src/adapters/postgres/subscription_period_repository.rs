//! PostgreSQL implementation of SubscriptionPeriodRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, SubscriptionId, SubscriptionPeriodId, Timestamp,
};
use crate::domain::subscription::{
    FindOrCreate, NewSubscriptionPeriod, PeriodSource, SubscriptionPeriod,
};
use crate::ports::SubscriptionPeriodRepository;

pub struct PostgresSubscriptionPeriodRepository {
    pool: PgPool,
}

impl PostgresSubscriptionPeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key(
        &self,
        key: &NewSubscriptionPeriod,
    ) -> Result<Option<SubscriptionPeriod>, DomainError> {
        let row: Option<PeriodRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, type AS source, start_date, end_date, created_at
            FROM subscription_periods
            WHERE subscription_id = $1 AND type = $2 AND start_date = $3 AND end_date = $4
            "#,
        )
        .bind(key.subscription_id.as_uuid())
        .bind(key.source.as_str())
        .bind(key.start_date)
        .bind(key.end_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find subscription period", e))?;

        row.map(SubscriptionPeriod::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PeriodRow {
    id: Uuid,
    subscription_id: Uuid,
    source: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<PeriodRow> for SubscriptionPeriod {
    type Error = DomainError;

    fn try_from(row: PeriodRow) -> Result<Self, Self::Error> {
        let source: PeriodSource = row.source.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid period type: {}", e))
        })?;

        Ok(SubscriptionPeriod {
            id: SubscriptionPeriodId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            source,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl SubscriptionPeriodRepository for PostgresSubscriptionPeriodRepository {
    async fn find_or_create(
        &self,
        key: &NewSubscriptionPeriod,
    ) -> Result<FindOrCreate<SubscriptionPeriod>, DomainError> {
        let inserted: Option<PeriodRow> = sqlx::query_as(
            r#"
            INSERT INTO subscription_periods (id, subscription_id, type, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (subscription_id, type, start_date, end_date) DO NOTHING
            RETURNING id, subscription_id, type AS source, start_date, end_date, created_at
            "#,
        )
        .bind(*SubscriptionPeriodId::new().as_uuid())
        .bind(key.subscription_id.as_uuid())
        .bind(key.source.as_str())
        .bind(key.start_date)
        .bind(key.end_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert subscription period", e))?;

        if let Some(row) = inserted {
            return Ok(FindOrCreate::Created(SubscriptionPeriod::try_from(row)?));
        }

        // Conflict: the row exists, read it back in a fresh statement.
        self.find_by_key(key)
            .await?
            .map(FindOrCreate::Found)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    "Subscription period vanished after insert conflict",
                )
            })
    }

    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<SubscriptionPeriod>, DomainError> {
        let rows: Vec<PeriodRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, type AS source, start_date, end_date, created_at
            FROM subscription_periods
            WHERE subscription_id = $1
            ORDER BY start_date, end_date
            "#,
        )
        .bind(subscription_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list subscription periods", e))?;

        rows.into_iter().map(SubscriptionPeriod::try_from).collect()
    }
}
