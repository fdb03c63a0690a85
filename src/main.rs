use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use cashier_fastspring::adapters::http::{webhook_router, WebhookAppState};
use cashier_fastspring::adapters::postgres::{
    PostgresSubscriptionPeriodRepository, PostgresSubscriptionRepository, PostgresUserDirectory,
    PostgresWebhookEventRepository,
};
use cashier_fastspring::application::{SubscriptionActivatedHandler, SubscriptionEventRouter};
use cashier_fastspring::config::{AppConfig, FastSpringConfig};
use cashier_fastspring::domain::fastspring::{FastSpringWebhookVerifier, IdempotentWebhookProcessor};
use cashier_fastspring::ports::WebhookEventRepository;
use cashier_fastspring::telemetry;

const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config.server.log_level, config.is_production())?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let webhook_events = Arc::new(PostgresWebhookEventRepository::new(pool.clone()));
    let handler = SubscriptionActivatedHandler::new(
        Arc::new(PostgresUserDirectory::new(pool.clone())),
        Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        Arc::new(PostgresSubscriptionPeriodRepository::new(pool.clone())),
    )
    .with_default_name(config.fastspring.default_subscription_name.clone());
    let dispatcher = SubscriptionEventRouter::new().register(Arc::new(handler));
    let processor = IdempotentWebhookProcessor::new(webhook_events.clone(), Arc::new(dispatcher));

    let verifier = config
        .fastspring
        .webhook_secret
        .clone()
        .map(|secret| Arc::new(FastSpringWebhookVerifier::new(secret)));
    if verifier.is_none() {
        tracing::warn!("No FastSpring webhook secret configured; signatures are not verified");
    }

    if config.fastspring.webhook_retention_days > 0 {
        spawn_retention_sweep(webhook_events, config.fastspring.clone());
    }

    let state = WebhookAppState {
        processor: Arc::new(processor),
        verifier,
    };
    let app = webhook_router()
        .with_state(state)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Periodically deletes idempotency records older than the retention window.
fn spawn_retention_sweep(repository: Arc<dyn WebhookEventRepository>, fastspring: FastSpringConfig) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RETENTION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let Some(cutoff) = fastspring.retention_cutoff(Utc::now()) else {
                tracing::error!(
                    retention_days = fastspring.webhook_retention_days,
                    "Webhook retention window is out of range; skipping sweep"
                );
                continue;
            };
            match repository.delete_before(cutoff).await {
                Ok(deleted) => tracing::debug!(deleted, "Expired webhook records removed"),
                Err(e) => tracing::warn!(error = %e, "Webhook retention sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
