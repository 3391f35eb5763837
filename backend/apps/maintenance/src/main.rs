//! Maintenance Entry Point
//!
//! Applies database migrations, checks the auth configuration and sweeps
//! expired sessions and verification tokens. Meant to run at deploy time
//! or from a scheduler. Uses `anyhow` for startup errors.

use account_auth::domain::repository::{AccountMaintenance, SessionMaintenance};
use account_auth::{AuthConfig, PgAuthRepository, application::config::MIN_SECRET_LEN};
use anyhow::Context;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintenance=info,account_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuthConfig::from_env().context("invalid auth configuration")?;
    check_config(&config);

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Sweeps: failures are reported, never fatal
    let repo = PgAuthRepository::new(pool.clone());
    let now = Utc::now();

    match repo.delete_expired(now).await {
        Ok(deleted) => {
            tracing::info!(sessions_deleted = deleted, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    match repo.clean_expired_verification_tokens(now).await {
        Ok(cleaned) => {
            tracing::info!(
                tokens_cleared = cleaned,
                "Verification token cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Verification token cleanup failed, continuing anyway"
            );
        }
    }

    pool.close().await;
    Ok(())
}

/// Report settings the API would reject at first use
fn check_config(config: &AuthConfig) {
    for (name, secret) in [
        ("ACCESS_TOKEN_SECRET", &config.access_token_secret),
        ("REFRESH_TOKEN_SECRET", &config.refresh_token_secret),
    ] {
        if secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                variable = name,
                min_bytes = MIN_SECRET_LEN,
                "Token secret missing or too short; token issuance will fail"
            );
        }
    }
    if config.access_token_secret == config.refresh_token_secret
        && !config.access_token_secret.is_empty()
    {
        tracing::warn!("Access and refresh token secrets are identical");
    }

    tracing::info!(
        access_ttl_secs = config.access_token_ttl.num_seconds(),
        refresh_ttl_secs = config.refresh_token_ttl.num_seconds(),
        verification_ttl_secs = config.verification_token_ttl.num_seconds(),
        reset_ttl_secs = config.reset_token_ttl.num_seconds(),
        "Auth configuration loaded"
    );
}
