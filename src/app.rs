/*
 * Responsibility
 * - tracing init -> Config -> dependencies (PgPool, verifier, stable client) -> Router
 * - middleware wiring (auth on the API routes, HTTP layers on everything)
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::middleware::http::HttpLimits;
use crate::repos::PgAnimalRepo;
use crate::services::auth::build_token_verifier;
use crate::services::{AnimalService, HttpStableRegistry};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,animal_service=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing; stderr may be hidden depending on how we are launched.
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting animal service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, HttpLimits::from(&config));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        tracing::info!("database migrations applied");
    }

    let auth = build_token_verifier(config)?;

    let stables = HttpStableRegistry::new(
        config.stable_service_url.clone(),
        config.stable_service_timeout,
    )
    .context("building stable service client")?;
    tracing::info!(url = %config.stable_service_url, "stable registry configured");

    let animals = AnimalService::new(Arc::new(PgAnimalRepo::new(pool)), Arc::new(stables));

    Ok(AppState::new(auth, animals))
}

/// API routes with bearer authentication, bound to `state`.
pub fn api_router(state: AppState) -> Router {
    let routes = middleware::auth::access::apply(api::v1::routes(), state.clone());
    routes.with_state(state)
}

fn build_router(state: AppState, limits: HttpLimits) -> Router {
    middleware::http::apply(api_router(state), limits)
}
