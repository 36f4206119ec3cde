use std::sync::Arc;

use agent::{Agent, GroqClient, TavilySearch};
use anyhow::Context;
use api::{create_router, AppState, Settings};
use axum::http::{header, HeaderValue, Method};
use store::{MemoryStore, PgStore, Store};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().context("Failed to load settings")?;

    let store = open_store(&settings).await?;
    let agent = build_agent(&settings)?;

    let cors = CorsLayer::new()
        .allow_origin(
            settings
                .server
                .client_origin
                .parse::<HeaderValue>()
                .context("Invalid client origin")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let addr = settings.address();
    let router = create_router(AppState::new(store, agent, settings))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

/// PostgreSQL with migrations applied, or an in-memory store when no URL is set.
async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn Store>> {
    match api::db::connect(&settings.database)
        .await
        .context("Failed to connect to database")?
    {
        Some(pool) => {
            let store = PgStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Connected to PostgreSQL");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database URL configured, data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_agent(settings: &Settings) -> anyhow::Result<Agent> {
    if settings.llm.api_key.is_empty() {
        tracing::warn!("GROQ_API_KEY is not set, AI endpoints will fail");
    }
    if settings.search.api_key.is_empty() {
        tracing::warn!("TAVILY_API_KEY is not set, web search will report failures");
    }

    let model = GroqClient::new(settings.llm.groq_config()).context("Failed to build Groq client")?;
    let search =
        TavilySearch::new(settings.search.tavily_config()).context("Failed to build search client")?;
    tracing::info!(model = %settings.llm.model, "agent ready");

    Ok(Agent::new(Arc::new(model))
        .with_tool(Arc::new(search))
        .with_max_steps(settings.llm.max_steps))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
