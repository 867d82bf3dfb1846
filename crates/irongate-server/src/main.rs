//! irongate-server — standalone proxy exposing `/analyze`, `/send`, and
//! `/events/batch` (the wire contract).
//!
//! Reads config from env vars:
//!   IRON_GATE_DATABASE_URL        — Postgres connection string (only
//!                                   read when built with `--features postgres`)
//!   IRON_GATE_BIND_ADDR           — listen address (default: 0.0.0.0:8080)
//!   IRON_GATE_LLM_ENDPOINT        — default LLM HTTP endpoint
//!   IRON_GATE_EVENTS_SINK_URL     — durable events/batch sink the dispatcher flushes to
//!   IRON_GATE_HEALTH_URL          — health probe target for the events sink

use std::sync::Arc;

use clap::Parser;
use irongate_core::{EventQueue, FirmConfigStore, ProxyOrchestrator};
use irongate_server::cli::Cli;
use irongate_server::dispatcher::EventDispatcher;
use irongate_server::health::spawn_health_probe;
use irongate_server::llm::HttpLlmClient;
use irongate_server::router::build_router;
use irongate_server::state::AppState;
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[cfg(feature = "postgres")]
use irongate_postgres::{PgChainStore, PgEventMirror};
#[cfg(feature = "postgres")]
use sqlx::postgres::PgPoolOptions;

#[cfg(not(feature = "postgres"))]
use irongate_core::{InMemoryChainStore, NoopEventMirror};

#[tokio::main]
async fn main() {
    if std::env::var("IRON_GATE_ENV").as_deref() != Ok("production") {
        let _ = dotenvy::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,irongate_server=debug,irongate_core=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let (chain, mirror) = build_stores().await;

    if let Some(firm_id) = cli.verify_chain {
        let result = chain.verify(&firm_id).await.expect("chain verification failed");
        println!(
            "firm={firm_id} valid={} total_events={} broken_at={:?}",
            result.valid, result.total_events, result.broken_at
        );
        return;
    }

    let queue = Arc::new(EventQueue::new(mirror));
    queue.reload().await.expect("failed to reload event queue from mirror");

    let http_client = Client::new();

    let llm_endpoint = std::env::var("IRON_GATE_LLM_ENDPOINT")
        .unwrap_or_else(|_| "http://127.0.0.1:4200/complete".to_string());
    let llm = Arc::new(HttpLlmClient::new(http_client.clone(), llm_endpoint));

    let orchestrator = Arc::new(ProxyOrchestrator::new(
        Arc::new(FirmConfigStore::new()),
        Arc::clone(&chain),
        Arc::clone(&queue),
        llm,
    ));

    let reconnect = Arc::new(Notify::new());

    let sink_url = std::env::var("IRON_GATE_EVENTS_SINK_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080/events/batch".to_string());
    let dispatcher = Arc::new(EventDispatcher::new(
        Arc::clone(&queue),
        http_client.clone(),
        sink_url,
        Arc::clone(&reconnect),
    ));
    tokio::spawn(async move {
        dispatcher.run().await;
    });

    if let Ok(health_url) = std::env::var("IRON_GATE_HEALTH_URL") {
        spawn_health_probe(
            http_client,
            health_url,
            irongate_server::dispatcher::health_probe_interval(),
            reconnect,
        );
    }

    let state = Arc::new(AppState { orchestrator, chain });
    let app = build_router(state);

    let listener = TcpListener::bind(&cli.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {}: {e}", cli.bind_addr));
    tracing::info!(addr = %cli.bind_addr, "irongate-server listening");

    axum::serve(listener, app).await.expect("server error");
}

#[cfg(feature = "postgres")]
async fn build_stores() -> (Arc<dyn irongate_core::ChainStore>, Arc<dyn irongate_core::EventMirror>) {
    let database_url =
        std::env::var("IRON_GATE_DATABASE_URL").expect("IRON_GATE_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    tracing::info!("connected to database");
    (Arc::new(PgChainStore::new(pool.clone())), Arc::new(PgEventMirror::new(pool)))
}

#[cfg(not(feature = "postgres"))]
async fn build_stores() -> (Arc<dyn irongate_core::ChainStore>, Arc<dyn irongate_core::EventMirror>) {
    (Arc::new(InMemoryChainStore::new()), Arc::new(NoopEventMirror))
}
