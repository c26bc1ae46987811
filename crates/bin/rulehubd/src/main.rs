//! # rulehubd — rulehub daemon
//!
//! Composition root that wires all adapters together and starts the engine
//! and API server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository and channel implementations (adapters)
//! - Construct the rule engine, injecting adapters via port traits
//! - Start the event dispatcher loop on its own task
//! - Build the axum router and serve
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use rulehub_adapter_channels_reqwest::{
    HttpEmailSender, HttpPushNotifier, HttpSmsSender, ReqwestHttpClient, build_client,
};
use rulehub_adapter_http_axum::state::AppState;
use rulehub_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteLogStore, SqliteRecordStore, SqliteRuleRepository,
    SqliteTemplateStore,
};
use rulehub_app::dispatcher::EventDispatcher;
use rulehub_app::engine::RuleEngine;
use rulehub_app::registry::{ActionRegistry, TriggerRegistry};
use rulehub_app::services::rule_service::RuleService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Outbound channels
    let client = build_client(Duration::from_secs(config.channels.timeout_secs))?;
    let email = HttpEmailSender::new(client.clone(), config.channels.email_url.clone());
    let sms = HttpSmsSender::new(client.clone(), config.channels.sms_url.clone());
    let push = HttpPushNotifier::new(client.clone(), config.channels.push_url.clone());
    let webhooks = ReqwestHttpClient::new(client);

    // Engine
    let engine = Arc::new(RuleEngine::new(
        TriggerRegistry::builtin(),
        ActionRegistry::builtin(),
        SqliteRuleRepository::new(pool.clone()),
        SqliteLogStore::new(pool.clone()),
        SqliteTemplateStore::new(pool.clone()),
        SqliteRecordStore::new(pool.clone()),
        email,
        sms,
        push,
        webhooks,
    ));

    // Change feed + dispatcher
    let (feed_tx, feed_rx) = mpsc::channel(256);
    let dispatcher = EventDispatcher::new(Arc::clone(&engine));
    tokio::spawn(dispatcher.run(feed_rx));

    // HTTP
    let state = AppState::new(
        RuleService::new(
            SqliteRuleRepository::new(pool.clone()),
            SqliteLogStore::new(pool),
        ),
        engine,
        TriggerRegistry::builtin(),
        ActionRegistry::builtin(),
        feed_tx,
    );
    let app = rulehub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "rulehubd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
