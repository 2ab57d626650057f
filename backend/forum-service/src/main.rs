use actix_web::{web, App, HttpServer};
use forum_service::{
    config::Config,
    db::{PgPostStore, PostLookup, PostStore},
    handlers::{self, AppState},
    services::{ContentTransformer, NerClient, PostingCooldown, ProfanityFilter},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Forum Service...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        service = %config.service.service_name,
        environment = %config.service.environment,
        http_port = %config.service.http_port,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.url)
        .await?;
    tracing::info!("Database pool initialized");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        e
    })?;
    tracing::info!("Migrations completed successfully");

    let store = Arc::new(PgPostStore::new(pool));
    let lookup: Arc<dyn PostLookup> = store.clone();
    let store: Arc<dyn PostStore> = store;

    let recognizer = Arc::new(NerClient::new(&config.ner)?);
    tracing::info!(
        timeout_ms = config.ner.timeout_ms,
        max_retries = config.ner.max_retries,
        offset_encoding = ?config.ner.offset_encoding,
        "NER client initialized"
    );

    let transformer = Arc::new(
        ContentTransformer::new(lookup, recognizer, config.moderation.client_url.clone())
            .with_offset_encoding(config.ner.offset_encoding),
    );

    tracing::info!("Loading profanity word list...");
    let profanity = Arc::new(ProfanityFilter::new(&config.moderation.profanity_words_path)?);
    tracing::info!(words = profanity.len(), "Profanity filter initialized");

    let cooldown = Arc::new(PostingCooldown::new(config.moderation.post_cooldown()));
    let purge_cooldown = cooldown.clone();
    let purge_every = config.moderation.post_cooldown().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_every);
        loop {
            interval.tick().await;
            purge_cooldown.purge_expired();
            tracing::debug!(
                tracked_users = purge_cooldown.tracked_users(),
                "Purged expired posting cooldowns"
            );
        }
    });

    let state = web::Data::new(AppState {
        transformer,
        store,
        profanity,
        cooldown,
    });

    let http_addr = format!("0.0.0.0:{}", config.service.http_port);
    tracing::info!("Forum Service listening on http://{}", http_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&http_addr)?
    .run()
    .await?;

    Ok(())
}
