//! Application entry point for the `connected-plant-care` service.
//!
//! Startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Opening the configured store (memory, JSON file or PostgreSQL)
//! - Restoring the plant fleet and starting the simulation ticker
//! - Serving the HTTP routes until Ctrl-C, then stopping the ticker
//!
//! # Environment Variables
//! - `PLANT_STORE`, `PLANT_STORE_PATH`, `DATABASE_URL`, ... – see `config`
//! - `PLANT_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `PLANT_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, io::IsTerminal, net::SocketAddr, sync::Arc};

use anyhow::Result;
use dotenvy::dotenv;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use plant_care::config::{self, StoreBackend};
use plant_care::storage::{FileStore, KeyValueStore, MemoryStore, PgStore};
use plant_care::{routes, schema, Orchestrator, PlantStore};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let backend = open_backend(&cfg.store).await?;
    let store = PlantStore::new(backend);

    let rng = match cfg.sim_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let orchestrator = Arc::new(Orchestrator::load(store, rng, cfg.seed_demo_plants).await?);
    let ticker = orchestrator.start(cfg.tick_interval);

    let app = routes::router(orchestrator.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    ticker.stop().await;
    Ok(())
}

/// Build the key-value backend named by the configuration.
async fn open_backend(store: &StoreBackend) -> Result<Arc<dyn KeyValueStore>> {
    // ---
    let backend: Arc<dyn KeyValueStore> = match store {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File(path) => Arc::new(FileStore::open(path)?),
        StoreBackend::Postgres {
            db_url,
            db_pool_max,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*db_pool_max)
                .connect(db_url)
                .await
                .map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to connect to database '{}': {}",
                        config::mask_db_url(db_url),
                        e
                    )
                })?;

            tracing::info!("Successfully connected to database");
            schema::create_schema(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
    };

    Ok(backend)
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// - Color output follows `FORCE_COLOR` (`1|true|yes` on, `0|false|no`
///   off), otherwise TTY detection
/// - Span events follow `PLANT_SPAN_EVENTS`: `"full"`, `"enter_exit"`, or
///   CLOSE events only by default
/// - Level comes from `RUST_LOG` when set, else `PLANT_LOG_LEVEL`
///
/// Call once at startup before any logging macros run.
fn init_tracing() {
    // ---
    let span_events = match env::var("PLANT_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("PLANT_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
