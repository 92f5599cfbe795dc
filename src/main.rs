use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use word_soup_backend::{build_router, config::Config, db, quiz::QuestionBank, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "word_soup_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Word Soup backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to database
    let db = db::create_pool(config.database_url(), config.database.max_connections).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations completed");

    // Load questions
    let questions = match &config.game.questions_path {
        Some(path) => QuestionBank::load(path).await?,
        None => {
            tracing::info!("QUESTIONS_PATH not set, using builtin questions");
            QuestionBank::builtin()?
        }
    };
    tracing::info!("Question bank ready with {} questions", questions.len());

    if let Some(seed) = config.game.grid_seed {
        tracing::warn!("GRID_SEED={} set, every session will see the same grids", seed);
    }

    let addr = config.server_addr();

    // Create application state
    let state = Arc::new(AppState {
        config,
        db,
        questions,
        active_sessions: DashMap::new(),
    });

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
