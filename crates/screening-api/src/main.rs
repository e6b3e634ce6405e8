use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use screening_api::router;
use screening_api::state::AppState;
use screening_engine::ScreeningEngine;
use screening_engine::collaborators::Collaborators;
use screening_engine::config::load_config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config_path = env::var("SCREENING_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("screening.json"));
    let addr = env::var("SCREENING_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let institution =
        env::var("SCREENING_INSTITUTION").unwrap_or_else(|_| "default".to_string());

    let config = load_config(&config_path)?;
    let collaborators = Collaborators::permissive(&config, &institution);
    let engine = ScreeningEngine::open(config, collaborators)?;
    let app = router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, config = %config_path.display(), "screening api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
