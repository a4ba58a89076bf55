use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use flightbook::config::AppConfig;
use flightbook::db;
use flightbook::handlers;
use flightbook::services::ai::groq::GroqProvider;
use flightbook::services::ai::ollama::OllamaProvider;
use flightbook::services::conversation;
use flightbook::services::nlu::llm::LlmRecognizer;
use flightbook::services::nlu::luis::LuisRecognizer;
use flightbook::services::nlu::NluRecognizer;
use flightbook::state::AppState;

const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let nlu = build_recognizer(&config);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        nlu,
    });

    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match conversation::expire_conversations(&sweeper) {
                Ok(0) => {}
                Ok(n) => tracing::info!(expired = n, "expired idle conversations"),
                Err(e) => tracing::error!(error = %e, "failed to expire conversations"),
            }
        }
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_recognizer(config: &AppConfig) -> Option<Box<dyn NluRecognizer>> {
    if !config.nlu_configured() {
        tracing::warn!(
            provider = %config.nlu_provider,
            "language understanding not configured, every booking detail will be prompted for"
        );
        return None;
    }

    let recognizer: Box<dyn NluRecognizer> = match config.nlu_provider.as_str() {
        "groq" => {
            tracing::info!("using Groq recognizer (model: {})", config.groq_model);
            let llm = GroqProvider::new(config.groq_api_key.clone(), config.groq_model.clone());
            Box::new(LlmRecognizer::new(Box::new(llm)))
        }
        "ollama" => {
            tracing::info!("using Ollama recognizer (url: {}, model: {})", config.ollama_url, config.ollama_model);
            let llm = OllamaProvider::new(config.ollama_url.clone(), config.ollama_model.clone());
            Box::new(LlmRecognizer::new(Box::new(llm)))
        }
        _ => {
            tracing::info!("using LUIS recognizer (host: {})", config.luis_api_host_name);
            Box::new(LuisRecognizer::new(
                config.luis_app_id.clone(),
                config.luis_api_key.clone(),
                config.luis_api_host_name.clone(),
                config.luis_slot.clone(),
            ))
        }
    };
    Some(recognizer)
}
