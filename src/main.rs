//! MedAssist - conversational medical information service
//!
//! Answers chat turns over HTTP, grounding news questions on a live RSS
//! search and everything else on an OpenAI-compatible chat model.

mod api;
mod chat;
mod classifier;
mod config;
mod llm;
mod news;
mod responder;
mod store;
mod system_prompt;
#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use chat::ChatOrchestrator;
use config::AppConfig;
use llm::LlmBackend;
use news::RssNewsSource;
use responder::ResponseGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use store::InMemoryConversationStore;
use system_prompt::Persona;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medassist=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();
    let persona = Persona::load(config.persona_file.as_deref());

    // LLM backend; absence is recoverable and answered per request
    let backend = llm::openai_backend(&config.llm);
    match &backend {
        LlmBackend::Ready(_) => tracing::info!(
            model = %config.llm.model,
            base_url = %config.llm.base_url,
            "LLM backend initialized"
        ),
        LlmBackend::MissingKey => {
            tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY.");
        }
        LlmBackend::Failed(e) => {
            tracing::warn!(error = %e, "LLM backend unavailable, replies will report the failure");
        }
    }
    let generator = ResponseGenerator::new(backend, persona, config.llm.temperature);

    let news = Arc::new(RssNewsSource::new(&config.news)?);
    let store = Arc::new(InMemoryConversationStore::new(config.store));

    // Create application state
    let state = AppState::new(ChatOrchestrator::new(store, news, generator));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("MedAssist server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
