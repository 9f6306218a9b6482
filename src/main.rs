//! Persona Chat server binary.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use persona_chat::adapters::ai::{GeminiConfig, GeminiProvider, PersonaPromptResponder, UnavailableProvider};
use persona_chat::adapters::http::{api_router, ChatAppState};
use persona_chat::adapters::persona::FilePersonaCatalog;
use persona_chat::application::ResponseOrchestrator;
use persona_chat::config::AppConfig;
use persona_chat::ports::{AIProvider, GenerativeResponder, PersonaProvider};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

fn ai_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, Box<dyn std::error::Error>> {
    match config.ai.gemini_api_key.as_deref().filter(|_| config.ai.has_gemini()) {
        Some(key) => {
            let gemini = GeminiConfig::new(key)
                .with_model(&config.ai.model)
                .with_base_url(&config.ai.base_url)
                .with_timeout(config.ai.attempt_timeout())
                .with_max_retries(config.ai.max_retries)
                .with_retry_base_delay(config.ai.retry_base_delay());
            Ok(Arc::new(GeminiProvider::new(gemini)?))
        }
        None => {
            warn!("No Gemini API key configured; generative replies will use persona fallbacks");
            Ok(Arc::new(UnavailableProvider::new("Gemini API key not configured")))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let catalog = FilePersonaCatalog::load(&config.personas.base_dir, &config.personas.entries).await;
    if catalog.is_empty() {
        warn!(base_dir = %config.personas.base_dir.display(), "No personas loaded");
    }
    let personas: Arc<dyn PersonaProvider> = Arc::new(catalog);

    let provider = ai_provider(&config)?;
    let info = provider.provider_info();
    info!(provider = %info.name, model = %info.model, "AI provider ready");

    let responder: Arc<dyn GenerativeResponder> = Arc::new(PersonaPromptResponder::new(provider));
    let orchestrator = ResponseOrchestrator::new(responder).with_generation_timeout(config.ai.timeout());

    let state = ChatAppState::new(personas.clone(), Arc::new(orchestrator));
    let app = api_router(state, &config.server);

    let addr = config.server.socket_addr()?;
    info!(%addr, personas = ?personas.persona_names(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
