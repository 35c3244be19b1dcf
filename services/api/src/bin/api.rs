//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{single_attempt_client, LopdfAdapter, OpenAiChatAdapter, TesseractAdapter},
    config::{Config, ConfigError},
    error::ApiError,
    web::{
        self,
        state::{spawn_session_sweeper, AppState},
        ApiDoc,
    },
};
use async_openai::config::OpenAIConfig;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use std::sync::Arc;
use study_assistant_core::{DocumentExtractor, PromptBuilder, RetryingCompletion, StudyAssistant};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let api_key = config
        .openai_api_key
        .as_ref()
        .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
    let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    let openai_client = single_attempt_client(openai_config);

    let chat_adapter = Arc::new(OpenAiChatAdapter::new(
        openai_client,
        config.chat_model.clone(),
        config.chat_max_tokens,
    ));
    let completion = Arc::new(RetryingCompletion::new(chat_adapter, config.retry_policy()));

    let extractor = Arc::new(DocumentExtractor::new(
        Arc::new(LopdfAdapter::new()),
        Arc::new(TesseractAdapter::new(
            config.tesseract_path.clone(),
            config.ocr_language.clone(),
        )),
    ));

    let assistant = StudyAssistant::new(
        extractor,
        completion,
        PromptBuilder::new(config.max_context_chars),
    );

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), assistant));
    if let Some(idle_ttl) = config.session_idle_ttl {
        spawn_session_sweeper(app_state.sessions.clone(), idle_ttl);
    }

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
