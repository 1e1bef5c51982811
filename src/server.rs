//! HTTP relay in front of a [`MachineTranslator`]
//!
//! Routes:
//!
//! * `GET /` - banner
//! * `POST /translate` - `{"text","source_lang","target_lang","tag_handling"}`, answers with
//!   the [`TranslationResult`] JSON and its code as HTTP status
//! * `POST /v2/translate` - official API shape, `text` is a list and the answer is
//!   `{"translations":[{"detected_source_language","text"}]}`
//!
//! When a token is configured every route requires it, either as `?token=`
//! or as `Authorization: Bearer <token>` / `Authorization: DeepL-Auth-Key <token>`.

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::mt::{MachineTranslator, TranslateOptions, TranslationResult};

pub const DEFAULT_PORT: u16 = 1188;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            token: None,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:1188`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn MachineTranslator>,
    pub token: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TranslatePayload {
    pub text: String,
    #[serde(default)]
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub tag_handling: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiTranslatePayload {
    pub text: Vec<String>,
    #[serde(default)]
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub tag_handling: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiTranslation {
    pub detected_source_language: String,
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiTranslateResponse {
    pub translations: Vec<ApiTranslation>,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

type ApiError = (StatusCode, Json<MessageResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(MessageResponse {
            code: status.as_u16(),
            message: message.into(),
        }),
    )
}

fn status_of(result: &TranslationResult) -> StatusCode {
    StatusCode::from_u16(result.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn options_from(tag_handling: &str) -> TranslateOptions {
    if tag_handling.trim().is_empty() {
        TranslateOptions::default()
    } else {
        TranslateOptions::with_tag_handling(tag_handling)
    }
}

/// Token carried in an `Authorization` header
///
/// Only `Bearer <t>` and `DeepL-Auth-Key <t>` are recognised; any other
/// scheme or shape yields `None`.
pub fn token_from_authorization(value: &str) -> Option<&str> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer" | "DeepL-Auth-Key", token] => Some(*token),
        _ => None,
    }
}

async fn require_token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.token.as_deref() else {
        return next.run(request).await;
    };

    let from_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_authorization);

    if from_header == Some(expected) || query.token.as_deref() == Some(expected) {
        return next.run(request).await;
    }

    warn!("Rejected request with missing or invalid access token");
    api_error(StatusCode::UNAUTHORIZED, "Invalid access token").into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/translate", post(translate))
        .route("/v2/translate", post(translate_api))
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(
    config: ServerConfig,
    translator: Arc<dyn MachineTranslator>,
) -> std::io::Result<()> {
    let provider = translator.provider_name().to_string();
    let state = AppState {
        translator,
        token: config.token.clone(),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        provider = %provider,
        protected = config.token.is_some(),
        "Relay listening on http://{}",
        config.bind_address()
    );
    axum::serve(listener, app).await
}

async fn banner() -> impl IntoResponse {
    Json(MessageResponse {
        code: 200,
        message: "DeepL web relay. POST /translate or /v2/translate".to_string(),
    })
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslatePayload>,
) -> Result<(StatusCode, Json<TranslationResult>), ApiError> {
    info!(
        "Translating {} chars {} → {}",
        request.text.chars().count(),
        if request.source_lang.is_empty() { "auto" } else { request.source_lang.as_str() },
        &request.target_lang
    );

    let result = state
        .translator
        .translate(
            &request.text,
            &request.source_lang,
            &request.target_lang,
            &options_from(&request.tag_handling),
        )
        .await
        .map_err(|e| {
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Translation service error: {}", e),
            )
        })?;

    Ok((status_of(&result), Json(result)))
}

async fn translate_api(
    State(state): State<AppState>,
    Json(request): Json<ApiTranslatePayload>,
) -> Result<Json<ApiTranslateResponse>, ApiError> {
    info!(
        "Translating {} texts {} → {}",
        request.text.len(),
        if request.source_lang.is_empty() { "auto" } else { request.source_lang.as_str() },
        &request.target_lang
    );

    let results = state
        .translator
        .translate_batch(
            &request.text,
            &request.source_lang,
            &request.target_lang,
            &options_from(&request.tag_handling),
        )
        .await
        .map_err(|e| {
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Translation service error: {}", e),
            )
        })?;

    let mut translations = Vec::with_capacity(results.len());
    for result in results {
        if !result.is_success() {
            let message = result.message.clone().unwrap_or_default();
            return Err(api_error(status_of(&result), message));
        }
        translations.push(ApiTranslation {
            detected_source_language: result.source_lang,
            text: result.data,
        });
    }

    Ok(Json(ApiTranslateResponse { translations }))
}
