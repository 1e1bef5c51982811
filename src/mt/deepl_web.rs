//! Provider for the DeepL web app's JSON-RPC backend
//!
//! Each call assembles an `LMT_handle_texts` request the same way the
//! official client does: a fresh request ID, a timestamp skewed by the
//! text's character signature, a text type picked from the markup check,
//! and the method-key spacing applied by [`format_post_body`]. The
//! formatted body is posted verbatim.
//!
//! # Configuration
//!
//! [`DeepLWebProvider::from_env`] reads:
//!
//! * `DEEPLX_ENDPOINT` - override the JSON-RPC endpoint
//! * `DEEPLX_DL_SESSION` - `dl_session` cookie of a Pro account; switches to the Pro endpoint
//! * `DEEPLX_PROXY` - proxy URL for all requests
//!
//! # Example
//!
//! ```ignore
//! use deeplx_web::mt::{DeepLWebProvider, MachineTranslator, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLWebProvider::from_env()?;
//!     let result = provider
//!         .translate("<b>Hello</b>", "EN", "DE", &TranslateOptions::with_tag_handling("html"))
//!         .await?;
//!     println!("{}", result.data);
//!     Ok(())
//! }
//! ```

use crate::mt::body::{Lang, PostData, format_post_body};
use crate::mt::classify::is_rich_text;
use crate::mt::error::{MtError, MtResult};
use crate::mt::language::{AUTO, normalize_source, normalize_target};
use crate::mt::request_id::{RandomRequestIds, RequestId, RequestIdSource};
use crate::mt::timestamp::{Clock, SystemClock, character_signature, synchronized_timestamp};
use crate::mt::translator::{MachineTranslator, TranslateOptions, TranslationResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE, COOKIE, USER_AGENT};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FREE_ENDPOINT: &str = "https://www2.deepl.com/jsonrpc";
pub const PRO_ENDPOINT: &str = "https://api.deepl.com/jsonrpc";

const TOO_MANY_REQUESTS: &str =
    "Too many requests, the backend is rate limiting this IP. Slow down and retry later.";

/// Connection settings for [`DeepLWebProvider`]
#[derive(Clone)]
pub struct ProviderConfig {
    /// Explicit endpoint; defaults to the free or Pro endpoint depending on `dl_session`
    pub endpoint: Option<String>,
    pub dl_session: Option<String>,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            dl_session: None,
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: non_empty_env("DEEPLX_ENDPOINT"),
            dl_session: non_empty_env("DEEPLX_DL_SESSION"),
            proxy: non_empty_env("DEEPLX_PROXY"),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("dl_session", &self.dl_session.as_ref().map(|_| "***"))
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Client for the web backend
#[derive(Clone)]
pub struct DeepLWebProvider {
    client: reqwest::Client,
    endpoint: String,
    dl_session: Option<String>,
    ids: Arc<dyn RequestIdSource>,
    clock: Arc<dyn Clock>,
}

impl DeepLWebProvider {
    /// Create a provider with the thread RNG and the system clock
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If the proxy URL is invalid or the HTTP client cannot be built
    pub fn new(config: ProviderConfig) -> MtResult<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| MtError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = match (&config.endpoint, &config.dl_session) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(_)) => PRO_ENDPOINT.to_string(),
            (None, None) => FREE_ENDPOINT.to_string(),
        };

        Ok(Self {
            client,
            endpoint,
            dl_session: config.dl_session,
            ids: Arc::new(RandomRequestIds),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        Self::new(ProviderConfig::from_env())
    }

    pub fn with_id_source(mut self, ids: Arc<dyn RequestIdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `Pro` when a session cookie is configured
    pub fn method_label(&self) -> &'static str {
        if self.dl_session.is_some() {
            "Pro"
        } else {
            "Free"
        }
    }

    /// Assemble the request object for one text
    ///
    /// Draws a new ID and reads the clock on every call.
    pub fn build_request(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> MtResult<PostData> {
        let source = normalize_source(source_lang)?;
        let target = normalize_target(target_lang)?;

        let id = self.ids.next_id();
        let timestamp = synchronized_timestamp(self.clock.as_ref(), character_signature(text));

        let mut post = PostData::handle_texts(
            id,
            text,
            Lang {
                source_lang_user_selected: source,
                target_lang: target.code,
            },
            timestamp,
        );

        let tag_handling = options
            .tag_handling
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| t == "html" || t == "xml");
        let job = &mut post.params.common_job_params;
        if tag_handling.is_some() || is_rich_text(text) {
            job.text_type = "richtext".to_string();
        }
        job.tag_handling = tag_handling;
        job.regional_variant = target.regional_variant;

        Ok(post)
    }

    async fn send(&self, body: String) -> MtResult<(u16, String)> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(USER_AGENT, "DeepL-iOS/2.9.1 iOS 16.3.0 (iPhone13,2)")
            .header("x-app-os-name", "iOS")
            .header("x-app-os-version", "16.3.0")
            .header("x-app-device", "iPhone13,2")
            .header("x-app-build", "510265")
            .header("x-app-version", "2.9.1")
            .header(CONNECTION, "keep-alive");

        if let Some(session) = &self.dl_session {
            request = request.header(COOKIE, format!("dl_session={}", session));
        }

        let response = request.body(body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

impl std::fmt::Debug for DeepLWebProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLWebProvider")
            .field("endpoint", &self.endpoint)
            .field("dl_session", &self.dl_session.as_ref().map(|_| "***"))
            .field("ids", &self.ids)
            .field("clock", &self.clock)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeepLWebProvider {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> MtResult<TranslationResult> {
        let method = self.method_label();
        if text.is_empty() {
            return Ok(TranslationResult::no_text(source_lang, target_lang, method));
        }

        let post = self.build_request(text, source_lang, target_lang, options)?;
        let body = format_post_body(&post)?;
        debug!(
            id = post.id,
            timestamp = post.params.timestamp,
            text_type = %post.params.common_job_params.text_type,
            "Sending translation request"
        );

        let (status, response) = self.send(body).await?;
        let result = parse_response(
            status,
            &response,
            &ResponseContext {
                id: post.id,
                source_lang: &post.params.lang.source_lang_user_selected,
                target_lang: &target_lang.trim().to_uppercase(),
                method,
            },
        )?;

        if !result.is_success() {
            warn!(
                code = result.code,
                reason = result.message.as_deref().unwrap_or(""),
                "Backend rejected translation"
            );
        }
        Ok(result)
    }

    fn provider_name(&self) -> &str {
        "DeepL Web"
    }
}

/// Request values echoed back in the result
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub id: RequestId,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    pub method: &'a str,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    #[serde(default)]
    texts: Vec<RpcText>,
    lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcText {
    text: String,
    #[serde(default)]
    alternatives: Vec<RpcAlternative>,
}

#[derive(Debug, Deserialize)]
struct RpcAlternative {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

/// Turn the backend's HTTP status and body into a [`TranslationResult`]
///
/// Rejections become results with a non-200 code. Only a 2xx body that
/// cannot be decoded is an error.
pub fn parse_response(
    status: u16,
    body: &str,
    ctx: &ResponseContext<'_>,
) -> MtResult<TranslationResult> {
    let failure = |code: u16, message: String| {
        TranslationResult::failure(
            code,
            ctx.id,
            message,
            ctx.source_lang,
            ctx.target_lang,
            ctx.method,
        )
    };

    if status == 429 {
        return Ok(failure(429, TOO_MANY_REQUESTS.to_string()));
    }

    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<RpcResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("Backend returned HTTP {}", status)
                } else {
                    trimmed.to_string()
                }
            });
        return Ok(failure(status, message));
    }

    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| MtError::InvalidResponse(format!("Failed to parse backend response: {}", e)))?;

    if let Some(error) = response.error {
        return Ok(failure(503, error.message));
    }

    let result = response.result.ok_or_else(|| {
        MtError::InvalidResponse("Response has neither 'result' nor 'error'".to_string())
    })?;
    let detected = result.lang;
    let first = result.texts.into_iter().next().ok_or_else(|| {
        MtError::InvalidResponse("Missing 'result.texts' entry".to_string())
    })?;

    let source_lang = match detected {
        Some(lang) if ctx.source_lang == AUTO => lang,
        _ => ctx.source_lang.to_string(),
    };

    Ok(TranslationResult {
        code: 200,
        id: ctx.id,
        message: None,
        data: first.text,
        alternatives: first.alternatives.into_iter().map(|a| a.text).collect(),
        source_lang,
        target_lang: ctx.target_lang.to_string(),
        method: ctx.method.to_string(),
    })
}
