//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the CLI and the relay server can run against the web backend or the
//! mock translator without knowing which one they hold.
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
//!         .translate("Hello, world!", "auto", "DE", &TranslateOptions::default())
//!         .await?;
//!     println!("{} {}", result.code, result.data);
//!     Ok(())
//! }
//! ```

use crate::mt::error::MtResult;
use crate::mt::request_id::RequestId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Longest source text the front ends send, in characters
pub const MAX_SOURCE_CHARS: usize = 1000;

/// Per-request options beyond the language pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// `html` or `xml`; anything else is treated as absent
    pub tag_handling: Option<String>,
}

impl TranslateOptions {
    pub fn with_tag_handling(tag_handling: impl Into<String>) -> Self {
        Self {
            tag_handling: Some(tag_handling.into()),
        }
    }
}

/// Outcome of one translation call
///
/// Backend-side failures (rate limiting, rejected requests) are reported
/// through `code` and `message` rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub code: u16,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: String,
    pub alternatives: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub method: String,
}

impl TranslationResult {
    pub fn is_success(&self) -> bool {
        self.code == 200
    }

    /// Result for an empty source text
    pub fn no_text(source_lang: &str, target_lang: &str, method: &str) -> Self {
        Self::failure(404, 0, "No text to translate", source_lang, target_lang, method)
    }

    pub fn failure(
        code: u16,
        id: RequestId,
        message: impl Into<String>,
        source_lang: &str,
        target_lang: &str,
        method: &str,
    ) -> Self {
        Self {
            code,
            id,
            message: Some(message.into()),
            data: String::new(),
            alternatives: Vec::new(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            method: method.to_string(),
        }
    }
}

/// Generic trait for machine translation providers
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_lang` - Source language code, or `auto`/empty to let the backend detect it
    /// * `target_lang` - Target language code, optionally with a regional variant (`EN-US`)
    /// * `options` - Tag handling and similar per-request options
    ///
    /// # Returns
    ///
    /// * `Ok(TranslationResult)` - The backend's answer, successful or not
    /// * `Err(MtError)` - Invalid input, transport failure or an undecodable response
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> MtResult<TranslationResult>;

    /// Translate several texts, one request each
    ///
    /// Output order matches input order. Stops at the first `Err`; results
    /// with a non-200 code are returned as they are.
    async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> MtResult<Vec<TranslationResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(
                self.translate(text, source_lang, target_lang, options)
                    .await?,
            );
        }
        Ok(results)
    }

    /// Name used in logs
    fn provider_name(&self) -> &str;
}

/// Cut text down to [`MAX_SOURCE_CHARS`] characters, respecting char boundaries
pub fn truncate_source(text: &str) -> &str {
    match text.char_indices().nth(MAX_SOURCE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_source("hello"), "hello");
        assert_eq!(truncate_source(""), "");
    }

    #[test]
    fn test_truncate_long_text() {
        let text = "a".repeat(MAX_SOURCE_CHARS + 50);
        assert_eq!(truncate_source(&text).len(), MAX_SOURCE_CHARS);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "ä".repeat(MAX_SOURCE_CHARS + 1);
        let cut = truncate_source(&text);
        assert_eq!(cut.chars().count(), MAX_SOURCE_CHARS);
        assert_eq!(cut.len(), MAX_SOURCE_CHARS * 2);
    }

    #[test]
    fn test_no_text_result() {
        let result = TranslationResult::no_text("auto", "DE", "Free");
        assert_eq!(result.code, 404);
        assert!(!result.is_success());
        assert_eq!(result.message.as_deref(), Some("No text to translate"));
    }

    #[test]
    fn test_result_json_shape() {
        let result = TranslationResult {
            code: 200,
            id: 8_300_000_000,
            message: None,
            data: "Hallo".to_string(),
            alternatives: vec!["Servus".to_string()],
            source_lang: "EN".to_string(),
            target_lang: "DE".to_string(),
            method: "Free".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["data"], "Hallo");
        assert_eq!(json["alternatives"][0], "Servus");
        assert!(json.get("message").is_none());
    }
}
