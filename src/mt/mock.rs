//! Mock Machine Translator for testing
//!
//! A deterministic, network-free translator for exercising the CLI and the
//! relay server without reaching the backend.
//!
//! # Example
//!
//! ```ignore
//! use deeplx_web::mt::{MachineTranslator, MockMode, MockTranslator, TranslateOptions};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "EN", "FR", &TranslateOptions::default()).await.unwrap();
//!     assert_eq!(result.data, "hello_FR");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::language::AUTO;
use crate::mt::request_id::{RandomRequestIds, RequestIdSource};
use crate::mt::translator::{MachineTranslator, TranslateOptions, TranslationResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target suffix: "hello" → "hello_FR"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_lang) → translation
    Mappings(HashMap<(String, String), String>),

    /// Answer like a backend that refuses the request (code, message)
    Reject(u16, String),

    /// Simulate transport errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self { mode, delay_ms: 0 }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self { mode, delay_ms }
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> MtResult<TranslationResult> {
        let id = RandomRequestIds.next_id();
        let source = if source.is_empty() { AUTO } else { source };

        let data = match &self.mode {
            MockMode::Suffix => format!("{}_{}", text, target),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                map.get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target))
            }
            MockMode::Reject(code, msg) => {
                return Ok(TranslationResult::failure(
                    *code,
                    id,
                    msg.clone(),
                    source,
                    target,
                    "Mock",
                ));
            }
            MockMode::Error(msg) => return Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => text.to_string(),
        };

        Ok(TranslationResult {
            code: 200,
            id,
            message: None,
            data,
            alternatives: Vec::new(),
            source_lang: source.to_string(),
            target_lang: target.to_string(),
            method: "Mock".to_string(),
        })
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        _options: &TranslateOptions,
    ) -> MtResult<TranslationResult> {
        self.apply_delay().await;
        self.apply_translation(text, source_lang, target_lang)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> TranslateOptions {
        TranslateOptions::default()
    }

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "EN", "FR", &opts()).await.unwrap();
        assert_eq!(result.data, "hello_FR");
        assert_eq!(result.code, 200);
        assert_eq!(result.source_lang, "EN");
        assert_eq!(result.method, "Mock");
    }

    #[tokio::test]
    async fn test_suffix_empty_source_is_auto() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "", "FR", &opts()).await.unwrap();
        assert_eq!(result.source_lang, "auto");
    }

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mut map = HashMap::new();
        map.insert(("hello".to_string(), "FR".to_string()), "bonjour".to_string());

        let mock = MockTranslator::new(MockMode::Mappings(map));
        let result = mock.translate("hello", "EN", "FR", &opts()).await.unwrap();
        assert_eq!(result.data, "bonjour");
    }

    #[tokio::test]
    async fn test_mapping_fallback_to_suffix() {
        let mock = MockTranslator::new(MockMode::Mappings(HashMap::new()));
        let result = mock.translate("unknown", "EN", "FR", &opts()).await.unwrap();
        assert_eq!(result.data, "unknown_FR");
    }

    #[tokio::test]
    async fn test_reject_mode_returns_code() {
        let mock = MockTranslator::new(MockMode::Reject(429, "slow down".to_string()));
        let result = mock.translate("hello", "EN", "FR", &opts()).await.unwrap();
        assert_eq!(result.code, 429);
        assert_eq!(result.message.as_deref(), Some("slow down"));
        assert!(result.data.is_empty());
    }

    #[tokio::test]
    async fn test_error_mode_returns_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", "EN", "FR", &opts()).await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "API unavailable"),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let result = mock.translate("Hello world", "EN", "FR", &opts()).await.unwrap();
        assert_eq!(result.data, "Hello world");
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let texts = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        let results = mock.translate_batch(&texts, "EN", "FR", &opts()).await.unwrap();
        let data: Vec<_> = results.iter().map(|r| r.data.as_str()).collect();
        assert_eq!(data, vec!["first_FR", "second_FR", "third_FR"]);
    }

    #[tokio::test]
    async fn test_batch_handles_empty_input() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let results = mock.translate_batch(&[], "EN", "FR", &opts()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_error_mode_batch_fails() {
        let mock = MockTranslator::new(MockMode::Error("Network error".to_string()));
        let texts = vec!["hello".to_string()];
        assert!(mock.translate_batch(&texts, "EN", "FR", &opts()).await.is_err());
    }

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
        let start = std::time::Instant::now();
        let _ = mock.translate("hello", "EN", "FR", &opts()).await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
