//! `LMT_handle_texts` request object and its wire formatting
//!
//! Formatting is two passes. [`serde_json`] first renders the object in
//! compact form with fields in declaration order. [`apply_method_spacing`]
//! then rewrites the spacing around the `method` key, which the backend
//! expects to vary with the request ID the same way the web client does.
//!
//! The formatted text must be sent as-is. Re-serializing it would drop the
//! spacing.

use crate::mt::error::MtResult;
use crate::mt::request_id::RequestId;
use crate::mt::timestamp::Millis;
use serde::Serialize;

pub const JSONRPC_VERSION: &str = "2.0";
pub const HANDLE_TEXTS_METHOD: &str = "LMT_handle_texts";

/// Number of alternative translations requested per text
pub const REQUEST_ALTERNATIVES: u32 = 3;

const METHOD_KEY_COMPACT: &str = r#""method":""#;
const METHOD_KEY_SPACED: &str = r#""method" : ""#;
const METHOD_KEY_NORMAL: &str = r#""method": ""#;

/// Full JSON-RPC request sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostData {
    pub jsonrpc: String,
    pub method: String,
    pub id: RequestId,
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Params {
    pub texts: Vec<TextItem>,
    pub splitting: String,
    pub lang: Lang,
    pub timestamp: Millis,
    #[serde(rename = "commonJobParams")]
    pub common_job_params: CommonJobParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextItem {
    pub text: String,
    #[serde(rename = "requestAlternatives")]
    pub request_alternatives: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lang {
    pub source_lang_user_selected: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonJobParams {
    #[serde(rename = "wasSpoken")]
    pub was_spoken: bool,
    pub transcribe_as: String,
    #[serde(rename = "textType")]
    pub text_type: String,
    #[serde(rename = "tagHandling", skip_serializing_if = "Option::is_none")]
    pub tag_handling: Option<String>,
    #[serde(rename = "regionalVariant", skip_serializing_if = "Option::is_none")]
    pub regional_variant: Option<String>,
}

impl PostData {
    /// Build a single-text `LMT_handle_texts` request
    pub fn handle_texts(id: RequestId, text: &str, lang: Lang, timestamp: Millis) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: HANDLE_TEXTS_METHOD.to_string(),
            id,
            params: Params {
                texts: vec![TextItem {
                    text: text.to_string(),
                    request_alternatives: REQUEST_ALTERNATIVES,
                }],
                splitting: "newlines".to_string(),
                lang,
                timestamp,
                common_job_params: CommonJobParams {
                    was_spoken: false,
                    transcribe_as: String::new(),
                    text_type: "plaintext".to_string(),
                    tag_handling: None,
                    regional_variant: None,
                },
            },
        }
    }
}

/// True when the ID calls for a space on both sides of the colon.
/// The constants come from the web client and must not be changed.
pub fn wants_spaced_method(id: RequestId) -> bool {
    (id + 5) % 29 == 0 || (id + 3) % 13 == 0
}

/// Rewrite the first compact `"method":"` in a serialized body
pub fn apply_method_spacing(serialized: &str, id: RequestId) -> String {
    let replacement = if wants_spaced_method(id) {
        METHOD_KEY_SPACED
    } else {
        METHOD_KEY_NORMAL
    };
    serialized.replacen(METHOD_KEY_COMPACT, replacement, 1)
}

/// Serialize a request and apply the method spacing for its ID
pub fn format_post_body(post: &PostData) -> MtResult<String> {
    let compact = serde_json::to_string(post)?;
    Ok(apply_method_spacing(&compact, post.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: RequestId) -> PostData {
        PostData::handle_texts(
            id,
            "Hello world",
            Lang {
                source_lang_user_selected: "EN".to_string(),
                target_lang: "DE".to_string(),
            },
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_spacing_predicate() {
        // (24 + 5) % 29 == 0
        assert!(wants_spaced_method(24));
        // (10 + 3) % 13 == 0
        assert!(wants_spaced_method(10));
        assert!(!wants_spaced_method(0));
        assert!(!wants_spaced_method(25));
        assert!(!wants_spaced_method(11));
    }

    #[test]
    fn test_spacing_predicate_on_real_ids() {
        assert!(wants_spaced_method(8_300_013_000));
        assert!(wants_spaced_method(8_300_009_000));
        assert!(!wants_spaced_method(8_300_000_000));
    }

    #[test]
    fn test_spaced_form() {
        let body = format_post_body(&sample(24)).unwrap();
        assert!(body.contains(r#""method" : "LMT_handle_texts""#));
        assert!(!body.contains(r#""method":""#));
    }

    #[test]
    fn test_normal_form() {
        let body = format_post_body(&sample(0)).unwrap();
        assert!(body.contains(r#""method": "LMT_handle_texts""#));
        assert!(!body.contains(r#""method" : ""#));
        assert!(!body.contains(r#""method":""#));
    }

    #[test]
    fn test_exact_wire_text() {
        let body = format_post_body(&sample(8_300_000_000)).unwrap();
        assert_eq!(
            body,
            concat!(
                r#"{"jsonrpc":"2.0","method": "LMT_handle_texts","id":8300000000,"#,
                r#""params":{"texts":[{"text":"Hello world","requestAlternatives":3}],"#,
                r#""splitting":"newlines","#,
                r#""lang":{"source_lang_user_selected":"EN","target_lang":"DE"},"#,
                r#""timestamp":1700000000000,"#,
                r#""commonJobParams":{"wasSpoken":false,"transcribe_as":"","textType":"plaintext"}}}"#
            )
        );
    }

    #[test]
    fn test_other_fields_stay_compact() {
        let body = format_post_body(&sample(24)).unwrap();
        assert!(body.starts_with(r#"{"jsonrpc":"2.0","method" : ""#));
        assert!(body.contains(r#""id":24,"params":{"#));
        assert!(body.contains(r#""splitting":"newlines""#));
    }

    #[test]
    fn test_formatting_twice_is_stable() {
        let post = sample(24);
        let first = format_post_body(&post).unwrap();
        let second = format_post_body(&post).unwrap();
        assert_eq!(first, second);
        assert!(!first.contains(r#""method"  :"#));
        assert_eq!(first.matches(r#""method""#).count(), 1);
    }

    #[test]
    fn test_transform_only_touches_first_occurrence() {
        let text = r#"{"method":"a","x":{"method":"b"}}"#;
        assert_eq!(
            apply_method_spacing(text, 0),
            r#"{"method": "a","x":{"method":"b"}}"#
        );
    }

    #[test]
    fn test_transform_is_noop_without_compact_key() {
        let text = r#"{"method": "a"}"#;
        assert_eq!(apply_method_spacing(text, 24), text);
    }

    #[test]
    fn test_method_key_inside_text_is_escaped() {
        let mut post = sample(24);
        post.params.texts[0].text = r#"say "method":"x""#.to_string();
        let body = format_post_body(&post).unwrap();
        assert!(body.starts_with(r#"{"jsonrpc":"2.0","method" : "LMT_handle_texts""#));
        assert!(body.contains(r#"say \"method\":\"x\""#));
    }

    #[test]
    fn test_optional_job_params() {
        let mut post = sample(0);
        post.params.common_job_params.tag_handling = Some("html".to_string());
        post.params.common_job_params.regional_variant = Some("en-US".to_string());
        post.params.common_job_params.text_type = "richtext".to_string();
        let body = format_post_body(&post).unwrap();
        assert!(body.contains(
            r#""textType":"richtext","tagHandling":"html","regionalVariant":"en-US""#
        ));
    }
}
