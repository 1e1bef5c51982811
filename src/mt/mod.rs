/// Translation client module
///
/// Builds requests for the DeepL web app's JSON-RPC backend that match the
/// official client byte for byte, sends them, and decodes the answers.
///
/// # Overview
///
/// 1. **Request IDs** - random IDs of the shape the backend accepts
/// 2. **Timestamps** - clock readings skewed by the text's count of `i`
/// 3. **Body formatting** - compact JSON with ID-dependent spacing around `method`
/// 4. **Markup check** - picks the text type for texts carrying tags
/// 5. **Providers** - the web backend client and a mock behind the `MachineTranslator` trait
///
/// # Example
///
/// ```ignore
/// use deeplx_web::mt::{DeepLWebProvider, MachineTranslator, TranslateOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = DeepLWebProvider::from_env()?;
///     let result = provider
///         .translate("Hello", "auto", "DE", &TranslateOptions::default())
///         .await?;
///     println!("{:?}", result);
///     Ok(())
/// }
/// ```
pub mod body;
pub mod classify;
pub mod deepl_web;
pub mod error;
pub mod language;
pub mod mock;
pub mod request_id;
pub mod timestamp;
pub mod translator;

pub use body::{PostData, apply_method_spacing, format_post_body, wants_spaced_method};
pub use classify::is_rich_text;
pub use deepl_web::{DeepLWebProvider, ProviderConfig, parse_response};
pub use error::{MtError, MtResult};
pub use language::{code_for_name, name_for_code, resolve_language};
pub use mock::{MockMode, MockTranslator};
pub use request_id::{RequestId, RequestIdSource, generate_request_id};
pub use timestamp::{Clock, SystemClock, character_signature, synchronized_timestamp};
pub use translator::{
    MachineTranslator, TranslateOptions, TranslationResult, truncate_source,
};
