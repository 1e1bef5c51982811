//! Client and relay for the DeepL web translator's JSON-RPC backend
//!
//! The backend only answers requests that look like they came from the
//! official client: request IDs of a fixed shape, a timestamp skewed by the
//! text's content, and ID-dependent spacing in the JSON body. The [`mt`]
//! module reproduces these details and wraps them in a
//! [`MachineTranslator`](mt::MachineTranslator) provider. The [`server`]
//! module exposes any translator over HTTP.

pub mod mt;
pub mod server;

// Re-export the request-crafting primitives for convenient access
pub use mt::{
    DeepLWebProvider, MachineTranslator, MtError, MtResult, TranslateOptions, TranslationResult,
    apply_method_spacing, character_signature, format_post_body, generate_request_id,
    is_rich_text, synchronized_timestamp,
};
