//! Language codes understood by the backend
//!
//! The backend wants upper-case two-letter codes (`EN`, `DE`, ...). Target
//! languages may carry a regional variant (`EN-US`, `PT-BR`), which is sent
//! separately from the base code. A source of `auto` leaves detection to
//! the backend.

use crate::mt::error::{MtError, MtResult};
use regex::Regex;
use std::sync::LazyLock;

/// Source language value that asks the backend to detect the language
pub const AUTO: &str = "auto";

/// Languages offered by the web client, with their English names
pub const LANGUAGES: &[(&str, &str)] = &[
    ("AR", "Arabic"),
    ("BG", "Bulgarian"),
    ("CS", "Czech"),
    ("DA", "Danish"),
    ("DE", "German"),
    ("EL", "Greek"),
    ("EN", "English"),
    ("ES", "Spanish"),
    ("ET", "Estonian"),
    ("FI", "Finnish"),
    ("FR", "French"),
    ("HU", "Hungarian"),
    ("ID", "Indonesian"),
    ("IT", "Italian"),
    ("JA", "Japanese"),
    ("KO", "Korean"),
    ("LT", "Lithuanian"),
    ("LV", "Latvian"),
    ("NB", "Norwegian Bokmål"),
    ("NL", "Dutch"),
    ("PL", "Polish"),
    ("PT", "Portuguese"),
    ("RO", "Romanian"),
    ("RU", "Russian"),
    ("SK", "Slovak"),
    ("SL", "Slovenian"),
    ("SV", "Swedish"),
    ("TR", "Turkish"),
    ("UK", "Ukrainian"),
    ("ZH", "Chinese"),
];

static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{2,4})?$").expect("static regex is valid")
});

/// Look up a code by English name (case-insensitive)
pub fn code_for_name(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(code, _)| *code)
}

/// Look up the English name of a base code (case-insensitive)
pub fn name_for_code(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(_, name)| *name)
}

/// Accept either a language tag or an English language name
///
/// Names are mapped through [`LANGUAGES`]; anything else is returned as given
/// and left for [`validate_language`] to judge.
pub fn resolve_language(input: &str) -> String {
    let input = input.trim();
    match code_for_name(input) {
        Some(code) => code.to_string(),
        None => input.to_string(),
    }
}

/// Check that a tag has the shape `xx`, `xxx` or `xx-VARIANT`
pub fn validate_language(tag: &str) -> MtResult<()> {
    if tag.is_empty() {
        return Err(MtError::InvalidLocale("Language code is empty".to_string()));
    }
    if !LANGUAGE_TAG.is_match(tag) {
        return Err(MtError::InvalidLocale(format!(
            "Invalid language code: {}",
            tag
        )));
    }
    Ok(())
}

/// Normalize the source language; empty or `auto` becomes `auto`
pub fn normalize_source(tag: &str) -> MtResult<String> {
    let tag = tag.trim();
    if tag.is_empty() || tag.eq_ignore_ascii_case(AUTO) {
        return Ok(AUTO.to_string());
    }
    validate_language(tag)?;
    Ok(base_code(tag))
}

/// Target language split into the base code and an optional regional variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLanguage {
    /// Upper-case base code, e.g. `EN`
    pub code: String,
    /// Variant as the backend spells it, e.g. `en-US`
    pub regional_variant: Option<String>,
}

pub fn normalize_target(tag: &str) -> MtResult<TargetLanguage> {
    let tag = tag.trim();
    validate_language(tag)?;

    let mut parts = tag.splitn(2, ['-', '_']);
    let base = parts.next().unwrap_or(tag);
    let regional_variant = parts
        .next()
        .map(|subtag| format!("{}-{}", base.to_lowercase(), subtag_case(subtag)));

    Ok(TargetLanguage {
        code: base.to_uppercase(),
        regional_variant,
    })
}

/// BCP 47 casing: four-letter script subtags are title case (`Hans`),
/// region subtags upper case (`US`, `419`)
fn subtag_case(subtag: &str) -> String {
    if subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
        let (first, rest) = subtag.split_at(1);
        format!("{}{}", first.to_ascii_uppercase(), rest.to_ascii_lowercase())
    } else {
        subtag.to_ascii_uppercase()
    }
}

fn base_code(tag: &str) -> String {
    tag.split(['-', '_']).next().unwrap_or(tag).to_uppercase()
}
