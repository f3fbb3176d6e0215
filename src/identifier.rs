//! Identifier normalization for navigation parameters
//!
//! Navigation parameters arrive in inconsistent shapes because of upstream
//! link serialization defects: a plain string, an array of path segments
//! (each of which may itself be an object), or a single object. This module
//! turns any of those into one canonical request string, or fails with a
//! named error before any network call is made.

use serde_json::Value;
use thiserror::Error;

use crate::constants::{FALLBACK_DOMAINS, HOST_MARKER};

/// Literal text a broken upstream link serializer leaves behind when an
/// object is stringified instead of its URL.
const OBJECT_DEFECT: &str = "[object Object]";

/// Errors produced while normalizing a navigation parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentifierError {
    /// The parameter is missing, of an unusable type, or does not reference
    /// the partner site
    #[error("Invalid identifier: {0}")]
    Invalid(String),

    /// The parameter carries the upstream encoding defect and cannot be
    /// repaired
    #[error(
        "Malformed identifier: the parameter contains '[object Object]', which indicates \
         broken URL encoding upstream. Navigate back and reopen the link instead of retrying \
         this URL."
    )]
    Malformed,
}

/// Turn a raw navigation parameter into one canonical request string.
///
/// The result is guaranteed to contain the partner-site host marker; use
/// [`normalize_loose`] when the caller canonicalizes slugs itself.
pub fn normalize(raw: &Value) -> Result<String, IdentifierError> {
    let identifier = normalize_loose(raw)?;
    require_host_marker(identifier)
}

/// Normalize a raw parameter without enforcing the host-marker postcondition.
///
/// Detail lookups accept bare slugs, which only reference the partner site
/// after [`canonical_detail_url`] prefixes a domain.
pub fn normalize_loose(raw: &Value) -> Result<String, IdentifierError> {
    let identifier = match raw {
        Value::String(s) => {
            let decoded = urlencoding::decode(s)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| s.clone());
            if decoded.contains(OBJECT_DEFECT) {
                return Err(IdentifierError::Malformed);
            }
            decoded
        }
        Value::Array(items) => items
            .iter()
            .map(segment_to_string)
            .collect::<Vec<_>>()
            .join("/"),
        Value::Object(_) => segment_to_string(raw),
        other => {
            return Err(IdentifierError::Invalid(format!(
                "expected a string, array, or object parameter, got {}",
                value_kind(other)
            )));
        }
    };

    if identifier.trim().is_empty() {
        return Err(IdentifierError::Invalid(
            "parameter resolved to an empty string".to_string(),
        ));
    }

    Ok(identifier)
}

/// Resolve a raw detail parameter to a full partner-site anime URL.
///
/// Full partner URLs pass through unchanged; bare slugs are attached to the
/// primary domain's `/anime/` path.
pub fn canonical_detail_url(raw: &Value) -> Result<String, IdentifierError> {
    let identifier = normalize_loose(raw)?;

    if is_partner_url(&identifier) {
        return Ok(identifier);
    }
    if identifier.contains("://") {
        // A URL pointing somewhere other than the partner site.
        return Err(IdentifierError::Invalid(format!(
            "'{}' does not reference the partner site",
            identifier
        )));
    }

    Ok(format!("{}/anime/{}", FALLBACK_DOMAINS[0], identifier))
}

/// Whether the identifier is already a full partner-site URL
pub fn is_partner_url(identifier: &str) -> bool {
    identifier.starts_with("https://otakudesu.")
}

/// Derive a human-readable display title from a canonical identifier.
///
/// URLs contribute their last meaningful path segment; the localized
/// `-sub-indo` suffix is stripped, hyphens become spaces, and each word is
/// capitalized. Deterministic: the same identifier always yields the same
/// title.
pub fn display_title(identifier: &str) -> String {
    let name = if is_partner_url(identifier) {
        let mut segments = identifier.trim_end_matches('/').rsplit('/');
        segments.next().unwrap_or(identifier).to_string()
    } else {
        identifier.to_string()
    };

    name.trim_end_matches("-sub-indo")
        .split('-')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case a title and collapse whitespace runs to single hyphens
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn require_host_marker(identifier: String) -> Result<String, IdentifierError> {
    if identifier.contains(HOST_MARKER) {
        Ok(identifier)
    } else {
        Err(IdentifierError::Invalid(format!(
            "'{}' does not reference the partner site",
            identifier
        )))
    }
}

/// Convert one array element (or a single-object parameter) to a string the
/// way the upstream link serializer should have.
fn segment_to_string(segment: &Value) -> String {
    match segment {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(url) = map.get("url").and_then(Value::as_str) {
                url.to_string()
            } else if let Some(href) = map.get("href").and_then(Value::as_str) {
                href.to_string()
            } else {
                map.values()
                    .map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join("/")
            }
        }
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
