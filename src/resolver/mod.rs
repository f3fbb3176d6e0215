//! Fallback resolution over alternative partner-site URLs
//!
//! The upstream aggregation API frequently fails for one formulation of a
//! partner URL while succeeding for another (different mirror domain, with
//! or without a trailing slash). This module builds the ordered candidate
//! list for an identifier and walks it sequentially, stopping at the first
//! response whose envelope validates. There is no backoff and no parallel
//! racing: the list is small and early success is the common case.

use serde_json::Value;
use tracing::{info, warn};

use crate::client::Transport;
use crate::constants::FALLBACK_DOMAINS;
use crate::identifier::is_partner_url;

/// Build the ordered candidate URL list for a canonical identifier.
///
/// Full partner URLs try the URL itself, the URL with a trailing slash, and
/// then the same path on each mirror domain (with and without slash). Bare
/// slugs try `/anime/{slug}/` and `/{slug}/` on each mirror domain in turn.
/// The first entry is always the primary formulation.
pub fn candidate_urls(identifier: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    if is_partner_url(identifier) {
        candidates.push(identifier.to_string());
        if !identifier.ends_with('/') {
            candidates.push(format!("{}/", identifier));
        }

        // Same path replayed across the known mirror domains.
        if let Some(path) = partner_path(identifier) {
            for domain in FALLBACK_DOMAINS {
                let rewritten = format!("{}{}", domain, path);
                if !candidates.contains(&rewritten) {
                    candidates.push(rewritten.clone());
                }
                let with_slash = format!("{}/", rewritten.trim_end_matches('/'));
                if !candidates.contains(&with_slash) {
                    candidates.push(with_slash);
                }
            }
        }
    } else {
        let slug = identifier.trim_matches('/');
        for domain in FALLBACK_DOMAINS {
            candidates.push(format!("{}/anime/{}/", domain, slug));
            candidates.push(format!("{}/{}/", domain, slug));
        }
    }

    candidates
}

/// Whether a parsed body satisfies the upstream success contract.
///
/// Both historical envelope conventions are accepted: `status: "Success"`
/// and `success: true`. The payload under `result` (or `data`) must be a
/// non-empty object or non-empty array.
pub fn envelope_is_success(body: &Value) -> bool {
    let flagged = body.get("status").and_then(Value::as_str) == Some("Success")
        || body.get("success").and_then(Value::as_bool) == Some(true);
    if !flagged {
        return false;
    }

    let payload = body.get("result").or_else(|| body.get("data"));
    match payload {
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

/// Walk the candidate list sequentially and return the first body that
/// satisfies the predicate.
///
/// `build_request` turns a candidate partner URL into the actual upstream
/// request URL (one builder per operation: detail, stream, download).
/// Returns `None` when every candidate is exhausted; the caller substitutes
/// a placeholder so its own caller always receives a renderable result.
pub async fn resolve_first_valid<T, B, P>(
    transport: &T,
    candidates: &[String],
    build_request: B,
    validates: P,
) -> Option<Value>
where
    T: Transport,
    B: Fn(&str) -> String,
    P: Fn(&Value) -> bool,
{
    for (index, candidate) in candidates.iter().enumerate() {
        let request_url = build_request(candidate);
        match transport.get_json(&request_url).await {
            Ok(body) => {
                if validates(&body) {
                    info!(
                        "Resolved candidate {} of {}: {}",
                        index + 1,
                        candidates.len(),
                        candidate
                    );
                    return Some(body);
                }
                warn!(
                    "Candidate {} returned a non-validating envelope: {}",
                    index + 1,
                    candidate
                );
            }
            Err(e) => {
                warn!("Candidate {} failed ({}): {}", index + 1, candidate, e);
            }
        }
    }

    warn!("All {} candidates exhausted", candidates.len());
    None
}

/// Resolve against the default success predicate.
pub async fn resolve<T, B>(transport: &T, candidates: &[String], build_request: B) -> Option<Value>
where
    T: Transport,
    B: Fn(&str) -> String,
{
    resolve_first_valid(transport, candidates, build_request, envelope_is_success).await
}

fn partner_path(url: &str) -> Option<&str> {
    // Strip "https://otakudesu.<tld>" and keep the path.
    let rest = url.strip_prefix("https://")?;
    let slash = rest.find('/')?;
    Some(&rest[slash..])
}
