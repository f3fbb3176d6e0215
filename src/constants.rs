//! Constants module for the Zephyre catalog gateway
//!
//! Contains upstream endpoint URL builders and the ordered list of
//! partner-site domains used by the fallback resolver.

/// Substring that every valid canonical identifier must contain.
///
/// Identifiers that do not reference the partner site are rejected before
/// any network call is made.
pub const HOST_MARKER: &str = "otakudesu";

/// Partner-site domains in fallback priority order.
///
/// The first entry is the primary domain used when building canonical URLs
/// from bare slugs; the rest are mirrors the resolver rotates through.
pub const FALLBACK_DOMAINS: &[&str] = &[
    "https://otakudesu.cloud",
    "https://otakudesu.video",
    "https://otakudesu.bid",
];

/// Case-insensitive marker identifying the preferred stream provider.
pub const PREFERRED_PROVIDER: &str = "ondesuhd";

/// URL builder functions for the upstream aggregation API
pub mod endpoints {
    /// Search URL with query parameter
    pub fn search(base_url: &str, query: &str) -> String {
        format!("{}/search?q={}", base_url, urlencoding::encode(query))
    }

    /// Anime detail lookup for a partner-site URL
    pub fn detail(base_url: &str, target: &str) -> String {
        format!("{}/detail?url={}", base_url, urlencoding::encode(target))
    }

    /// Episode stream lookup for a partner-site episode URL
    pub fn stream(base_url: &str, target: &str) -> String {
        format!("{}/stream?url={}", base_url, urlencoding::encode(target))
    }

    /// Download-link lookup for a partner-site episode URL
    pub fn download(base_url: &str, target: &str) -> String {
        format!("{}/download?url={}", base_url, urlencoding::encode(target))
    }

    /// Episode metadata lookup, used as the stream operation's fallback
    pub fn episode(base_url: &str, target: &str) -> String {
        format!("{}/episode?url={}", base_url, urlencoding::encode(target))
    }

    /// Latest updates feed
    pub fn lastupdate(base_url: &str) -> String {
        format!("{}/lastupdate", base_url)
    }

    /// Ongoing anime feed
    pub fn ongoing(base_url: &str) -> String {
        format!("{}/ongoing", base_url)
    }

    /// Completed anime feed
    pub fn completed(base_url: &str) -> String {
        format!("{}/completed", base_url)
    }

    /// Weekly schedule feed (separate base URL upstream)
    pub fn schedule(schedule_base_url: &str) -> String {
        schedule_base_url.to_string()
    }
}
