//! Episode stream mirror selection
//!
//! Stream payloads arrive grouped by quality, each quality carrying its own
//! server list. Players want the opposite pivot: mirrors (servers) with the
//! qualities each one offers. This module performs that pivot, dedupes
//! mirror names case-insensitively, and picks sensible defaults. The
//! `ondesuhd` provider is preferred because it historically embeds most
//! reliably.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::constants::PREFERRED_PROVIDER;

/// One quality group as the upstream delivers it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuality {
    /// Quality label ("360p", "480p", "720p", ...)
    pub quality: String,
    /// Servers offering this quality
    #[serde(default)]
    pub server_list: Vec<StreamServer>,
}

/// One server entry inside a quality group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamServer {
    /// Provider name as written upstream
    pub server: String,
    /// Embeddable stream URL
    pub stream_url: String,
}

/// One playable link at a specific quality
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityLink {
    /// Quality label
    pub quality: String,
    /// Embeddable stream URL
    pub url: String,
}

/// One mirror (server) with every quality it offers, in upstream order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mirror {
    /// Provider name, first-seen casing
    pub server: String,
    /// Qualities offered, deduplicated by label
    pub qualities: Vec<QualityLink>,
}

/// A concrete playback choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Chosen mirror name
    pub server: String,
    /// Chosen quality label
    pub quality: String,
    /// Stream URL to embed
    pub url: String,
}

/// Mirrors pivoted from the quality-grouped payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorTable {
    mirrors: Vec<Mirror>,
}

impl MirrorTable {
    /// Pivot quality groups into mirrors.
    ///
    /// Server names differing only in case are the same mirror; the first
    /// spelling seen wins. Within a mirror, repeated quality labels keep
    /// their first URL.
    pub fn from_qualities(groups: &[StreamQuality]) -> Self {
        let mut mirrors: Vec<Mirror> = Vec::new();

        for group in groups {
            for entry in &group.server_list {
                let key = entry.server.to_lowercase();
                let index = match mirrors.iter().position(|m| m.server.to_lowercase() == key) {
                    Some(existing) => existing,
                    None => {
                        mirrors.push(Mirror {
                            server: entry.server.clone(),
                            qualities: Vec::new(),
                        });
                        mirrors.len() - 1
                    }
                };
                let mirror = &mut mirrors[index];
                if !mirror.qualities.iter().any(|q| q.quality == group.quality) {
                    mirror.qualities.push(QualityLink {
                        quality: group.quality.clone(),
                        url: entry.stream_url.clone(),
                    });
                }
            }
        }

        Self { mirrors }
    }

    /// Parse and pivot a validated stream envelope.
    ///
    /// Entries that do not match the expected shape are skipped with a
    /// warning rather than failing the whole payload.
    pub fn from_payload(body: &Value) -> Self {
        let groups: Vec<StreamQuality> = body
            .get("result")
            .or_else(|| body.get("data"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match serde_json::from_value(item.clone()) {
                        Ok(group) => Some(group),
                        Err(e) => {
                            warn!("Skipping unparseable stream quality group: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self::from_qualities(&groups)
    }

    /// Whether any playable mirror exists
    pub fn is_empty(&self) -> bool {
        self.mirrors.iter().all(|m| m.qualities.is_empty())
    }

    /// Mirrors in presentation order: preferred provider first, the rest
    /// alphabetically by name.
    pub fn ordered_mirrors(&self) -> Vec<&Mirror> {
        let mut ordered: Vec<&Mirror> = self.mirrors.iter().collect();
        ordered.sort_by(|a, b| {
            let a_pref = is_preferred(&a.server);
            let b_pref = is_preferred(&b.server);
            b_pref
                .cmp(&a_pref)
                .then_with(|| a.server.to_lowercase().cmp(&b.server.to_lowercase()))
        });
        ordered
    }

    /// Default playback choice: the preferred provider's mirror when one
    /// exists, otherwise the first mirror; always that mirror's last listed
    /// quality (upstream lists qualities ascending, so the last is the
    /// highest).
    ///
    /// Returns `None` when no mirror is playable.
    pub fn default_selection(&self) -> Option<Selection> {
        let ordered = self.ordered_mirrors();
        let mirror = ordered.iter().find(|m| !m.qualities.is_empty())?;
        last_quality_of(mirror)
    }

    /// Switch to a named mirror, keeping its last listed quality.
    ///
    /// The name match is case-insensitive. Unknown names yield `None` so the
    /// caller can keep the current selection.
    pub fn select_server(&self, server: &str) -> Option<Selection> {
        let key = server.to_lowercase();
        let mirror = self
            .mirrors
            .iter()
            .find(|m| m.server.to_lowercase() == key)?;
        last_quality_of(mirror)
    }

    /// Switch to a specific quality on a named mirror.
    pub fn select_quality(&self, server: &str, quality: &str) -> Option<Selection> {
        let key = server.to_lowercase();
        let mirror = self
            .mirrors
            .iter()
            .find(|m| m.server.to_lowercase() == key)?;
        let link = mirror.qualities.iter().find(|q| q.quality == quality)?;
        Some(Selection {
            server: mirror.server.clone(),
            quality: link.quality.clone(),
            url: link.url.clone(),
        })
    }
}

fn is_preferred(server: &str) -> bool {
    server.to_lowercase().contains(PREFERRED_PROVIDER)
}

fn last_quality_of(mirror: &Mirror) -> Option<Selection> {
    let link = mirror.qualities.last()?;
    Some(Selection {
        server: mirror.server.clone(),
        quality: link.quality.clone(),
        url: link.url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(quality: &str, servers: &[(&str, &str)]) -> StreamQuality {
        StreamQuality {
            quality: quality.to_string(),
            server_list: servers
                .iter()
                .map(|(server, url)| StreamServer {
                    server: server.to_string(),
                    stream_url: url.to_string(),
                })
                .collect(),
        }
    }

    fn sample_table() -> MirrorTable {
        MirrorTable::from_qualities(&[
            group("360p", &[("OndesuHD-1", "https://stream.example.com/ohd1-360")]),
            group("480p", &[("Mirror-X", "https://stream.example.com/mx-480")]),
            group("720p", &[("OndesuHD-1", "https://stream.example.com/ohd1-720")]),
        ])
    }

    #[test]
    fn test_pivot_groups_by_server() {
        let table = sample_table();
        let ohd = table.select_server("OndesuHD-1").unwrap();
        assert_eq!(ohd.server, "OndesuHD-1");
        assert_eq!(table.mirrors.len(), 2);
    }

    #[test]
    fn test_server_dedup_is_case_insensitive() {
        let table = MirrorTable::from_qualities(&[
            group("360p", &[("OndesuHD", "https://stream.example.com/a")]),
            group("720p", &[("ONDESUHD", "https://stream.example.com/b")]),
        ]);
        assert_eq!(table.mirrors.len(), 1);
        // First-seen casing wins.
        assert_eq!(table.mirrors[0].server, "OndesuHD");
        assert_eq!(table.mirrors[0].qualities.len(), 2);
    }

    #[test]
    fn test_quality_dedup_keeps_first_url() {
        let table = MirrorTable::from_qualities(&[
            group("720p", &[("Mirror-X", "https://stream.example.com/first")]),
            group("720p", &[("mirror-x", "https://stream.example.com/second")]),
        ]);
        assert_eq!(table.mirrors[0].qualities.len(), 1);
        assert_eq!(
            table.mirrors[0].qualities[0].url,
            "https://stream.example.com/first"
        );
    }

    #[test]
    fn test_default_prefers_ondesuhd_last_quality() {
        let table = sample_table();
        let selection = table.default_selection().unwrap();
        assert_eq!(selection.server, "OndesuHD-1");
        assert_eq!(selection.quality, "720p");
        assert_eq!(selection.url, "https://stream.example.com/ohd1-720");
    }

    #[test]
    fn test_default_falls_back_without_preferred_provider() {
        let table = MirrorTable::from_qualities(&[
            group("480p", &[("Zeta", "https://stream.example.com/z")]),
            group("480p", &[("Alpha", "https://stream.example.com/a")]),
        ]);
        let selection = table.default_selection().unwrap();
        // Alphabetical order decides when no mirror is preferred.
        assert_eq!(selection.server, "Alpha");
    }

    #[test]
    fn test_ordered_mirrors_preferred_first_then_alphabetical() {
        let table = MirrorTable::from_qualities(&[group(
            "480p",
            &[
                ("Zeta", "https://stream.example.com/z"),
                ("ondesuhd-2", "https://stream.example.com/o"),
                ("Alpha", "https://stream.example.com/a"),
            ],
        )]);
        let names: Vec<&str> = table
            .ordered_mirrors()
            .iter()
            .map(|m| m.server.as_str())
            .collect();
        assert_eq!(names, vec!["ondesuhd-2", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_select_server_case_insensitive() {
        let table = sample_table();
        let selection = table.select_server("ondesuhd-1").unwrap();
        assert_eq!(selection.server, "OndesuHD-1");
        assert_eq!(selection.quality, "720p");
    }

    #[test]
    fn test_select_server_unknown_name() {
        assert!(sample_table().select_server("nope").is_none());
    }

    #[test]
    fn test_select_quality() {
        let table = sample_table();
        let selection = table.select_quality("OndesuHD-1", "360p").unwrap();
        assert_eq!(selection.quality, "360p");
        assert_eq!(selection.url, "https://stream.example.com/ohd1-360");
    }

    #[test]
    fn test_select_quality_not_offered() {
        assert!(sample_table().select_quality("Mirror-X", "1080p").is_none());
    }

    #[test]
    fn test_empty_payload_has_no_selection() {
        let table = MirrorTable::from_qualities(&[]);
        assert!(table.is_empty());
        assert!(table.default_selection().is_none());
    }

    #[test]
    fn test_from_payload_skips_bad_entries() {
        let body = json!({
            "status": "Success",
            "result": [
                { "quality": "720p", "serverList": [
                    { "server": "OndesuHD", "streamUrl": "https://stream.example.com/x" }
                ]},
                { "unexpected": true }
            ]
        });
        let table = MirrorTable::from_payload(&body);
        assert_eq!(table.mirrors.len(), 1);
        assert_eq!(
            table.default_selection().unwrap().url,
            "https://stream.example.com/x"
        );
    }

    #[test]
    fn test_from_payload_data_envelope() {
        let body = json!({
            "success": true,
            "data": [
                { "quality": "480p", "serverList": [
                    { "server": "Mirror-X", "streamUrl": "https://stream.example.com/y" }
                ]}
            ]
        });
        let table = MirrorTable::from_payload(&body);
        assert!(!table.is_empty());
    }
}
