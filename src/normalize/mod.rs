//! Response shape normalization for upstream payloads
//!
//! The aggregation API answers the same logical query with at least four
//! envelope conventions (`result` array, `data` array, bare array,
//! `results` array) and two field-naming conventions (localized names such
//! as `judul`/`sinopsis`/`hari` next to their English equivalents). This
//! module recognizes each shape by structural inspection and maps it into
//! one canonical record type. Every mapping is pure and total: unknown
//! shapes produce placeholder records, never an error.

pub mod placeholder;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::identifier::{display_title, slugify};

/// Fallback token used when no title field is recognized
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Locally served stand-in image
pub const PLACEHOLDER_POSTER: &str = "/placeholder-anime.jpg";

/// Canonical catalog listing entry (latest updates, ongoing, completed,
/// search results)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Display title, first non-empty of the localized and English fields
    pub title: String,
    /// Explicit slug if present, else derived from the title
    pub slug: String,
    /// Partner-site URL for the entry, empty when upstream omits it
    pub url: String,
    /// Poster image URL
    pub poster: String,
    /// Thumbnail image URL (usually the same asset as the poster)
    pub thumb: String,
    /// Latest episode label
    pub episode: String,
    /// Release date or relative age label
    pub release_date: String,
    /// Broadcast day
    pub day: String,
    /// Broadcast time
    pub time: String,
    /// Airing status
    pub status: String,
    /// Rating label
    pub rating: String,
    /// Genre labels
    pub genre: Vec<String>,
    /// Short synopsis
    pub synopsis: String,
}

/// Canonical anime detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetail {
    /// Display title
    pub title: String,
    /// Poster image URL
    pub poster: String,
    /// Thumbnail image URL
    pub thumb: String,
    /// Synopsis text, synthesized when upstream omits it
    pub synopsis: String,
    /// Rating label ("N/A" when absent)
    pub rating: String,
    /// Airing status
    pub status: String,
    /// Format (TV, OVA, Movie, ...)
    #[serde(rename = "type")]
    pub anime_type: String,
    /// Episode count label
    pub episodes: String,
    /// Per-episode duration
    pub duration: String,
    /// Release date
    pub release: String,
    /// Studio name
    pub studio: String,
    /// Producer name
    pub producer: String,
    /// Japanese title
    pub japanese: String,
    /// Genre labels
    pub genre: Vec<String>,
    /// Watchable episodes
    pub episode_list: Vec<EpisodeRef>,
}

/// Reference to one watchable episode inside an anime detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    /// Episode label
    pub episode: String,
    /// Partner-site episode URL, repaired when upstream serialized it badly
    pub url: String,
    /// Publication date if known
    pub date: Option<String>,
}

/// One day of the weekly broadcast schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    /// Day label as reported upstream
    pub day: String,
    /// Entries airing that day
    pub anime_list: Vec<ScheduleEntry>,
}

/// One broadcast schedule entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Display title
    pub title: String,
    /// Slug derived from the title
    pub slug: String,
    /// Poster image URL
    pub poster: String,
}

/// Recognized envelope shapes for listing payloads
#[derive(Debug, PartialEq)]
pub enum ListingEnvelope<'a> {
    /// `{ status: "Success", result: [...] }`
    Result(&'a Vec<Value>),
    /// `{ data: [...] }`
    Data(&'a Vec<Value>),
    /// Bare top-level array
    Bare(&'a Vec<Value>),
    /// `{ results: [...] }`
    Results(&'a Vec<Value>),
    /// None of the above
    Unrecognized,
}

/// Classify a listing payload by structural inspection.
///
/// Recognition order matches the historical precedence: the `result` array
/// convention wins, then `data`, then a bare array, then `results`.
pub fn classify_listing(body: &Value) -> ListingEnvelope<'_> {
    if body.get("status").and_then(Value::as_str) == Some("Success") {
        if let Some(Value::Array(items)) = body.get("result") {
            return ListingEnvelope::Result(items);
        }
    }
    if let Some(Value::Array(items)) = body.get("data") {
        return ListingEnvelope::Data(items);
    }
    if let Value::Array(items) = body {
        return ListingEnvelope::Bare(items);
    }
    if let Some(Value::Array(items)) = body.get("results") {
        return ListingEnvelope::Results(items);
    }
    ListingEnvelope::Unrecognized
}

/// Normalize a listing payload of any recognized envelope shape.
///
/// Unrecognized shapes emit a warning and yield the fixed placeholder set
/// so callers always have something to render.
pub fn normalize_listing(body: &Value) -> Vec<CatalogItem> {
    let items = match classify_listing(body) {
        ListingEnvelope::Result(items)
        | ListingEnvelope::Data(items)
        | ListingEnvelope::Bare(items)
        | ListingEnvelope::Results(items) => items,
        ListingEnvelope::Unrecognized => {
            warn!("Unrecognized listing envelope shape, substituting placeholders");
            return placeholder::listing();
        }
    };

    items.iter().map(catalog_item_from_value).collect()
}

/// Map one listing item of either field-naming convention into the
/// canonical record. Total: every input produces a record.
pub fn catalog_item_from_value(item: &Value) -> CatalogItem {
    let title = probe_str(item, &["judul", "title"]).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let slug = probe_str(item, &["slug"]).unwrap_or_else(|| slugify(&title));
    let poster =
        probe_str(item, &["thumbnail", "poster"]).unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());
    let thumb =
        probe_str(item, &["thumbnail", "thumb"]).unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

    CatalogItem {
        title,
        slug,
        url: probe_str(item, &["link", "url"]).unwrap_or_default(),
        poster,
        thumb,
        episode: probe_str(item, &["episode"]).unwrap_or_else(|| "TBA".to_string()),
        release_date: probe_str(item, &["tanggal", "releaseDate", "release_date"])
            .unwrap_or_else(|| "TBA".to_string()),
        day: probe_str(item, &["hari", "day"]).unwrap_or_else(|| "TBA".to_string()),
        time: probe_str(item, &["time"]).unwrap_or_else(|| "TBA".to_string()),
        status: probe_str(item, &["status"]).unwrap_or_else(|| "Unknown".to_string()),
        rating: rating_label(item.get("rating")),
        genre: canonical_genre(item.get("genre")),
        synopsis: probe_str(item, &["sinopsis", "synopsis"])
            .unwrap_or_else(|| "No synopsis available".to_string()),
    }
}

/// Normalize a search result item.
///
/// Search responses carry a sparser shape: `judul`, `link`, `thumbnail`;
/// the slug is taken from the last non-empty URL segment.
pub fn search_item_from_value(item: &Value) -> CatalogItem {
    let title = probe_str(item, &["judul", "title"]).unwrap_or_else(|| "Unknown Anime".to_string());
    let url = probe_str(item, &["link", "url"]).unwrap_or_default();
    let slug = url
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string());
    let poster =
        probe_str(item, &["thumbnail", "poster"]).unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

    CatalogItem {
        title,
        slug,
        url,
        poster: poster.clone(),
        thumb: poster,
        episode: "TBA".to_string(),
        release_date: "TBA".to_string(),
        day: "TBA".to_string(),
        time: "TBA".to_string(),
        status: "Unknown".to_string(),
        rating: "N/A".to_string(),
        genre: Vec::new(),
        synopsis: "No synopsis available".to_string(),
    }
}

/// Normalize a validated detail envelope into the canonical record.
///
/// `identifier` supplies the deterministic title fallback when upstream
/// returns a detail object without any title field.
pub fn normalize_detail(body: &Value, identifier: &str) -> AnimeDetail {
    let result = body
        .get("result")
        .or_else(|| body.get("data"))
        .unwrap_or(body);

    let title = probe_str(result, &["judul", "title"])
        .unwrap_or_else(|| display_title(identifier));

    let episode_list: Vec<EpisodeRef> = result
        .get("epsd_url")
        .and_then(Value::as_array)
        .map(|eps| eps.iter().map(episode_ref_from_value).collect())
        .unwrap_or_default();

    let episodes = if !episode_list.is_empty() {
        episode_list.len().to_string()
    } else {
        probe_str(result, &["total_episode", "episodes"]).unwrap_or_else(|| "0".to_string())
    };

    let mut detail = AnimeDetail {
        title,
        poster: probe_str(result, &["thumbnail", "poster"])
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
        thumb: probe_str(result, &["thumbnail", "thumb"])
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
        synopsis: probe_str(result, &["sinopsis", "synopsis"]).unwrap_or_default(),
        rating: rating_label(result.get("rating")),
        status: probe_str(result, &["anime_status", "status"])
            .unwrap_or_else(|| "Unknown".to_string()),
        anime_type: probe_str(result, &["tipe", "type"]).unwrap_or_else(|| "TV".to_string()),
        episodes,
        duration: probe_str(result, &["durasi", "duration"])
            .unwrap_or_else(|| "Unknown".to_string()),
        release: probe_str(result, &["rilis", "tanggal_rilis", "release"])
            .unwrap_or_else(|| "Unknown".to_string()),
        studio: probe_str(result, &["studio"]).unwrap_or_else(|| "Unknown".to_string()),
        producer: probe_str(result, &["produser", "producer"])
            .unwrap_or_else(|| "Unknown".to_string()),
        japanese: probe_str(result, &["japanese"]).unwrap_or_default(),
        genre: canonical_genre(result.get("genre")),
        episode_list,
    };

    // A validated detail with no synopsis still renders something useful.
    if detail.synopsis.trim().is_empty() && result.get("sinopsis").is_none() {
        detail.synopsis = if detail.episode_list.is_empty() {
            format!(
                "{} - detailed synopsis is not available right now.",
                detail.title
            )
        } else {
            format!(
                "{} is available to watch with {} episodes. Detailed synopsis is not available right now.",
                detail.title,
                detail.episode_list.len()
            )
        };
    }

    detail
}

/// Map one raw episode entry, repairing badly serialized URLs.
fn episode_ref_from_value(ep: &Value) -> EpisodeRef {
    let label = probe_str(ep, &["title", "episode"]).unwrap_or_else(|| "Episode".to_string());

    let raw_url = ep.get("epsd_url").or_else(|| ep.get("url"));
    let mut url = match raw_url {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => map
            .get("url")
            .or_else(|| map.get("href"))
            .or_else(|| map.get("epsd_url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        _ => String::new(),
    };

    // Repair the upstream serialization defect with a deterministic
    // title-based URL.
    if url.is_empty()
        || url.contains("[object Object]")
        || url.starts_with('{')
        || url.starts_with('[')
    {
        url = format!(
            "https://otakudesu.cloud/episode/{}",
            slugify(&label)
        );
    }

    EpisodeRef {
        episode: label,
        url,
        date: probe_str(ep, &["date"]),
    }
}

/// Normalize the weekly schedule payload.
///
/// The schedule envelope is `result: [{day, animeList: [{anime_name,
/// cover}]}]`; days without a recognizable entry list are skipped. An empty
/// outcome yields the placeholder week.
pub fn normalize_schedule(body: &Value) -> Vec<ScheduleDay> {
    let days: Vec<ScheduleDay> = body
        .get("result")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(|day_data| {
                    let day = probe_str(day_data, &["day", "hari"])?;
                    let entries = day_data
                        .get("animeList")
                        .and_then(Value::as_array)?
                        .iter()
                        .map(schedule_entry_from_value)
                        .collect();
                    Some(ScheduleDay {
                        day,
                        anime_list: entries,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if days.is_empty() {
        warn!("No recognizable schedule data, substituting placeholder week");
        return placeholder::schedule();
    }

    days
}

fn schedule_entry_from_value(anime: &Value) -> ScheduleEntry {
    let title =
        probe_str(anime, &["anime_name", "title"]).unwrap_or_else(|| "Unknown Anime".to_string());
    let slug = schedule_slug(&title);

    ScheduleEntry {
        title,
        slug,
        poster: probe_str(anime, &["cover", "poster"])
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
    }
}

/// Slug form used by schedule entries: non-alphanumeric runs collapse to a
/// single hyphen.
fn schedule_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_hyphen = false;
        } else if !last_was_hyphen && !slug.is_empty() {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// First non-empty string among the given field names
fn probe_str(value: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(s) = value.get(field).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// Stringify a rating of either numeric or string form
fn rating_label(rating: Option<&Value>) -> String {
    match rating {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Canonical genre list: delimited strings split on `", "`, sequences used
/// as-is, anything else empty
fn canonical_genre(genre: Option<&Value>) -> Vec<String> {
    match genre {
        Some(Value::String(s)) if !s.is_empty() => {
            s.split(", ").map(str::to_string).collect()
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
