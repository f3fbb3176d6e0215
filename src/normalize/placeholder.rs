//! Locally generated placeholder records
//!
//! When every upstream candidate is exhausted, or an envelope shape is
//! unrecognizable, the service still answers with renderable data. All
//! factories here are pure: the same inputs always produce the same
//! records, so retries and tests see stable output.

use super::{AnimeDetail, CatalogItem, ScheduleDay, ScheduleEntry, PLACEHOLDER_POSTER};
use crate::identifier::{display_title, slugify};

/// Number of entries in a placeholder listing
pub const LISTING_SIZE: usize = 12;

/// Well-known titles used to fill placeholder listings
const STOCK_TITLES: [&str; LISTING_SIZE] = [
    "One Piece",
    "Naruto Shippuden",
    "Jujutsu Kaisen",
    "Boruto",
    "Black Clover",
    "Bleach",
    "Spy x Family",
    "Tokyo Revengers",
    "My Hero Academia",
    "Demon Slayer",
    "Attack on Titan",
    "Dr Stone",
];

/// Fixed-size listing shown when no upstream feed is reachable
pub fn listing() -> Vec<CatalogItem> {
    STOCK_TITLES
        .iter()
        .enumerate()
        .map(|(index, title)| {
            let slug = slugify(title);
            CatalogItem {
                title: title.to_string(),
                url: format!("https://otakudesu.cloud/anime/{}", slug),
                slug,
                poster: PLACEHOLDER_POSTER.to_string(),
                thumb: PLACEHOLDER_POSTER.to_string(),
                episode: format!("Episode {}", LISTING_SIZE - index),
                release_date: "Recently".to_string(),
                day: "TBA".to_string(),
                time: "TBA".to_string(),
                status: "Ongoing".to_string(),
                rating: "N/A".to_string(),
                genre: Vec::new(),
                synopsis: "Data is temporarily unavailable.".to_string(),
            }
        })
        .collect()
}

/// Detail record shown when every candidate URL for an anime failed.
///
/// The title is derived deterministically from the identifier; the synopsis
/// explains the failure so the page is honest about missing data.
pub fn detail(identifier: &str) -> AnimeDetail {
    let title = display_title(identifier);
    let synopsis = format!(
        "Information for {} could not be retrieved right now. The upstream data \
         source may be under maintenance, the title may have moved to a different \
         address, or the link that led here may be outdated. Try again later or \
         search for the title instead.",
        title
    );

    AnimeDetail {
        title,
        poster: PLACEHOLDER_POSTER.to_string(),
        thumb: PLACEHOLDER_POSTER.to_string(),
        synopsis,
        rating: "N/A".to_string(),
        status: "Unknown".to_string(),
        anime_type: "Unknown".to_string(),
        episodes: "Unknown".to_string(),
        duration: "Unknown".to_string(),
        release: "Unknown".to_string(),
        studio: "Unknown".to_string(),
        producer: "Unknown".to_string(),
        japanese: String::new(),
        genre: Vec::new(),
        episode_list: Vec::new(),
    }
}

/// Empty weekly schedule shown when the schedule feed is unreachable
pub fn schedule() -> Vec<ScheduleDay> {
    ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"]
        .iter()
        .map(|day| ScheduleDay {
            day: day.to_string(),
            anime_list: Vec::<ScheduleEntry>::new(),
        })
        .collect()
}

/// Placeholder search results derived from the query text
pub fn search(query: &str) -> Vec<CatalogItem> {
    let title = display_title(&slugify(query));
    let slug = slugify(query);
    vec![CatalogItem {
        title: format!("{} (search unavailable)", title),
        url: String::new(),
        slug,
        poster: PLACEHOLDER_POSTER.to_string(),
        thumb: PLACEHOLDER_POSTER.to_string(),
        episode: "TBA".to_string(),
        release_date: "TBA".to_string(),
        day: "TBA".to_string(),
        time: "TBA".to_string(),
        status: "Unknown".to_string(),
        rating: "N/A".to_string(),
        genre: Vec::new(),
        synopsis: "Search is temporarily unavailable. Try again in a moment.".to_string(),
    }]
}
