//! API Routes module for the Zephyre catalog gateway
//!
//! This module contains all HTTP route handlers for the public API
//! endpoints. Listing and detail handlers never fail on upstream problems:
//! they fall back to locally generated placeholder data so clients always
//! receive something renderable.

pub mod report;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::client::{Transport, Upstream};
use crate::config::Config;
use crate::constants::endpoints;
use crate::error::AppResult;
use crate::identifier::{canonical_detail_url, display_title, normalize};
use crate::models::{
    AnimeDetail, ApiError, ApiResponse, CatalogItem, DownloadView, EpisodeRef, EpisodeView,
    Mirror, QualityLink, ReportRequest, ReportResponse, ScheduleDay, ScheduleEntry, Selection,
    StreamQuality, StreamServer,
};
use crate::normalize::{
    normalize_detail, normalize_listing, normalize_schedule, placeholder, search_item_from_value,
};
use crate::relay::ReportRelay;
use crate::resolver::{candidate_urls, envelope_is_success, resolve};
use crate::stream::MirrorTable;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub upstream: Upstream,
    pub relay: ReportRelay,
}

/// The identifier tail of the request path, still percent-encoded.
///
/// Path extraction percent-decodes matched segments, which would stack a
/// second decode on top of the normalizer's single decode and corrupt
/// identifiers carrying literal percent escapes. Taking the raw URI tail
/// keeps the normalizer's decode the only one.
fn raw_identifier(req: &HttpRequest, prefix: &str) -> String {
    req.uri()
        .path()
        .strip_prefix(prefix)
        .map(str::to_string)
        .unwrap_or_else(|| req.match_info().query("slug").to_string())
}

/// Extract the payload of a validated download envelope.
///
/// A flat payload carries the link under downloadUrl; grouped payloads are
/// passed through as-is. Both historical envelope conventions are probed,
/// matching what the resolver accepts as success.
fn download_payload(body: &Value) -> Value {
    let result = body
        .get("result")
        .or_else(|| body.get("data"))
        .cloned()
        .unwrap_or(Value::Null);
    result.get("downloadUrl").cloned().unwrap_or(result)
}

/// Map a validated search envelope into canonical results, probing both
/// envelope conventions before giving up on placeholders.
fn search_results(body: &Value, keyword: &str) -> Vec<CatalogItem> {
    body.get("result")
        .or_else(|| body.get("data"))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(search_item_from_value).collect())
        .unwrap_or_else(|| placeholder::search(keyword))
}

/// Fetch one listing feed and normalize it, substituting placeholders when
/// the upstream is unreachable or answers with a failure envelope.
async fn fetch_listing(data: &web::Data<AppState>, url: &str) -> Vec<CatalogItem> {
    info!("Fetching listing feed: {}", url);
    match data.upstream.get_json(url).await {
        Ok(body) if envelope_is_success(&body) => normalize_listing(&body),
        Ok(_) => {
            warn!("Listing feed answered with a failure envelope: {}", url);
            placeholder::listing()
        }
        Err(e) => {
            warn!("Listing feed unreachable ({}): {}", url, e);
            placeholder::listing()
        }
    }
}

/// GET /api/lastupdate - Latest episode releases
#[utoipa::path(
    get,
    path = "/api/lastupdate",
    tag = "catalog",
    responses(
        (status = 200, description = "Latest releases retrieved successfully", body = Vec<CatalogItem>)
    )
)]
pub async fn get_lastupdate(data: web::Data<AppState>) -> impl Responder {
    let url = endpoints::lastupdate(&data.config.upstream_base_url);
    let items = fetch_listing(&data, &url).await;
    HttpResponse::Ok().json(ApiResponse::new(items))
}

/// GET /api/ongoing - Currently airing series
///
/// Served from the latest-release feed; every entry is airing by
/// definition, so the status is pinned.
#[utoipa::path(
    get,
    path = "/api/ongoing",
    tag = "catalog",
    responses(
        (status = 200, description = "Ongoing series retrieved successfully", body = Vec<CatalogItem>)
    )
)]
pub async fn get_ongoing(data: web::Data<AppState>) -> impl Responder {
    let url = endpoints::lastupdate(&data.config.upstream_base_url);
    let mut items = fetch_listing(&data, &url).await;
    for item in &mut items {
        item.status = "Ongoing".to_string();
    }
    HttpResponse::Ok().json(ApiResponse::new(items))
}

/// GET /api/completed - Finished series
#[utoipa::path(
    get,
    path = "/api/completed",
    tag = "catalog",
    responses(
        (status = 200, description = "Completed series retrieved successfully", body = Vec<CatalogItem>)
    )
)]
pub async fn get_completed(data: web::Data<AppState>) -> impl Responder {
    let url = endpoints::completed(&data.config.upstream_base_url);
    let items = fetch_listing(&data, &url).await;
    HttpResponse::Ok().json(ApiResponse::new(items))
}

/// Query parameters for search endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Search keyword
    pub q: Option<String>,
}

/// GET /api/search - Search the catalog
///
/// Query parameter: q (required) - search keyword
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results retrieved successfully", body = Vec<CatalogItem>),
        (status = 400, description = "Bad request - search query is required", body = ApiError)
    )
)]
pub async fn search_anime(
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let keyword = match &query.q {
        Some(q) if !q.trim().is_empty() => q.trim().to_string(),
        _ => {
            return HttpResponse::BadRequest().json(ApiError::new("Search query is required"));
        }
    };

    info!("Searching catalog: {}", keyword);
    let url = endpoints::search(&data.config.upstream_base_url, &keyword);

    let results = match data.upstream.get_json(&url).await {
        Ok(body) if envelope_is_success(&body) => search_results(&body, &keyword),
        Ok(_) => {
            warn!("Search answered with a failure envelope: {}", keyword);
            placeholder::search(&keyword)
        }
        Err(e) => {
            warn!("Search unreachable ({}): {}", keyword, e);
            placeholder::search(&keyword)
        }
    };

    HttpResponse::Ok().json(ApiResponse::new(results))
}

/// GET /api/schedule - Weekly broadcast schedule
#[utoipa::path(
    get,
    path = "/api/schedule",
    tag = "catalog",
    responses(
        (status = 200, description = "Weekly schedule retrieved successfully", body = Vec<ScheduleDay>)
    )
)]
pub async fn get_schedule(data: web::Data<AppState>) -> impl Responder {
    let url = endpoints::schedule(&data.config.schedule_base_url);
    info!("Fetching schedule feed: {}", url);

    let days = match data.upstream.get_json(&url).await {
        Ok(body) if envelope_is_success(&body) => normalize_schedule(&body),
        Ok(_) => {
            warn!("Schedule feed answered with a failure envelope");
            placeholder::schedule()
        }
        Err(e) => {
            warn!("Schedule feed unreachable: {}", e);
            placeholder::schedule()
        }
    };

    HttpResponse::Ok().json(ApiResponse::new(days))
}

/// GET /api/anime/{slug} - Anime detail
///
/// Accepts a bare slug or a full partner-site URL. Tries every candidate
/// formulation in order and answers with a deterministic placeholder when
/// all of them fail.
#[utoipa::path(
    get,
    path = "/api/anime/{slug}",
    tag = "catalog",
    params(
        ("slug" = String, Path, description = "Anime slug or full partner-site URL")
    ),
    responses(
        (status = 200, description = "Anime detail retrieved successfully", body = AnimeDetail),
        (status = 400, description = "Bad request - unusable identifier", body = ApiError)
    )
)]
pub async fn get_anime_detail(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let canonical = canonical_detail_url(&json!(raw_identifier(&req, "/api/anime/")))?;
    let candidates = candidate_urls(&canonical);
    info!("Resolving anime detail over {} candidates", candidates.len());

    let base = data.config.upstream_base_url.clone();
    let detail = match resolve(&data.upstream, &candidates, |c| endpoints::detail(&base, c)).await
    {
        Some(body) => normalize_detail(&body, &canonical),
        None => {
            warn!("Anime detail exhausted every candidate: {}", canonical);
            placeholder::detail(&canonical)
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::new(detail)))
}

/// GET /api/episode/{slug} - Episode stream mirrors
///
/// The identifier must reference the partner site. The stream lookup falls
/// back to the episode-page lookup when no candidate yields stream data.
#[utoipa::path(
    get,
    path = "/api/episode/{slug}",
    tag = "catalog",
    params(
        ("slug" = String, Path, description = "Episode URL or URL-encoded identifier")
    ),
    responses(
        (status = 200, description = "Episode stream mirrors retrieved successfully", body = EpisodeView),
        (status = 400, description = "Bad request - unusable identifier", body = ApiError)
    )
)]
pub async fn get_episode(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let identifier = normalize(&json!(raw_identifier(&req, "/api/episode/")))?;
    let candidates = candidate_urls(&identifier);
    info!("Resolving episode stream over {} candidates", candidates.len());

    let base = data.config.upstream_base_url.clone();
    let mut body = resolve(&data.upstream, &candidates, |c| endpoints::stream(&base, c)).await;

    if body.is_none() {
        info!("Stream lookup failed, falling back to episode lookup");
        body = resolve(&data.upstream, &candidates, |c| endpoints::episode(&base, c)).await;
    }

    let table = body.map(|b| MirrorTable::from_payload(&b)).unwrap_or_default();
    if table.is_empty() {
        warn!("No playable mirror for: {}", identifier);
    }

    let view = EpisodeView {
        title: display_title(&identifier),
        mirrors: table.ordered_mirrors().into_iter().cloned().collect(),
        default_selection: table.default_selection(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::new(view)))
}

/// GET /api/download/{slug} - Episode download links
#[utoipa::path(
    get,
    path = "/api/download/{slug}",
    tag = "catalog",
    params(
        ("slug" = String, Path, description = "Episode URL or URL-encoded identifier")
    ),
    responses(
        (status = 200, description = "Download links retrieved successfully", body = DownloadView),
        (status = 400, description = "Bad request - unusable identifier", body = ApiError),
        (status = 500, description = "Download links unavailable", body = ApiError)
    )
)]
pub async fn get_download(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let identifier = normalize(&json!(raw_identifier(&req, "/api/download/")))?;
    let candidates = candidate_urls(&identifier);
    info!("Resolving download links over {} candidates", candidates.len());

    let base = data.config.upstream_base_url.clone();
    match resolve(&data.upstream, &candidates, |c| endpoints::download(&base, c)).await {
        Some(body) => {
            let view = DownloadView {
                title: display_title(&identifier),
                download: download_payload(&body),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::new(view)))
        }
        None => {
            warn!("Download links exhausted every candidate: {}", identifier);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("Download links are unavailable right now")))
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Zephyre Catalog Gateway",
        version = "0.1.0",
        description = "Resilient gateway over a third-party anime catalog aggregation API",
        license(
            name = "MIT"
        )
    ),
    paths(
        get_lastupdate,
        get_ongoing,
        get_completed,
        search_anime,
        get_schedule,
        get_anime_detail,
        get_episode,
        get_download,
        report::submit_report
    ),
    components(
        schemas(
            CatalogItem,
            AnimeDetail,
            EpisodeRef,
            ScheduleDay,
            ScheduleEntry,
            StreamQuality,
            StreamServer,
            Mirror,
            QualityLink,
            Selection,
            EpisodeView,
            DownloadView,
            ReportRequest,
            ReportResponse,
            ApiError,
            SearchQuery
        )
    ),
    tags(
        (name = "catalog", description = "Catalog data endpoints"),
        (name = "report", description = "User report relay")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/lastupdate", web::get().to(get_lastupdate))
            .route("/ongoing", web::get().to(get_ongoing))
            .route("/completed", web::get().to(get_completed))
            .route("/search", web::get().to(search_anime))
            .route("/schedule", web::get().to(get_schedule))
            .route("/anime/{slug:.*}", web::get().to(get_anime_detail))
            .route("/episode/{slug:.*}", web::get().to(get_episode))
            .route("/download/{slug:.*}", web::get().to(get_download))
            .route("/report", web::post().to(report::submit_report))
            .route(
                "/report",
                web::method(actix_web::http::Method::OPTIONS).to(report::report_preflight),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use actix_web::test as actix_test;
    use actix_web::App;
    use std::time::Duration;

    fn test_state() -> web::Data<AppState> {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            upstream_base_url: "http://127.0.0.1:1/api/otakudesu".to_string(),
            schedule_base_url: "http://127.0.0.1:1/api/jadwal/anime".to_string(),
            upstream_api_key: "test-key".to_string(),
            relay: RelayConfig {
                webhook_url: None,
                delivery_timeout: Duration::from_secs(15),
            },
        };
        web::Data::new(AppState {
            upstream: Upstream::new(&config.upstream_api_key),
            relay: ReportRelay::new(&config.relay),
            config,
        })
    }

    #[actix_rt::test]
    async fn test_search_requires_query() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/search").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn test_search_rejects_blank_query() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/search?q=%20%20")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn test_detail_rejects_malformed_identifier() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/anime/%5Bobject%20Object%5D")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn test_episode_rejects_foreign_host() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/episode/https%3A%2F%2Fexample.com%2Fepisode%2Fx")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    // The unreachable upstream address makes listing handlers exercise
    // their placeholder path.
    #[actix_rt::test]
    async fn test_lastupdate_answers_with_placeholders_when_upstream_is_down() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/lastupdate").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(
            body["data"].as_array().unwrap().len(),
            placeholder::LISTING_SIZE
        );
    }

    #[test]
    fn test_download_payload_flat_result() {
        let body = json!({
            "status": "Success",
            "result": { "downloadUrl": "https://files.example.com/ep1.mp4" }
        });
        assert_eq!(
            download_payload(&body),
            json!("https://files.example.com/ep1.mp4")
        );
    }

    #[test]
    fn test_download_payload_data_envelope() {
        // The resolver accepts data-enveloped bodies as success, so the
        // extraction has to read them too.
        let body = json!({
            "success": true,
            "data": { "downloadUrl": "https://files.example.com/ep1.mp4" }
        });
        assert_eq!(
            download_payload(&body),
            json!("https://files.example.com/ep1.mp4")
        );
    }

    #[test]
    fn test_download_payload_grouped_passthrough() {
        let grouped = json!({ "480p": ["https://files.example.com/a"], "720p": ["https://files.example.com/b"] });
        let body = json!({ "status": "Success", "result": grouped.clone() });
        assert_eq!(download_payload(&body), grouped);
    }

    #[test]
    fn test_search_results_data_envelope() {
        let body = json!({
            "success": true,
            "data": [
                { "judul": "One Piece", "link": "https://otakudesu.cloud/anime/one-piece/" }
            ]
        });
        let results = search_results(&body, "one piece");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].slug, "one-piece");
    }

    #[actix_rt::test]
    async fn test_download_answers_500_when_every_candidate_fails() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/download/https%3A%2F%2Fotakudesu.cloud%2Fepisode%2Fone-piece-episode-1")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn test_download_rejects_malformed_identifier() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/download/%5Bobject%20Object%5D")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    // A doubly escaped sequence must survive as a single escape: the route
    // layer hands the raw tail to the normalizer, whose decode is the only
    // one applied.
    #[actix_rt::test]
    async fn test_episode_identifier_is_decoded_exactly_once() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/episode/https%3A%2F%2Fotakudesu.cloud%2Fepisode%2Fone%2520piece")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["data"]["title"], "One%20piece");
    }

    #[actix_rt::test]
    async fn test_ongoing_pins_status() {
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state())
                .configure(configure_routes),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/ongoing").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        for item in body["data"].as_array().unwrap() {
            assert_eq!(item["status"], "Ongoing");
        }
    }
}
