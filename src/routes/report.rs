//! Report relay endpoint
//!
//! Accepting a report and delivering it to the bot are separate outcomes:
//! the endpoint answers success whenever the report text is usable, and a
//! delivery problem is surfaced as a note instead of an error so clients
//! never show a failure for something the operator will still read.

use actix_web::{web, HttpResponse, Responder};
use tracing::{info, warn};

use crate::models::{ApiError, ReportRequest, ReportResponse};
use crate::relay::RelayError;
use crate::routes::AppState;

/// POST /api/report - Submit a user report
#[utoipa::path(
    post,
    path = "/api/report",
    tag = "report",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report accepted", body = ReportResponse),
        (status = 400, description = "Bad request - message is required", body = ApiError)
    )
)]
pub async fn submit_report(
    data: web::Data<AppState>,
    body: web::Json<ReportRequest>,
) -> impl Responder {
    let message = body.message.trim();
    if message.is_empty() {
        return HttpResponse::BadRequest().json(ApiError::new("Report message is required"));
    }

    info!("Received user report ({} chars)", message.len());

    let response = match data.relay.deliver(message).await {
        Ok(()) => ReportResponse::delivered(),
        Err(RelayError::Unconfigured) => {
            info!("Report relay not configured, storing report in the log");
            ReportResponse::accepted_with_note("Report stored for manual processing")
        }
        Err(e) => {
            warn!("Report accepted but delivery failed: {}", e);
            ReportResponse::accepted_with_note(
                "Report stored; delivery to the operator is delayed",
            )
        }
    };

    HttpResponse::Ok().json(response)
}

/// OPTIONS /api/report - CORS preflight
pub async fn report_preflight() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Upstream;
    use crate::config::{Config, RelayConfig};
    use crate::relay::ReportRelay;
    use crate::routes::configure_routes;
    use actix_web::{test, App};
    use std::time::Duration;

    fn state_with_webhook(webhook_url: Option<&str>) -> web::Data<AppState> {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            upstream_base_url: "http://127.0.0.1:1/api/otakudesu".to_string(),
            schedule_base_url: "http://127.0.0.1:1/api/jadwal/anime".to_string(),
            upstream_api_key: "test-key".to_string(),
            relay: RelayConfig {
                webhook_url: webhook_url.map(str::to_string),
                delivery_timeout: Duration::from_secs(2),
            },
        };
        web::Data::new(AppState {
            upstream: Upstream::new(&config.upstream_api_key),
            relay: ReportRelay::new(&config.relay),
            config,
        })
    }

    #[actix_rt::test]
    async fn test_report_rejects_empty_message() {
        let app = test::init_service(
            App::new()
                .app_data(state_with_webhook(None))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_json(serde_json::json!({ "message": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn test_report_without_webhook_still_succeeds() {
        let app = test::init_service(
            App::new()
                .app_data(state_with_webhook(None))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_json(serde_json::json!({ "message": "player is broken" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["note"], "Report stored for manual processing");
    }

    #[actix_rt::test]
    async fn test_report_with_unreachable_bot_still_succeeds() {
        let app = test::init_service(
            App::new()
                .app_data(state_with_webhook(Some("http://127.0.0.1:1/send")))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/report")
            .set_json(serde_json::json!({ "message": "subtitle out of sync" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["note"].as_str().unwrap().contains("delayed"));
    }

    #[actix_rt::test]
    async fn test_report_preflight_allows_cross_origin_post() {
        let app = test::init_service(
            App::new()
                .app_data(state_with_webhook(None))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::with_uri("/api/report")
            .method(actix_web::http::Method::OPTIONS)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let headers = resp.headers();
        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert!(headers
            .get("Access-Control-Allow-Methods")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("POST"));
    }
}
