//! Data models for the Zephyre catalog gateway
//!
//! This module contains the response wrappers shared by every endpoint and
//! the request/response bodies of the report relay. The canonical catalog
//! records live next to the normalizer and are re-exported here for
//! convenience.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Re-export canonical records for convenience
pub use crate::normalize::{AnimeDetail, CatalogItem, EpisodeRef, ScheduleDay, ScheduleEntry};
pub use crate::stream::{Mirror, QualityLink, Selection, StreamQuality, StreamServer};

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was fetched
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Create a new successful API response with a custom timestamp
    pub fn with_timestamp(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Response payload for the episode endpoint: the mirror table plus the
/// default playback choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeView {
    /// Episode display title derived from the identifier
    pub title: String,
    /// Playable mirrors in presentation order
    pub mirrors: Vec<Mirror>,
    /// Default playback choice, absent when no mirror is playable
    pub default_selection: Option<Selection>,
}

/// Response payload for the download endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadView {
    /// Episode display title derived from the identifier
    pub title: String,
    /// Download page URL or grouped download links, as upstream delivers it
    pub download: serde_json::Value,
}

/// Request body for submitting a user report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Free-form report text
    pub message: String,
}

/// Response for the report endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Always true: accepting a report never fails on delivery problems
    pub success: bool,
    /// Human-readable confirmation
    pub message: String,
    /// Set when the report was accepted but not delivered to the bot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ReportResponse {
    /// Report accepted and delivered
    pub fn delivered() -> Self {
        Self {
            success: true,
            message: "Report received. Thank you!".to_string(),
            note: None,
        }
    }

    /// Report accepted but not delivered; the note explains what happened
    pub fn accepted_with_note(note: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "Report received. Thank you!".to_string(),
            note: Some(note.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::new(vec!["item1", "item2"]);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("Something went wrong");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"Something went wrong\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_report_request_deserialization() {
        let json = r#"{ "message": "player is broken on episode 3" }"#;
        let request: ReportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.message, "player is broken on episode 3");
    }

    #[test]
    fn test_report_response_delivered() {
        let response = ReportResponse::delivered();
        assert!(response.success);
        assert!(response.note.is_none());

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"note\""));
    }

    #[test]
    fn test_report_response_with_note() {
        let response = ReportResponse::accepted_with_note("stored for manual processing");
        assert!(response.success);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"note\":\"stored for manual processing\""));
    }

    #[test]
    fn test_episode_view_serialization() {
        let view = EpisodeView {
            title: "One Piece Episode 1".to_string(),
            mirrors: vec![],
            default_selection: None,
        };

        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"mirrors\":[]"));
        assert!(json.contains("\"defaultSelection\":null"));
    }
}
