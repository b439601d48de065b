//! Frame ingestion handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use clens_models::envelope::{extract_frame_b64, extract_person_detections};

use crate::error::{ApiError, ApiResult};
use crate::services::{AnalyzeSummary, FramePipeline};
use crate::state::AppState;

/// Response of the `/analyze` endpoint.
///
/// Either a benign short-circuit (`ok` + `reason`) or the full outcome
/// counts of a processed payload.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections_in_payload: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_new_detections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_updated_count: Option<usize>,
}

impl AnalyzeResponse {
    fn nothing_to_do(reason: &'static str) -> Self {
        Self {
            ok: true,
            reason: Some(reason),
            detections_in_payload: None,
            unique_new_detections: None,
            metrics_updated_count: None,
        }
    }

    fn from_summary(summary: AnalyzeSummary) -> Self {
        Self {
            ok: true,
            reason: None,
            detections_in_payload: Some(summary.detections_in_payload),
            unique_new_detections: Some(summary.unique_new_detections),
            metrics_updated_count: Some(summary.metrics_updated_count),
        }
    }
}

/// Ingest one video-analytics event payload.
///
/// Parses the event envelope out of the request's `messages` object,
/// decodes the frame, and runs every not-yet-counted person detection
/// through crop → classification → aggregation. Missing frames or
/// detections are benign; only malformed requests and undecodable frames
/// are client errors.
pub async fn analyze_frame(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AnalyzeResponse>> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Received invalid JSON: {}", e);
        ApiError::bad_request("Invalid JSON")
    })?;

    let messages = payload
        .get("messages")
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Payload must contain 'messages' object"))?;

    let Some(frame_b64) = extract_frame_b64(messages) else {
        return Ok(Json(AnalyzeResponse::nothing_to_do("no_image_in_payload")));
    };

    let detections = extract_person_detections(messages);
    if detections.is_empty() {
        return Ok(Json(AnalyzeResponse::nothing_to_do("no_person_detections_in_payload")));
    }

    let frame = BASE64
        .decode(frame_b64.trim())
        .ok()
        .and_then(|bytes| image::load_from_memory(&bytes).ok())
        .ok_or_else(|| {
            error!("Failed to decode base64 frame image");
            ApiError::bad_request("Invalid or corrupt image data")
        })?;

    let summary = FramePipeline::from_state(&state).process(&frame, &detections).await;

    Ok(Json(AnalyzeResponse::from_summary(summary)))
}
