//! Per-request analytics pipeline.
//!
//! Drives each incoming frame through dedup filtering, crop extraction,
//! face classification and bucket aggregation. A failure in any one
//! detection is logged and skipped; it never aborts the rest of the batch
//! or the request.

use std::sync::Arc;

use chrono::Utc;
use image::DynamicImage;
use serde::Serialize;
use tracing::{error, info, warn};

use clens_faces::{FaceClient, FaceError};
use clens_models::{BucketKey, PersonDetection};
use clens_store::{AnalyticsStore, StoreError};

use crate::metrics;
use crate::services::crop::{encode_crop, CropError};
use crate::services::dedup::DedupCache;
use crate::state::AppState;

/// Outcome counts for one processed frame payload.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct AnalyzeSummary {
    /// Person detections present in the payload, before dedup.
    pub detections_in_payload: usize,
    /// Detections that were not already in the dedup cache at their turn.
    pub unique_new_detections: usize,
    /// Detections that resulted in a successful aggregation write.
    pub metrics_updated_count: usize,
}

/// Why one detection produced no counter update.
#[derive(Debug)]
enum DetectionSkip {
    InvalidBoundingBox,
    CropFailed(CropError),
    NoFaceFound,
    ClassificationFailed(FaceError),
    StoreFailed(StoreError),
}

impl DetectionSkip {
    fn reason(&self) -> &'static str {
        match self {
            DetectionSkip::InvalidBoundingBox => "invalid_bounding_box",
            DetectionSkip::CropFailed(_) => "crop_failed",
            DetectionSkip::NoFaceFound => "no_face_found",
            DetectionSkip::ClassificationFailed(_) => "classification_failed",
            DetectionSkip::StoreFailed(_) => "store_failed",
        }
    }
}

/// Orchestrates the per-detection flow for one request.
pub struct FramePipeline {
    store: Arc<AnalyticsStore>,
    faces: Arc<FaceClient>,
    dedup: Arc<DedupCache>,
    location_id: String,
}

impl FramePipeline {
    /// Build a pipeline borrowing the application's shared clients.
    pub fn from_state(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            faces: Arc::clone(&state.faces),
            dedup: Arc::clone(&state.dedup),
            location_id: state.config.location_id.clone(),
        }
    }

    /// Process every person detection found in one frame payload.
    ///
    /// Detections are handled in payload order; the first occurrence of a
    /// tracker id wins because it is marked seen immediately after its
    /// counters are written.
    pub async fn process(&self, frame: &DynamicImage, detections: &[PersonDetection]) -> AnalyzeSummary {
        let now = Utc::now();
        let bucket = BucketKey::from_utc(&self.location_id, now);

        self.dedup.purge_expired(now).await;

        let mut summary = AnalyzeSummary {
            detections_in_payload: detections.len(),
            ..Default::default()
        };

        for detection in detections {
            let Some(tracker_id) = detection.tracker_id.as_deref().filter(|id| !id.is_empty()) else {
                warn!("Skipping detection with no tracker_id");
                metrics::record_detection_skipped("missing_tracker_id");
                continue;
            };

            if self.dedup.is_seen(tracker_id).await {
                info!("Skipping already processed tracker_id: {}", tracker_id);
                metrics::record_dedup_hit();
                continue;
            }

            summary.unique_new_detections += 1;

            match self.process_new_detection(frame, detection, &bucket).await {
                Ok(()) => {
                    summary.metrics_updated_count += 1;
                    self.dedup.mark_seen(tracker_id, now).await;
                }
                Err(skip) => {
                    metrics::record_detection_skipped(skip.reason());
                    log_skip(tracker_id, &skip);
                }
            }
        }

        info!(
            detections_in_payload = summary.detections_in_payload,
            unique_new_detections = summary.unique_new_detections,
            metrics_updated_count = summary.metrics_updated_count,
            "Processed payload"
        );

        summary
    }

    /// Crop, classify and count a single not-yet-seen detection.
    async fn process_new_detection(
        &self,
        frame: &DynamicImage,
        detection: &PersonDetection,
        bucket: &BucketKey,
    ) -> Result<(), DetectionSkip> {
        let bbox = detection
            .latest_bbox()
            .filter(|b| b.is_finite())
            .ok_or(DetectionSkip::InvalidBoundingBox)?;

        let crop = encode_crop(frame, bbox).map_err(DetectionSkip::CropFailed)?;

        let demographics = self
            .faces
            .detect_demographics(crop)
            .await
            .map_err(DetectionSkip::ClassificationFailed)?
            .ok_or(DetectionSkip::NoFaceFound)?;

        self.store
            .increment_bucket(bucket, demographics.gender, demographics.bracket())
            .await
            .map_err(DetectionSkip::StoreFailed)?;

        metrics::record_face_classified(demographics.gender);
        metrics::record_bucket_write();

        Ok(())
    }
}

fn log_skip(tracker_id: &str, skip: &DetectionSkip) {
    match skip {
        DetectionSkip::InvalidBoundingBox => {
            warn!("Skipping detection with invalid bounding box for tracker_id: {}", tracker_id);
        }
        DetectionSkip::CropFailed(e) => {
            warn!("Failed to crop detection for tracker_id {}: {}", tracker_id, e);
        }
        DetectionSkip::NoFaceFound => {
            info!("Processed a crop for tracker_id {}, but no face was found in it", tracker_id);
        }
        DetectionSkip::ClassificationFailed(e) => {
            error!("Face classification failed for tracker_id {}: {}", tracker_id, e);
        }
        DetectionSkip::StoreFailed(e) => {
            error!("Counter update failed for tracker_id {}: {}", tracker_id, e);
        }
    }
}
