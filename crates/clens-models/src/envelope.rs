//! Event-envelope extraction.
//!
//! Upstream publishes one envelope per frame: a JSON object mapping
//! sub-stream names to payloads. Sub-streams are addressed by key prefix,
//! not by a fixed name — the suffix encodes the upstream node instance.

use serde_json::{Map, Value};

use crate::detection::PersonDetection;

/// Key prefix of the sub-stream carrying the base64-encoded frame.
pub const FRAME_SOURCE_PREFIX: &str = "RTSPStreamReceiver_";

/// Key prefix of the sub-stream carrying tracked-object detections.
pub const DETECTION_SOURCE_PREFIX: &str = "PolylineWithDirection_";

/// Find the base64 frame string in an envelope.
///
/// Returns the `data` field of the first entry whose key starts with
/// [`FRAME_SOURCE_PREFIX`] and whose value is an object. If several
/// sub-streams match, which one wins follows the map's iteration order,
/// which is not guaranteed to be stable upstream.
pub fn extract_frame_b64(messages: &Map<String, Value>) -> Option<String> {
    messages.iter().find_map(|(key, value)| {
        if !key.starts_with(FRAME_SOURCE_PREFIX) {
            return None;
        }
        value
            .as_object()
            .and_then(|obj| obj.get("data"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    })
}

/// Collect all person detections from an envelope.
///
/// Every entry whose key starts with [`DETECTION_SOURCE_PREFIX`] and whose
/// value is an object contributes its `data` list (missing list = empty).
/// Only items labelled `"Person"` that parse as [`PersonDetection`] are
/// kept; malformed items are dropped silently — absence of detections is
/// a benign outcome, never an error.
pub fn extract_person_detections(messages: &Map<String, Value>) -> Vec<PersonDetection> {
    let mut detections = Vec::new();
    for (key, value) in messages {
        if !key.starts_with(DETECTION_SOURCE_PREFIX) {
            continue;
        }
        let Some(items) = value.as_object().and_then(|obj| obj.get("data")).and_then(Value::as_array)
        else {
            continue;
        };
        for item in items {
            match serde_json::from_value::<PersonDetection>(item.clone()) {
                Ok(det) if det.is_person() => detections.push(det),
                _ => {}
            }
        }
    }
    detections
}
