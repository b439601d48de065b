//! Person detection records from the upstream perception pipeline.

use serde::{Deserialize, Serialize};

use crate::rect::NormalizedRect;

/// Label carried by detections of interest.
pub const PERSON_LABEL: &str = "Person";

/// One tracked object reported by the upstream detector.
///
/// `bounding_box_history` is ordered oldest-first; the last entry is the
/// most recent (authoritative) position of the tracked object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDetection {
    /// Stable identifier assigned upstream to a person across frames.
    #[serde(default)]
    pub tracker_id: Option<String>,
    /// Ordered history of normalized bounding boxes.
    #[serde(rename = "boundingBoxHistory", default)]
    pub bounding_box_history: Vec<NormalizedRect>,
    /// Object class label; only `"Person"` entries are counted.
    #[serde(default)]
    pub label: String,
}

impl PersonDetection {
    /// The most recent bounding box, if any history was reported.
    pub fn latest_bbox(&self) -> Option<&NormalizedRect> {
        self.bounding_box_history.last()
    }

    /// Whether this detection is a person.
    pub fn is_person(&self) -> bool {
        self.label == PERSON_LABEL
    }
}
