//! Shared data models for the CrowdLens backend.
//!
//! This crate provides Serde-serializable types for:
//! - Person detections and their normalized bounding boxes
//! - Event-envelope extraction (frame + detection sub-streams)
//! - Demographic dimensions (gender, age brackets, counter names)
//! - Hourly aggregation bucket keys and records

pub mod bucket;
pub mod demographics;
pub mod detection;
pub mod envelope;
pub mod rect;

// Re-export common types
pub use bucket::{BucketKey, HourlyBucket, HOUR_ATTR, PARTITION_KEY_ATTR};
pub use demographics::{counter_attr, AgeBracket, DimensionParseError, Gender, TOTAL_COUNT_ATTR};
pub use detection::PersonDetection;
pub use envelope::{extract_frame_b64, extract_person_detections};
pub use rect::{NormalizedRect, PixelRect};
