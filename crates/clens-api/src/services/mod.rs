//! Ingestion services.

pub mod crop;
pub mod dedup;
pub mod pipeline;

pub use crop::{encode_crop, CropError};
pub use dedup::DedupCache;
pub use pipeline::{AnalyzeSummary, FramePipeline};
