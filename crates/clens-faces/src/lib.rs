//! AWS Rekognition face-attribute client.
//!
//! Wraps DetectFaces for the ingestion pipeline: given a JPEG crop of a
//! detected person, returns the gender and age range of the first face
//! found, or nothing if the crop contains no face.

mod client;
mod error;

pub use client::{FaceClient, FaceConfig, FaceDemographics};
pub use error::{FaceError, FaceResult};
