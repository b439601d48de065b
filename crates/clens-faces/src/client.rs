//! Rekognition DetectFaces wrapper.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_rekognition::config::{Builder, Region};
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Attribute, FaceDetail, Image};
use aws_sdk_rekognition::Client;
use tracing::debug;

use clens_models::{counter_attr, AgeBracket, Gender};

use crate::error::{FaceError, FaceResult};

/// Configuration for the face-attribute client.
#[derive(Debug, Clone)]
pub struct FaceConfig {
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region
    pub region: String,
}

impl FaceConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FaceResult<Self> {
        Ok(Self {
            access_key_id: std::env::var("REKOGNITION_ACCESS_KEY_ID")
                .map_err(|_| FaceError::config_error("REKOGNITION_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("REKOGNITION_SECRET_ACCESS_KEY")
                .map_err(|_| FaceError::config_error("REKOGNITION_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}

/// Gender and age range of one detected face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDemographics {
    pub gender: Gender,
    pub age_low: f64,
    pub age_high: f64,
}

impl FaceDemographics {
    /// Midpoint of the estimated age range.
    pub fn average_age(&self) -> f64 {
        (self.age_low + self.age_high) / 2.0
    }

    /// Age bracket of the averaged estimate.
    pub fn bracket(&self) -> AgeBracket {
        AgeBracket::from_age(self.average_age())
    }

    /// The `{gender}_{bracket}` counter name for this face.
    pub fn counter_attr(&self) -> &'static str {
        counter_attr(self.gender, self.bracket())
    }
}

/// AWS Rekognition face-attribute client.
#[derive(Clone)]
pub struct FaceClient {
    client: Client,
}

impl FaceClient {
    /// Create a new client from configuration.
    pub fn new(config: FaceConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "rekognition",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .build();

        Self { client: Client::from_conf(sdk_config) }
    }

    /// Create from environment variables.
    pub fn from_env() -> FaceResult<Self> {
        Ok(Self::new(FaceConfig::from_env()?))
    }

    /// Detect the gender and age range of the most prominent face in a crop.
    ///
    /// A crop without any detectable face returns `Ok(None)` — person
    /// detectors fire on backs of heads and partial occlusions, so this is
    /// an expected outcome, not a failure. When several faces are found,
    /// only the first (highest-confidence) result is used.
    pub async fn detect_demographics(&self, crop_jpeg: Vec<u8>) -> FaceResult<Option<FaceDemographics>> {
        debug!("Requesting face attributes for a {} byte crop", crop_jpeg.len());

        let image = Image::builder().bytes(Blob::new(crop_jpeg)).build();

        let response = self
            .client
            .detect_faces()
            .image(image)
            .attributes(Attribute::AgeRange)
            .attributes(Attribute::Gender)
            .send()
            .await
            .map_err(|e| FaceError::service(e.to_string()))?;

        match response.face_details().first() {
            Some(detail) => map_face(detail).map(Some),
            None => Ok(None),
        }
    }
}

/// Map one Rekognition face detail to demographics.
fn map_face(detail: &FaceDetail) -> FaceResult<FaceDemographics> {
    let age_range = detail
        .age_range()
        .ok_or_else(|| FaceError::InvalidResponse("face detail has no age range".to_string()))?;
    let age_low = age_range
        .low()
        .ok_or_else(|| FaceError::InvalidResponse("age range has no lower bound".to_string()))?;
    let age_high = age_range
        .high()
        .ok_or_else(|| FaceError::InvalidResponse("age range has no upper bound".to_string()))?;

    let gender = detail
        .gender()
        .and_then(|g| g.value())
        .map(|v| Gender::from_service_value(v.as_str()))
        .unwrap_or(Gender::Men);

    Ok(FaceDemographics {
        gender,
        age_low: age_low as f64,
        age_high: age_high as f64,
    })
}
