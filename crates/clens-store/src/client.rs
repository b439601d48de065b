//! Analytics table client implementation.

use std::collections::HashMap;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::config::{Builder, Region};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::NaiveDate;
use tracing::debug;

use clens_models::{
    counter_attr, AgeBracket, BucketKey, Gender, HourlyBucket, HOUR_ATTR, PARTITION_KEY_ATTR,
    TOTAL_COUNT_ATTR,
};

use crate::error::{StoreError, StoreResult};

/// Configuration for the analytics store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region
    pub region: String,
    /// Analytics table name
    pub table_name: String,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self {
            access_key_id: std::env::var("DYNAMODB_ACCESS_KEY_ID")
                .map_err(|_| StoreError::config_error("DYNAMODB_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("DYNAMODB_SECRET_ACCESS_KEY")
                .map_err(|_| StoreError::config_error("DYNAMODB_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            table_name: std::env::var("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|_| "AIOS-AQ-18".to_string()),
        })
    }
}

/// DynamoDB analytics table client.
#[derive(Clone)]
pub struct AnalyticsStore {
    client: Client,
    table: String,
}

impl AnalyticsStore {
    /// Create a new store client from configuration.
    pub fn new(config: StoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "dynamodb",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            table: config.table_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self::new(StoreConfig::from_env()?))
    }

    /// Count one classified person into an hourly bucket.
    ///
    /// Issues a single `ADD` update incrementing `total_count`, the
    /// per-gender total, and the `{gender}_{bracket}` counter by one.
    /// `ADD` is atomic per attribute and creates the record if it does not
    /// exist, so concurrent writers targeting the same bucket never lose
    /// increments and no read-modify-write happens application-side.
    pub async fn increment_bucket(
        &self,
        key: &BucketKey,
        gender: Gender,
        bracket: AgeBracket,
    ) -> StoreResult<()> {
        let age_gender = counter_attr(gender, bracket);
        debug!(
            "Incrementing bucket {} hour {} ({})",
            key.partition_key(),
            key.hour,
            age_gender
        );

        self.client
            .update_item()
            .table_name(&self.table)
            .key(PARTITION_KEY_ATTR, AttributeValue::S(key.partition_key()))
            .key(HOUR_ATTR, AttributeValue::N(key.hour.to_string()))
            .update_expression("ADD #total_count :val, #total_gender :val, #age_gender_attr :val")
            .expression_attribute_names("#total_count", TOTAL_COUNT_ATTR)
            .expression_attribute_names("#total_gender", gender.total_attr())
            .expression_attribute_names("#age_gender_attr", age_gender)
            .expression_attribute_values(":val", AttributeValue::N("1".to_string()))
            .send()
            .await
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        Ok(())
    }

    /// Read back all hourly buckets recorded for a location on a date.
    pub async fn query_date(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<HourlyBucket>> {
        let partition_key = format!("{}#{}", location_id, date.format("%Y-%m-%d"));
        debug!("Querying analytics buckets for {}", partition_key);

        let response = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("LocationDate = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(partition_key))
            .send()
            .await
            .map_err(|e| StoreError::query_failed(e.to_string()))?;

        response
            .items()
            .iter()
            .map(decode_bucket)
            .collect::<StoreResult<Vec<_>>>()
    }

    /// Check connectivity by describing the analytics table.
    pub async fn check_connectivity(&self) -> StoreResult<()> {
        self.client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
            .map_err(|e| StoreError::AwsSdk(format!("Analytics table check failed: {}", e)))?;
        Ok(())
    }
}

/// Decode one table record into an [`HourlyBucket`].
///
/// Numeric attributes become counters; the partition key and any
/// non-numeric attribute are ignored. A record without a numeric `Hour`
/// is malformed.
fn decode_bucket(item: &HashMap<String, AttributeValue>) -> StoreResult<HourlyBucket> {
    let hour = item
        .get(HOUR_ATTR)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| StoreError::MalformedRecord("record has no numeric Hour key".to_string()))?;

    let mut counters = HashMap::new();
    for (attr, value) in item {
        if attr == HOUR_ATTR || attr == PARTITION_KEY_ATTR {
            continue;
        }
        if let Ok(n) = value.as_n() {
            if let Ok(count) = n.parse::<u64>() {
                counters.insert(attr.clone(), count);
            }
        }
    }

    Ok(HourlyBucket { hour, counters })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(
        hour: &str,
        counters: &[(&str, &str)],
    ) -> HashMap<String, AttributeValue> {
        let mut map = HashMap::new();
        map.insert(
            PARTITION_KEY_ATTR.to_string(),
            AttributeValue::S("CAM05#2025-03-07".to_string()),
        );
        map.insert(HOUR_ATTR.to_string(), AttributeValue::N(hour.to_string()));
        for (attr, n) in counters {
            map.insert(attr.to_string(), AttributeValue::N(n.to_string()));
        }
        map
    }

    #[test]
    fn test_decode_bucket() {
        let bucket = decode_bucket(&item(
            "14",
            &[("total_count", "7"), ("total_women", "4"), ("women_age_18_24", "2")],
        ))
        .unwrap();
        assert_eq!(bucket.hour, 14);
        assert_eq!(bucket.counter("total_count"), 7);
        assert_eq!(bucket.counter("total_women"), 4);
        assert_eq!(bucket.counter("women_age_18_24"), 2);
        assert_eq!(bucket.counter("total_men"), 0);
        assert!(!bucket.counters.contains_key(PARTITION_KEY_ATTR));
    }

    #[test]
    fn test_decode_bucket_missing_hour() {
        let mut record = item("9", &[]);
        record.remove(HOUR_ATTR);
        assert!(matches!(
            decode_bucket(&record),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_decode_bucket_skips_non_numeric() {
        let mut record = item("3", &[("total_count", "1")]);
        record.insert("note".to_string(), AttributeValue::S("manual".to_string()));
        let bucket = decode_bucket(&record).unwrap();
        assert_eq!(bucket.counter("total_count"), 1);
        assert!(!bucket.counters.contains_key("note"));
    }
}
