//! Hourly aggregation bucket keys and records.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Partition key attribute name in the analytics table.
pub const PARTITION_KEY_ATTR: &str = "LocationDate";

/// Sort key attribute name in the analytics table.
pub const HOUR_ATTR: &str = "Hour";

/// Key of one hourly, per-location aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKey {
    pub location_id: String,
    pub date: NaiveDate,
    pub hour: u32,
}

impl BucketKey {
    /// Bucket for the given UTC instant. The ingestion path stamps buckets
    /// in UTC; the dashboard read path maps them back through the
    /// configured local timezone.
    pub fn from_utc(location_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            location_id: location_id.into(),
            date: at.date_naive(),
            hour: at.hour(),
        }
    }

    /// Partition key value: `{location}#{YYYY-MM-DD}`.
    pub fn partition_key(&self) -> String {
        format!(
            "{}#{:04}-{:02}-{:02}",
            self.location_id,
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }
}

/// One hourly bucket as read back from the analytics table.
///
/// Counters are stored flat on the record; absent attributes read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub hour: u32,
    pub counters: HashMap<String, u64>,
}

impl HourlyBucket {
    /// Value of a named counter, zero if the attribute is absent.
    pub fn counter(&self, attr: &str) -> u64 {
        self.counters.get(attr).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_partition_key_format() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap();
        let key = BucketKey::from_utc("CAM05", at);
        assert_eq!(key.partition_key(), "CAM05#2025-03-07");
        assert_eq!(key.hour, 14);
    }

    #[test]
    fn test_partition_key_pads_date() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let key = BucketKey::from_utc("LOBBY", at);
        assert_eq!(key.partition_key(), "LOBBY#2025-01-02");
    }

    #[test]
    fn test_counter_defaults_to_zero() {
        let mut bucket = HourlyBucket { hour: 9, counters: HashMap::new() };
        assert_eq!(bucket.counter("total_count"), 0);
        bucket.counters.insert("total_count".to_string(), 4);
        assert_eq!(bucket.counter("total_count"), 4);
    }
}
