//! Dashboard chart handlers.
//!
//! These endpoints read back the hourly buckets the ingestion path writes.
//! "Today" is the current calendar date in the configured local timezone;
//! each bucket's hour is converted to a UTC instant for the chart's x axis.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::warn;

use clens_models::{counter_attr, AgeBracket, Gender, HourlyBucket};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One chart data point.
#[derive(Debug, Serialize, PartialEq)]
pub struct ChartPoint {
    /// ISO 8601 UTC timestamp of the bucket's hour.
    pub x: String,
    /// Counter value.
    pub y: u64,
}

/// Chart series response.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub result: Vec<ChartPoint>,
}

/// Hourly visitor flow for today, per gender.
pub async fn flow_today(
    State(state): State<AppState>,
    Path(gender): Path<String>,
) -> ApiResult<Json<ChartResponse>> {
    let gender: Gender = gender.parse().map_err(bad_dimension)?;
    let result = today_series(&state, gender.total_attr()).await?;
    Ok(Json(ChartResponse { result }))
}

/// Hourly counts for today, per gender and age bracket.
pub async fn age_breakdown_today(
    State(state): State<AppState>,
    Path((gender, bracket)): Path<(String, String)>,
) -> ApiResult<Json<ChartResponse>> {
    let gender: Gender = gender.parse().map_err(bad_dimension)?;
    let bracket: AgeBracket = bracket.parse().map_err(bad_dimension)?;
    let result = today_series(&state, counter_attr(gender, bracket)).await?;
    Ok(Json(ChartResponse { result }))
}

fn bad_dimension(e: clens_models::DimensionParseError) -> ApiError {
    ApiError::bad_request(e.to_string())
}

/// Query today's buckets and project one counter into chart points.
async fn today_series(state: &AppState, attr: &str) -> ApiResult<Vec<ChartPoint>> {
    let tz = state.config.local_timezone;
    let today = Utc::now().with_timezone(&tz).date_naive();
    let buckets = state.store.query_date(&state.config.location_id, today).await?;
    Ok(series_points(&buckets, today, tz, attr))
}

/// Project one counter out of a day's buckets, dropping zero-valued hours.
fn series_points(buckets: &[HourlyBucket], date: NaiveDate, tz: Tz, attr: &str) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    for bucket in buckets {
        let y = bucket.counter(attr);
        if y == 0 {
            continue;
        }
        match hour_to_utc_timestamp(date, bucket.hour, tz) {
            Some(x) => points.push(ChartPoint { x, y }),
            None => warn!("Bucket hour {} does not exist in timezone {} on {}", bucket.hour, tz, date),
        }
    }
    points
}

/// Interpret an hour of the local day in `tz` and format it as UTC.
///
/// An hour skipped by a DST transition yields `None`; an ambiguous hour
/// resolves to its earlier occurrence.
fn hour_to_utc_timestamp(date: NaiveDate, hour: u32, tz: Tz) -> Option<String> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    let local = naive.and_local_timezone(tz).earliest()?;
    Some(local.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ").to_string())
}
