use axum::extract::{Query, State};
use axum::Json;
use catalog::{load_detail_index, normalize_vessel_name, MPA_REPORT, VESSEL_DETAILS};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use compute::{tally, Breakdown, VesselProfile};
use formats::Record;
use serde::Deserialize;
use streaming::{DatasetGroups, TimeWindow};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::AppState;

pub const MISSING_WINDOW: &str = "Missing startTime or endTime query parameters";
pub const MISSING_TOKEN: &str = "Missing GFW_API_TOKEN";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselsQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Check the requested window; the raw strings are kept as the cache key and
/// forwarded upstream unchanged.
pub fn validate_window(query: &VesselsQuery) -> Result<TimeWindow, ApiError> {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let (Some(start), Some(end)) = (present(&query.start_time), present(&query.end_time)) else {
        return Err(ApiError::Validation(MISSING_WINDOW.to_string()));
    };

    let (Some(from), Some(to)) = (parse_instant(&start), parse_instant(&end)) else {
        return Err(ApiError::Validation(format!(
            "Invalid startTime or endTime: expected RFC 3339 or YYYY-MM-DD, got {start:?} and {end:?}"
        )));
    };
    if from > to {
        return Err(ApiError::Validation(
            "startTime must not be after endTime".to_string(),
        ));
    }
    Ok(TimeWindow::new(start, end))
}

/// Vessels present in the monitored region during the window, per dataset.
pub async fn get_vessels(
    State(state): State<AppState>,
    Query(query): Query<VesselsQuery>,
) -> Result<Json<DatasetGroups>, ApiError> {
    let window = validate_window(&query)?;

    let Some(presence) = state.presence.as_ref() else {
        error!("GFW_API_TOKEN is not configured; presence queries are disabled");
        return Err(ApiError::Config(MISSING_TOKEN.to_string()));
    };

    let groups = presence.vessels(window).await?;
    Ok(Json(groups.as_ref().clone()))
}

/// Count vessels per flag state. A vessel listed by several datasets counts
/// once, under the flag of its first listing.
pub fn flag_breakdown(groups: &DatasetGroups) -> Vec<Breakdown> {
    let mut seen = HashSet::new();
    tally(
        groups
            .values()
            .flatten()
            .filter(|v| seen.insert(v.id.as_str()))
            .map(|v| v.flag.as_str()),
    )
}

/// Presence vessels for the window grouped by flag. Shares the cached
/// upstream result with `/api/vessels`.
pub async fn get_vessel_flags(
    State(state): State<AppState>,
    Query(query): Query<VesselsQuery>,
) -> Result<Json<Vec<Breakdown>>, ApiError> {
    let window = validate_window(&query)?;

    let Some(presence) = state.presence.as_ref() else {
        error!("GFW_API_TOKEN is not configured; presence queries are disabled");
        return Err(ApiError::Config(MISSING_TOKEN.to_string()));
    };

    let groups = presence.vessels(window).await?;
    Ok(Json(flag_breakdown(&groups)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub mmsi: Option<String>,
    pub name: Option<String>,
}

fn find_report_row<'a>(
    rows: &'a [Record],
    mmsi: Option<&str>,
    name: Option<&str>,
) -> Option<&'a Record> {
    let by_mmsi = mmsi.and_then(|m| {
        rows.iter()
            .find(|r| r.get("mmsi").is_some_and(|v| v.trim() == m))
    });
    by_mmsi.or_else(|| {
        let wanted = normalize_vessel_name(name?);
        if wanted.is_empty() {
            return None;
        }
        rows.iter().find(|r| {
            r.get("vessel_name")
                .is_some_and(|v| normalize_vessel_name(v) == wanted)
        })
    })
}

/// Risk-report row for one vessel, enriched with its deep-dive tables when
/// they exist.
pub async fn get_vessel_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<VesselProfile>, ApiError> {
    let mmsi = query.mmsi.as_deref().map(str::trim).filter(|m| !m.is_empty());
    let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    if mmsi.is_none() && name.is_none() {
        return Err(ApiError::Validation(
            "Missing mmsi or name query parameter".to_string(),
        ));
    }

    let report = state.store.load(MPA_REPORT, &state.config.report_file).await?;
    let Some(row) = find_report_row(&report.records, mmsi, name) else {
        return Err(ApiError::NotFound("Vessel not found in report".to_string()));
    };

    let index = match load_detail_index(&state.store, VESSEL_DETAILS).await {
        Ok(index) => Some(index),
        Err(err) => {
            warn!(error = %err, "deep-dive details unavailable; using report row only");
            None
        }
    };
    let dive = index.as_ref().and_then(|idx| {
        idx.find(
            row.get("mmsi").map(String::as_str),
            row.get("vessel_name").map(String::as_str),
        )
    });

    Ok(Json(VesselProfile::build(row, dive)))
}
