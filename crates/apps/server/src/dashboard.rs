//! Everything the map/table dashboard renders, in one response.

use axum::extract::{Query, State};
use axum::Json;
use catalog::{summarize_numeric, NumericSummary, DEFAULT_SUMMARY_COLUMNS, MPA_REPORT};
use compute::{
    breakdown_by_column, breakdown_multi_valued, top_rows, visible_headers, Breakdown,
    RiskSummary, MAX_ROWS,
};
use formats::{rings_from_str, Record, Ring};
use layers::{paths_center, project_equirectangular, project_fitted, ProjectedPath, Viewport};
use serde::Serialize;

use crate::datasets::TableQuery;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdowns {
    pub by_flag: Vec<Breakdown>,
    pub by_gear_type: Vec<Breakdown>,
    pub by_risk_category: Vec<Breakdown>,
    pub by_violation_type: Vec<Breakdown>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub viewport: Viewport,
    pub region_paths: Vec<ProjectedPath>,
    pub global_paths: Vec<ProjectedPath>,
    pub center: [f64; 2],
    pub headers: Vec<String>,
    pub visible_headers: Vec<String>,
    pub rows: Vec<Record>,
    pub risk_summary: RiskSummary,
    pub numeric_summary: Vec<NumericSummary>,
    pub breakdowns: Breakdowns,
}

/// Boundary rings of the monitored region. Any read or parse failure fails
/// the whole map rather than drawing partial geometry.
pub async fn load_region_rings(state: &AppState) -> Result<Vec<Ring>, ApiError> {
    let path = &state.config.region_geojson;
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::Geometry(format!("failed to read {}: {e}", path.display())))?;
    rings_from_str(&text)
        .map_err(|e| ApiError::Geometry(format!("invalid boundary {}: {e}", path.display())))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let (report, rings) = tokio::join!(
        state.store.load(MPA_REPORT, &state.config.report_file),
        load_region_rings(&state)
    );
    let report = report?;
    let rings = rings?;

    let viewport = Viewport::default();
    let region_paths = project_fitted(&rings, viewport);
    let global_paths = project_equirectangular(&rings, viewport);
    let center = paths_center(&region_paths, viewport);

    let records = &report.records;
    let breakdowns = Breakdowns {
        by_flag: breakdown_by_column(records, "flag"),
        by_gear_type: breakdown_by_column(records, "gear_type"),
        by_risk_category: breakdown_by_column(records, "risk_category"),
        by_violation_type: breakdown_multi_valued(records, "violation_types"),
    };
    let risk_summary = RiskSummary::from_records(records);
    let numeric_summary = summarize_numeric(&report, &report.headers, DEFAULT_SUMMARY_COLUMNS);
    let visible = visible_headers(&report);
    let headers = report.headers.clone();
    let rows = top_rows(report, query.sort_column(), query.sort_order(), MAX_ROWS);

    Ok(Json(Dashboard {
        viewport,
        region_paths,
        global_paths,
        center,
        headers,
        visible_headers: visible,
        rows,
        risk_summary,
        numeric_summary,
        breakdowns,
    }))
}
