//! Per-vessel profile assembled from a risk-report row and, when available,
//! the vessel's deep-dive tables.
//!
//! Each metric prefers the value derived from the deep dive and falls back to
//! the matching report column. Counts that are still missing read as zero;
//! averages and maxima stay absent.

use std::collections::BTreeSet;

use catalog::DeepDive;
use formats::{Record, parse_bool, parse_number};
use foundation::Statistics;
use serde::Serialize;

use super::risk::RiskCategory;

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct SeverityCounts {
    pub critical: Option<f64>,
    pub high: Option<f64>,
    pub medium: Option<f64>,
    pub low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselProfile {
    pub vessel_name: Option<String>,
    pub mmsi: Option<String>,
    pub has_deep_dive: bool,
    pub risk_category: RiskCategory,
    pub composite_risk_score: Option<f64>,

    pub flag: Option<String>,
    pub vessel_type: Option<String>,
    pub gear_type: Option<String>,
    pub length_m: Option<String>,

    pub visits: f64,
    pub hours_in_region: f64,
    pub mean_speed_knots: Option<f64>,
    pub max_speed_knots: Option<f64>,
    pub visits_with_fishing: Option<f64>,
    pub visits_with_dark_periods: Option<f64>,

    pub violations: f64,
    pub violation_types: Option<String>,
    pub severity: SeverityCounts,
    /// Only known from a deep dive.
    pub verified_violations: Option<usize>,

    pub dark_events: f64,
    pub dark_hours: f64,
    pub avg_dark_hours: Option<f64>,
}

fn text(record: &Record, column: &str) -> Option<String> {
    record
        .get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn number(record: &Record, column: &str) -> Option<f64> {
    record.get(column).and_then(|v| parse_number(v))
}

/// Numeric column values; unparseable cells count as zero.
fn column_values(records: &[Record], column: &str) -> Vec<f64> {
    records
        .iter()
        .map(|r| number(r, column).unwrap_or(0.0))
        .collect()
}

fn count_where(records: &[Record], pred: impl Fn(&Record) -> bool) -> usize {
    records.iter().filter(|r| pred(r)).count()
}

fn flag_set(record: &Record, column: &str) -> bool {
    record.get(column).is_some_and(|v| parse_bool(v))
}

fn severity_is(record: &Record, level: &str) -> bool {
    record
        .get("severity")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(level))
}

/// Metrics computed from the deep-dive tables alone.
struct DiveMetrics {
    visits: f64,
    hours: f64,
    mean_speed: Option<f64>,
    max_speed: Option<f64>,
    fishing_visits: f64,
    dark_visits: f64,
    violations: f64,
    violation_types: Option<String>,
    severity: SeverityCounts,
    verified: usize,
    dark_events: f64,
    dark_hours: f64,
    avg_dark_hours: Option<f64>,
}

impl DiveMetrics {
    fn compute(dive: &DeepDive) -> Self {
        let durations = column_values(&dive.visits, "duration_hours");
        let avg_speeds = column_values(&dive.visits, "avg_speed_knots");
        let max_speeds = column_values(&dive.visits, "max_speed_knots");
        let gaps = column_values(&dive.dark_events, "gap_duration_hours");

        // Distinct, in first-seen order.
        let mut seen = BTreeSet::new();
        let types: Vec<&str> = dive
            .violations
            .iter()
            .filter_map(|r| r.get("violation_type"))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && seen.insert(*v))
            .collect();

        let severity_count = |level: &str| {
            Some(count_where(&dive.violations, |r| severity_is(r, level)) as f64)
        };
        let dark_hours = Statistics::sum(&gaps);

        DiveMetrics {
            visits: dive.visits.len() as f64,
            hours: Statistics::sum(&durations),
            mean_speed: Statistics::mean(&avg_speeds),
            max_speed: Statistics::min_max(&max_speeds).map(|(_, max)| max),
            fishing_visits: count_where(&dive.visits, |r| flag_set(r, "fishing_detected")) as f64,
            dark_visits: count_where(&dive.visits, |r| flag_set(r, "dark_periods_detected"))
                as f64,
            violations: dive.violations.len() as f64,
            violation_types: (!types.is_empty()).then(|| types.join(", ")),
            severity: SeverityCounts {
                critical: severity_count("CRITICAL"),
                high: severity_count("HIGH"),
                medium: severity_count("MEDIUM"),
                low: severity_count("LOW"),
            },
            verified: count_where(&dive.violations, |r| flag_set(r, "verified")),
            dark_events: dive.dark_events.len() as f64,
            dark_hours,
            avg_dark_hours: (!gaps.is_empty()).then(|| dark_hours / gaps.len() as f64),
        }
    }
}

impl VesselProfile {
    pub fn build(row: &Record, dive: Option<&DeepDive>) -> Self {
        let metrics = dive.map(DiveMetrics::compute);
        let m = metrics.as_ref();

        let identity = |column: &str| {
            dive.and_then(|d| d.identity_field(column))
                .map(|v| v.trim().to_string())
                .or_else(|| text(row, column))
        };

        VesselProfile {
            vessel_name: text(row, "vessel_name"),
            mmsi: text(row, "mmsi"),
            has_deep_dive: dive.is_some(),
            risk_category: RiskCategory::of(row),
            composite_risk_score: number(row, "composite_risk_score"),

            flag: identity("flag"),
            vessel_type: identity("vessel_type"),
            gear_type: identity("gear_type"),
            length_m: identity("length_m"),

            visits: m
                .map(|m| m.visits)
                .or_else(|| number(row, "total_visits"))
                .unwrap_or(0.0),
            hours_in_region: m
                .map(|m| m.hours)
                .or_else(|| number(row, "total_hours_in_mpa"))
                .unwrap_or(0.0),
            mean_speed_knots: m
                .and_then(|m| m.mean_speed)
                .or_else(|| number(row, "mean_speed_knots")),
            max_speed_knots: m
                .and_then(|m| m.max_speed)
                .or_else(|| number(row, "max_speed_knots")),
            visits_with_fishing: m
                .map(|m| m.fishing_visits)
                .or_else(|| number(row, "visits_with_fishing")),
            visits_with_dark_periods: m
                .map(|m| m.dark_visits)
                .or_else(|| number(row, "visits_with_dark_periods")),

            violations: m
                .map(|m| m.violations)
                .or_else(|| number(row, "total_violations"))
                .unwrap_or(0.0),
            violation_types: m
                .and_then(|m| m.violation_types.clone())
                .or_else(|| text(row, "violation_types")),
            severity: m.map(|m| m.severity).unwrap_or_else(|| SeverityCounts {
                critical: number(row, "critical_count"),
                high: number(row, "high_count"),
                medium: number(row, "medium_count"),
                low: number(row, "low_count"),
            }),
            verified_violations: m.map(|m| m.verified),

            dark_events: m
                .map(|m| m.dark_events)
                .or_else(|| number(row, "dark_events"))
                .unwrap_or(0.0),
            dark_hours: m
                .map(|m| m.dark_hours)
                .or_else(|| number(row, "total_dark_hours"))
                .unwrap_or(0.0),
            avg_dark_hours: m
                .and_then(|m| m.avg_dark_hours)
                .or_else(|| number(row, "avg_dark_hours")),
        }
    }
}
