//! Presence payload types and the cleaning step applied to every upstream
//! response before it is cached.
//!
//! Upstream shape:
//!
//! ```json
//! { "entries": [ { "<dataset>": [ { "vesselId": "...", ... }, ... ] }, ... ] }
//! ```
//!
//! Anything that does not fit that shape (a missing `entries`, a dataset
//! value that is not an array, a record without an id) is skipped.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requested observation window; also the presence cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `"<start>,<end>"`, the upstream `date-range` form.
    pub fn date_range(&self) -> String {
        format!("{},{}", self.start, self.end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub id: String,
    pub name: String,
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmsi: Option<String>,
}

/// Dataset key to vessels, each id at most once per dataset.
pub type DatasetGroups = BTreeMap<String, Vec<Vessel>>;

/// Non-empty string, or a number rendered as text.
fn text_field(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(record: &Value, field: &str) -> Option<f64> {
    match record.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

impl Vessel {
    /// Normalize one raw upstream record. `None` when it has no vessel id.
    pub fn from_raw(record: &Value) -> Option<Self> {
        let id = text_field(record, "vesselId")?;
        let mmsi = text_field(record, "mmsi");
        let name = text_field(record, "shipName")
            .or_else(|| mmsi.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Some(Vessel {
            id,
            name,
            flag: text_field(record, "flag").unwrap_or_else(|| UNKNOWN.to_string()),
            hours: number_field(record, "hours"),
            vessel_type: text_field(record, "vesselType")
                .or_else(|| text_field(record, "geartype")),
            mmsi,
        })
    }
}

/// Group raw records by dataset, keeping the first record seen for each
/// vessel id within a dataset.
pub fn clean_response(payload: &Value) -> DatasetGroups {
    let mut groups = DatasetGroups::new();
    let mut seen: BTreeMap<String, HashSet<String>> = BTreeMap::new();

    let entries = payload
        .get("entries")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for entry in entries {
        let Some(datasets) = entry.as_object() else {
            continue;
        };
        for (dataset, records) in datasets {
            let Some(records) = records.as_array() else {
                continue;
            };
            let vessels = groups.entry(dataset.clone()).or_default();
            let ids = seen.entry(dataset.clone()).or_default();
            for vessel in records.iter().filter_map(Vessel::from_raw) {
                if ids.insert(vessel.id.clone()) {
                    vessels.push(vessel);
                }
            }
        }
    }
    groups
}
