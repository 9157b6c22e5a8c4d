//! Per-vessel deep-dive tables.
//!
//! A deep dive is up to four tables sharing a base name:
//! `<base>_deep_dive_{identity,visits,violations,dark_events}.csv`. Files that
//! do not match that pattern exactly are ignored, and a part that fails to
//! load is skipped on its own without failing the index.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use formats::Record;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::store::TabularStore;

const DEEP_DIVE_MARKER: &str = "_deep_dive_";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailPart {
    Identity,
    Visits,
    Violations,
    DarkEvents,
}

impl DetailPart {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "identity" => Some(DetailPart::Identity),
            "visits" => Some(DetailPart::Visits),
            "violations" => Some(DetailPart::Violations),
            "dark_events" => Some(DetailPart::DarkEvents),
            _ => None,
        }
    }
}

/// Split a deep-dive file name into its base name and part.
///
/// Matching is case-insensitive; the returned base keeps its original case.
pub fn match_detail_file(name: &str) -> Option<(&str, DetailPart)> {
    let lower = name.to_ascii_lowercase();
    let stem_len = lower.strip_suffix(".csv")?.len();
    let marker_at = lower[..stem_len].rfind(DEEP_DIVE_MARKER)?;
    if marker_at == 0 {
        return None;
    }
    let part = DetailPart::from_suffix(&lower[marker_at + DEEP_DIVE_MARKER.len()..stem_len])?;
    Some((&name[..marker_at], part))
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDive {
    pub identity: Option<Record>,
    pub visits: Vec<Record>,
    pub violations: Vec<Record>,
    pub dark_events: Vec<Record>,
}

impl DeepDive {
    pub fn identity_field(&self, column: &str) -> Option<&str> {
        self.identity
            .as_ref()
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Lowercase ASCII letters and digits only; everything else is dropped.
pub fn normalize_vessel_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Deep dives indexed by normalized vessel name and by MMSI.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailIndex {
    dives: Vec<DeepDive>,
    by_name: BTreeMap<String, usize>,
    by_mmsi: BTreeMap<String, usize>,
}

impl DetailIndex {
    pub fn len(&self) -> usize {
        self.dives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dives.is_empty()
    }

    /// Add a deep dive under its normalized name and MMSI. A key that is
    /// already taken keeps pointing at the earlier dive.
    pub fn insert(&mut self, base: &str, dive: DeepDive) {
        let idx = self.dives.len();
        let name_key =
            normalize_vessel_name(dive.identity_field("vessel_name").unwrap_or(base));
        let mmsi_key = dive.identity_field("mmsi").map(|m| m.trim().to_string());

        if !name_key.is_empty() {
            claim(&mut self.by_name, name_key, idx, base, "vessel name");
        }
        if let Some(mmsi) = mmsi_key {
            claim(&mut self.by_mmsi, mmsi, idx, base, "mmsi");
        }
        self.dives.push(dive);
    }

    /// Look a vessel up by MMSI first, then by name.
    pub fn find(&self, mmsi: Option<&str>, name: Option<&str>) -> Option<&DeepDive> {
        let by_mmsi = mmsi
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .and_then(|m| self.by_mmsi.get(m));
        let by_name = || {
            name.map(normalize_vessel_name)
                .filter(|n| !n.is_empty())
                .and_then(|n| self.by_name.get(&n))
        };
        by_mmsi
            .or_else(by_name)
            .and_then(|&idx| self.dives.get(idx))
    }
}

fn claim(keys: &mut BTreeMap<String, usize>, key: String, idx: usize, base: &str, kind: &str) {
    match keys.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(idx);
        }
        Entry::Occupied(slot) => {
            warn!(
                base,
                key = %slot.key(),
                kind,
                "duplicate deep-dive key; keeping the earlier vessel"
            );
        }
    }
}

/// Build the deep-dive index from every matching file in `dataset`.
pub async fn load_detail_index(
    store: &TabularStore,
    dataset: &str,
) -> Result<DetailIndex, CatalogError> {
    let mut groups: BTreeMap<String, BTreeMap<DetailPart, String>> = BTreeMap::new();
    for file in store.list(dataset).await? {
        let Some((base, part)) = match_detail_file(&file) else {
            debug!(dataset, file = %file, "not a deep-dive file; skipped");
            continue;
        };
        groups
            .entry(base.to_string())
            .or_default()
            .insert(part, file.clone());
    }

    let mut index = DetailIndex::default();
    for (base, parts) in groups {
        let loads = parts.iter().map(|(part, file)| async move {
            match store.load(dataset, file).await {
                Ok(table) => Some((*part, table.records)),
                Err(err) => {
                    warn!(
                        dataset,
                        file = %file,
                        error = %err,
                        "skipping unreadable deep-dive part"
                    );
                    None
                }
            }
        });

        let mut dive = DeepDive::default();
        for (part, records) in join_all(loads).await.into_iter().flatten() {
            match part {
                DetailPart::Identity => dive.identity = records.into_iter().next(),
                DetailPart::Visits => dive.visits = records,
                DetailPart::Violations => dive.violations = records,
                DetailPart::DarkEvents => dive.dark_events = records,
            }
        }
        index.insert(&base, dive);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::{
        DeepDive, DetailIndex, DetailPart, load_detail_index, match_detail_file,
        normalize_vessel_name,
    };
    use crate::store::{TabularStore, VESSEL_DETAILS};
    use formats::Record;
    use std::fs;

    fn dive(name: &str, mmsi: &str, flag: &str) -> DeepDive {
        let identity: Record = [("vessel_name", name), ("mmsi", mmsi), ("flag", flag)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DeepDive {
            identity: Some(identity),
            ..DeepDive::default()
        }
    }

    #[test]
    fn matches_only_the_strict_pattern() {
        assert_eq!(
            match_detail_file("Sea_Star_deep_dive_identity.csv"),
            Some(("Sea_Star", DetailPart::Identity))
        );
        assert_eq!(
            match_detail_file("x_DEEP_DIVE_Dark_Events.CSV"),
            Some(("x", DetailPart::DarkEvents))
        );
        assert_eq!(match_detail_file("x_deep_dive_summary.csv"), None);
        assert_eq!(match_detail_file("_deep_dive_visits.csv"), None);
        assert_eq!(match_detail_file("x_deep_dive_visits.csv.bak"), None);
        assert_eq!(match_detail_file("report.csv"), None);
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_vessel_name("Sea Star-II"), "seastarii");
        assert_eq!(normalize_vessel_name("  "), "");
    }

    #[test]
    fn colliding_keys_keep_the_first_dive() {
        let mut index = DetailIndex::default();
        index.insert("sea_star", dive("Sea Star", "111", "NOR"));
        index.insert("sea_star_2", dive("SEA-STAR", "222", "ESP"));
        index.insert("other", dive("Other", "111", "PAN"));
        assert_eq!(index.len(), 3);

        let by_name = index.find(None, Some("sea star")).unwrap();
        assert_eq!(by_name.identity_field("flag"), Some("NOR"));
        let by_mmsi = index.find(Some("111"), None).unwrap();
        assert_eq!(by_mmsi.identity_field("flag"), Some("NOR"));

        // Keys that did not collide still resolve to their own dive.
        assert_eq!(index.find(Some("222"), None).unwrap().identity_field("flag"), Some("ESP"));
        assert_eq!(index.find(None, Some("other")).unwrap().identity_field("flag"), Some("PAN"));
    }

    #[tokio::test]
    async fn indexes_by_name_and_mmsi_and_skips_bad_parts() {
        let dir = tempfile::tempdir().unwrap();
        let details = dir.path().join(VESSEL_DETAILS);
        fs::create_dir_all(&details).unwrap();
        fs::write(
            details.join("sea_star_deep_dive_identity.csv"),
            "vessel_name,mmsi,flag\nSea Star,123456789,NOR\n",
        )
        .unwrap();
        fs::write(
            details.join("sea_star_deep_dive_visits.csv"),
            "duration_hours\n2\n3\n",
        )
        .unwrap();
        // Invalid UTF-8 cannot be read as text: this part alone is skipped.
        fs::write(details.join("sea_star_deep_dive_violations.csv"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(details.join("unrelated.csv"), "a\n1\n").unwrap();

        let store = TabularStore::new(dir.path());
        let index = load_detail_index(&store, VESSEL_DETAILS).await.unwrap();
        assert_eq!(index.len(), 1);

        let by_mmsi = index.find(Some("123456789"), None).unwrap();
        assert_eq!(by_mmsi.visits.len(), 2);
        assert!(by_mmsi.violations.is_empty());

        let by_name = index.find(Some("000"), Some("SEA-STAR")).unwrap();
        assert_eq!(by_name.identity_field("flag"), Some("NOR"));
        assert!(index.find(None, Some("other")).is_none());
    }
}
