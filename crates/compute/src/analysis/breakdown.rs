//! Grouped counts for chart rendering.
//!
//! Groups are ordered by count, descending. Groups with equal counts keep the
//! order in which their name was first seen.

use std::collections::HashMap;

use formats::Record;
use serde::Serialize;

/// Group name used for blank values.
pub const UNKNOWN_GROUP: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub name: String,
    pub count: usize,
}

/// Count occurrences of each name. Names are trimmed; blank ones become
/// [`UNKNOWN_GROUP`].
pub fn tally<I, S>(names: I) -> Vec<Breakdown>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: Vec<Breakdown> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for name in names {
        let trimmed = name.as_ref().trim();
        let key = if trimmed.is_empty() {
            UNKNOWN_GROUP
        } else {
            trimmed
        };
        match index.get(key) {
            Some(&slot) => groups[slot].count += 1,
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push(Breakdown {
                    name: key.to_string(),
                    count: 1,
                });
            }
        }
    }

    // `sort_by` is stable, which preserves first-seen order among ties.
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// One group per distinct value of `column`.
pub fn breakdown_by_column<'a, I>(records: I, column: &str) -> Vec<Breakdown>
where
    I: IntoIterator<Item = &'a Record>,
{
    tally(
        records
            .into_iter()
            .map(|r| r.get(column).map(String::as_str).unwrap_or("")),
    )
}

/// Like [`breakdown_by_column`], but each cell is a comma-separated list and
/// every listed value counts once. Empty list items are ignored, so a blank
/// cell contributes nothing.
pub fn breakdown_multi_valued<'a, I>(records: I, column: &str) -> Vec<Breakdown>
where
    I: IntoIterator<Item = &'a Record>,
{
    tally(
        records
            .into_iter()
            .filter_map(|r| r.get(column))
            .flat_map(|cell| cell.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::{Breakdown, breakdown_by_column, breakdown_multi_valued, tally};
    use formats::Record;
    use pretty_assertions::assert_eq;

    fn b(name: &str, count: usize) -> Breakdown {
        Breakdown {
            name: name.to_string(),
            count,
        }
    }

    fn rows(column: &str, values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|v| Record::from([(column.to_string(), v.to_string())]))
            .collect()
    }

    #[test]
    fn sorted_descending_with_first_seen_tie_break() {
        let groups = tally(["PAN", "ESP", "LBR", "ESP", "PAN", "CHN"]);
        assert_eq!(
            groups,
            vec![b("PAN", 2), b("ESP", 2), b("LBR", 1), b("CHN", 1)]
        );
    }

    #[test]
    fn blank_values_group_as_unknown() {
        let records = rows("flag", &["", "NOR", "  "]);
        assert_eq!(
            breakdown_by_column(&records, "flag"),
            vec![b("Unknown", 2), b("NOR", 1)]
        );
        assert_eq!(
            breakdown_by_column(&records, "missing"),
            vec![b("Unknown", 3)]
        );
    }

    #[test]
    fn multi_valued_cells_split_on_commas() {
        let records = rows(
            "violation_types",
            &["fishing, loitering", "loitering", "", "transshipment,fishing,"],
        );
        assert_eq!(
            breakdown_multi_valued(&records, "violation_types"),
            vec![b("fishing", 2), b("loitering", 2), b("transshipment", 1)]
        );
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(tally(Vec::<String>::new()).is_empty());
    }
}
