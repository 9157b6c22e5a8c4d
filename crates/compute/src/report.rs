//! Risk-report view helpers: which columns to show and how many rows.

use catalog::{SortOrder, sort_table};
use formats::{Record, Table};

pub const MAX_ROWS: usize = 200;

pub const DISPLAY_COLUMNS: [&str; 6] = [
    "vessel_name",
    "flag",
    "gear_type",
    "composite_risk_score",
    "total_violations",
    "violation_types",
];

/// Display columns the table actually has, in display order.
pub fn visible_headers(table: &Table) -> Vec<String> {
    DISPLAY_COLUMNS
        .iter()
        .filter(|c| table.has_column(c))
        .map(|c| c.to_string())
        .collect()
}

/// Sort by `column` (if any), then keep the first `limit` rows.
pub fn top_rows(table: Table, column: Option<&str>, order: SortOrder, limit: usize) -> Vec<Record> {
    let mut records = sort_table(table, column, order).records;
    records.truncate(limit);
    records
}

#[cfg(test)]
mod tests {
    use super::{MAX_ROWS, top_rows, visible_headers};
    use catalog::SortOrder;
    use formats::parse_table;
    use pretty_assertions::assert_eq;

    #[test]
    fn visible_headers_follow_display_order() {
        let table = parse_table("mmsi,flag,vessel_name,risk_category\n1,PAN,A,HIGH\n").unwrap();
        assert_eq!(visible_headers(&table), vec!["vessel_name", "flag"]);
    }

    #[test]
    fn rows_are_sorted_before_the_limit() {
        let mut text = String::from("vessel_name,composite_risk_score\n");
        for i in 0..250 {
            text.push_str(&format!("v{i},{i}\n"));
        }
        let table = parse_table(&text).unwrap();

        let rows = top_rows(table.clone(), Some("composite_risk_score"), SortOrder::Desc, MAX_ROWS);
        assert_eq!(rows.len(), MAX_ROWS);
        assert_eq!(rows[0]["vessel_name"], "v249");
        assert_eq!(rows[MAX_ROWS - 1]["vessel_name"], "v50");

        let unsorted = top_rows(table, None, SortOrder::Asc, 3);
        let names: Vec<_> = unsorted.iter().map(|r| r["vessel_name"].as_str()).collect();
        assert_eq!(names, vec!["v0", "v1", "v2"]);
    }
}
