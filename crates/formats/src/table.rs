//! Delimited text tables.
//!
//! The first non-blank line is the header row; every following non-blank
//! line is a record. Quoting follows RFC 4180: a quoted field may contain
//! commas and line breaks, and a doubled quote inside it is one literal
//! quote character.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// One row, keyed by header name.
///
/// Every record in a [`Table`] carries exactly the table's header set; cells
/// missing from the source line are empty strings and surplus cells are
/// dropped.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Cell values of `column` in record order; absent cells read as `""`.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.records
            .iter()
            .map(move |r| r.get(column).map(String::as_str).unwrap_or(""))
    }

    /// Build a record for this table from positional values.
    pub fn record_from_values<S: AsRef<str>>(&self, values: &[S]) -> Record {
        record_from_values(&self.headers, values)
    }
}

fn record_from_values<S: AsRef<str>>(headers: &[String], values: &[S]) -> Record {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let v = values.get(i).map(|s| s.as_ref().to_string()).unwrap_or_default();
            (h.clone(), v)
        })
        .collect()
}

fn is_blank_line(record: &::csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty()) && record.len() <= 1
}

pub fn parse_table(text: &str) -> Result<Table, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut records: Vec<Record> = Vec::new();

    for row in reader.records() {
        let row = row?;
        if is_blank_line(&row) {
            continue;
        }
        match &headers {
            None => {
                headers = Some(row.iter().map(|h| h.trim().to_string()).collect());
            }
            Some(h) => {
                let values: Vec<&str> = row.iter().collect();
                records.push(record_from_values(h, &values));
            }
        }
    }

    Ok(Table {
        headers: headers.unwrap_or_default(),
        records,
    })
}

/// Serialize a table back to delimited text, quoting only where needed.
pub fn write_table(table: &Table) -> Result<String, FormatError> {
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    if !table.headers.is_empty() {
        writer.write_record(&table.headers)?;
    }
    for record in &table.records {
        writer.write_record(
            table
                .headers
                .iter()
                .map(|h| record.get(h).map(String::as_str).unwrap_or("")),
        )?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| FormatError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| FormatError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{Table, parse_table, write_table};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_header_and_records() {
        let t = parse_table("name, flag ,score\nAlpha,NO,3\r\nBeta,IS,10\n").unwrap();
        assert_eq!(t.headers, vec!["name", "flag", "score"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.records[1]["name"], "Beta");
        assert_eq!(t.records[1]["score"], "10");
    }

    #[test]
    fn quoted_fields_keep_commas_quotes_and_newlines() {
        let t = parse_table("a,b\n\"x, y\",\"say \"\"hi\"\"\"\n\"multi\nline\",z\n").unwrap();
        assert_eq!(t.records.len(), 2);
        assert_eq!(t.records[0]["a"], "x, y");
        assert_eq!(t.records[0]["b"], "say \"hi\"");
        assert_eq!(t.records[1]["a"], "multi\nline");
    }

    #[test]
    fn blank_lines_are_skipped_and_short_rows_padded() {
        let t = parse_table("\n\na,b,c\n\n1\n   \n1,2,3,4\n").unwrap();
        assert_eq!(t.headers, vec!["a", "b", "c"]);
        assert_eq!(t.records.len(), 2);
        assert_eq!(t.records[0]["b"], "");
        assert_eq!(t.records[0]["c"], "");
        // Surplus cells never add keys beyond the header set.
        assert_eq!(t.records[1].len(), 3);
    }

    #[test]
    fn empty_input_is_empty_table() {
        assert_eq!(parse_table("").unwrap(), Table::default());
        assert_eq!(parse_table("\n \n").unwrap(), Table::default());
    }

    #[test]
    fn write_then_parse_preserves_records() {
        let mut t = Table::new(vec!["id".into(), "note".into()], Vec::new());
        t.records.push(t.record_from_values(&["1", "plain"]));
        t.records.push(t.record_from_values(&["2", "comma, inside"]));
        t.records.push(t.record_from_values(&["3", "quote \" inside"]));
        t.records.push(t.record_from_values(&["4", "line\nbreak"]));
        t.records.push(t.record_from_values(&["5", ""]));

        let text = write_table(&t).unwrap();
        let back = parse_table(&text).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn column_reads_in_record_order() {
        let t = parse_table("k\nb\na\n").unwrap();
        assert_eq!(t.column("k").collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(t.column("missing").collect::<Vec<_>>(), vec!["", ""]);
    }
}
