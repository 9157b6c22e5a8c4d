//! Type-aware ordering of table cells.
//!
//! Cells that parse fully as numbers compare numerically and sort ahead of
//! every other cell. The rest compare in natural order, so `"item9"` sorts
//! before `"item10"`. Keeping the two groups apart makes the comparison a
//! total order even when a column mixes `1.5` with `1.7x`.
//! All sorts here are stable: records with equal keys keep their original
//! relative order, in both directions.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use formats::{Record, Table, parse_number};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `"desc"` (case-insensitive) is ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Sort key of one cell.
#[derive(Debug, Clone, Copy)]
enum CellKey<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> CellKey<'a> {
    fn of(raw: &'a str) -> Self {
        match parse_number(raw) {
            // `+ 0.0` folds -0 into 0 so the two compare equal.
            Some(n) => CellKey::Number(n + 0.0),
            None => CellKey::Text(raw),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellKey::Number(x), CellKey::Number(y)) => x.total_cmp(y),
            (CellKey::Number(_), CellKey::Text(_)) => Ordering::Less,
            (CellKey::Text(_), CellKey::Number(_)) => Ordering::Greater,
            (CellKey::Text(a), CellKey::Text(b)) => natural_cmp(a, b),
        }
    }
}

pub fn compare_values(a: &str, b: &str) -> Ordering {
    CellKey::of(a).compare(&CellKey::of(b))
}

/// Natural-order string comparison.
///
/// Digit runs compare by numeric value (of any length), other characters
/// case-insensitively. Strings that are equal under those rules fall back to
/// plain byte order so the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        let (ca, cb) = match (ai.peek(), bi.peek()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&ca), Some(&cb)) => (ca, cb),
        };

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let da = take_digits(&mut ai);
            let db = take_digits(&mut bi);
            let ord = cmp_digit_runs(&da, &db);
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }

        let ord = fold_case(ca).cmp(&fold_case(cb));
        if ord != Ordering::Equal {
            return ord;
        }
        ai.next();
        bi.next();
    }

    a.cmp(b)
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

pub fn sort_records(records: &mut [Record], column: &str, order: SortOrder) {
    records.sort_by(|ra, rb| {
        let a = CellKey::of(ra.get(column).map(String::as_str).unwrap_or(""));
        let b = CellKey::of(rb.get(column).map(String::as_str).unwrap_or(""));
        order.apply(a.compare(&b))
    });
}

/// Sort a table's records by `column`.
///
/// No column, or a column the table does not declare, leaves the table
/// unchanged.
pub fn sort_table(mut table: Table, column: Option<&str>, order: SortOrder) -> Table {
    let Some(column) = column.filter(|c| !c.is_empty()) else {
        return table;
    };
    if !table.has_column(column) {
        return table;
    }
    sort_records(&mut table.records, column, order);
    table
}

#[cfg(test)]
mod tests {
    use super::{SortOrder, compare_values, natural_cmp, sort_records, sort_table};
    use formats::{Record, parse_table};
    use std::cmp::Ordering;

    fn names(t: &formats::Table, col: &str) -> Vec<String> {
        t.column(col).map(str::to_string).collect()
    }

    #[test]
    fn numeric_values_compare_numerically() {
        assert_eq!(compare_values("9", "10"), Ordering::Less);
        assert_eq!(compare_values("-2.5", "1e1"), Ordering::Less);
        assert_eq!(compare_values(" 3 ", "3"), Ordering::Equal);
    }

    #[test]
    fn mixed_values_use_natural_order() {
        assert_eq!(natural_cmp("item9", "item10"), Ordering::Less);
        assert_eq!(compare_values("item9", "item10"), Ordering::Less);
        assert_eq!(natural_cmp("Alpha", "beta"), Ordering::Less);
        assert_eq!(natural_cmp("v2x", "v2y"), Ordering::Less);
        assert_eq!(natural_cmp("v", "v1"), Ordering::Less);
        assert_eq!(natural_cmp("x00000000000000000000001", "x2"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn sorts_both_directions() {
        let t = parse_table("name,score\na,10\nb,9\nc,100\n").unwrap();
        let asc = sort_table(t.clone(), Some("score"), SortOrder::Asc);
        assert_eq!(names(&asc, "name"), vec!["b", "a", "c"]);
        let desc = sort_table(t, Some("score"), SortOrder::Desc);
        assert_eq!(names(&desc, "name"), vec!["c", "a", "b"]);
    }

    #[test]
    fn sorting_sorted_table_is_identity() {
        let t = parse_table("k\nitem1\nitem2\nitem10\nzeta\n").unwrap();
        let once = sort_table(t, Some("k"), SortOrder::Asc);
        let twice = sort_table(once.clone(), Some("k"), SortOrder::Asc);
        assert_eq!(once, twice);
        assert_eq!(names(&once, "k"), vec!["item1", "item2", "item10", "zeta"]);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let t = parse_table("id,tier\nfirst,1\nsecond,2\nthird,1\nfourth,2\n").unwrap();
        let asc = sort_table(t.clone(), Some("tier"), SortOrder::Asc);
        assert_eq!(names(&asc, "id"), vec!["first", "third", "second", "fourth"]);
        let desc = sort_table(t, Some("tier"), SortOrder::Desc);
        assert_eq!(names(&desc, "id"), vec!["second", "fourth", "first", "third"]);
    }

    #[test]
    fn absent_column_is_a_no_op() {
        let t = parse_table("k\nb\na\n").unwrap();
        assert_eq!(sort_table(t.clone(), None, SortOrder::Asc), t);
        assert_eq!(sort_table(t.clone(), Some(""), SortOrder::Desc), t);
        assert_eq!(sort_table(t.clone(), Some("missing"), SortOrder::Asc), t);
    }

    #[test]
    fn order_parse_defaults_to_ascending() {
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Asc);
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
    }

    #[test]
    fn numbers_sort_ahead_of_text() {
        assert_eq!(compare_values("100", "1.7x"), Ordering::Less);
        assert_eq!(compare_values("item", "-3"), Ordering::Greater);
        assert_eq!(compare_values("-0", "0"), Ordering::Equal);

        // Decimals next to numeric-prefixed text stay transitive.
        assert_eq!(compare_values("1.5", "1.10"), Ordering::Greater);
        assert_eq!(compare_values("1.5", "1.7x"), Ordering::Less);
        assert_eq!(compare_values("1.10", "1.7x"), Ordering::Less);
    }

    fn mixed_column(rng: &mut fastrand::Rng, len: usize) -> Vec<Record> {
        (0..len)
            .map(|_| {
                let n = rng.u32(0..30);
                let cell = match rng.u8(0..5) {
                    0 => format!("1.{n}"),
                    1 => format!("1.{n}x"),
                    2 => format!("-{n}"),
                    3 => format!("-{n}x"),
                    _ => String::new(),
                };
                Record::from([("v".to_string(), cell)])
            })
            .collect()
    }

    #[test]
    fn mixed_columns_sort_consistently() {
        for seed in 0..400 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let len = rng.usize(2..60);
            let mut records = mixed_column(&mut rng, len);
            for order in [SortOrder::Asc, SortOrder::Desc] {
                sort_records(&mut records, "v", order);
                let once = records.clone();
                sort_records(&mut records, "v", order);
                assert_eq!(records, once, "seed {seed}, {order:?}");
                for pair in records.windows(2) {
                    let ord = compare_values(&pair[0]["v"], &pair[1]["v"]);
                    let expected = match order {
                        SortOrder::Asc => ord != Ordering::Greater,
                        SortOrder::Desc => ord != Ordering::Less,
                    };
                    assert!(expected, "seed {seed}: {:?} before {:?}", pair[0], pair[1]);
                }
            }
        }
    }
}
