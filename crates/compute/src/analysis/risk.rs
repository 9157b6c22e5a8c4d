use formats::Record;
use serde::{Deserialize, Serialize};

pub const RISK_COLUMN: &str = "risk_category";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl RiskCategory {
    /// Case-insensitive, whitespace-tolerant; anything unrecognized is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => RiskCategory::Critical,
            "HIGH" => RiskCategory::High,
            "MEDIUM" => RiskCategory::Medium,
            "LOW" => RiskCategory::Low,
            _ => RiskCategory::Unknown,
        }
    }

    /// Category of a report row; a missing column reads as `Unknown`.
    pub fn of(record: &Record) -> Self {
        record
            .get(RISK_COLUMN)
            .map(|v| RiskCategory::parse(v))
            .unwrap_or(RiskCategory::Unknown)
    }

    /// Medium and above.
    pub fn is_concerning(self) -> bool {
        matches!(
            self,
            RiskCategory::Critical | RiskCategory::High | RiskCategory::Medium
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Critical => "CRITICAL",
            RiskCategory::High => "HIGH",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::Low => "LOW",
            RiskCategory::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub concerning: usize,
    pub concerning_pct: u32,
}

impl RiskSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        Self::from_categories(records.into_iter().map(RiskCategory::of))
    }

    /// Every category counts towards `total`; `Unknown` counts nowhere else.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = RiskCategory>,
    {
        let mut summary = RiskSummary::default();
        for category in categories {
            summary.total += 1;
            match category {
                RiskCategory::Critical => summary.critical += 1,
                RiskCategory::High => summary.high += 1,
                RiskCategory::Medium => summary.medium += 1,
                RiskCategory::Low => summary.low += 1,
                RiskCategory::Unknown => {}
            }
        }
        summary.concerning = summary.critical + summary.high + summary.medium;
        summary.concerning_pct = if summary.total == 0 {
            0
        } else {
            (summary.concerning as f64 / summary.total as f64 * 100.0).round() as u32
        };
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::{RiskCategory, RiskSummary};
    use formats::Record;
    use pretty_assertions::assert_eq;

    fn row(category: &str) -> Record {
        Record::from([("risk_category".to_string(), category.to_string())])
    }

    #[test]
    fn parse_is_lenient() {
        assert_eq!(RiskCategory::parse(" critical "), RiskCategory::Critical);
        assert_eq!(RiskCategory::parse("Medium"), RiskCategory::Medium);
        assert_eq!(RiskCategory::parse(""), RiskCategory::Unknown);
        assert_eq!(RiskCategory::parse("severe"), RiskCategory::Unknown);
        assert_eq!(RiskCategory::of(&Record::new()), RiskCategory::Unknown);
    }

    #[test]
    fn summary_counts_tiers_and_rounds_percentage() {
        let rows = [row("HIGH"), row("low"), row("bogus")];
        let summary = RiskSummary::from_records(&rows);
        assert_eq!(
            summary,
            RiskSummary {
                total: 3,
                critical: 0,
                high: 1,
                medium: 0,
                low: 1,
                concerning: 1,
                concerning_pct: 33,
            }
        );
    }

    #[test]
    fn concerning_includes_medium_and_above() {
        let rows = [row("CRITICAL"), row("medium"), row("LOW")];
        let summary = RiskSummary::from_records(&rows);
        assert_eq!(summary.concerning, 2);
        assert_eq!(summary.concerning_pct, 67);
    }

    #[test]
    fn empty_summary_has_zero_percentage() {
        assert_eq!(RiskSummary::from_records(&Vec::<Record>::new()), RiskSummary::default());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(RiskSummary::from_records(&[row("HIGH")])).unwrap();
        assert_eq!(json["concerningPct"], 100);
        assert_eq!(serde_json::to_value(RiskCategory::High).unwrap(), "HIGH");
    }
}
