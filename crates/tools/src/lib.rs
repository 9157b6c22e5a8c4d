//! Text and SVG renderings used by the `mpa` command line tool.

use std::fmt::Write as _;

use catalog::NumericSummary;
use compute::{Breakdown, RiskSummary};
use layers::{ProjectedPath, Viewport};

/// Standalone SVG document with one closed polygon per path.
pub fn render_svg(paths: &[ProjectedPath], viewport: Viewport) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = viewport.width,
        h = viewport.height,
    );
    let _ = writeln!(
        svg,
        r##"  <rect width="100%" height="100%" fill="#0b2540"/>"##
    );
    for path in paths.iter().filter(|p| !p.points.is_empty()) {
        let _ = writeln!(
            svg,
            r##"  <polygon points="{}" fill="#3fa7d6" fill-opacity="0.35" stroke="#9ad1ff" stroke-width="1.5"/>"##,
            path.to_svg_points()
        );
    }
    svg.push_str("</svg>\n");
    svg
}

pub fn format_risk_summary(summary: &RiskSummary) -> String {
    format!(
        "{total} vessels detected; {concerning} ({pct}%) medium, high or critical concern\n\
         critical: {critical}\nhigh: {high}\nmedium: {medium}\nlow: {low}\n",
        total = summary.total,
        concerning = summary.concerning,
        pct = summary.concerning_pct,
        critical = summary.critical,
        high = summary.high,
        medium = summary.medium,
        low = summary.low,
    )
}

pub fn format_breakdown(title: &str, groups: &[Breakdown]) -> String {
    let mut out = format!("{title}:\n");
    let width = groups.iter().map(|g| g.name.len()).max().unwrap_or(0);
    for g in groups {
        let _ = writeln!(out, "  {:<width$}  {}", g.name, g.count);
    }
    out
}

pub fn format_numeric_summary(summaries: &[NumericSummary]) -> String {
    let mut out = String::new();
    for s in summaries {
        let _ = writeln!(
            out,
            "{}: min {:.3} max {:.3} avg {:.3}",
            s.column, s.min, s.max, s.average
        );
    }
    out
}
