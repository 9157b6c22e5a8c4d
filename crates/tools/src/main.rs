use std::fs;
use std::path::{Path, PathBuf};

use catalog::{DEFAULT_SUMMARY_COLUMNS, NumericSummary, SortOrder, sort_table, summarize_numeric};
use clap::{Parser, Subcommand, ValueEnum};
use compute::{
    Breakdown, MAX_ROWS, RiskSummary, breakdown_by_column, breakdown_multi_valued,
    visible_headers,
};
use formats::{Table, parse_table, rings_from_str, write_table};
use layers::{Projection, Viewport};
use serde::Serialize;
use tools::{format_breakdown, format_numeric_summary, format_risk_summary, render_svg};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Marine protected area report tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Asc,
            Order::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Risk tiers, breakdowns and numeric column ranges of a report
    Summary {
        /// Risk report CSV
        report: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Sorted report rows as CSV
    Table {
        /// Risk report CSV
        report: PathBuf,

        /// Column to sort by
        #[arg(long)]
        sort_by: Option<String>,

        #[arg(long, value_enum, default_value_t = Order::Asc)]
        order: Order,

        /// Maximum number of rows
        #[arg(long, default_value_t = MAX_ROWS)]
        limit: usize,

        /// Keep every column instead of the display set
        #[arg(long)]
        all_columns: bool,
    },

    /// Render a boundary GeoJSON as SVG
    Map {
        /// FeatureCollection of Polygon/MultiPolygon
        boundary: PathBuf,

        /// Whole-world equirectangular placement instead of fitting the region
        #[arg(long)]
        global: bool,

        #[arg(long, default_value_t = layers::MAP_WIDTH)]
        width: f64,

        #[arg(long, default_value_t = layers::MAP_HEIGHT)]
        height: f64,

        #[arg(long, default_value_t = layers::MAP_PADDING)]
        padding: f64,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDoc {
    risk_summary: RiskSummary,
    by_flag: Vec<Breakdown>,
    by_violation_type: Vec<Breakdown>,
    numeric_summary: Vec<NumericSummary>,
}

fn read_report(path: &Path) -> Result<Table, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    Ok(parse_table(&text)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Summary { report, json } => {
            let table = read_report(&report)?;
            let risk = RiskSummary::from_records(&table.records);
            let flags = breakdown_by_column(&table.records, "flag");
            let violations = breakdown_multi_valued(&table.records, "violation_types");
            let numeric = summarize_numeric(&table, &table.headers, DEFAULT_SUMMARY_COLUMNS);

            if json {
                let doc = SummaryDoc {
                    risk_summary: risk,
                    by_flag: flags,
                    by_violation_type: violations,
                    numeric_summary: numeric,
                };
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", format_risk_summary(&risk));
                print!("{}", format_breakdown("flags", &flags));
                print!("{}", format_breakdown("violation types", &violations));
                print!("{}", format_numeric_summary(&numeric));
            }
        }
        Command::Table {
            report,
            sort_by,
            order,
            limit,
            all_columns,
        } => {
            let table = read_report(&report)?;
            let headers = if all_columns {
                table.headers.clone()
            } else {
                visible_headers(&table)
            };
            let mut sorted = sort_table(table, sort_by.as_deref(), order.into());
            sorted.records.truncate(limit);
            for record in &mut sorted.records {
                record.retain(|column, _| headers.contains(column));
            }
            sorted.headers = headers;
            print!("{}", write_table(&sorted)?);
        }
        Command::Map {
            boundary,
            global,
            width,
            height,
            padding,
            out,
        } => {
            let text = fs::read_to_string(&boundary)
                .map_err(|e| format!("read {}: {e}", boundary.display()))?;
            let rings = rings_from_str(&text)?;
            let projection = if global {
                Projection::Equirectangular
            } else {
                Projection::Fitted
            };
            let viewport = Viewport::new(width, height, padding);
            let svg = render_svg(&projection.project(&rings, viewport), viewport);

            match out {
                Some(path) => {
                    fs::write(&path, svg).map_err(|e| format!("write {}: {e}", path.display()))?;
                    info!(rings = rings.len(), "wrote {}", path.display());
                }
                None => print!("{svg}"),
            }
        }
    }
    Ok(())
}
