//! Server configuration, read once from the environment at start-up.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_GFW_URL: &str = "https://gateway.api.globalfishingwatch.org/v3/4wings/report";
pub const DEFAULT_DATASET: &str = "public-global-presence:latest";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Holds `mpa_report/`, `vessel_details/` and the boundary documents.
    pub data_root: PathBuf,
    /// Boundary drawn on the dashboard map.
    pub region_geojson: PathBuf,
    /// Boundary sent upstream with every presence query.
    pub query_geojson: PathBuf,
    pub report_file: String,
    pub gfw_token: Option<String>,
    pub gfw_url: String,
    pub gfw_datasets: Vec<String>,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AddrParseError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing or unparseable values fall back to
    /// defaults, except for the listen address.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AddrParseError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let u64_var = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let addr = var("MPA_ADDR", DEFAULT_ADDR).parse()?;
        let data_root = PathBuf::from(var("MPA_DATA_ROOT", "data"));
        let region_geojson = data_root.join(var(
            "MPA_REGION_GEOJSON",
            "region_geojsons/Charlie-Gibbs_North_High_Seas_Marine_Protected_Area.geojson",
        ));
        let query_geojson = data_root.join(var("MPA_QUERY_GEOJSON", "mpa_geojsons/test_mpa.json"));

        let gfw_datasets: Vec<String> = var("GFW_DATASETS", DEFAULT_DATASET)
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            addr,
            region_geojson,
            query_geojson,
            report_file: var("MPA_REPORT_FILE", "charlie_gibbs_report.csv"),
            gfw_token: lookup("GFW_API_TOKEN").filter(|t| !t.trim().is_empty()),
            gfw_url: var("GFW_API_URL", DEFAULT_GFW_URL),
            gfw_datasets: if gfw_datasets.is_empty() {
                vec![DEFAULT_DATASET.to_string()]
            } else {
                gfw_datasets
            },
            cache_ttl: Duration::from_secs(u64_var("PRESENCE_CACHE_TTL_SECS", 300)),
            upstream_timeout: Duration::from_secs(u64_var("UPSTREAM_TIMEOUT_SECS", 60)),
            data_root,
        })
    }
}
