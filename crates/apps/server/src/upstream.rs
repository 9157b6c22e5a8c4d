//! Global Fishing Watch 4Wings report client.

use std::path::PathBuf;

use serde_json::{json, Value};
use streaming::{BoxFuture, FetchError, PresenceSource, TimeWindow};
use tracing::{debug, warn};

use crate::config::ServerConfig;

pub const SERVICE: &str = "GFW";

pub struct GfwClient {
    http: reqwest::Client,
    url: String,
    token: String,
    datasets: Vec<String>,
    region_path: PathBuf,
}

impl GfwClient {
    pub fn new(config: &ServerConfig, token: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            http,
            url: config.gfw_url.clone(),
            token,
            datasets: config.gfw_datasets.clone(),
            region_path: config.query_geojson.clone(),
        })
    }

    /// Query string of a presence report grouped per vessel.
    pub fn query(&self, window: &TimeWindow) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("format".to_string(), "JSON".to_string()),
            ("group-by".to_string(), "VESSEL_ID".to_string()),
            ("temporal-resolution".to_string(), "HOURLY".to_string()),
        ];
        for (i, dataset) in self.datasets.iter().enumerate() {
            pairs.push((format!("datasets[{i}]"), dataset.clone()));
        }
        pairs.push(("date-range".to_string(), window.date_range()));
        pairs.push(("spatial-aggregation".to_string(), "True".to_string()));
        pairs.push(("spatial-resolution".to_string(), "LOW".to_string()));
        pairs
    }

    async fn region(&self) -> Result<Value, FetchError> {
        let text = tokio::fs::read_to_string(&self.region_path)
            .await
            .map_err(|e| FetchError::Region(format!("{}: {e}", self.region_path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| FetchError::Region(format!("{}: {e}", self.region_path.display())))
    }

    async fn report(&self, window: &TimeWindow) -> Result<Value, FetchError> {
        let region = self.region().await?;
        debug!(window = %window, datasets = ?self.datasets, "requesting presence report");

        let transport = |e: reqwest::Error| FetchError::Transport {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        };

        let resp = self
            .http
            .post(&self.url)
            .query(&self.query(window))
            .bearer_auth(&self.token)
            .json(&json!({ "geojson": region }))
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(window = %window, status = status.as_u16(), "presence report request rejected");
            return Err(FetchError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>().await.map_err(|e| FetchError::Decode {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })
    }
}

impl PresenceSource for GfwClient {
    fn name(&self) -> &str {
        SERVICE
    }

    fn fetch<'a>(&'a self, window: &'a TimeWindow) -> BoxFuture<'a, Result<Value, FetchError>> {
        Box::pin(self.report(window))
    }
}
