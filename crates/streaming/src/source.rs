//! Upstream presence source seam and the cached service built on it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use foundation::Clock;
use serde_json::Value;

use crate::cache::{CoalesceError, Coalescer};
use crate::protocol::{DatasetGroups, TimeWindow, clean_response};
use crate::residency::Residency;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status.
    #[error("{service} error {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },
    #[error("{service} request failed: {reason}")]
    Transport { service: String, reason: String },
    #[error("{service} returned an unreadable body: {reason}")]
    Decode { service: String, reason: String },
    /// The region boundary sent upstream could not be read.
    #[error("region boundary unavailable: {0}")]
    Region(String),
}

impl FetchError {
    /// Upstream HTTP status, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Something that can produce a raw presence report for a time window.
pub trait PresenceSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    fn fetch<'a>(&'a self, window: &'a TimeWindow) -> BoxFuture<'a, Result<Value, FetchError>>;
}

pub type PresenceError = CoalesceError<FetchError>;

/// Presence reports per time window, cleaned once per fetch and cached.
#[derive(Clone)]
pub struct PresenceService {
    source: Arc<dyn PresenceSource>,
    cache: Coalescer<TimeWindow, Arc<DatasetGroups>, FetchError>,
}

impl PresenceService {
    pub fn new(source: Arc<dyn PresenceSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: Coalescer::new(ttl),
        }
    }

    pub fn with_clock(
        source: Arc<dyn PresenceSource>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            cache: Coalescer::with_clock(ttl, clock),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn vessels(&self, window: TimeWindow) -> Result<Arc<DatasetGroups>, PresenceError> {
        let source = Arc::clone(&self.source);
        let request = window.clone();
        self.cache
            .get(window, move || async move {
                let payload = source.fetch(&request).await?;
                Ok(Arc::new(clean_response(&payload)))
            })
            .await
    }

    pub fn state(&self, window: &TimeWindow) -> Residency {
        self.cache.state(window)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use foundation::ManualClock;
    use serde_json::{Value, json};

    use super::{BoxFuture, FetchError, PresenceError, PresenceService, PresenceSource};
    use crate::protocol::TimeWindow;
    use crate::residency::Residency;

    struct ScriptedSource {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    impl PresenceSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch<'a>(&'a self, window: &'a TimeWindow) -> BoxFuture<'a, Result<Value, FetchError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if let Some(status) = self.fail_with {
                    return Err(FetchError::Status {
                        service: "GFW".into(),
                        status,
                        body: "nope".into(),
                    });
                }
                Ok(json!({
                    "entries": [{ "ds": [
                        { "vesselId": window.start.clone() },
                        { "vesselId": window.start.clone() }
                    ]}]
                }))
            })
        }
    }

    fn service(fail_with: Option<u16>) -> (Arc<ScriptedSource>, PresenceService) {
        let source = Arc::new(ScriptedSource {
            calls: AtomicUsize::new(0),
            fail_with,
        });
        let clock = Arc::new(ManualClock::new(0));
        let svc = PresenceService::with_clock(source.clone(), Duration::from_secs(300), clock);
        (source, svc)
    }

    #[tokio::test]
    async fn cleans_and_caches_per_window() {
        let (source, svc) = service(None);
        let jan = TimeWindow::new("2024-01-01", "2024-01-31");

        let first = svc.vessels(jan.clone()).await.unwrap();
        let second = svc.vessels(jan.clone()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first["ds"].len(), 1);
        assert_eq!(first["ds"][0].id, "2024-01-01");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.state(&jan), Residency::Fresh);

        svc.vessels(TimeWindow::new("2024-02-01", "2024-02-28"))
            .await
            .unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_status_is_surfaced() {
        let (_, svc) = service(Some(401));
        let err = svc
            .vessels(TimeWindow::new("2024-01-01", "2024-01-02"))
            .await
            .unwrap_err();
        let PresenceError::Fetch(inner) = &err else {
            panic!("expected fetch error, got {err:?}");
        };
        assert_eq!(inner.status(), Some(401));
        assert_eq!(err.to_string(), "GFW error 401: nope");
    }
}
