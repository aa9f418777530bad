//! Catalog API health monitoring.

use crate::client::HttpCatalogClient;
use crate::types::CatalogStats;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use vlone_core::SearchQuery;

/// Latest known API health.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiStatus {
    /// `None` until the first check completes
    pub online: Option<bool>,
    /// Round trip of the last successful check
    pub latency_ms: u64,
    /// Songs in the catalog, 0 when unknown
    pub total_tracks: u64,
    /// Full statistics when the stats endpoint answered
    pub stats: Option<CatalogStats>,
}

impl ApiStatus {
    pub fn is_online(&self) -> bool {
        self.online == Some(true)
    }

    fn offline() -> Self {
        Self {
            online: Some(false),
            ..Self::default()
        }
    }
}

/// Check the API once.
///
/// Tries the stats endpoint first and falls back to the first song page.
pub async fn check_status(client: &HttpCatalogClient) -> ApiStatus {
    let start = Instant::now();

    match client.get_stats().await {
        Ok(stats) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            debug!(latency_ms, "Catalog online");
            return ApiStatus {
                online: Some(true),
                latency_ms,
                total_tracks: stats.total_songs,
                stats: Some(stats),
            };
        }
        Err(e) => warn!(error = %e, "Stats endpoint failed, trying fallback"),
    }

    let query = SearchQuery {
        page: Some(1),
        ..SearchQuery::default()
    };
    match client.search_songs(&query).await {
        Ok(page) => ApiStatus {
            online: Some(true),
            latency_ms: start.elapsed().as_millis() as u64,
            total_tracks: page.total,
            stats: None,
        },
        Err(e) => {
            warn!(error = %e, "Catalog offline");
            ApiStatus::offline()
        }
    }
}

/// Background poller publishing [`ApiStatus`].
///
/// The first check runs immediately, then every
/// `health_poll_interval`. Dropping the monitor stops polling.
#[derive(Debug)]
pub struct HealthMonitor {
    status: watch::Receiver<ApiStatus>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Start polling on the current tokio runtime
    pub fn spawn(client: HttpCatalogClient) -> Self {
        let period = client
            .config()
            .health_poll_interval
            .max(Duration::from_secs(1));
        let (tx, status) = watch::channel(ApiStatus::default());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let status = check_status(&client).await;
                if tx.send(status).is_err() {
                    break;
                }
            }
        });

        Self { status, task }
    }

    /// Latest published status
    pub fn status(&self) -> ApiStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApiStatus> {
        self.status.clone()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
