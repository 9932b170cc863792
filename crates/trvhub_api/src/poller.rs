use crate::domain::DiscoveryService;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodic background discovery.
///
/// Polls are never user-triggered, so an empty gateway never causes demo
/// synthesis from here. Failures are logged and the loop keeps running.
pub struct DiscoveryPoller {
    discovery: Arc<DiscoveryService>,
    interval: Duration,
}

impl DiscoveryPoller {
    pub fn new(discovery: Arc<DiscoveryService>, interval: Duration) -> Self {
        Self {
            discovery,
            interval,
        }
    }

    pub async fn run(self, cancellation_token: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "starting discovery poller"
        );

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("discovery poller received shutdown signal, stopping");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    match self.discovery.discover_all_devices(false).await {
                        Ok(devices) => {
                            debug!(count = devices.len(), "background discovery poll complete");
                        }
                        Err(err) => {
                            warn!("background discovery poll failed: {}", err);
                        }
                    }
                }
            }
        }

        info!("discovery poller stopped");
    }
}
