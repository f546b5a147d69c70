//! Retention sweeper
//!
//! Periodically evicts finished jobs older than the retention window.
//! Only started when a retention window is configured.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info};

use crate::repository::JobStore;

pub struct RetentionSweeper {
    store: Arc<dyn JobStore>,
    retention: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn JobStore>, retention: Duration, interval: Duration) -> Self {
        Self {
            store,
            retention,
            interval,
        }
    }

    /// Evicts everything that finished more than `retention` ago
    pub fn sweep_once(&self) -> usize {
        let Ok(window) = chrono::Duration::from_std(self.retention) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(window) else {
            return 0;
        };
        self.store.evict_finished_before(cutoff)
    }

    /// Starts the sweep loop on a background task
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting retention sweeper (retention: {:?}, interval: {:?})",
            self.retention, self.interval
        );

        tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);

            loop {
                ticker.tick().await;

                let evicted = self.sweep_once();
                if evicted > 0 {
                    info!("Evicted {} finished job(s)", evicted);
                } else {
                    debug!("No finished jobs to evict");
                }
            }
        })
    }
}
