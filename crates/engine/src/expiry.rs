//! Expiry scheduler.
//!
//! Polls the database for active trades past their expiry instead of
//! keeping a timer per trade. The same query drives the startup sweep, so
//! trades that expired while the server was down settle on the first poll.
//! Settlement deferred by a stale quote is retried on the next poll.

use std::sync::Arc;

use chrono::Utc;
use optiondesk_core::error::DeskError;
use optiondesk_data::Repositories;
use tracing::{error, info, warn};

use crate::registry::AccountRegistry;

const DUE_BATCH_SIZE: i64 = 200;

pub struct ExpiryScheduler {
    repos: Repositories,
    registry: Arc<AccountRegistry>,
    poll_interval_ms: u64,
}

impl ExpiryScheduler {
    /// Creates a scheduler over the shared registry.
    #[must_use]
    pub fn new(repos: Repositories, registry: Arc<AccountRegistry>, poll_interval_ms: u64) -> Self {
        Self {
            repos,
            registry,
            poll_interval_ms,
        }
    }

    /// Runs the settlement loop until the process shuts down.
    pub async fn run(self) {
        info!(poll_ms = self.poll_interval_ms, "expiry scheduler started");
        let mut interval =
            tokio::time::interval(std::time::Duration::from_millis(self.poll_interval_ms));

        loop {
            interval.tick().await;
            if let Err(e) = self.settle_due().await {
                error!(error = %e, "expiry poll failed");
            }
        }
    }

    /// Settles every due trade once; returns the number settled.
    ///
    /// # Errors
    /// Returns an error only if the due-trade query fails; individual
    /// settlement failures are logged and retried on the next poll.
    pub async fn settle_due(&self) -> anyhow::Result<usize> {
        let now = Utc::now();
        let due = self.repos.trades.query_due(now, DUE_BATCH_SIZE).await?;
        if due.is_empty() {
            return Ok(0);
        }

        info!(count = due.len(), "settling due trades");
        let mut settled = 0;

        for trade in due {
            let handle = self.registry.handle(trade.user_id).await;
            match handle.settle_trade(trade.id).await {
                Ok(Some(_)) => settled += 1,
                // Already settled elsewhere; nothing to do.
                Ok(None) => {}
                Err(DeskError::StalePrice { symbol, age_secs }) => {
                    warn!(
                        trade_id = %trade.id,
                        symbol,
                        age_secs,
                        "settlement deferred on stale quote"
                    );
                }
                Err(e) => {
                    error!(trade_id = %trade.id, error = %e, "settlement failed");
                }
            }
        }

        Ok(settled)
    }
}
