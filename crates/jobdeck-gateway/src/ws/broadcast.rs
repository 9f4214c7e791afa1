use std::{sync::Arc, time::Duration};

use jobdeck_protocol::JobsFrame;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::snapshot::SnapshotSource;
use crate::ws::registry::{ConnectionRegistry, Visit};

/// Periodic fan-out of the full job list to every connected observer.
pub struct BroadcastLoop<S> {
    source: S,
    observers: Arc<ConnectionRegistry>,
}

impl<S: SnapshotSource> BroadcastLoop<S> {
    pub fn new(source: S, observers: Arc<ConnectionRegistry>) -> Self {
        Self { source, observers }
    }

    /// One broadcast round. Returns how many observers received the frame.
    pub async fn tick(&self) -> usize {
        if self.observers.count() == 0 {
            return 0;
        }

        let frame = JobsFrame::new(self.source.snapshot().await);
        let text = match frame.to_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "failed to serialize jobs frame");
                return 0;
            }
        };

        let mut delivered = 0;
        let removed = self.observers.for_each(|conn_id, tx| {
            match tx.try_send(text.clone()) {
                Ok(()) => {
                    delivered += 1;
                    Visit::Keep
                }
                Err(TrySendError::Full(_)) => {
                    warn!(conn_id = %conn_id, "observer queue full, dropping observer");
                    Visit::Remove
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(conn_id = %conn_id, "observer already gone");
                    Visit::Remove
                }
            }
        });

        if !removed.is_empty() {
            info!(
                removed = removed.len(),
                observers = self.observers.count(),
                "pruned observers after broadcast"
            );
        }
        delivered
    }

    /// Tick every `period` until `shutdown` fires.
    pub async fn run(self, period: Duration, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(period_ms = period.as_millis() as u64, "broadcast loop started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.cancelled() => break,
            }
        }

        // dropping every queue ends the observer sessions
        let closed = self.observers.for_each(|_, _| Visit::Remove);
        info!(closed = closed.len(), "broadcast loop stopped");
    }
}
