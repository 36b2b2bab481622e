//! Expiration Sweep Task
//!
//! Background task that periodically removes expired entries from a store.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{GeoStore, StatsCounters};
use crate::error::{CacheError, Result};

// == Sweep Handle ==
/// Owns a running sweep task.
///
/// `stop` shuts the task down and waits for it to exit. A handle dropped
/// without being stopped aborts the task instead.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to stop and waits until it has exited.
    ///
    /// Returns false if the handle had already been stopped.
    pub async fn stop(&mut self) -> bool {
        let Some(tx) = self.shutdown_tx.take() else {
            return false;
        };

        // The receiver is gone only if the task already exited.
        let _ = tx.send(());
        let _ = (&mut self.join).await;
        true
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && !self.join.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some() {
            self.join.abort();
        }
    }
}

/// Spawns a task that sweeps expired entries out of `store` every `period`.
///
/// Each pass takes the write lock, removes every entry whose expiration is
/// strictly in the past and records the pass in `stats`. Entries that never
/// expire are left alone.
///
/// # Errors
/// - `InvalidConfiguration` if `period` is zero
/// - `NoRuntime` if called outside a tokio runtime
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(GeoStore::<String>::new(Precision::Within1Km, ttl)));
/// let mut sweeper = spawn_sweep_task(store.clone(), Arc::new(StatsCounters::new()), period)?;
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweep_task<V>(
    store: Arc<RwLock<GeoStore<V>>>,
    stats: Arc<StatsCounters>,
    period: Duration,
) -> Result<SweepHandle>
where
    V: Send + Sync + 'static,
{
    if period.is_zero() {
        return Err(CacheError::InvalidConfiguration(
            "cleanup interval must be greater than zero".to_string(),
        ));
    }

    let runtime = Handle::try_current().map_err(|e| CacheError::NoRuntime(e.to_string()))?;
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let join = runtime.spawn(async move {
        info!(interval_ms = period.as_millis() as u64, "Sweep task started");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    break;
                }
                _ = ticker.tick() => {
                    let removed = store.write().await.cleanup_expired();
                    stats.record_sweep(removed);

                    if removed > 0 {
                        info!("Sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Sweep: no expired entries found");
                    }
                }
            }
        }

        info!("Sweep task stopped");
    });

    Ok(SweepHandle {
        shutdown_tx: Some(shutdown_tx),
        join,
    })
}
