//! Monitor Metrics Service - One Adapter per Watched Monitor
//!
//! Keeps a `MonitorMetrics` for every watched monitor and routes
//! heartbeats to it. Watching a monitor starts tag enrichment in a
//! background task; heartbeats that arrive before it settles are
//! queued and flushed in arrival order once the adapter is active.
//! Unwatching a monitor while enrichment is still running discards
//! the slot, and the enrichment task drops its result on completion.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::monitor_metrics::{MetricsContext, MonitorMetrics};
use crate::domain::monitor::{Heartbeat, MonitorDescriptor, MonitorId, TlsInfo};

/// Heartbeat waiting for enrichment to settle.
type QueuedUpdate = (Heartbeat, Option<TlsInfo>);

enum Slot {
    /// Enrichment running; updates are buffered.
    Pending {
        generation: u64,
        queued: VecDeque<QueuedUpdate>,
    },
    /// Adapter ready; updates are applied directly.
    Active(MonitorMetrics),
}

/// Watches many monitors against one set of gauges.
#[derive(Clone)]
pub struct MonitorMetricsService {
    /// Collaborators handed to every adapter.
    ctx: MetricsContext,
    /// Watched monitors by id.
    slots: Arc<Mutex<HashMap<MonitorId, Slot>>>,
    /// Source of pending-slot generations.
    generation: Arc<AtomicU64>,
    /// Heartbeats kept per pending monitor; oldest dropped beyond this.
    max_pending_updates: usize,
}

impl MonitorMetricsService {
    pub fn new(ctx: MetricsContext, max_pending_updates: usize) -> Self {
        Self {
            ctx,
            slots: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            max_pending_updates,
        }
    }

    /// Start watching a monitor.
    ///
    /// An existing adapter for the same id is removed first, so edits
    /// to a monitor never leave series with stale labels behind. The
    /// returned handle completes once enrichment has settled.
    #[instrument(skip(self, monitor), fields(monitor_id = monitor.id))]
    pub async fn watch(&self, monitor: MonitorDescriptor) -> JoinHandle<()> {
        let pending = MonitorMetrics::begin(&monitor, &self.ctx);

        let generation = {
            let mut slots = self.slots.lock().await;
            // Drawn under the lock so the newest slot always holds the
            // highest generation for its id.
            let generation = self.generation.fetch_add(1, Ordering::Relaxed);
            let previous = slots.insert(
                monitor.id,
                Slot::Pending {
                    generation,
                    queued: VecDeque::new(),
                },
            );
            if let Some(Slot::Active(mut old)) = previous {
                debug!("Replacing watched monitor");
                old.remove();
            }
            generation
        };

        let slots = Arc::clone(&self.slots);
        tokio::spawn(async move {
            let adapter = pending.enrich().await;
            let monitor_id = adapter.monitor_id();

            let mut slots = slots.lock().await;
            let Some(slot) = slots.get_mut(&monitor_id) else {
                debug!(monitor_id, "Monitor unwatched during enrichment");
                return;
            };

            match slot {
                Slot::Pending {
                    generation: current,
                    queued,
                } if *current == generation => {
                    let flushed = queued.len();
                    for (heartbeat, tls) in queued.drain(..) {
                        adapter.update(&heartbeat, tls.as_ref());
                    }
                    let labels = adapter.labels().len();
                    *slot = Slot::Active(adapter);
                    info!(
                        monitor_id,
                        labels,
                        flushed,
                        "Monitor metrics active"
                    );
                }
                _ => {
                    debug!(monitor_id, "Monitor re-watched during enrichment");
                }
            }
        })
    }

    /// Export a heartbeat for a watched monitor.
    ///
    /// Unknown monitors are ignored. Returns whether the monitor is watched.
    pub async fn record(
        &self,
        monitor_id: MonitorId,
        heartbeat: Heartbeat,
        tls: Option<TlsInfo>,
    ) -> bool {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(&monitor_id) {
            Some(Slot::Active(adapter)) => {
                adapter.update(&heartbeat, tls.as_ref());
                true
            }
            Some(Slot::Pending { queued, .. }) => {
                if queued.len() >= self.max_pending_updates {
                    queued.pop_front();
                    warn!(
                        monitor_id,
                        limit = self.max_pending_updates,
                        "Pending update queue full, dropping oldest heartbeat"
                    );
                }
                queued.push_back((heartbeat, tls));
                true
            }
            None => {
                debug!(monitor_id, "Heartbeat for unwatched monitor");
                false
            }
        }
    }

    /// Stop watching a monitor and drop its series.
    ///
    /// Returns whether the monitor was watched.
    #[instrument(skip(self))]
    pub async fn unwatch(&self, monitor_id: MonitorId) -> bool {
        let removed = self.slots.lock().await.remove(&monitor_id);
        match removed {
            Some(Slot::Active(mut adapter)) => {
                adapter.remove();
                true
            }
            Some(Slot::Pending { queued, .. }) => {
                debug!(
                    dropped = queued.len(),
                    "Monitor unwatched before enrichment settled"
                );
                true
            }
            None => false,
        }
    }

    /// Ids of all watched monitors, pending or active.
    pub async fn watched(&self) -> Vec<MonitorId> {
        let mut ids: Vec<MonitorId> = self.slots.lock().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Whether a monitor's adapter has finished enrichment.
    pub async fn is_active(&self, monitor_id: MonitorId) -> bool {
        matches!(
            self.slots.lock().await.get(&monitor_id),
            Some(Slot::Active(_))
        )
    }

    /// Drop the series of every watched monitor.
    pub async fn unwatch_all(&self) {
        let drained: Vec<Slot> = self.slots.lock().await.drain().map(|(_, s)| s).collect();
        let count = drained.len();
        for slot in drained {
            if let Slot::Active(mut adapter) = slot {
                adapter.remove();
            }
        }
        info!(count, "All monitors unwatched");
    }
}
