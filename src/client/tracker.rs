//! Case tracker
//!
//! Fetches a case right away, then again on a fixed interval, publishing every
//! result. Starting a new query cancels the previous one: once `track` or
//! `stop` returns, nothing from an earlier query is published.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{ClientError, ComplaintClient};
use crate::db::ComplaintDoc;
use crate::store::CaseLookup;

/// Refresh interval used by the tracking page
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where the tracker gets case records from
#[async_trait]
pub trait CaseSource: Send + Sync + 'static {
    async fn fetch(&self, lookup: &CaseLookup) -> Result<ComplaintDoc, ClientError>;
}

#[async_trait]
impl CaseSource for ComplaintClient {
    async fn fetch(&self, lookup: &CaseLookup) -> Result<ComplaintDoc, ClientError> {
        self.track(lookup).await
    }
}

/// One poll result
#[derive(Debug)]
pub struct TrackerUpdate {
    pub lookup: CaseLookup,
    pub result: Result<ComplaintDoc, ClientError>,
}

/// Publishing side shared with the polling task
struct Outlet {
    generation: u64,
    tx: mpsc::UnboundedSender<TrackerUpdate>,
}

impl Outlet {
    /// Send only if `generation` is still current; false once the query is stale
    /// or the receiver is gone.
    fn publish(outlet: &Mutex<Outlet>, generation: u64, update: TrackerUpdate) -> bool {
        let guard = outlet.lock().unwrap_or_else(|e| e.into_inner());
        guard.generation == generation && guard.tx.send(update).is_ok()
    }
}

pub struct Tracker<S: CaseSource> {
    source: Arc<S>,
    interval: Duration,
    outlet: Arc<Mutex<Outlet>>,
    task: Option<JoinHandle<()>>,
}

impl<S: CaseSource> Tracker<S> {
    /// Create a tracker and the receiver its updates arrive on
    pub fn new(source: S, interval: Duration) -> (Self, mpsc::UnboundedReceiver<TrackerUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = Self {
            source: Arc::new(source),
            interval,
            outlet: Arc::new(Mutex::new(Outlet { generation: 0, tx })),
            task: None,
        };
        (tracker, rx)
    }

    /// Start polling `lookup`, cancelling any query already running
    pub fn track(&mut self, lookup: CaseLookup) {
        let generation = self.retire_current();
        debug!("Tracking {} (query {})", lookup, generation);

        let source = Arc::clone(&self.source);
        let outlet = Arc::clone(&self.outlet);
        let interval = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // First tick completes immediately
                ticker.tick().await;

                let result = source.fetch(&lookup).await;
                let update = TrackerUpdate {
                    lookup: lookup.clone(),
                    result,
                };

                if !Outlet::publish(&outlet, generation, update) {
                    break;
                }
            }
        }));
    }

    /// Stop polling
    pub fn stop(&mut self) {
        self.retire_current();
    }

    pub fn is_tracking(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Invalidate the running query and return the next generation
    fn retire_current(&mut self) -> u64 {
        let generation = {
            let mut guard = self.outlet.lock().unwrap_or_else(|e| e.into_inner());
            guard.generation += 1;
            guard.generation
        };

        if let Some(task) = self.task.take() {
            task.abort();
        }

        generation
    }
}

impl<S: CaseSource> Drop for Tracker<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
