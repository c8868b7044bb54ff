use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use crate::config::Settings;
use crate::errors::DockQueueResult;
use crate::models::DriverRecord;
use crate::state_management::{counts, project, DashboardView, DriverQueueManager};

/// One polled picture of the queue: every view and its size
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub taken_at: DateTime<Utc>,
    pub counts: BTreeMap<DashboardView, usize>,
    pub views: BTreeMap<DashboardView, Vec<DriverRecord>>,
}

impl DashboardSnapshot {
    pub fn from_records(records: &[DriverRecord], taken_at: DateTime<Utc>) -> Self {
        let views = DashboardView::ALL
            .iter()
            .map(|view| (*view, project(records, *view).into_iter().cloned().collect()))
            .collect();
        Self { taken_at, counts: counts(records), views }
    }

    pub fn count(&self, view: DashboardView) -> usize {
        self.counts.get(&view).copied().unwrap_or(0)
    }

    pub fn view(&self, view: DashboardView) -> &[DriverRecord] {
        self.views.get(&view).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Re-reads the queue on every polling cycle and keeps the latest snapshot
pub struct DockQueueController {
    pub settings: Arc<Settings>,
    pub queue_manager: Arc<DriverQueueManager>,
    latest: RwLock<Option<DashboardSnapshot>>,
}

impl DockQueueController {
    /// Creates a new `DockQueueController`
    ///
    /// # Arguments
    ///
    /// * `settings`: The application settings
    /// * `queue_manager`: The `DriverQueueManager` the dashboards read through
    pub fn new(settings: Arc<Settings>, queue_manager: Arc<DriverQueueManager>) -> Self {
        info!("Initializing Dock Queue Controller");
        Self { settings, queue_manager, latest: RwLock::new(None) }
    }

    /// Executes a single polling cycle: full re-read, projection, snapshot swap
    ///
    /// # Returns
    ///
    /// * `Ok(DashboardSnapshot)` with the fresh views
    /// * `Err(DockQueueError)` if the store read fails; the previous snapshot is kept
    pub async fn run_polling_cycle(&self) -> DockQueueResult<DashboardSnapshot> {
        let start = std::time::Instant::now();
        let records = self.queue_manager.list_drivers().await?;
        let snapshot = DashboardSnapshot::from_records(&records, Utc::now());
        debug!("Polled {} driver records in {:?}", records.len(), start.elapsed());

        info!(
            "Queue: gate-in {}, verification {}, bongkar {}, selesai {}, rejected {}",
            snapshot.count(DashboardView::GateIn),
            snapshot.count(DashboardView::Verification),
            snapshot.count(DashboardView::Bongkar),
            snapshot.count(DashboardView::Selesai),
            snapshot.count(DashboardView::Rejected),
        );

        *self.latest.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub async fn latest_snapshot(&self) -> Option<DashboardSnapshot> {
        self.latest.read().await.clone()
    }
}
