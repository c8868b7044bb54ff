use std::collections::HashSet;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use futures::future::try_join;
use rand::Rng;
use tracing::{error, info, instrument, warn};
use crate::alerting::{AlertManager, QueueAlert};
use crate::config::QueueSettings;
use crate::errors::{DockQueueError, DockQueueResult};
use crate::models::{ActivityAction, CheckInRequest, DocumentRef, DriverRecord, GateConfig, QueueStatus};
use crate::repositories::{DriverRepository, GateRepository, RecordStore};
use crate::state_management::activity_logger::ActivityLogger;
use crate::state_management::transitions::{plan_transition, queue_number, AlertKind, QueueEvent, TransitionContext};

const ID_ATTEMPTS: usize = 50;

/// Drives driver records through the queue lifecycle.
///
/// Every mutation is one read of the current rows, one single-row write, then the side effects
/// (activity log, notification) which never undo or fail the write.
#[derive(Clone)]
pub struct DriverQueueManager {
    drivers: DriverRepository,
    gates: GateRepository,
    activity: Arc<ActivityLogger>,
    alerts: Arc<AlertManager>,
    settings: QueueSettings,
}

impl DriverQueueManager {
    /// Creates a new `DriverQueueManager`.
    ///
    /// # Arguments
    ///
    /// * `store` - The record store holding drivers, gates and logs.
    /// * `activity` - The audit logger.
    /// * `alerts` - The alert manager used for approval and call messages.
    /// * `settings` - Queue numbering and check-in rules.
    pub fn new(
        store: Arc<dyn RecordStore>,
        activity: Arc<ActivityLogger>,
        alerts: Arc<AlertManager>,
        settings: QueueSettings,
    ) -> Self {
        Self {
            drivers: DriverRepository::new(Arc::clone(&store)),
            gates: GateRepository::new(store),
            activity,
            alerts,
            settings,
        }
    }

    /// Registers a walk-in or booking and returns the stored record
    ///
    /// The id is `WH-{yyyymmdd}-{NNN}` with a random suffix, redrawn when it collides with an existing row,
    /// including rows older than the store's read window that only the insert reports.
    /// An inline document is uploaded by the store; the resolved URL, or nothing, is kept on the record.
    #[instrument(skip(self, request), fields(plate = %request.license_plate))]
    pub async fn check_in(&self, request: CheckInRequest) -> DockQueueResult<DriverRecord> {
        request.validate(self.settings.max_document_bytes)?;

        let now = Utc::now();
        let mut existing: HashSet<String> = self.drivers.fetch_all().await?.into_iter().map(|d| d.id).collect();

        let mut record = DriverRecord {
            id: generate_check_in_id(now, &existing)?,
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            license_plate: request.license_plate.trim().to_string(),
            company: request.company.trim().to_string(),
            entry_type: request.entry_type,
            purpose: request.purpose,
            priority: request.priority,
            do_number: request.do_number.trim().to_string(),
            pic: request.pic.filter(|p| !p.trim().is_empty()),
            document_file: request.document.as_ref().map(DocumentRef::as_wire),
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            status: QueueStatus::initial(request.entry_type),
            gate: None,
            queue_number: None,
            check_in_time: now,
            arrived_at_gate_time: None,
            verified_time: None,
            called_time: None,
            loading_start_time: None,
            end_time: None,
            exit_time: None,
            verified_by: None,
            called_by: None,
            exit_verified_by: None,
            security_notes: None,
            rejection_reason: None,
        };

        // the read above only covers the store's window, so an older row can still hold the id
        let mut attempts = 1;
        let receipt = loop {
            match self.drivers.insert(&record).await {
                Ok(receipt) => break receipt,
                Err(DockQueueError::DuplicateRecord(reason)) if attempts < ID_ATTEMPTS => {
                    warn!("Check-in id {} taken ({}), drawing another", record.id, reason);
                    existing.insert(std::mem::take(&mut record.id));
                    record.id = generate_check_in_id(now, &existing)?;
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        };
        record.document_file = match request.document {
            Some(DocumentRef::InlineImage(_)) => receipt.generated_ref,
            Some(DocumentRef::Url(url)) => Some(receipt.generated_ref.unwrap_or_else(|| url.to_string())),
            None => None,
        };

        info!("Driver {} checked in as {} ({})", record.license_plate, record.id, record.status);
        self.activity
            .record(&record.name, ActivityAction::CheckIn, &format!("Check-in {} ({})", record.license_plate, record.id))
            .await;
        Ok(record)
    }

    /// Marks the driver as arrived at the gate. Scanning a driver already at the gate changes nothing.
    pub async fn scan(&self, id: &str, actor: &str) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::ArriveAtGate, actor).await
    }

    /// Approves entry onto an open gate and assigns the queue number
    pub async fn approve(&self, id: &str, actor: &str, gate: &str, notes: Option<String>) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::Approve { gate: gate.to_string(), notes }, actor).await
    }

    pub async fn reject(&self, id: &str, actor: &str, reason: &str) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::Reject { reason: reason.to_string() }, actor).await
    }

    pub async fn call(&self, id: &str, actor: &str) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::Call, actor).await
    }

    pub async fn start_loading(&self, id: &str, actor: &str) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::StartLoading, actor).await
    }

    pub async fn complete(&self, id: &str, actor: &str) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::Complete, actor).await
    }

    pub async fn gate_out(&self, id: &str, actor: &str) -> DockQueueResult<DriverRecord> {
        self.apply(id, QueueEvent::GateOut, actor).await
    }

    /// Applies one event to one record
    ///
    /// # Returns
    ///
    /// * `Ok(DriverRecord)` - The record as it stands after the write
    /// * `Err(DockQueueError)` - Not found, guard failure, or store failure; nothing was written
    #[instrument(skip(self, event), fields(event = event.name()))]
    pub async fn apply(&self, id: &str, event: QueueEvent, actor: &str) -> DockQueueResult<DriverRecord> {
        let (records, gates) = match event {
            QueueEvent::Approve { .. } => try_join(self.drivers.fetch_all(), self.gates.fetch_all()).await?,
            _ => (self.drivers.fetch_all().await?, Vec::new()),
        };
        let record = records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DockQueueError::DriverNotFound(id.to_string()))?;

        let now = Utc::now();
        let ctx = TransitionContext {
            records: &records,
            gates: &gates,
            priority_gate: &self.settings.priority_gate,
            now,
        };
        let transition = match plan_transition(&record, &event, actor, &ctx) {
            Ok(t) => t,
            Err(e) => {
                warn!("Rejected {} on {}: {}", event.name(), id, e);
                return Err(e);
            }
        };

        let Some(patch) = transition.patch else {
            return Ok(record);
        };

        if let Err(e) = self.drivers.update(&patch).await {
            error!("Failed to persist {} for {}: {}", event.name(), id, e);
            return Err(e);
        }

        let mut updated = record;
        updated.apply(&patch);
        info!("Driver {} is now {}", updated.id, updated.status);

        self.activity.record(actor, transition.action, &transition.details).await;

        if let Some(kind) = transition.alert {
            let alert = match kind {
                AlertKind::EntryApproved => QueueAlert::entry_approved(&updated, actor, now),
                AlertKind::DriverCalled => QueueAlert::driver_called(&updated),
            };
            self.alerts.handle_alert(&alert).await;
        }

        Ok(updated)
    }

    /// All driver records, newest check-in first
    pub async fn list_drivers(&self) -> DockQueueResult<Vec<DriverRecord>> {
        let mut drivers = self.drivers.fetch_all().await?;
        drivers.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        Ok(drivers)
    }

    pub async fn find_driver(&self, id: &str) -> DockQueueResult<DriverRecord> {
        self.drivers
            .find(id)
            .await?
            .ok_or_else(|| DockQueueError::DriverNotFound(id.to_string()))
    }

    /// Gates security may currently assign
    pub async fn open_gates(&self) -> DockQueueResult<Vec<GateConfig>> {
        Ok(self.gates.fetch_all().await?.into_iter().filter(GateConfig::is_open).collect())
    }

    /// The queue number the next approval on `gate` would receive
    pub async fn preview_queue_number(&self, gate: &str) -> DockQueueResult<String> {
        let records = self.drivers.fetch_all().await?;
        Ok(queue_number(gate, &records, &self.settings.priority_gate))
    }
}

/// Draws `WH-{yyyymmdd}-{NNN}` ids until one is free
pub fn generate_check_in_id(now: DateTime<Utc>, existing: &HashSet<String>) -> DockQueueResult<String> {
    let date = now.format("%Y%m%d");
    let mut rng = rand::thread_rng();
    for _ in 0..ID_ATTEMPTS {
        let candidate = format!("WH-{}-{:03}", date, rng.gen_range(0..1000));
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(DockQueueError::StoreError(format!("no free check-in id for {}", date)))
}
