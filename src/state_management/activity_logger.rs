use std::sync::Arc;
use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};
use crate::errors::DockQueueResult;
use crate::models::{ActivityAction, ActivityLogEntry};
use crate::repositories::{ActivityLogRepository, RecordStore};

/// Appends audit entries to the `logs` table.
///
/// Logging is a side effect of a committed action: a failed write is logged and swallowed.
pub struct ActivityLogger {
    logs: ActivityLogRepository,
}

impl ActivityLogger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { logs: ActivityLogRepository::new(store) }
    }

    /// Records one action
    ///
    /// # Arguments
    ///
    /// * `actor` - The operator name; `System` when none was supplied
    /// * `action` - The action tag
    /// * `details` - Free text describing what happened
    pub async fn record(&self, actor: &str, action: ActivityAction, details: &str) {
        let now = Utc::now();
        let actor = if actor.trim().is_empty() { "System" } else { actor };
        let entry = ActivityLogEntry {
            id: format!("LOG-{}-{:04}", now.timestamp_millis(), rand::thread_rng().gen_range(0..10_000)),
            actor: actor.to_string(),
            action,
            details: details.to_string(),
            created_at: now,
        };

        match self.logs.insert(&entry).await {
            Ok(_) => debug!("Logged {} by {}", action, actor),
            Err(e) => warn!("Logging failed for {} by {}: {}", action, actor, e),
        }
    }

    /// Most recent entries first, bounded by the store's logs window
    pub async fn recent(&self) -> DockQueueResult<Vec<ActivityLogEntry>> {
        let mut entries = self.logs.fetch_all().await?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}
