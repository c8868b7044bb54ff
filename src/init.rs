use std::sync::Arc;
use anyhow::Result;
use tracing::info;
use crate::alerting::{AlertManager, LogNotifier, Notifier, WhatsAppNotifier};
use crate::config::{Settings, StoreBackend};
use crate::controllers::DockQueueController;
use crate::repositories::{HttpStore, MemoryStore, RecordStore};
use crate::services::{AdminDirectory, Geofence};
use crate::state_management::{ActivityLogger, DriverQueueManager};

/// Everything the service wires together at startup
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn RecordStore>,
    pub alert_manager: Arc<AlertManager>,
    pub activity: Arc<ActivityLogger>,
    pub queue_manager: Arc<DriverQueueManager>,
    pub directory: Arc<AdminDirectory>,
    pub geofence: Geofence,
    pub controller: Arc<DockQueueController>,
}

/// Picks the record store for the configured backend
pub fn build_store(settings: &Settings) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match settings.store.backend {
        StoreBackend::Http => Arc::new(HttpStore::new(&settings.store)?),
        StoreBackend::Memory => Arc::new(MemoryStore::new(&settings.store)),
    };
    info!("Record store: {}", settings.store);
    Ok(store)
}

/// Dev mode only logs messages; otherwise they go to the WhatsApp gateway
pub fn build_notifier(settings: &Settings) -> Result<Arc<dyn Notifier>> {
    if settings.notification.dev_mode {
        info!("Notifications in dev mode: messages are logged, not sent");
        Ok(Arc::new(LogNotifier))
    } else {
        Ok(Arc::new(WhatsAppNotifier::new(&settings.notification)?))
    }
}

/// Builds the application context on top of an already chosen store and notifier
pub fn assemble(settings: Arc<Settings>, store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> AppContext {
    let alert_manager = Arc::new(AlertManager::new(&settings.notification, notifier));
    let activity = Arc::new(ActivityLogger::new(Arc::clone(&store)));
    let queue_manager = Arc::new(DriverQueueManager::new(
        Arc::clone(&store),
        Arc::clone(&activity),
        Arc::clone(&alert_manager),
        settings.queue.clone(),
    ));
    let directory = Arc::new(AdminDirectory::new(Arc::clone(&store), Arc::clone(&activity)));
    let geofence = Geofence::new(&settings.geofence);
    let controller = Arc::new(DockQueueController::new(Arc::clone(&settings), Arc::clone(&queue_manager)));

    AppContext {
        settings,
        store,
        alert_manager,
        activity,
        queue_manager,
        directory,
        geofence,
        controller,
    }
}

/// Loads settings and wires the service. Logging must already be initialized by the caller.
pub fn initialize(settings: Settings) -> Result<AppContext> {
    let settings = Arc::new(settings);
    let store = build_store(&settings)?;
    let notifier = build_notifier(&settings)?;
    Ok(assemble(settings, store, notifier))
}
