#![allow(dead_code)]

use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use iqx_dockqueue::alerting::RecordingNotifier;
use iqx_dockqueue::config::{
    GeofenceSettings, LoggingSettings, NotificationSettings, PollingSettings, QueueSettings, Settings, StoreBackend,
    StoreSettings,
};
use iqx_dockqueue::init::{assemble, AppContext};
use iqx_dockqueue::models::{
    CheckInRequest, DriverRecord, EntryType, GateConfig, GateStatus, GateType, Priority, Purpose,
};
use iqx_dockqueue::repositories::{GateRepository, MemoryStore, RecordStore};

pub const GROUP_TARGET: &str = "120363423657558569@g.us";
pub const DRIVER_PHONE: &str = "081234567890";

pub fn create_mock_settings() -> Settings {
    Settings {
        store: StoreSettings {
            backend: StoreBackend::Memory,
            endpoint: "http://localhost:3000/api/drivers".to_string(),
            api_key: None,
            timeout_ms: 2000,
            drivers_window: 500,
            logs_window: 100,
            public_document_base: "http://localhost:3000/storage/documents".to_string(),
        },
        notification: NotificationSettings {
            dev_mode: true,
            api_url: "http://localhost:9/send".to_string(),
            token: None,
            group_target: GROUP_TARGET.to_string(),
            country_code: "62".to_string(),
            timeout_ms: 2000,
        },
        geofence: GeofenceSettings {
            site_name: "Test Warehouse".to_string(),
            address: "Test Address".to_string(),
            latitude: -6.226976,
            longitude: 106.5446167,
            max_distance_meters: 1000.0,
        },
        queue: QueueSettings {
            priority_gate: "GATE 2".to_string(),
            sbi_pic: "Bu Santi".to_string(),
            sdi_pic: "Pak Azhari".to_string(),
            max_document_bytes: 4_000_000,
        },
        polling: PollingSettings { interval_secs: 5 },
        logging: LoggingSettings {
            level: "info".to_string(),
            file: None,
            path: None,
        },
    }
}

pub struct Harness {
    pub app: AppContext,
    pub store: Arc<MemoryStore>,
    pub notifier: RecordingNotifier,
}

/// An app wired to the in-memory store and a recording notifier, with GATE 2 and GATE 3 open and GATE 5 closed
pub async fn harness() -> Harness {
    harness_with(create_mock_settings()).await
}

/// Same as `harness`, on caller-adjusted settings
pub async fn harness_with(settings: Settings) -> Harness {
    let store = Arc::new(MemoryStore::new(&settings.store));
    let notifier = RecordingNotifier::new();
    let dyn_store: Arc<dyn RecordStore> = store.clone();
    let app = assemble(Arc::new(settings), Arc::clone(&dyn_store), Arc::new(notifier.clone()));

    let gates = GateRepository::new(dyn_store);
    for (id, name, status) in [
        ("gate-2", "GATE 2", GateStatus::Open),
        ("gate-3", "GATE 3", GateStatus::Open),
        ("gate-5", "GATE 5", GateStatus::Closed),
    ] {
        gates
            .insert(&GateConfig {
                id: id.to_string(),
                name: name.to_string(),
                gate_type: GateType::Dock,
                status,
            })
            .await
            .expect("seed gate");
    }

    Harness { app, store, notifier }
}

pub fn walk_in(name: &str, plate: &str) -> CheckInRequest {
    CheckInRequest {
        name: name.to_string(),
        phone: DRIVER_PHONE.to_string(),
        license_plate: plate.to_string(),
        company: "PT Vendor Logistik".to_string(),
        purpose: Purpose::Unloading,
        do_number: "PO/SBI/2025/7".to_string(),
        pic: Some("Bu Santi".to_string()),
        notes: Some("[GPS: OK, Dist: 120m]".to_string()),
        entry_type: EntryType::WalkIn,
        priority: Priority::Normal,
        document: None,
    }
}

/// A stored-shape record with the given status, checked in `minutes_ago`
pub fn record(id: &str, status: &str, minutes_ago: i64) -> DriverRecord {
    let checked_in: DateTime<Utc> = Utc::now() - Duration::minutes(minutes_ago);
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Driver {}", id),
        "phone": DRIVER_PHONE,
        "licensePlate": format!("B {} XYZ", 1000 + minutes_ago),
        "company": "PT Vendor Logistik",
        "entryType": "WALK_IN",
        "purpose": "LOADING",
        "doNumber": "PO/SDI/2025/1",
        "status": status,
        "checkInTime": checked_in.timestamp_millis(),
    }))
    .expect("valid record json")
}
