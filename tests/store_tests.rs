mod common;

use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::create_mock_settings;
use iqx_dockqueue::config::StoreBackend;
use iqx_dockqueue::errors::DockQueueError;
use iqx_dockqueue::models::{DriverPatch, DriverRecord, QueueStatus};
use iqx_dockqueue::repositories::{
    DriverRepository, HttpStore, MemoryStore, RecordStore, StoreRequest, Table,
};
use std::sync::Arc;

#[test]
fn test_only_known_tables_are_allowed() {
    assert_eq!("drivers".parse::<Table>().unwrap(), Table::Drivers);
    assert_eq!("divisions".parse::<Table>().unwrap(), Table::Divisions);
    let err = "trucks".parse::<Table>().unwrap_err();
    assert_eq!(err.to_string(), "Validation error: Table 'trucks' is not allowed.");
}

#[test]
fn test_store_request_wire_shape() {
    let request = StoreRequest::Update { table: Table::Drivers, data: json!({"id": "WH-1", "status": "CALLED"}) };
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"action": "UPDATE", "table": "drivers", "data": {"id": "WH-1", "status": "CALLED"}})
    );
    let get: StoreRequest = serde_json::from_value(json!({"action": "GET", "table": "logs"})).unwrap();
    assert_eq!(get, StoreRequest::Get { table: Table::Logs });
}

#[tokio::test]
async fn test_update_and_delete_require_id() {
    let store = MemoryStore::new(&create_mock_settings().store);
    let update = store.update(Table::Drivers, json!({"status": "CALLED"})).await.unwrap_err();
    assert!(matches!(update, DockQueueError::ValidationError(ref m) if m == "ID is required for UPDATE"));
    let delete = store
        .execute(StoreRequest::Delete { table: Table::Users, data: json!({"id": ""}) })
        .await
        .unwrap_err();
    assert!(matches!(delete, DockQueueError::ValidationError(_)));
}

#[tokio::test]
async fn test_memory_store_orders_and_windows_drivers() {
    let mut settings = create_mock_settings();
    settings.store.drivers_window = 2;
    let store = MemoryStore::new(&settings.store);
    for (id, t) in [("WH-1", 1_000), ("WH-2", 3_000), ("WH-3", 2_000)] {
        store
            .create(Table::Drivers, json!({"id": id, "checkInTime": t, "licensePlate": "B 1 X"}))
            .await
            .unwrap();
    }
    let rows = store.get(Table::Drivers).await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["WH-2", "WH-3"]);
    assert_eq!(rows[0]["licensePlate"], "B 1 X");
}

#[tokio::test]
async fn test_memory_store_orders_other_tables_by_id() {
    let store = MemoryStore::new(&create_mock_settings().store);
    for id in ["gate-b", "gate-a", "gate-c"] {
        store.create(Table::Gates, json!({"id": id, "name": id, "type": "DOCK", "status": "OPEN"})).await.unwrap();
    }
    let rows = store.get(Table::Gates).await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["gate-a", "gate-b", "gate-c"]);
}

#[tokio::test]
async fn test_memory_store_update_semantics() {
    let store = MemoryStore::new(&create_mock_settings().store);
    store.create(Table::Users, json!({"id": "u1", "name": "Ani", "role": "SECURITY", "status": "ACTIVE"})).await.unwrap();

    let duplicate = store.create(Table::Users, json!({"id": "u1", "name": "Other"})).await.unwrap_err();
    assert!(matches!(duplicate, DockQueueError::DuplicateRecord(_)));

    store.update(Table::Users, json!({"id": "u1", "pinCode": "1234"})).await.unwrap();
    let rows = store.get(Table::Users).await.unwrap();
    assert_eq!(rows[0]["pinCode"], "1234");
    assert_eq!(rows[0]["name"], "Ani");

    let missing = store.update(Table::Users, json!({"id": "u9", "name": "X"})).await.unwrap_err();
    assert!(matches!(missing, DockQueueError::StoreError(_)));

    store.delete(Table::Users, "u1").await.unwrap();
    store.delete(Table::Users, "u1").await.unwrap();
    assert!(store.get(Table::Users).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_duplicate_driver_leaves_no_document() {
    let store = MemoryStore::new(&create_mock_settings().store);
    let row = |payload: &str| {
        json!({
            "id": "WH-20250101-001",
            "licensePlate": "B 1 A",
            "documentFile": format!("data:image/jpeg;base64,{}", payload),
        })
    };
    let receipt = store.create(Table::Drivers, row("aGVsbG8=")).await.unwrap();
    let url = receipt.generated_ref.unwrap();
    let name = url.rsplit('/').next().unwrap();

    let err = store.create(Table::Drivers, row("d29ybGQ=")).await.unwrap_err();
    assert!(matches!(err, DockQueueError::DuplicateRecord(_)));
    assert_eq!(store.document_count(), 1);
    assert_eq!(store.document(name).unwrap(), b"hello".to_vec());
    assert_eq!(store.row_count(Table::Drivers), 1);
}

#[tokio::test]
async fn test_memory_store_fills_log_timestamps() {
    let store = MemoryStore::new(&create_mock_settings().store);
    store
        .create(Table::Logs, json!({"id": "l1", "userEmail": "Pos 1", "action": "SCAN_AT_GATE", "details": "x"}))
        .await
        .unwrap();
    let rows = store.get(Table::Logs).await.unwrap();
    assert!(rows[0]["createdAt"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_repository_skips_undecodable_rows() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new(&create_mock_settings().store));
    store.create(Table::Drivers, json!({"id": "broken", "checkInTime": 5})).await.unwrap();
    store
        .create(
            Table::Drivers,
            json!({
                "id": "WH-1", "name": "Budi", "phone": "0812", "licensePlate": "B 1 X", "company": "PT A",
                "purpose": "LOADING", "doNumber": null, "status": "CHECKED_IN", "gate": "NONE", "checkInTime": 1
            }),
        )
        .await
        .unwrap();

    let drivers: Vec<DriverRecord> = DriverRepository::new(store).fetch_all().await.unwrap();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].gate, None);
    assert_eq!(drivers[0].do_number, "");
}

fn http_settings(uri: &str) -> iqx_dockqueue::config::StoreSettings {
    let mut settings = create_mock_settings().store;
    settings.backend = StoreBackend::Http;
    settings.endpoint = format!("{}/api/drivers", uri);
    settings.api_key = Some(Secret::new("store-key".to_string()));
    settings
}

#[tokio::test]
async fn test_http_store_posts_get_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/drivers"))
        .and(header("authorization", "Bearer store-key"))
        .and(body_partial_json(json!({"action": "GET", "table": "gates"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "gate-2", "name": "GATE 2", "type": "DOCK", "status": "OPEN"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpStore::new(&http_settings(&server.uri())).unwrap();
    let rows = store.get(Table::Gates).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "GATE 2");
}

#[tokio::test]
async fn test_http_store_create_returns_file_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/drivers"))
        .and(body_partial_json(json!({"action": "CREATE", "table": "drivers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "fileUrl": "https://cdn.example.com/SJ_WH-1_1.jpg"
        })))
        .mount(&server)
        .await;

    let store = HttpStore::new(&http_settings(&server.uri())).unwrap();
    let receipt = store.create(Table::Drivers, json!({"id": "WH-1"})).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.generated_ref.as_deref(), Some("https://cdn.example.com/SJ_WH-1_1.jpg"));
}

#[tokio::test]
async fn test_http_store_sends_single_row_patch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "UPDATE",
            "table": "drivers",
            "data": {"id": "WH-1", "status": "CALLED", "calledBy": "Admin"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn RecordStore> = Arc::new(HttpStore::new(&http_settings(&server.uri())).unwrap());
    let mut patch = DriverPatch::for_driver("WH-1", QueueStatus::Called);
    patch.called_by = Some("Admin".into());
    DriverRepository::new(store).update(&patch).await.unwrap();
}

#[tokio::test]
async fn test_http_store_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;

    let store = HttpStore::new(&http_settings(&server.uri())).unwrap();
    let err = store.get(Table::Drivers).await.unwrap_err();
    match err {
        DockQueueError::StoreError(message) => {
            assert!(message.starts_with("API Error (drivers): 500"), "{}", message);
            assert!(message.contains("db down"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_http_store_rejects_without_request_when_id_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let store = HttpStore::new(&http_settings(&server.uri())).unwrap();
    let err = store.update(Table::Drivers, json!({"status": "CALLED"})).await.unwrap_err();
    assert!(err.is_rejection());
}
