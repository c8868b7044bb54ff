mod common;

use common::{harness, walk_in};
use serde_json::json;
use iqx_dockqueue::errors::DockQueueError;
use iqx_dockqueue::models::{
    AccountStatus, ActivityAction, DivisionConfig, GateConfig, GateStatus, GateType, QueueStatus, UserProfile,
};
use iqx_dockqueue::repositories::{RecordStore, Table};
use iqx_dockqueue::state_management::DashboardView;

fn operator(id: &str, name: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: name.to_string(),
        role: "SECURITY".to_string(),
        pin_code: Some("1234".to_string()),
        status: AccountStatus::Inactive,
    }
}

#[tokio::test]
async fn test_save_gate_generates_id_then_updates_in_place() {
    let h = harness().await;
    let directory = &h.app.directory;

    let created = directory
        .save_gate(
            GateConfig { id: String::new(), name: "GATE 7".to_string(), gate_type: GateType::Dock, status: GateStatus::Open },
            "Admin Ops",
        )
        .await
        .unwrap();
    let millis = created.id.strip_prefix("gate-").expect("generated gate id");
    assert!(millis.parse::<i64>().is_ok());
    assert_eq!(h.store.row_count(Table::Gates), 4);

    let closed = GateConfig { status: GateStatus::Closed, ..created.clone() };
    directory.save_gate(closed, "Admin Ops").await.unwrap();
    assert_eq!(h.store.row_count(Table::Gates), 4);

    let gates = directory.list_gates().await.unwrap();
    let stored = gates.iter().find(|g| g.id == created.id).unwrap();
    assert_eq!(stored.status, GateStatus::Closed);
    assert!(directory.list_open_gates().await.unwrap().iter().all(|g| g.id != created.id));

    let logs = h.app.activity.recent().await.unwrap();
    assert_eq!(logs[0].action, ActivityAction::SaveGate);
    assert_eq!(logs[0].actor, "Admin Ops");
    assert_eq!(logs.iter().filter(|l| l.action == ActivityAction::SaveGate).count(), 2);
}

#[tokio::test]
async fn test_save_gate_requires_a_name() {
    let h = harness().await;
    let err = h
        .app
        .directory
        .save_gate(
            GateConfig { id: String::new(), name: "  ".to_string(), gate_type: GateType::Dock, status: GateStatus::Open },
            "Admin Ops",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DockQueueError::ValidationError(_)));
    assert_eq!(h.store.row_count(Table::Gates), 3);
}

#[tokio::test]
async fn test_saving_a_non_dock_gate_keeps_its_type() {
    let h = harness().await;
    h.store
        .create(Table::Gates, json!({"id": "gate-pos", "name": "POS UTARA", "type": "GATE", "status": "OPEN"}))
        .await
        .unwrap();

    let gate = h.app.directory.list_gates().await.unwrap().into_iter().find(|g| g.id == "gate-pos").unwrap();
    assert_eq!(gate.gate_type, GateType::Other("GATE".to_string()));
    h.app.directory.save_gate(GateConfig { status: GateStatus::Closed, ..gate }, "Admin Ops").await.unwrap();

    let rows = h.store.get(Table::Gates).await.unwrap();
    let row = rows.iter().find(|r| r["id"] == "gate-pos").unwrap();
    assert_eq!(row["type"], "GATE");
    assert_eq!(row["status"], "CLOSED");
}

#[tokio::test]
async fn test_delete_gate_is_logged() {
    let h = harness().await;
    h.app.directory.delete_gate("gate-5", "Admin Ops").await.unwrap();

    assert!(h.app.directory.list_gates().await.unwrap().iter().all(|g| g.id != "gate-5"));
    let logs = h.app.activity.recent().await.unwrap();
    assert_eq!(logs[0].action, ActivityAction::DeleteGate);
    assert!(logs[0].details.contains("gate-5"));
}

#[tokio::test]
async fn test_add_user_starts_active_and_rejects_duplicate_ids() {
    let h = harness().await;
    let directory = &h.app.directory;

    let added = directory.add_user(operator("sec01", "Ani"), "Admin Ops").await.unwrap();
    assert_eq!(added.status, AccountStatus::Active);
    assert_eq!(directory.list_users().await.unwrap()[0].status, AccountStatus::Active);

    let err = directory.add_user(operator("SEC01", "Other"), "Admin Ops").await.unwrap_err();
    assert!(matches!(err, DockQueueError::ValidationError(_)));
    assert_eq!(directory.list_users().await.unwrap().len(), 1);

    let logs = h.app.activity.recent().await.unwrap();
    assert_eq!(logs[0].action, ActivityAction::AddUser);
    assert_eq!(logs.iter().filter(|l| l.action == ActivityAction::AddUser).count(), 1);
}

#[tokio::test]
async fn test_update_and_delete_user() {
    let h = harness().await;
    let directory = &h.app.directory;
    directory.add_user(operator("sec01", "Ani"), "Admin Ops").await.unwrap();

    let renamed = UserProfile { name: "Ani Lestari".to_string(), status: AccountStatus::Active, ..operator("sec01", "") };
    directory.update_user(renamed, "Admin Ops").await.unwrap();
    assert_eq!(directory.list_users().await.unwrap()[0].name, "Ani Lestari");

    let missing = directory.update_user(operator("sec99", "Nobody"), "Admin Ops").await.unwrap_err();
    assert!(matches!(missing, DockQueueError::ValidationError(_)));

    directory.delete_user("sec01", "Admin Ops").await.unwrap();
    assert!(directory.list_users().await.unwrap().is_empty());
    assert_eq!(h.app.activity.recent().await.unwrap()[0].action, ActivityAction::DeleteUser);
}

#[tokio::test]
async fn test_save_division_uppercases_id_and_defaults_theme() {
    let h = harness().await;
    let directory = &h.app.directory;

    let saved = directory
        .save_division(
            DivisionConfig { id: " sbi ".to_string(), name: "Sinar Bahagia".to_string(), password: None, theme: None },
            "Admin Ops",
        )
        .await
        .unwrap();
    assert_eq!(saved.id, "SBI");
    assert_eq!(saved.theme.as_deref(), Some("slate"));

    directory
        .save_division(
            DivisionConfig { theme: Some("emerald".to_string()), ..saved.clone() },
            "Admin Ops",
        )
        .await
        .unwrap();
    let divisions = directory.list_divisions().await.unwrap();
    assert_eq!(divisions.len(), 1);
    assert_eq!(divisions[0].theme.as_deref(), Some("emerald"));
    assert_eq!(h.app.activity.recent().await.unwrap()[0].action, ActivityAction::SaveDivision);

    directory.delete_division("sbi", "Admin Ops").await.unwrap();
    assert!(directory.list_divisions().await.unwrap().is_empty());
    assert_eq!(h.app.activity.recent().await.unwrap()[0].action, ActivityAction::DeleteDivision);
}

#[tokio::test]
async fn test_polling_cycle_keeps_latest_snapshot() {
    let h = harness().await;
    let controller = &h.app.controller;
    assert!(controller.latest_snapshot().await.is_none());

    let qm = &h.app.queue_manager;
    let waiting = qm.check_in(walk_in("Budi", "B 1234 XYZ")).await.unwrap();
    let verified = qm.check_in(walk_in("Sari", "D 55 AB")).await.unwrap();
    qm.scan(&verified.id, "Pos 1").await.unwrap();
    qm.approve(&verified.id, "Pos 1", "GATE 2", None).await.unwrap();

    let snapshot = controller.run_polling_cycle().await.unwrap();
    assert_eq!(snapshot.count(DashboardView::GateIn), 1);
    assert_eq!(snapshot.count(DashboardView::Verification), 1);
    assert_eq!(snapshot.count(DashboardView::Bongkar), 1);
    assert_eq!(snapshot.count(DashboardView::Rejected), 0);
    assert_eq!(snapshot.view(DashboardView::GateIn)[0].id, waiting.id);
    assert_eq!(snapshot.view(DashboardView::Bongkar)[0].status, QueueStatus::Verified);

    let latest = controller.latest_snapshot().await.unwrap();
    assert_eq!(latest.taken_at, snapshot.taken_at);
    assert_eq!(latest.counts, snapshot.counts);

    qm.call(&verified.id, "Admin Ops").await.unwrap();
    let next = controller.run_polling_cycle().await.unwrap();
    assert_eq!(next.count(DashboardView::Verification), 0);
    assert_eq!(next.count(DashboardView::Bongkar), 1);
    assert_eq!(controller.latest_snapshot().await.unwrap().count(DashboardView::Verification), 0);
}
