mod common;

use common::{create_mock_settings, record};
use iqx_dockqueue::models::{DocumentNumberInput, DocumentRef, EntryType, LicensePlate, PoEntity, Priority, Purpose};
use iqx_dockqueue::services::{Geofence, GeofenceClearance, GeofenceVerdict, GeoPoint};
use iqx_dockqueue::state_management::{counts, project, search, CargoDetails, CheckInWizard, DashboardView, PersonalData, WizardStep};

fn ids(rows: &[&iqx_dockqueue::models::DriverRecord]) -> Vec<String> {
    rows.iter().map(|r| r.id.clone()).collect()
}

fn fleet() -> Vec<iqx_dockqueue::models::DriverRecord> {
    vec![
        record("booked", "BOOKED", 50),
        record("checked", "CHECKED_IN", 10),
        record("gate", "AT_GATE", 30),
        record("verified", "VERIFIED", 20),
        record("called", "CALLED", 40),
        record("loading", "LOADING", 5),
        record("done", "COMPLETED", 60),
        record("gone", "EXITED", 70),
        record("rejected", "REJECTED", 15),
    ]
}

#[test]
fn test_security_views() {
    let records = fleet();
    assert_eq!(ids(&project(&records, DashboardView::GateIn)), vec!["checked", "gate", "booked"]);
    assert_eq!(ids(&project(&records, DashboardView::GateOut)), vec!["done"]);
}

#[test]
fn test_admin_tabs() {
    let records = fleet();
    assert_eq!(ids(&project(&records, DashboardView::Verification)), vec!["verified"]);
    assert_eq!(ids(&project(&records, DashboardView::Bongkar)), vec!["loading", "verified", "called"]);
    assert_eq!(ids(&project(&records, DashboardView::Selesai)), vec!["done"]);
}

#[test]
fn test_counts_cover_every_view() {
    let records = fleet();
    let counts = counts(&records);
    assert_eq!(counts[&DashboardView::GateIn], 3);
    assert_eq!(counts[&DashboardView::Bongkar], 3);
    assert_eq!(counts[&DashboardView::PendingArrival], 2);
    assert_eq!(counts[&DashboardView::Exited], 1);
    assert_eq!(counts[&DashboardView::Rejected], 1);
    assert_eq!(counts.len(), DashboardView::ALL.len());
}

#[test]
fn test_search_matches_plate_and_name() {
    let mut records = fleet();
    records[1].license_plate = "B 1234 XYZ".into();
    records[2].name = "Siti Aminah".into();

    let gate_in = project(&records, DashboardView::GateIn);
    assert_eq!(ids(&search(gate_in.clone(), "b 12")), vec!["checked"]);
    assert_eq!(ids(&search(gate_in.clone(), "AMINAH")), vec!["gate"]);
    assert_eq!(search(gate_in, "").len(), 3);
}

#[test]
fn test_geofence_blocks_at_1500m_and_passes_at_200m() {
    let geofence = Geofence::new(&create_mock_settings().geofence);
    let site = geofence.site();

    let far = geofence.evaluate(Some(GeoPoint::new(site.latitude + 0.0135, site.longitude)));
    assert!(!far.is_allowed());
    assert!((far.distance_meters().unwrap() - 1501.0).abs() < 1.0);
    assert_eq!(geofence.clear(far), None);

    let near = geofence.evaluate(Some(GeoPoint::new(site.latitude + 0.0018, site.longitude)));
    assert!(near.is_allowed());
    let clearance = geofence.clear(near).unwrap();
    assert_eq!(clearance.annotation(), "[GPS: OK, Dist: 200m]");
}

#[test]
fn test_geofence_bypass_when_location_unavailable() {
    let geofence = Geofence::new(&create_mock_settings().geofence);
    let verdict = geofence.evaluate(None);
    assert_eq!(verdict, GeofenceVerdict::LocationUnavailable);
    assert_eq!(geofence.bypass(verdict).annotation(), "[GPS: BYPASS, Dist: ?m]");
}

fn personal() -> PersonalData {
    PersonalData {
        name: "Budi".into(),
        phone: "081234567890".into(),
        plate: LicensePlate::new("b", "1234", "xyz").unwrap(),
    }
}

fn cargo(entity: PoEntity) -> CargoDetails {
    CargoDetails {
        company: "PT Vendor Logistik".into(),
        purpose: Purpose::Unloading,
        document_number: DocumentNumberInput {
            entity,
            year: "2025".into(),
            sequence: "7".into(),
            free_text: "SJ-881/EXT".into(),
        },
        pic: "Pak Dedi".into(),
        notes: "Pallet rusak".into(),
        priority: Priority::Urgent,
    }
}

#[test]
fn test_wizard_builds_check_in_request() {
    let settings = create_mock_settings();
    let clearance = GeofenceClearance::Ok { distance_meters: 200.2 };
    let mut wizard = CheckInWizard::start(clearance, settings.queue.clone());

    wizard.choose_entry_type(EntryType::Booking).unwrap();
    wizard.submit_personal(personal()).unwrap();
    wizard.submit_cargo(cargo(PoEntity::Sbi)).unwrap();
    wizard
        .attach_document(Some(DocumentRef::parse("data:image/jpeg;base64,aGVsbG8=").unwrap()))
        .unwrap();
    assert_eq!(wizard.step(), WizardStep::Ready);

    let request = wizard.finish().unwrap();
    assert_eq!(request.license_plate, "B 1234 XYZ");
    assert_eq!(request.do_number, "PO/SBI/2025/7");
    assert_eq!(request.pic.as_deref(), Some("Bu Santi"));
    assert_eq!(request.notes.as_deref(), Some("Pallet rusak [GPS: OK, Dist: 200m]"));
    assert_eq!(request.entry_type, EntryType::Booking);
    assert_eq!(request.priority, Priority::Urgent);
    assert!(request.document.is_some());
    request.validate(settings.queue.max_document_bytes).unwrap();
}

#[test]
fn test_wizard_other_entity_keeps_typed_pic_and_free_text() {
    let mut wizard = CheckInWizard::start(GeofenceClearance::Bypass { distance_meters: None }, create_mock_settings().queue);
    wizard.choose_entry_type(EntryType::WalkIn).unwrap();
    wizard.submit_personal(personal()).unwrap();
    wizard.submit_cargo(cargo(PoEntity::Other)).unwrap();
    wizard.attach_document(None).unwrap();

    let request = wizard.finish().unwrap();
    assert_eq!(request.do_number, "SJ-881/EXT");
    assert_eq!(request.pic.as_deref(), Some("Pak Dedi"));
    assert_eq!(request.notes.as_deref(), Some("Pallet rusak [GPS: BYPASS, Dist: ?m]"));
}

#[test]
fn test_wizard_validates_each_step() {
    let mut wizard = CheckInWizard::start(GeofenceClearance::Ok { distance_meters: 10.0 }, create_mock_settings().queue);
    assert!(wizard.submit_personal(personal()).is_err());
    wizard.choose_entry_type(EntryType::WalkIn).unwrap();

    let mut no_number = personal();
    no_number.plate = LicensePlate::new("B", "", "XYZ").unwrap();
    assert!(wizard.submit_personal(no_number).is_err());
    assert_eq!(wizard.step(), WizardStep::PersonalData);

    wizard.submit_personal(personal()).unwrap();
    let mut blank_sequence = cargo(PoEntity::Sdi);
    blank_sequence.document_number.sequence = "  ".into();
    assert!(wizard.submit_cargo(blank_sequence).is_err());
    assert_eq!(wizard.step(), WizardStep::Cargo);

    wizard.back();
    assert_eq!(wizard.step(), WizardStep::PersonalData);
    assert_eq!(wizard.draft().personal, Some(personal()));
}
