use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use crate::alerting::notifier::{DeliveryReport, Notifier};
use crate::config::NotificationSettings;
use crate::models::{gate_label, wib, DriverRecord, Purpose};

/// The operational messages the queue sends
#[derive(Debug, Clone, PartialEq)]
pub enum QueueAlert {
    /// Security approved entry; goes to the operations group
    EntryApproved {
        company: String,
        license_plate: String,
        driver_name: String,
        do_number: String,
        purpose: Purpose,
        gate: String,
        queue_number: String,
        approved_at: DateTime<Utc>,
        approved_by: String,
    },
    /// Admin called the driver to the dock; goes to the driver's phone
    DriverCalled {
        phone: String,
        license_plate: String,
        driver_name: String,
        queue_number: Option<String>,
        gate: String,
    },
}

impl QueueAlert {
    /// Builds the approval message from the record as it looks after verification
    pub fn entry_approved(driver: &DriverRecord, approved_by: &str, approved_at: DateTime<Utc>) -> Self {
        QueueAlert::EntryApproved {
            company: driver.company.clone(),
            license_plate: driver.license_plate.clone(),
            driver_name: driver.name.clone(),
            do_number: driver.do_number.clone(),
            purpose: driver.purpose,
            gate: driver.gate.clone().unwrap_or_default(),
            queue_number: driver.queue_number.clone().unwrap_or_default(),
            approved_at,
            approved_by: approved_by.to_string(),
        }
    }

    pub fn driver_called(driver: &DriverRecord) -> Self {
        QueueAlert::DriverCalled {
            phone: driver.phone.clone(),
            license_plate: driver.license_plate.clone(),
            driver_name: driver.name.clone(),
            queue_number: driver.queue_number.clone(),
            gate: driver.gate.clone().unwrap_or_default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueueAlert::EntryApproved { .. } => "entry_approved",
            QueueAlert::DriverCalled { .. } => "driver_called",
        }
    }
}

const RULE: &str = "--------------------------------------------";

/// Renders the message text. Times are shown on the warehouse's WIB clock.
pub fn format_alert_message(alert: &QueueAlert) -> String {
    match alert {
        QueueAlert::EntryApproved {
            company, license_plate, driver_name, do_number, purpose, gate, queue_number, approved_at, approved_by,
        } => {
            format!(
                "NOTIFIKASI OPERASIONAL TRAFFIC GUDANG\n{rule}\nSTATUS: ENTRY APPROVED (AKSES MASUK)\n\n\
                 DETAIL UNIT:\nVendor   : {}\nNo. Pol  : {}\nDriver   : {}\nDokumen  : {}\nKegiatan : {}\n\n\
                 ALOKASI:\nGate     : {}\nAntrian  : {}\nWaktu    : {} WIB\nPetugas  : {}\n{rule}",
                company,
                license_plate,
                driver_name,
                do_number,
                purpose,
                gate_label(gate),
                queue_number,
                wib(*approved_at).format("%H:%M"),
                approved_by,
                rule = RULE,
            )
        }
        QueueAlert::DriverCalled { license_plate, driver_name, queue_number, gate, .. } => {
            format!(
                "PANGGILAN OPERASIONAL BONGKAR MUAT\n{rule}\nIDENTITAS UNIT:\nNo. Polisi    : {}\nNama Driver   : {}\n\
                 No. Antrian   : {}\n\nINSTRUKSI MERAPAT:\nLokasi Tujuan : {}\n\n\
                 Personel operasional telah siap di Gate (dock) untuk memproses muatan Anda.\n\
                 Mohon segera memindahkan unit dari area parkir tunggu menuju lokasi tersebut dalam waktu maksimal 10 menit.\n\
                 {rule}\nAdmin Operations\nSociolla Warehouse Management",
                license_plate,
                driver_name,
                queue_number.as_deref().unwrap_or("-"),
                gate_label(gate),
                rule = RULE,
            )
        }
    }
}

/// Resolves where each alert goes and hands it to the configured `Notifier`
pub struct AlertManager {
    notifier: Arc<dyn Notifier>,
    group_target: String,
}

impl AlertManager {
    pub fn new(settings: &NotificationSettings, notifier: Arc<dyn Notifier>) -> Self {
        info!("Initializing Alert Manager");
        Self { notifier, group_target: settings.group_target.clone() }
    }

    pub fn destination(&self, alert: &QueueAlert) -> String {
        match alert {
            QueueAlert::EntryApproved { .. } => self.group_target.clone(),
            QueueAlert::DriverCalled { phone, .. } => phone.clone(),
        }
    }

    /// Sends the alert. A failed delivery is logged and returned, never raised.
    pub async fn handle_alert(&self, alert: &QueueAlert) -> DeliveryReport {
        let destination = self.destination(alert);
        let message = format_alert_message(alert);
        let report = self.notifier.send(&destination, &message).await;
        if report.delivered {
            info!("Alert {} delivered", alert.kind());
        } else {
            warn!(
                "Alert {} not delivered to {}: {}",
                alert.kind(),
                destination,
                report.reason.as_deref().unwrap_or("unknown")
            );
        }
        report
    }
}
