//! # Operational Views
//!
//! Pure projections of the full record set into the lists security and admin work from.
//! Views never sort beyond the newest-check-in-first order and never change a record.

use std::collections::BTreeMap;
use serde::Serialize;
use crate::models::{DriverRecord, QueueStatus};

/// The named lists shown on the dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardView {
    /// Security gate-in ("Masuk")
    GateIn,
    /// Security gate-out ("Keluar")
    GateOut,
    /// Admin verification tab
    Verification,
    /// Admin unloading tab ("Bongkar")
    Bongkar,
    /// Admin finished tab ("Selesai")
    Selesai,
    PendingArrival,
    AtGate,
    Loading,
    Exited,
    Rejected,
}

impl DashboardView {
    pub const ALL: [DashboardView; 10] = [
        DashboardView::GateIn,
        DashboardView::GateOut,
        DashboardView::Verification,
        DashboardView::Bongkar,
        DashboardView::Selesai,
        DashboardView::PendingArrival,
        DashboardView::AtGate,
        DashboardView::Loading,
        DashboardView::Exited,
        DashboardView::Rejected,
    ];

    /// The statuses a record must be in to appear in this view
    pub fn statuses(&self) -> &'static [QueueStatus] {
        use QueueStatus::*;
        match self {
            DashboardView::GateIn => &[Booked, CheckedIn, AtGate],
            DashboardView::GateOut => &[Completed],
            DashboardView::Verification => &[Verified],
            DashboardView::Bongkar => &[Verified, Called, Loading],
            DashboardView::Selesai => &[Completed],
            DashboardView::PendingArrival => &[Booked, CheckedIn],
            DashboardView::AtGate => &[AtGate],
            DashboardView::Loading => &[Loading],
            DashboardView::Exited => &[Exited],
            DashboardView::Rejected => &[Rejected],
        }
    }

    pub fn includes(&self, status: QueueStatus) -> bool {
        self.statuses().contains(&status)
    }
}

/// Records in `view`, newest check-in first
pub fn project<'a>(records: &'a [DriverRecord], view: DashboardView) -> Vec<&'a DriverRecord> {
    let mut rows: Vec<&DriverRecord> = records.iter().filter(|r| view.includes(r.status)).collect();
    rows.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
    rows
}

/// Narrows a view by a search term: plate contains the upper-cased term, or name contains it case-insensitively
pub fn search<'a>(rows: Vec<&'a DriverRecord>, term: &str) -> Vec<&'a DriverRecord> {
    let term = term.trim();
    if term.is_empty() {
        return rows;
    }
    let plate_term = term.to_uppercase();
    let name_term = term.to_lowercase();
    rows.into_iter()
        .filter(|r| r.license_plate.contains(&plate_term) || r.name.to_lowercase().contains(&name_term))
        .collect()
}

/// Number of records in each view
pub fn counts(records: &[DriverRecord]) -> BTreeMap<DashboardView, usize> {
    DashboardView::ALL
        .iter()
        .map(|view| (*view, records.iter().filter(|r| view.includes(r.status)).count()))
        .collect()
}
