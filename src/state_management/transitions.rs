//! # Queue Transitions
//!
//! Pure planning of one status change: given the current record, the event and a read-only view of
//! the other records and gates, produce the single-row patch to persist, the activity entry to log and
//! the alert to send. Nothing here touches the store.

use chrono::{DateTime, Utc};
use crate::errors::{DockQueueError, DockQueueResult};
use crate::models::{same_gate, ActivityAction, DriverPatch, DriverRecord, GateConfig, QueueStatus};

/// Something an operator does to a driver record
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// Security scanned the driver's code or picked the driver from the gate-in list
    ArriveAtGate,
    Approve { gate: String, notes: Option<String> },
    Reject { reason: String },
    Call,
    StartLoading,
    Complete,
    GateOut,
}

impl QueueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::ArriveAtGate => "arrive at gate",
            QueueEvent::Approve { .. } => "be approved",
            QueueEvent::Reject { .. } => "be rejected",
            QueueEvent::Call => "be called",
            QueueEvent::StartLoading => "start loading",
            QueueEvent::Complete => "complete",
            QueueEvent::GateOut => "gate out",
        }
    }

    pub fn target_status(&self) -> QueueStatus {
        match self {
            QueueEvent::ArriveAtGate => QueueStatus::AtGate,
            QueueEvent::Approve { .. } => QueueStatus::Verified,
            QueueEvent::Reject { .. } => QueueStatus::Rejected,
            QueueEvent::Call => QueueStatus::Called,
            QueueEvent::StartLoading => QueueStatus::Loading,
            QueueEvent::Complete => QueueStatus::Completed,
            QueueEvent::GateOut => QueueStatus::Exited,
        }
    }
}

/// Which message a committed transition triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    EntryApproved,
    DriverCalled,
}

/// Read-only state a transition may consult
pub struct TransitionContext<'a> {
    pub records: &'a [DriverRecord],
    pub gates: &'a [GateConfig],
    pub priority_gate: &'a str,
    pub now: DateTime<Utc>,
}

/// A planned transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// `None` when the event is already satisfied and nothing is written
    pub patch: Option<DriverPatch>,
    pub action: ActivityAction,
    pub details: String,
    pub alert: Option<AlertKind>,
}

/// Plans `event` on `record`
///
/// # Arguments
///
/// * `record`: The record as last read from the store
/// * `event`: The operator action
/// * `actor`: The operator name recorded on the row and in the activity log
/// * `ctx`: Other records and gates, and the clock
///
/// # Returns
///
/// * `Ok(Transition)` when the guard holds
/// * `Err(DockQueueError)` with the record left untouched otherwise
pub fn plan_transition(
    record: &DriverRecord,
    event: &QueueEvent,
    actor: &str,
    ctx: &TransitionContext<'_>,
) -> DockQueueResult<Transition> {
    // a repeated scan is a no-op, not an error
    if *event == QueueEvent::ArriveAtGate && record.status == QueueStatus::AtGate {
        return Ok(Transition {
            patch: None,
            action: ActivityAction::ScanAtGate,
            details: format!("Driver {} already at gate", record.license_plate),
            alert: None,
        });
    }

    let target = event.target_status();
    if !record.status.can_transition_to(target) {
        return Err(DockQueueError::InvalidTransition {
            id: record.id.clone(),
            status: record.status,
            event: event.name(),
        });
    }

    let now = ctx.now;
    let mut patch = DriverPatch::for_driver(&record.id, target);

    let (action, details, alert) = match event {
        QueueEvent::ArriveAtGate => {
            if record.arrived_at_gate_time.is_none() {
                patch.arrived_at_gate_time = Some(now);
            }
            (ActivityAction::ScanAtGate, format!("Driver {} arrived at gate", record.license_plate), None)
        }
        QueueEvent::Approve { gate, notes } => {
            let gate = resolve_open_gate(gate, ctx.gates)?;
            patch.queue_number = Some(queue_number(&gate.name, ctx.records, ctx.priority_gate));
            patch.gate = Some(gate.name.clone());
            patch.verified_time = Some(now);
            patch.verified_by = Some(actor.to_string());
            patch.security_notes = notes.clone().filter(|n| !n.trim().is_empty());
            if record.arrived_at_gate_time.is_none() {
                patch.arrived_at_gate_time = Some(now);
            }
            (
                ActivityAction::VerifyDriver,
                format!("Driver {} verified", record.license_plate),
                Some(AlertKind::EntryApproved),
            )
        }
        QueueEvent::Reject { reason } => {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(DockQueueError::ValidationError("rejection reason is required".into()));
            }
            patch.rejection_reason = Some(reason.to_string());
            patch.verified_by = Some(actor.to_string());
            (ActivityAction::RejectDriver, format!("Rejected: {}", reason), None)
        }
        QueueEvent::Call => {
            patch.called_time = Some(now);
            patch.called_by = Some(actor.to_string());
            (ActivityAction::CallDriver, format!("Driver called by {}", actor), Some(AlertKind::DriverCalled))
        }
        QueueEvent::StartLoading => {
            patch.loading_start_time = Some(now);
            (ActivityAction::UpdateStatus, format!("Status changed to {}", target), None)
        }
        QueueEvent::Complete => {
            patch.end_time = Some(now);
            (ActivityAction::UpdateStatus, format!("Status changed to {}", target), None)
        }
        QueueEvent::GateOut => {
            patch.exit_time = Some(now);
            patch.exit_verified_by = Some(actor.to_string());
            (ActivityAction::UpdateStatus, format!("Status changed to {}", target), None)
        }
    };

    Ok(Transition { patch: Some(patch), action, details, alert })
}

/// Finds the configured gate for `requested`; it must exist and be OPEN
pub fn resolve_open_gate<'a>(requested: &str, gates: &'a [GateConfig]) -> DockQueueResult<&'a GateConfig> {
    if requested.trim().is_empty() {
        return Err(DockQueueError::ValidationError("a gate is required to approve entry".into()));
    }
    let gate = gates
        .iter()
        .find(|g| g.matches(requested))
        .ok_or_else(|| DockQueueError::GateUnavailable(format!("{} is not configured", requested)))?;
    if !gate.is_open() {
        return Err(DockQueueError::GateUnavailable(format!("{} is closed", gate.name)));
    }
    Ok(gate)
}

/// Next queue number for `gate`: `A` on the priority gate, `B` elsewhere, then 1 + the numbered records on that gate.
///
/// Count-based: two verifications racing on the same gate can compute the same number.
pub fn queue_number(gate: &str, records: &[DriverRecord], priority_gate: &str) -> String {
    let prefix = if same_gate(gate, priority_gate) { 'A' } else { 'B' };
    let taken = records
        .iter()
        .filter(|r| r.queue_number.is_some())
        .filter(|r| r.assigned_gate().is_some_and(|g| same_gate(g, gate)))
        .count();
    format!("{}-{:03}", prefix, taken + 1)
}
