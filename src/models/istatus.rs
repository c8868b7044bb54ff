//! # Queue Status and Classification Enums

//! This module defines the lifecycle status of a driver check-in and the classification enums recorded on it.
//! The transition graph lives on `QueueStatus` so every caller agrees on which moves are legal.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::errors::DockQueueError;

/// Represents the lifecycle status of a driver record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    /// A scheduled visit registered ahead of arrival.
    Booked,
    /// A walk-in driver that has submitted the check-in form.
    CheckedIn,
    /// Security has scanned or selected the driver at the gate.
    AtGate,
    /// Security approved entry; a gate and queue number are assigned.
    Verified,
    /// Admin has called the driver to the dock.
    Called,
    /// Loading or unloading is in progress.
    Loading,
    /// Loading or unloading has finished; the truck may leave.
    Completed,
    /// The truck has passed gate-out.
    Exited,
    /// Security refused entry.
    Rejected,
}

impl QueueStatus {
    pub const ALL: [QueueStatus; 9] = [
        QueueStatus::Booked,
        QueueStatus::CheckedIn,
        QueueStatus::AtGate,
        QueueStatus::Verified,
        QueueStatus::Called,
        QueueStatus::Loading,
        QueueStatus::Completed,
        QueueStatus::Exited,
        QueueStatus::Rejected,
    ];

    /// The status a freshly created record starts in.
    pub fn initial(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Booking => QueueStatus::Booked,
            EntryType::WalkIn => QueueStatus::CheckedIn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Booked => "BOOKED",
            QueueStatus::CheckedIn => "CHECKED_IN",
            QueueStatus::AtGate => "AT_GATE",
            QueueStatus::Verified => "VERIFIED",
            QueueStatus::Called => "CALLED",
            QueueStatus::Loading => "LOADING",
            QueueStatus::Completed => "COMPLETED",
            QueueStatus::Exited => "EXITED",
            QueueStatus::Rejected => "REJECTED",
        }
    }

    /// Whether a record in this status can still move.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Exited | QueueStatus::Rejected)
    }

    /// The directed transition graph. No back-transitions; REJECTED only from AT_GATE.
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Booked, AtGate)
                | (CheckedIn, AtGate)
                | (AtGate, Verified)
                | (AtGate, Rejected)
                | (Verified, Called)
                | (Called, Loading)
                | (Loading, Completed)
                | (Completed, Exited)
        )
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = DockQueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueueStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DockQueueError::ValidationError(format!("unknown queue status '{}'", s)))
    }
}

/// How the driver arrived in the system. Set once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    #[default]
    WalkIn,
    Booking,
}

/// Whether the truck is collecting or delivering goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Purpose {
    Loading,
    Unloading,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purpose::Loading => f.write_str("LOADING"),
            Purpose::Unloading => f.write_str("UNLOADING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
}
