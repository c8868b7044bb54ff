//! # Activity Log Entries

//! Append-only audit records. An entry is created once per mutating action and never updated or deleted.

use std::fmt;
use chrono::{DateTime, Utc};
use chrono::serde::ts_milliseconds;
use serde::{Deserialize, Serialize};

/// The action tag recorded for each mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    CheckIn,
    ScanAtGate,
    VerifyDriver,
    RejectDriver,
    CallDriver,
    UpdateStatus,
    AddUser,
    UpdateUser,
    DeleteUser,
    SaveGate,
    DeleteGate,
    SaveDivision,
    DeleteDivision,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::CheckIn => "CHECK_IN",
            ActivityAction::ScanAtGate => "SCAN_AT_GATE",
            ActivityAction::VerifyDriver => "VERIFY_DRIVER",
            ActivityAction::RejectDriver => "REJECT_DRIVER",
            ActivityAction::CallDriver => "CALL_DRIVER",
            ActivityAction::UpdateStatus => "UPDATE_STATUS",
            ActivityAction::AddUser => "ADD_USER",
            ActivityAction::UpdateUser => "UPDATE_USER",
            ActivityAction::DeleteUser => "DELETE_USER",
            ActivityAction::SaveGate => "SAVE_GATE",
            ActivityAction::DeleteGate => "DELETE_GATE",
            ActivityAction::SaveDivision => "SAVE_DIVISION",
            ActivityAction::DeleteDivision => "DELETE_DIVISION",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one row of the `logs` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    /// Who performed the action; stored under the legacy `userEmail` column
    #[serde(rename = "userEmail")]
    pub actor: String,
    pub action: ActivityAction,
    pub details: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
