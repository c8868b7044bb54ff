//! # Gate Configuration

//! Gates are physical dock or entry points. Security may only assign OPEN gates; a gate closed later
//! stays valid for the records already assigned to it.

use serde::{Deserialize, Serialize};

/// What kind of point the gate is. Types other than `DOCK` keep their stored text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GateType {
    Dock,
    Other(String),
}

impl GateType {
    pub fn is_dock(&self) -> bool {
        matches!(self, GateType::Dock)
    }
}

impl From<String> for GateType {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case("DOCK") {
            GateType::Dock
        } else {
            GateType::Other(raw)
        }
    }
}

impl From<GateType> for String {
    fn from(gate_type: GateType) -> Self {
        match gate_type {
            GateType::Dock => "DOCK".to_string(),
            GateType::Other(raw) => raw,
        }
    }
}

/// Whether the gate accepts new assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Open,
    Closed,
}

/// Represents a configured gate as stored in the `gates` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub gate_type: GateType,
    pub status: GateStatus,
}

impl GateConfig {
    pub fn is_open(&self) -> bool {
        self.status == GateStatus::Open
    }

    /// Gate names are compared ignoring case and treating `_` as a space (`GATE_2` == `Gate 2`).
    pub fn matches(&self, gate_name: &str) -> bool {
        same_gate(&self.name, gate_name)
    }
}

/// Compares two gate identifiers the way the queue does
pub fn same_gate(a: &str, b: &str) -> bool {
    normalize_gate(a) == normalize_gate(b)
}

/// Human-readable gate label, e.g. `GATE_2` -> `GATE 2`
pub fn gate_label(gate: &str) -> String {
    gate.replace('_', " ")
}

fn normalize_gate(gate: &str) -> String {
    gate.trim()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
