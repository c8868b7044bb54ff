//! # Driver Record Representation

//! This module defines the `DriverRecord` struct, one row per check-in or booking, together with the
//! partial update (`DriverPatch`) the queue state machine sends to the store and the `CheckInRequest`
//! that creates a record. Field names cross the store boundary in camelCase; timestamps as epoch milliseconds.

use chrono::{DateTime, Utc};
use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;
use crate::errors::{DockQueueError, DockQueueResult};
use crate::models::istatus::{EntryType, Priority, Purpose, QueueStatus};

/// Represents a single driver check-in and its progress through the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    /// `WH-YYYYMMDD-NNN`, immutable after creation
    pub id: String,
    pub name: String,
    pub phone: String,
    /// Assembled plate, e.g. `B 1234 XYZ`
    pub license_plate: String,
    /// Vendor or carrier name
    pub company: String,
    #[serde(default)]
    pub entry_type: EntryType,
    pub purpose: Purpose,
    #[serde(default)]
    pub priority: Priority,
    /// Purchase/delivery order number, formatted or free text
    #[serde(default, deserialize_with = "null_as_empty")]
    pub do_number: String,
    #[serde(default)]
    pub pic: Option<String>,
    /// Public URL of the delivery document photo
    #[serde(default)]
    pub document_file: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: QueueStatus,
    #[serde(default, deserialize_with = "deserialize_gate")]
    pub gate: Option<String>,
    #[serde(default)]
    pub queue_number: Option<String>,
    #[serde(with = "ts_milliseconds")]
    pub check_in_time: DateTime<Utc>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub arrived_at_gate_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub verified_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub called_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub loading_start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verified_by: Option<String>,
    #[serde(default)]
    pub called_by: Option<String>,
    #[serde(default)]
    pub exit_verified_by: Option<String>,
    #[serde(default)]
    pub security_notes: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl DriverRecord {
    /// Merges a partial update into the record, touching only the fields the patch carries
    pub fn apply(&mut self, patch: &DriverPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        merge(&mut self.gate, &patch.gate);
        merge(&mut self.queue_number, &patch.queue_number);
        merge(&mut self.arrived_at_gate_time, &patch.arrived_at_gate_time);
        merge(&mut self.verified_time, &patch.verified_time);
        merge(&mut self.called_time, &patch.called_time);
        merge(&mut self.loading_start_time, &patch.loading_start_time);
        merge(&mut self.end_time, &patch.end_time);
        merge(&mut self.exit_time, &patch.exit_time);
        merge(&mut self.verified_by, &patch.verified_by);
        merge(&mut self.called_by, &patch.called_by);
        merge(&mut self.exit_verified_by, &patch.exit_verified_by);
        merge(&mut self.security_notes, &patch.security_notes);
        merge(&mut self.rejection_reason, &patch.rejection_reason);
    }

    /// The gate this record is assigned to, if verification has happened
    pub fn assigned_gate(&self) -> Option<&str> {
        self.gate.as_deref()
    }
}

fn merge<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *field = Some(v.clone());
    }
}

/// A single-row update sent to the store. Only `Some` fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QueueStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_number: Option<String>,
    #[serde(default, with = "ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub arrived_at_gate_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub verified_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub called_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub loading_start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_verified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl DriverPatch {
    pub fn for_driver(id: &str, status: QueueStatus) -> Self {
        Self {
            id: id.to_string(),
            status: Some(status),
            ..Default::default()
        }
    }
}

/// The document attached to a check-in: either an inline encoded image or an already published URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    /// A `data:` URL carrying a base64 image, uploaded by the store on create
    InlineImage(String),
    /// A resolved public URL
    Url(Url),
}

impl DocumentRef {
    /// Classifies a raw document value
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentRef)` for `data:` payloads and absolute http(s) URLs
    /// * `Err(DockQueueError::ValidationError)` for anything else
    pub fn parse(raw: &str) -> DockQueueResult<Self> {
        let raw = raw.trim();
        if raw.starts_with("data:") {
            if !raw.contains(";base64,") {
                return Err(DockQueueError::ValidationError("document payload is not base64 encoded".into()));
            }
            return Ok(DocumentRef::InlineImage(raw.to_string()));
        }
        let url = Url::parse(raw)
            .map_err(|e| DockQueueError::ValidationError(format!("document reference is neither a data URL nor a URL: {}", e)))?;
        match url.scheme() {
            "http" | "https" => Ok(DocumentRef::Url(url)),
            other => Err(DockQueueError::ValidationError(format!("unsupported document URL scheme '{}'", other))),
        }
    }

    /// Approximate decoded size of an inline payload; zero for URLs
    pub fn payload_bytes(&self) -> usize {
        match self {
            DocumentRef::InlineImage(data) => {
                let encoded = data.split_once(',').map(|(_, b)| b.len()).unwrap_or(0);
                encoded / 4 * 3
            }
            DocumentRef::Url(_) => 0,
        }
    }

    /// The value written to the `documentFile` field on create
    pub fn as_wire(&self) -> String {
        match self {
            DocumentRef::InlineImage(data) => data.clone(),
            DocumentRef::Url(url) => url.to_string(),
        }
    }
}

/// Everything the driver supplies when checking in
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInRequest {
    pub name: String,
    pub phone: String,
    pub license_plate: String,
    pub company: String,
    pub purpose: Purpose,
    pub do_number: String,
    pub pic: Option<String>,
    pub notes: Option<String>,
    pub entry_type: EntryType,
    pub priority: Priority,
    pub document: Option<DocumentRef>,
}

impl CheckInRequest {
    /// Rejects a request missing any field the queue needs to identify the truck
    pub fn validate(&self, max_document_bytes: usize) -> DockQueueResult<()> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("licensePlate", &self.license_plate),
            ("company", &self.company),
            ("doNumber", &self.do_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DockQueueError::ValidationError(format!("{} is required", field)));
            }
        }
        if let Some(document) = &self.document {
            if document.payload_bytes() > max_document_bytes {
                return Err(DockQueueError::ValidationError(format!(
                    "document is {} bytes, limit is {}",
                    document.payload_bytes(),
                    max_document_bytes
                )));
            }
        }
        Ok(())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unassigned rows may carry an empty string or the `NONE` placeholder instead of null
fn deserialize_gate<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
{
    let gate = Option::<String>::deserialize(deserializer)?;
    Ok(gate.filter(|g| !g.trim().is_empty() && !g.eq_ignore_ascii_case("NONE")))
}
