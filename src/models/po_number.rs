//! # Purchase Order Number Formatting

//! Internal entities (SBI, SDI, SRI) use the `PO/{ENTITY}/{YEAR}/{SEQUENCE}` format; anything else is typed
//! by hand. SBI and SDI also have a fixed PIC that the form locks. Everything here is computed on demand.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::config::QueueSettings;
use crate::errors::DockQueueError;

/// The internal entity a purchase order belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoEntity {
    #[default]
    Sbi,
    Sdi,
    Sri,
    Other,
}

impl PoEntity {
    pub fn code(&self) -> &'static str {
        match self {
            PoEntity::Sbi => "SBI",
            PoEntity::Sdi => "SDI",
            PoEntity::Sri => "SRI",
            PoEntity::Other => "OTHER",
        }
    }

    /// Whether the PIC is fixed for this entity and must not be edited
    pub fn is_pic_locked(&self) -> bool {
        matches!(self, PoEntity::Sbi | PoEntity::Sdi)
    }

    /// The configured PIC for locked entities
    pub fn fixed_pic<'a>(&self, settings: &'a QueueSettings) -> Option<&'a str> {
        match self {
            PoEntity::Sbi => Some(settings.sbi_pic.as_str()),
            PoEntity::Sdi => Some(settings.sdi_pic.as_str()),
            PoEntity::Sri | PoEntity::Other => None,
        }
    }
}

impl fmt::Display for PoEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PoEntity {
    type Err = DockQueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SBI" => Ok(PoEntity::Sbi),
            "SDI" => Ok(PoEntity::Sdi),
            "SRI" => Ok(PoEntity::Sri),
            "OTHER" => Ok(PoEntity::Other),
            other => Err(DockQueueError::ValidationError(format!("unknown PO entity '{}'", other))),
        }
    }
}

/// `PO/{entity}/{year}/{sequence}` with year and sequence reduced to digits. The sequence is not padded.
pub fn format_po_number(entity: PoEntity, year: &str, sequence: &str) -> String {
    format!("PO/{}/{}/{}", entity.code(), digits(year), digits(sequence))
}

/// The document-number fields of the cargo step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentNumberInput {
    pub entity: PoEntity,
    pub year: String,
    pub sequence: String,
    /// Used verbatim when the entity is OTHER
    pub free_text: String,
}

impl DocumentNumberInput {
    /// The `doNumber` value for the current inputs
    pub fn do_number(&self) -> String {
        match self.entity {
            PoEntity::Other => self.free_text.clone(),
            entity => format_po_number(entity, &self.year, &self.sequence),
        }
    }

    /// Whether enough was typed to submit: a sequence for internal entities, any text for OTHER
    pub fn is_complete(&self) -> bool {
        match self.entity {
            PoEntity::Other => !self.free_text.trim().is_empty(),
            _ => !digits(&self.sequence).is_empty(),
        }
    }

    /// The PIC to record: the fixed one for locked entities, otherwise whatever was typed
    pub fn resolve_pic(&self, typed: &str, settings: &QueueSettings) -> String {
        self.entity
            .fixed_pic(settings)
            .map(str::to_string)
            .unwrap_or_else(|| typed.trim().to_string())
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
