//! # Check-in Wizard
//!
//! The driver-facing check-in form as an explicit step machine carrying one accumulated draft:
//! `EntryType -> PersonalData -> Cargo -> Document -> Ready`. A wizard can only be opened with a
//! geofence clearance, and the clearance annotation ends up in the record's notes.

use std::fmt;
use crate::config::QueueSettings;
use crate::errors::{DockQueueError, DockQueueResult};
use crate::models::{CheckInRequest, DocumentNumberInput, DocumentRef, EntryType, LicensePlate, Priority, Purpose};
use crate::services::geofence::GeofenceClearance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    EntryType,
    PersonalData,
    Cargo,
    Document,
    Ready,
}

impl WizardStep {
    fn previous(self) -> Self {
        match self {
            WizardStep::EntryType | WizardStep::PersonalData => WizardStep::EntryType,
            WizardStep::Cargo => WizardStep::PersonalData,
            WizardStep::Document => WizardStep::Cargo,
            WizardStep::Ready => WizardStep::Document,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::EntryType => "entry type",
            WizardStep::PersonalData => "personal data",
            WizardStep::Cargo => "cargo",
            WizardStep::Document => "document",
            WizardStep::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalData {
    pub name: String,
    pub phone: String,
    pub plate: LicensePlate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CargoDetails {
    pub company: String,
    pub purpose: Purpose,
    pub document_number: DocumentNumberInput,
    /// Typed PIC; ignored when the entity has a fixed PIC
    pub pic: String,
    pub notes: String,
    pub priority: Priority,
}

/// Everything collected so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckInDraft {
    pub entry_type: EntryType,
    pub personal: Option<PersonalData>,
    pub cargo: Option<CargoDetails>,
    pub document: Option<DocumentRef>,
}

pub struct CheckInWizard {
    step: WizardStep,
    draft: CheckInDraft,
    clearance: GeofenceClearance,
    settings: QueueSettings,
}

impl CheckInWizard {
    /// Opens the wizard for a session that has passed, or bypassed, the geofence
    pub fn start(clearance: GeofenceClearance, settings: QueueSettings) -> Self {
        Self { step: WizardStep::EntryType, draft: CheckInDraft::default(), clearance, settings }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &CheckInDraft {
        &self.draft
    }

    pub fn back(&mut self) {
        self.step = self.step.previous();
    }

    pub fn choose_entry_type(&mut self, entry_type: EntryType) -> DockQueueResult<()> {
        self.ensure_step(WizardStep::EntryType)?;
        self.draft.entry_type = entry_type;
        self.step = WizardStep::PersonalData;
        Ok(())
    }

    /// Name, phone, plate prefix and plate number are required
    pub fn submit_personal(&mut self, personal: PersonalData) -> DockQueueResult<()> {
        self.ensure_step(WizardStep::PersonalData)?;
        if personal.name.trim().is_empty() {
            return Err(DockQueueError::ValidationError("name is required".into()));
        }
        if personal.phone.trim().is_empty() {
            return Err(DockQueueError::ValidationError("phone is required".into()));
        }
        if !personal.plate.is_complete() {
            return Err(DockQueueError::ValidationError("plate prefix and number are required".into()));
        }
        self.draft.personal = Some(personal);
        self.step = WizardStep::Cargo;
        Ok(())
    }

    /// Company and a complete document number are required
    pub fn submit_cargo(&mut self, cargo: CargoDetails) -> DockQueueResult<()> {
        self.ensure_step(WizardStep::Cargo)?;
        if cargo.company.trim().is_empty() {
            return Err(DockQueueError::ValidationError("company is required".into()));
        }
        if !cargo.document_number.is_complete() {
            return Err(DockQueueError::ValidationError("document number is incomplete".into()));
        }
        self.draft.cargo = Some(cargo);
        self.step = WizardStep::Document;
        Ok(())
    }

    /// Attaches the delivery document photo, or skips it
    pub fn attach_document(&mut self, document: Option<DocumentRef>) -> DockQueueResult<()> {
        self.ensure_step(WizardStep::Document)?;
        if let Some(doc) = &document {
            if doc.payload_bytes() > self.settings.max_document_bytes {
                return Err(DockQueueError::ValidationError(format!(
                    "document is {} bytes, limit is {}",
                    doc.payload_bytes(),
                    self.settings.max_document_bytes
                )));
            }
        }
        self.draft.document = document;
        self.step = WizardStep::Ready;
        Ok(())
    }

    /// Turns the completed draft into a check-in request
    pub fn finish(self) -> DockQueueResult<CheckInRequest> {
        self.ensure_step(WizardStep::Ready)?;
        let CheckInDraft { entry_type, personal, cargo, document } = self.draft;
        let (Some(personal), Some(cargo)) = (personal, cargo) else {
            return Err(DockQueueError::ValidationError("check-in draft is incomplete".into()));
        };

        let pic = cargo.document_number.resolve_pic(&cargo.pic, &self.settings);
        let annotation = self.clearance.annotation();
        let notes = match cargo.notes.trim() {
            "" => annotation,
            typed => format!("{} {}", typed, annotation),
        };

        Ok(CheckInRequest {
            name: personal.name.trim().to_string(),
            phone: personal.phone.trim().to_string(),
            license_plate: personal.plate.assemble(),
            company: cargo.company.trim().to_string(),
            purpose: cargo.purpose,
            do_number: cargo.document_number.do_number(),
            pic: Some(pic).filter(|p| !p.is_empty()),
            notes: Some(notes),
            entry_type,
            priority: cargo.priority,
            document,
        })
    }

    fn ensure_step(&self, step: WizardStep) -> DockQueueResult<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(DockQueueError::ValidationError(format!("wizard is at the {} step, not {}", self.step, step)))
        }
    }
}
