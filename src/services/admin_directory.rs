use std::sync::Arc;
use chrono::Utc;
use tracing::info;
use crate::errors::{DockQueueError, DockQueueResult};
use crate::models::{AccountStatus, ActivityAction, DivisionConfig, GateConfig, UserProfile};
use crate::repositories::{DivisionRepository, GateRepository, RecordStore, UserRepository};
use crate::state_management::activity_logger::ActivityLogger;

const DEFAULT_THEME: &str = "slate";

/// Maintains gates, operator profiles and divisions. Every change is logged.
pub struct AdminDirectory {
    gates: GateRepository,
    users: UserRepository,
    divisions: DivisionRepository,
    activity: Arc<ActivityLogger>,
}

impl AdminDirectory {
    pub fn new(store: Arc<dyn RecordStore>, activity: Arc<ActivityLogger>) -> Self {
        Self {
            gates: GateRepository::new(Arc::clone(&store)),
            users: UserRepository::new(Arc::clone(&store)),
            divisions: DivisionRepository::new(store),
            activity,
        }
    }

    pub async fn list_gates(&self) -> DockQueueResult<Vec<GateConfig>> {
        self.gates.fetch_all().await
    }

    pub async fn list_open_gates(&self) -> DockQueueResult<Vec<GateConfig>> {
        Ok(self.gates.fetch_all().await?.into_iter().filter(GateConfig::is_open).collect())
    }

    /// Creates a gate, or updates it when the id already exists. A blank id becomes `gate-{millis}`.
    pub async fn save_gate(&self, mut gate: GateConfig, actor: &str) -> DockQueueResult<GateConfig> {
        if gate.name.trim().is_empty() {
            return Err(DockQueueError::ValidationError("gate name is required".into()));
        }
        if gate.id.trim().is_empty() {
            gate.id = format!("gate-{}", Utc::now().timestamp_millis());
        }

        if self.gates.find(&gate.id).await?.is_some() {
            self.gates.update(&gate).await?;
        } else {
            self.gates.insert(&gate).await?;
        }
        info!("Saved gate {} ({:?})", gate.name, gate.status);
        self.activity
            .record(actor, ActivityAction::SaveGate, &format!("Gate {} saved as {:?}", gate.name, gate.status))
            .await;
        Ok(gate)
    }

    pub async fn delete_gate(&self, id: &str, actor: &str) -> DockQueueResult<()> {
        self.gates.delete(id).await?;
        self.activity.record(actor, ActivityAction::DeleteGate, &format!("Gate {} deleted", id)).await;
        Ok(())
    }

    pub async fn list_users(&self) -> DockQueueResult<Vec<UserProfile>> {
        self.users.fetch_all().await
    }

    /// Adds an operator; the id must be new and the account starts ACTIVE
    pub async fn add_user(&self, mut profile: UserProfile, actor: &str) -> DockQueueResult<UserProfile> {
        if profile.id.trim().is_empty() || profile.name.trim().is_empty() {
            return Err(DockQueueError::ValidationError("user id and name are required".into()));
        }
        let users = self.users.fetch_all().await?;
        if users.iter().any(|u| u.id.eq_ignore_ascii_case(&profile.id)) {
            return Err(DockQueueError::ValidationError(format!("user id '{}' already exists", profile.id)));
        }
        profile.status = AccountStatus::Active;
        self.users.insert(&profile).await?;
        self.activity
            .record(actor, ActivityAction::AddUser, &format!("Added user {} ({})", profile.name, profile.role))
            .await;
        Ok(profile)
    }

    pub async fn update_user(&self, profile: UserProfile, actor: &str) -> DockQueueResult<UserProfile> {
        if self.users.find(&profile.id).await?.is_none() {
            return Err(DockQueueError::ValidationError(format!("user '{}' does not exist", profile.id)));
        }
        self.users.update(&profile).await?;
        self.activity
            .record(actor, ActivityAction::UpdateUser, &format!("Updated user {}", profile.id))
            .await;
        Ok(profile)
    }

    pub async fn delete_user(&self, id: &str, actor: &str) -> DockQueueResult<()> {
        self.users.delete(id).await?;
        self.activity.record(actor, ActivityAction::DeleteUser, &format!("Deleted user {}", id)).await;
        Ok(())
    }

    pub async fn list_divisions(&self) -> DockQueueResult<Vec<DivisionConfig>> {
        self.divisions.fetch_all().await
    }

    /// Creates or updates a division. The id is upper-cased; a missing theme becomes `slate`.
    pub async fn save_division(&self, mut division: DivisionConfig, actor: &str) -> DockQueueResult<DivisionConfig> {
        division.id = division.id.trim().to_uppercase();
        if division.id.is_empty() {
            return Err(DockQueueError::ValidationError("division id is required".into()));
        }
        if division.theme.as_deref().map_or(true, |t| t.trim().is_empty()) {
            division.theme = Some(DEFAULT_THEME.to_string());
        }

        if self.divisions.find(&division.id).await?.is_some() {
            self.divisions.update(&division).await?;
        } else {
            self.divisions.insert(&division).await?;
        }
        self.activity
            .record(actor, ActivityAction::SaveDivision, &format!("Division {} saved", division.id))
            .await;
        Ok(division)
    }

    pub async fn delete_division(&self, id: &str, actor: &str) -> DockQueueResult<()> {
        let id = id.trim().to_uppercase();
        self.divisions.delete(&id).await?;
        self.activity.record(actor, ActivityAction::DeleteDivision, &format!("Division {} deleted", id)).await;
        Ok(())
    }
}
