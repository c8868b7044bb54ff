use crate::models::{ActivityLogEntry, DivisionConfig, DriverRecord, GateConfig, UserProfile};
use crate::repositories::repository_trait::{Record, Table, TableRepository};

pub type DriverRepository = TableRepository<DriverRecord>;
pub type GateRepository = TableRepository<GateConfig>;
pub type ActivityLogRepository = TableRepository<ActivityLogEntry>;
pub type UserRepository = TableRepository<UserProfile>;
pub type DivisionRepository = TableRepository<DivisionConfig>;

impl Record for DriverRecord {
    const TABLE: Table = Table::Drivers;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for GateConfig {
    const TABLE: Table = Table::Gates;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for ActivityLogEntry {
    const TABLE: Table = Table::Logs;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for UserProfile {
    const TABLE: Table = Table::Users;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for DivisionConfig {
    const TABLE: Table = Table::Divisions;

    fn record_id(&self) -> &str {
        &self.id
    }
}
