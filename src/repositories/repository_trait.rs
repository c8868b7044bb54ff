use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use async_trait::async_trait;
use derive_more::Display;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use crate::errors::{DockQueueError, DockQueueResult};

/// The collections the record store will accept. Anything else is rejected before a request is made.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    #[display("drivers")]
    Drivers,
    #[display("users")]
    Users,
    #[display("gates")]
    Gates,
    #[display("logs")]
    Logs,
    #[display("divisions")]
    Divisions,
}

impl FromStr for Table {
    type Err = DockQueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drivers" => Ok(Table::Drivers),
            "users" => Ok(Table::Users),
            "gates" => Ok(Table::Gates),
            "logs" => Ok(Table::Logs),
            "divisions" => Ok(Table::Divisions),
            other => Err(DockQueueError::ValidationError(format!("Table '{}' is not allowed.", other))),
        }
    }
}

/// One store operation. Serialized on the wire as `{"action": "...", "table": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum StoreRequest {
    Get { table: Table },
    Create { table: Table, data: Value },
    Update { table: Table, data: Value },
    Delete { table: Table, data: Value },
}

impl StoreRequest {
    pub fn table(&self) -> Table {
        match self {
            StoreRequest::Get { table }
            | StoreRequest::Create { table, .. }
            | StoreRequest::Update { table, .. }
            | StoreRequest::Delete { table, .. } => *table,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            StoreRequest::Get { .. } => "GET",
            StoreRequest::Create { .. } => "CREATE",
            StoreRequest::Update { .. } => "UPDATE",
            StoreRequest::Delete { .. } => "DELETE",
        }
    }

    /// Checks the request shape before it reaches any store
    ///
    /// # Returns
    ///
    /// * `Ok(())` when the payload is an object and, for updates and deletes, carries a non-empty `id`
    /// * `Err(DockQueueError::ValidationError)` otherwise
    pub fn validate(&self) -> DockQueueResult<()> {
        match self {
            StoreRequest::Get { .. } => Ok(()),
            StoreRequest::Create { data, .. } => {
                if data.is_object() {
                    Ok(())
                } else {
                    Err(DockQueueError::ValidationError(format!("CREATE on {} needs an object payload", self.table())))
                }
            }
            StoreRequest::Update { data, .. } | StoreRequest::Delete { data, .. } => {
                match row_id(data) {
                    Some(_) => Ok(()),
                    None => Err(DockQueueError::ValidationError(format!("ID is required for {}", self.action()))),
                }
            }
        }
    }
}

/// The `id` of a row payload, if present and non-empty
pub fn row_id(data: &Value) -> Option<&str> {
    data.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
}

/// Result of a create: the store may hand back a generated reference such as an uploaded document URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceipt {
    pub success: bool,
    #[serde(default, alias = "fileUrl")]
    pub generated_ref: Option<String>,
}

/// What a store returns for each kind of request
#[derive(Debug, Clone, PartialEq)]
pub enum StoreResponse {
    Rows(Vec<Value>),
    Created(CreateReceipt),
    Done,
}

/// Defines the generic asynchronous record store the queue runs on
///
/// Implementations only need `execute`; the typed helpers unwrap the matching response variant.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Runs a single request against the store
    ///
    /// # Arguments
    ///
    /// * `request`: The operation to perform
    ///
    /// # Returns
    ///
    /// * `Ok(StoreResponse)` matching the request kind
    /// * `Err(DockQueueError)` on validation, store or connection failure
    async fn execute(&self, request: StoreRequest) -> DockQueueResult<StoreResponse>;

    /// All rows of a table, in the store's ordering
    async fn get(&self, table: Table) -> DockQueueResult<Vec<Value>> {
        match self.execute(StoreRequest::Get { table }).await? {
            StoreResponse::Rows(rows) => Ok(rows),
            other => Err(unexpected(table, "GET", &other)),
        }
    }

    async fn create(&self, table: Table, data: Value) -> DockQueueResult<CreateReceipt> {
        match self.execute(StoreRequest::Create { table, data }).await? {
            StoreResponse::Created(receipt) => Ok(receipt),
            other => Err(unexpected(table, "CREATE", &other)),
        }
    }

    async fn update(&self, table: Table, data: Value) -> DockQueueResult<()> {
        match self.execute(StoreRequest::Update { table, data }).await? {
            StoreResponse::Done => Ok(()),
            other => Err(unexpected(table, "UPDATE", &other)),
        }
    }

    async fn delete(&self, table: Table, id: &str) -> DockQueueResult<()> {
        let data = serde_json::json!({ "id": id });
        match self.execute(StoreRequest::Delete { table, data }).await? {
            StoreResponse::Done => Ok(()),
            other => Err(unexpected(table, "DELETE", &other)),
        }
    }
}

fn unexpected(table: Table, action: &str, response: &StoreResponse) -> DockQueueError {
    DockQueueError::StoreError(format!("unexpected response to {} on {}: {:?}", action, table, response))
}

/// A row type that lives in one store table
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: Table;

    fn record_id(&self) -> &str;
}

/// Typed access to one table of a `RecordStore`
pub struct TableRepository<T> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), _record: PhantomData }
    }
}

impl<T: Record> TableRepository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store, _record: PhantomData }
    }

    /// Fetches every row of the table
    ///
    /// Rows that cannot be decoded are skipped with a warning so one bad row does not blank a dashboard.
    pub async fn fetch_all(&self) -> DockQueueResult<Vec<T>> {
        let rows = self.store.get(T::TABLE).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<T>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping undecodable {} row: {}", T::TABLE, e);
                    None
                }
            })
            .collect())
    }

    pub async fn find(&self, id: &str) -> DockQueueResult<Option<T>> {
        Ok(self.fetch_all().await?.into_iter().find(|r| r.record_id() == id))
    }

    pub async fn insert(&self, item: &T) -> DockQueueResult<CreateReceipt> {
        self.store.create(T::TABLE, serde_json::to_value(item)?).await
    }

    /// Sends a partial row; the payload must carry the `id`
    pub async fn update<P: Serialize + Sync>(&self, patch: &P) -> DockQueueResult<()> {
        self.store.update(T::TABLE, serde_json::to_value(patch)?).await
    }

    pub async fn delete(&self, id: &str) -> DockQueueResult<()> {
        self.store.delete(T::TABLE, id).await
    }
}
