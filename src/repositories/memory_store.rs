//! # In-Memory Record Store
//!
//! A `RecordStore` backed by process memory. It keeps the same contract as the remote API:
//! table whitelist, ordering windows, id checks, camelCase/snake_case normalization and
//! upload of inline `data:` documents on driver creation.

use std::collections::HashMap;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use crate::config::StoreSettings;
use crate::errors::{DockQueueError, DockQueueResult};
use crate::repositories::field_case::{map_keys, to_camel_case, to_snake_case};
use crate::repositories::repository_trait::{row_id, CreateReceipt, RecordStore, StoreRequest, StoreResponse, Table};

type Row = Map<String, Value>;

pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    documents: RwLock<HashMap<String, Vec<u8>>>,
    drivers_window: usize,
    logs_window: usize,
    public_document_base: String,
}

impl MemoryStore {
    pub fn new(settings: &StoreSettings) -> Self {
        info!("Initializing in-memory record store");
        Self {
            tables: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            drivers_window: settings.drivers_window,
            logs_window: settings.logs_window,
            public_document_base: settings.public_document_base.trim_end_matches('/').to_string(),
        }
    }

    /// Bytes of an uploaded document, by file name
    pub fn document(&self, name: &str) -> Option<Vec<u8>> {
        self.documents.read().get(name).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.documents.read().len()
    }

    pub fn row_count(&self, table: Table) -> usize {
        self.tables.read().get(&table).map_or(0, Vec::len)
    }

    fn read_rows(&self, table: Table) -> Vec<Value> {
        let tables = self.tables.read();
        let mut rows: Vec<Row> = tables.get(&table).cloned().unwrap_or_default();
        // newest insert first among equal timestamps
        rows.reverse();
        match table {
            Table::Drivers => {
                rows.sort_by_key(|r| std::cmp::Reverse(millis(r, "check_in_time")));
                rows.truncate(self.drivers_window);
            }
            Table::Logs => {
                rows.sort_by_key(|r| std::cmp::Reverse(millis(r, "created_at")));
                rows.truncate(self.logs_window);
            }
            _ => rows.sort_by(|a, b| id_of(a).cmp(id_of(b))),
        }
        rows.into_iter()
            .map(|r| map_keys(Value::Object(r), to_camel_case))
            .collect()
    }

    fn create_row(&self, table: Table, data: Value) -> DockQueueResult<CreateReceipt> {
        let mut row = match map_keys(data, to_snake_case) {
            Value::Object(row) => row,
            _ => return Err(DockQueueError::ValidationError(format!("CREATE on {} needs an object payload", table))),
        };

        if table == Table::Logs && !row.contains_key("created_at") {
            row.insert("created_at".into(), Value::from(Utc::now().timestamp_millis()));
        }

        let mut tables = self.tables.write();
        let rows = tables.entry(table).or_default();
        let id = id_of(&row).to_string();
        if !id.is_empty() && rows.iter().any(|r| id_of(r) == id) {
            return Err(DockQueueError::DuplicateRecord(format!("id '{}' already exists in {}", id, table)));
        }

        let mut generated_ref = None;
        if table == Table::Drivers {
            if let Some(Value::String(doc)) = row.get("document_file").cloned() {
                if doc.starts_with("data:") {
                    generated_ref = self.upload_document(&id, &doc);
                    let resolved = generated_ref.clone().map(Value::String).unwrap_or(Value::Null);
                    row.insert("document_file".into(), resolved);
                }
            }
        }

        debug!("Created row '{}' in {}", id, table);
        rows.push(row);
        Ok(CreateReceipt { success: true, generated_ref })
    }

    /// Decodes a `data:` payload and publishes it as `SJ_{id}_{millis}.jpg`; `None` when decoding fails
    fn upload_document(&self, id: &str, data_url: &str) -> Option<String> {
        let encoded = data_url.split_once(";base64,").map(|(_, b)| b)?;
        match STANDARD.decode(encoded.trim()) {
            Ok(bytes) => {
                let name = format!("SJ_{}_{}.jpg", id, Utc::now().timestamp_millis());
                let url = format!("{}/{}", self.public_document_base, name);
                self.documents.write().insert(name, bytes);
                Some(url)
            }
            Err(e) => {
                warn!("Document upload for {} failed: {}", id, e);
                None
            }
        }
    }

    fn update_row(&self, table: Table, data: Value) -> DockQueueResult<()> {
        let patch = match map_keys(data, to_snake_case) {
            Value::Object(patch) => patch,
            _ => return Err(DockQueueError::ValidationError(format!("UPDATE on {} needs an object payload", table))),
        };
        let id = id_of(&patch).to_string();
        let mut tables = self.tables.write();
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| id_of(r) == id))
            .ok_or_else(|| DockQueueError::StoreError(format!("no row '{}' in {}", id, table)))?;
        for (key, value) in patch {
            row.insert(key, value);
        }
        Ok(())
    }

    fn delete_row(&self, table: Table, id: &str) {
        if let Some(rows) = self.tables.write().get_mut(&table) {
            rows.retain(|r| id_of(r) != id);
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn execute(&self, request: StoreRequest) -> DockQueueResult<StoreResponse> {
        request.validate()?;
        match request {
            StoreRequest::Get { table } => Ok(StoreResponse::Rows(self.read_rows(table))),
            StoreRequest::Create { table, data } => Ok(StoreResponse::Created(self.create_row(table, data)?)),
            StoreRequest::Update { table, data } => {
                self.update_row(table, data)?;
                Ok(StoreResponse::Done)
            }
            StoreRequest::Delete { table, data } => {
                if let Some(id) = row_id(&data) {
                    self.delete_row(table, id);
                }
                Ok(StoreResponse::Done)
            }
        }
    }
}

fn id_of(row: &Row) -> &str {
    row.get("id").and_then(Value::as_str).unwrap_or("")
}

fn millis(row: &Row, key: &str) -> i64 {
    row.get(key).and_then(Value::as_i64).unwrap_or(0)
}
