use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;
use crate::config::StoreSettings;
use crate::errors::{DockQueueError, DockQueueResult};
use crate::repositories::repository_trait::{CreateReceipt, RecordStore, StoreRequest, StoreResponse};

/// A `RecordStore` that forwards every request to the remote row API as a single JSON POST.
pub struct HttpStore {
    client: Client,
    endpoint: Url,
    api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl HttpStore {
    /// Creates a new `HttpStore`
    ///
    /// # Arguments
    ///
    /// * `settings`: The store settings holding the endpoint, key and timeout
    ///
    /// # Returns
    ///
    /// * `Ok(HttpStore)` if the endpoint parses and the client builds
    /// * `Err(DockQueueError)` otherwise
    pub fn new(settings: &StoreSettings) -> DockQueueResult<Self> {
        let endpoint = settings.endpoint_url()?;
        info!("Initializing HTTP record store at {}", endpoint);
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self { client, endpoint, api_key: settings.api_key.clone() })
    }
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn execute(&self, request: StoreRequest) -> DockQueueResult<StoreResponse> {
        request.validate()?;
        let table = request.table();
        let action = request.action();
        debug!("Store request {} on {}", action, table);

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Store rejected {} on {}: {}", action, table, status);
            return Err(DockQueueError::StoreError(format!("API Error ({}): {} - {}", table, status, body)));
        }

        match request {
            StoreRequest::Get { .. } => {
                let rows: Vec<Value> = serde_json::from_str(&body)?;
                Ok(StoreResponse::Rows(rows))
            }
            StoreRequest::Create { .. } => {
                let receipt: CreateReceipt = serde_json::from_str(&body)?;
                if !receipt.success {
                    return Err(DockQueueError::StoreError(format!("API Error ({}): create not acknowledged", table)));
                }
                Ok(StoreResponse::Created(receipt))
            }
            StoreRequest::Update { .. } | StoreRequest::Delete { .. } => {
                let ack: Ack = serde_json::from_str(&body)?;
                if !ack.success {
                    let reason = ack.error.unwrap_or_else(|| "not acknowledged".to_string());
                    return Err(DockQueueError::StoreError(format!("API Error ({}): {}", table, reason)));
                }
                Ok(StoreResponse::Done)
            }
        }
    }
}
