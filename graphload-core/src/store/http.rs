// HTTP document store client: one POST per created document.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use tracing::debug;

use crate::config::StoreSection;
use crate::error::StoreError;

use super::{DocumentStore, PartitionKey, WriteReceipt};

/// Response header carrying the cost of a request.
pub const REQUEST_CHARGE_HEADER: &str = "x-ms-request-charge";
/// Request header carrying the partition key as a JSON array.
pub const PARTITION_KEY_HEADER: &str = "x-ms-documentdb-partitionkey";

/// Document store reached over HTTP.
///
/// Writes go to `{endpoint}/dbs/{database}/colls/{container}/docs`. The
/// optional auth token is forwarded verbatim in the `authorization` header;
/// producing it is the caller's concern.
#[derive(Debug)]
pub struct HttpDocumentStore {
    client: Client,
    docs_url: String,
    auth_token: Option<String>,
}

impl HttpDocumentStore {
    pub fn new(endpoint: &str, database: &str, container: &str) -> Result<Self, StoreError> {
        // reqwest is built without a bundled crypto provider.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            docs_url: format!(
                "{}/dbs/{database}/colls/{container}/docs",
                endpoint.trim_end_matches('/')
            ),
            auth_token: None,
        })
    }

    pub fn from_config(section: &StoreSection) -> Result<Self, StoreError> {
        let store = Self::new(&section.endpoint, &section.database, &section.container)?;
        Ok(match &section.auth_token {
            Some(token) if !token.is_empty() => store.with_auth_token(token.clone()),
            _ => store,
        })
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }
}

fn request_charge(headers: &HeaderMap) -> f64 {
    headers
        .get(REQUEST_CHARGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[async_trait::async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl DocumentStore for HttpDocumentStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn create_item(
        &self,
        partition_key: &PartitionKey,
        document: &[u8],
    ) -> Result<WriteReceipt, StoreError> {
        let mut request = self
            .client
            .post(&self.docs_url)
            .header(CONTENT_TYPE, "application/json")
            .header(PARTITION_KEY_HEADER, partition_key.to_header_value())
            .body(document.to_vec());
        if let Some(token) = &self.auth_token {
            request = request.header("authorization", token);
        }

        debug!(url = %self.docs_url, partition = %partition_key, "Creating item");

        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        let cost_units = request_charge(resp.headers());

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                cost_units,
                message,
            });
        }

        Ok(WriteReceipt { cost_units })
    }
}
