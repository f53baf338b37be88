//! HTTP plumbing shared by the algod and indexer clients.
//!
//! # Responsibilities
//! - Build request URLs from a resolved endpoint
//! - Attach the service API token
//! - Enforce a per-request timeout
//! - Map non-success statuses to [`LedgerError::Http`]

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::timeout;
use url::Url;

use crate::config::schema::RetryConfig;
use crate::ledger::types::{LedgerError, LedgerResult};
use crate::network::ServiceEndpoint;
use crate::resilience::retry_idempotent;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// A REST service reachable at one base URL.
#[derive(Clone)]
pub struct ServiceClient {
    name: &'static str,
    http: Client,
    base: Url,
    token_header: &'static str,
    token: String,
    timeout_secs: u64,
    retry: RetryConfig,
}

impl ServiceClient {
    pub fn new(
        name: &'static str,
        endpoint: &ServiceEndpoint,
        token_header: &'static str,
        timeout_secs: u64,
        retry: RetryConfig,
    ) -> LedgerResult<Self> {
        let base = endpoint.url()?;
        Ok(Self {
            name,
            http: Client::new(),
            base,
            token_header,
            token: endpoint.token.clone(),
            timeout_secs,
            retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> LedgerResult<Url> {
        let joined = format!("{}{}", self.base.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| LedgerError::Rpc(format!("Invalid request URL '{}': {}", joined, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.header(self.token_header, &self.token)
        }
    }

    async fn execute(&self, request: RequestBuilder) -> LedgerResult<Vec<u8>> {
        let send = async {
            let response = request
                .send()
                .await
                .map_err(|e| LedgerError::Rpc(format!("{} request failed: {}", self.name, e)))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| LedgerError::Rpc(format!("{} response failed: {}", self.name, e)))?;

            if !status.is_success() {
                let message = serde_json::from_slice::<ErrorBody>(&body)
                    .map(|b| b.message)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
                return Err(LedgerError::Http {
                    status: status.as_u16(),
                    message,
                });
            }
            Ok(body.to_vec())
        };

        match timeout(Duration::from_secs(self.timeout_secs), send).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(self.timeout_secs)),
        }
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, body: &[u8]) -> LedgerResult<T> {
        serde_json::from_slice(body).map_err(|e| {
            LedgerError::Encoding(format!("{} returned malformed JSON for {}: {}", self.name, path, e))
        })
    }

    async fn get_once<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> LedgerResult<T> {
        let request = self.authorize(self.http.get(self.url(path)?).query(query));
        let body = self.execute(request).await?;
        self.decode(path, &body)
    }

    /// GET a JSON document, retrying transient failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> LedgerResult<T> {
        tracing::debug!(service = self.name, path, "GET");
        retry_idempotent(&self.retry, path, || self.get_once(path, query)).await
    }

    /// POST a binary body once and decode the JSON answer.
    pub async fn post_binary<T: DeserializeOwned>(&self, path: &str, body: Vec<u8>) -> LedgerResult<T> {
        tracing::debug!(service = self.name, path, bytes = body.len(), "POST");
        let request = self
            .authorize(self.http.post(self.url(path)?))
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(body);
        let body = self.execute(request).await?;
        self.decode(path, &body)
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("name", &self.name)
            .field("base", &self.base.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
