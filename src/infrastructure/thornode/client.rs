use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::shared::errors::BackendError;

/// Thin JSON-over-HTTPS client for the protocol node
#[derive(Debug, Clone)]
pub struct ThornodeClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl ThornodeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// GET `path` and decode the JSON body. Error bodies are decoded too, the
    /// node reports failures as JSON with a non-2xx status.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let send = async {
            let response = self.http_client.get(&url).query(query).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = timeout(self.timeout, send)
            .await
            .map_err(|_| BackendError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| BackendError::ApiError(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Undecodable response from {} (status {}): {}", url, status, e);
            BackendError::InvalidResponse { status: status.as_u16(), message: e.to_string() }
        })
    }
}
