//! HTTP binding for the persistence and fetch contracts
//!
//! Thin JSON client over the platform REST API. All engine logic lives in
//! the board; this module only shapes requests and maps failures to
//! [`StoreError`].

use super::{OrderSource, TransitionStore};
use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::models::{Order, OrderFilter};
use std::time::Duration;

/// Standard API envelope returned by the backend
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[allow(dead_code)]
    code: String,
    message: String,
    data: Option<T>,
}

/// REST-backed collaborator
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    client: Client,
    base_url: String,
}

impl HttpCollaborator {
    /// Create a client against a base URL, with a request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_failure(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ApiResponse<()>>(&body)
            .map(|r| r.message)
            .unwrap_or(body);
        match status {
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                StoreError::Transport(format!("{status}: {reason}"))
            }
            _ => StoreError::Rejected(reason),
        }
    }
}

#[async_trait]
impl TransitionStore for HttpCollaborator {
    async fn commit_transition(
        &self,
        form_owner_id: &str,
        order_id: &str,
        target_stage: &str,
    ) -> Result<(), StoreError> {
        let url = self.url(&format!("api/forms/{form_owner_id}/orders/{order_id}/stage"));
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "stage": target_stage }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderSource for HttpCollaborator {
    async fn fetch_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let response = self
            .client
            .get(self.url("api/orders"))
            .query(filter)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }

        let envelope: ApiResponse<Vec<Order>> = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("invalid response body: {e}")))?;
        Ok(envelope.data.unwrap_or_default())
    }
}
