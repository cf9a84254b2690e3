//! Prediction history operations against the backend.
//!
//! The backend keeps one history list per account. Records come back in
//! storage order and the client never reorders them; deletion works by
//! id, with batch deletes fanned out concurrently and reported per id.

use crate::auth::Session;
use crate::config::{NetworkConfig, Settings};
use crate::error::{HeartviewError, Result};
use crate::records::PredictionRecord;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

/// Client for the backend's history endpoints.
pub struct HistoryClient {
    client: Client,
    api_base: String,
}

/// Per-id result of a batch delete.
///
/// A batch never fails as a whole; every id is attempted and the ones
/// that could not be removed are reported with their errors so the
/// caller can re-fetch and reconcile.
#[derive(Debug)]
pub struct BatchDeleteOutcome {
    /// Ids confirmed removed by the backend.
    pub deleted: Vec<String>,
    /// Ids that failed, with the error for each.
    pub failed: Vec<(String, HeartviewError)>,
}

impl BatchDeleteOutcome {
    /// True when every requested id was deleted.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl HistoryClient {
    /// Create a client for the configured backend.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| HeartviewError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            api_base: settings.api_base.clone(),
        })
    }

    /// Fetch the signed-in user's prediction history, in backend order.
    pub async fn fetch_history(&self, session: &Session) -> Result<Vec<PredictionRecord>> {
        let url = format!("{}/history", self.api_base);
        let response = self
            .client
            .get(&url)
            .header("Authorization", session.bearer_header())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(HeartviewError::SessionExpired);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HeartviewError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let records: Vec<PredictionRecord> =
            response.json().await.map_err(|e| HeartviewError::Json {
                message: format!("Failed to parse history response: {}", e),
                source: None,
            })?;
        debug!("Fetched {} history records", records.len());
        Ok(records)
    }

    /// Delete one record by id.
    pub async fn delete_record(&self, session: &Session, id: &str) -> Result<()> {
        let url = format!("{}/history/{}", self.api_base, urlencoding::encode(id));
        let response = self
            .client
            .delete(&url)
            .header("Authorization", session.bearer_header())
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                debug!("Deleted record {}", id);
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(HeartviewError::SessionExpired),
            StatusCode::NOT_FOUND => Err(HeartviewError::RecordNotFound { id: id.to_string() }),
            s => {
                let message = response.text().await.unwrap_or_default();
                Err(HeartviewError::Backend {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }

    /// Delete a batch of records concurrently, one request per id.
    pub async fn delete_records(&self, session: &Session, ids: &[String]) -> BatchDeleteOutcome {
        let attempts = ids.iter().map(|id| async move {
            let result = self.delete_record(session, id).await;
            (id.clone(), result)
        });

        let mut outcome = BatchDeleteOutcome {
            deleted: Vec::new(),
            failed: Vec::new(),
        };
        for (id, result) in join_all(attempts).await {
            match result {
                Ok(()) => outcome.deleted.push(id),
                Err(e) => {
                    warn!("Failed to delete record {}: {}", id, e);
                    outcome.failed.push((id, e));
                }
            }
        }

        info!(
            "Batch delete removed {} of {} records",
            outcome.deleted.len(),
            ids.len()
        );
        outcome
    }
}
