//! HTTP plumbing shared by the embedding and generation clients.
//!
//! Failures are tagged with the calling service's name so that both
//! clients report [`RecallError::ServiceUnavailable`] the same way.

use std::time::Duration;

use crate::error::{RecallError, Result};

pub(crate) const EMBEDDING: &str = "embedding";
pub(crate) const GENERATION: &str = "generation";

pub(crate) fn client(service: &'static str, timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RecallError::unavailable(service, format!("failed to build HTTP client: {}", e)))
}

/// Decode a JSON body, turning non-success statuses into errors that carry
/// the response text.
pub(crate) async fn read_json(
    service: &'static str,
    response: reqwest::Response,
    provider: &str,
) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(RecallError::unavailable(
            service,
            format!("{} API error {}: {}", provider, status, body_text),
        ));
    }
    response.json().await.map_err(|e| {
        RecallError::unavailable(service, format!("{} response was not JSON: {}", provider, e))
    })
}
