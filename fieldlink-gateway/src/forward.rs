use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::configs::ForwarderSettings;
use crate::record::SensorRecord;
use crate::stats::StatsReport;

/// Why a forward attempt failed. The attempt is never retried here; the
/// caller records the outcome and moves on (at-most-once delivery).
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Backend returned status {0}")]
    Status(u16),
}

/// Downstream sink for flushed batches and periodic stats reports.
#[async_trait]
pub trait Forwarder {
    async fn forward_batch(&mut self, records: &[SensorRecord]) -> Result<(), ForwardError>;

    async fn forward_stats(&mut self, report: &StatsReport) -> Result<(), ForwardError>;
}

/// HTTP forwarder posting JSON to the backend API.
///
/// The request timeout bounds how long the gateway loop can stall on a slow
/// backend; a timed-out attempt fails like any other.
pub struct HttpForwarder {
    client: reqwest::Client,
    data_url: String,
    stats_url: String,
}

impl HttpForwarder {
    pub fn new(settings: &ForwarderSettings) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| ForwardError::Network(e.to_string()))?;

        Ok(Self {
            client,
            data_url: format!("{}{}", settings.base_url, settings.data_path),
            stats_url: format!("{}{}", settings.base_url, settings.stats_path),
        })
    }

    async fn post<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<(), ForwardError> {
        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                ForwardError::Timeout
            } else {
                ForwardError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ForwardError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward_batch(&mut self, records: &[SensorRecord]) -> Result<(), ForwardError> {
        self.post(&self.data_url, &records).await
    }

    async fn forward_stats(&mut self, report: &StatsReport) -> Result<(), ForwardError> {
        self.post(&self.stats_url, report).await
    }
}
