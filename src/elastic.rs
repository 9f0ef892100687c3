use async_trait::async_trait;
use http::header::{CONTENT_TYPE, USER_AGENT};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::transform::BulkBatch;

#[derive(thiserror::Error, Debug)]
pub enum ExporterError {
    #[error("bulk request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bulk endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("bulk response reported per-item errors")]
    ItemErrors,
    #[error("failed to encode bulk payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The sink seam. The production implementation posts to an Elasticsearch
/// bulk endpoint; tests substitute a fake to capture flushed batches.
#[async_trait]
pub trait BulkExporter {
    async fn bulk(&self, batch: BulkBatch) -> Result<(), ExporterError>;
}

pub type DynBulkExporter = Arc<dyn BulkExporter + Send + Sync>;

pub struct RestBulkExporter {
    endpoint: String,
    client: reqwest::Client,
}

impl RestBulkExporter {
    pub fn new(endpoint: &str) -> Result<Self, ExporterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(RestBulkExporter {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Renders a batch as newline-delimited JSON, one action line followed by one
/// document line per pair, with the trailing newline the bulk API requires.
pub fn render_ndjson(batch: &BulkBatch) -> Result<String, serde_json::Error> {
    let mut body = String::new();
    for (action, document) in &batch.items {
        body.push_str(&serde_json::to_string(&serde_json::json!({ "index": action }))?);
        body.push('\n');
        body.push_str(&serde_json::to_string(document)?);
        body.push('\n');
    }
    Ok(body)
}

#[async_trait]
impl BulkExporter for RestBulkExporter {
    async fn bulk(&self, batch: BulkBatch) -> Result<(), ExporterError> {
        if batch.is_empty() {
            return Ok(());
        }

        let uri = format!("{}/_bulk", self.endpoint);
        let body = render_ndjson(&batch)?;
        let bytes = body.len();
        let documents = batch.len();
        info!(documents, "sending metrics to elasticsearch");

        let start = Instant::now();
        let response = self
            .client
            .post(&uri)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .header(
                USER_AGENT,
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        info!(
            status = %status,
            bytes,
            documents,
            elapsed_ms = start.elapsed().as_millis(),
            uri = %uri,
            "bulk HTTP request completed"
        );

        if !status.is_success() {
            return Err(ExporterError::Status(status));
        }

        let payload: serde_json::Value = response.json().await?;
        if payload
            .get("errors")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            debug!("bulk response: {:?}", payload);
            return Err(ExporterError::ItemErrors);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{BulkAction, DocumentDimension, MetricDocument};

    fn test_batch() -> BulkBatch {
        let action = BulkAction {
            index: "cloudwatch".to_string(),
            doc_type: "LoadBalancer".to_string(),
            id: 1_700_000_123,
        };
        let document = MetricDocument {
            timestamp: None,
            sample_count: Some(1.0),
            average: None,
            sum: None,
            minimum: None,
            maximum: None,
            unit: None,
            namespace: "AWS/ELB".to_string(),
            metric_name: "RequestCount".to_string(),
            dimension: DocumentDimension {
                name: "LoadBalancerName".to_string(),
                value: "lb1".to_string(),
            },
            environment: "production".to_string(),
            availability_zone: Some("ap-south-1a".to_string()),
        };
        BulkBatch {
            items: vec![(action, document)],
        }
    }

    #[test]
    fn test_render_ndjson_shape() {
        let body = render_ndjson(&test_batch()).unwrap();
        assert!(body.ends_with('\n'));

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);

        let action: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_index"], "cloudwatch");
        assert_eq!(action["index"]["_type"], "LoadBalancer");
        assert_eq!(action["index"]["_id"], 1_700_000_123);

        let document: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(document["MetricName"], "RequestCount");
        assert_eq!(document["Environment"], "production");
    }

    #[test]
    fn test_render_ndjson_empty_batch() {
        assert_eq!(render_ndjson(&BulkBatch::default()).unwrap(), "");
    }
}
