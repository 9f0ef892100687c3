use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::config::{namespace_carries_zone, Config};
use crate::metrics::{MetricQuery, StatisticsDatapoint};

/// The identifying dimension carried on every document, mirroring the
/// dimension used in the originating query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDimension {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// A datapoint tagged with its query context, in the field spelling the
/// downstream index expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDocument {
    #[serde(rename = "Timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "SampleCount", skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<f64>,
    #[serde(rename = "Average", skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(rename = "Sum", skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(rename = "Minimum", skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(rename = "Maximum", skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "Unit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "Namespace")]
    pub namespace: String,
    #[serde(rename = "MetricName")]
    pub metric_name: String,
    #[serde(rename = "Dimension")]
    pub dimension: DocumentDimension,
    #[serde(rename = "Environment")]
    pub environment: String,
    #[serde(rename = "AvailabilityZone", skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

/// Action metadata preceding each document in a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkAction {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: i64,
}

/// One bulk request worth of (action, document) pairs. A batch is local to a
/// single fetch response and flushed immediately.
#[derive(Debug, Clone, Default)]
pub struct BulkBatch {
    pub items: Vec<(BulkAction, MetricDocument)>,
}

impl BulkBatch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Tags each datapoint of a fetch response and pairs it with its index
/// action. An empty response yields an empty batch, which is never flushed.
pub fn build_batch(
    config: &Config,
    query: &MetricQuery,
    datapoints: Vec<StatisticsDatapoint>,
) -> BulkBatch {
    let mut items = Vec::with_capacity(datapoints.len());
    for datapoint in datapoints {
        let action = BulkAction {
            index: config.index_name.clone(),
            doc_type: query.doc_type.to_string(),
            id: synthetic_id(datapoint.timestamp),
        };
        let document = MetricDocument {
            timestamp: datapoint.timestamp,
            sample_count: datapoint.sample_count,
            average: datapoint.average,
            sum: datapoint.sum,
            minimum: datapoint.minimum,
            maximum: datapoint.maximum,
            unit: datapoint.unit,
            namespace: query.namespace.to_string(),
            metric_name: query.metric_name.clone(),
            dimension: DocumentDimension {
                name: query.dimension_name.clone(),
                value: query.dimension_value.clone(),
            },
            environment: config.environment.clone(),
            availability_zone: namespace_carries_zone(query.namespace)
                .then(|| query.availability_zone.clone()),
        };
        items.push((action, document));
    }
    BulkBatch { items }
}

// Timestamp seconds plus a random offset. Best-effort de-duplication only:
// two datapoints in the same second can collide, and repeated invocations
// over overlapping windows produce distinct ids for the same datapoint.
fn synthetic_id(timestamp: Option<DateTime<Utc>>) -> i64 {
    let seconds = timestamp.map(|t| t.timestamp()).unwrap_or_default();
    seconds + rand::thread_rng().gen_range(100..999)
}
