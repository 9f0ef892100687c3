use aws_sdk_cloudwatch::primitives::DateTime as SdkDateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, Statistic};
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use chrono::{DateTime, Duration, Utc};
use lambda_runtime::Error;
use tracing::debug;

use crate::config::LoadBalancerKind;

/// The trailing window a sweep covers. Computed once per invocation so every
/// fetch in the sweep shares the same bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn trailing(minutes: u64) -> Self {
        let end = Utc::now();
        TimeWindow {
            start: end - Duration::minutes(minutes as i64),
            end,
        }
    }
}

/// One statistics request, scoped to a single (balancer, zone, metric)
/// combination.
#[derive(Debug, Clone)]
pub struct MetricQuery {
    pub namespace: &'static str,
    pub doc_type: &'static str,
    pub metric_name: String,
    pub dimension_name: String,
    pub dimension_value: String,
    pub availability_zone: String,
    pub window: TimeWindow,
    pub period: i32,
}

impl MetricQuery {
    pub fn new(
        kind: LoadBalancerKind,
        dimension_value: &str,
        metric_name: &str,
        availability_zone: &str,
        window: TimeWindow,
        period: i32,
    ) -> Self {
        MetricQuery {
            namespace: kind.namespace(),
            doc_type: kind.doc_type(),
            metric_name: metric_name.to_string(),
            dimension_name: kind.dimension_name().to_string(),
            dimension_value: dimension_value.to_string(),
            availability_zone: availability_zone.to_string(),
            window,
            period,
        }
    }
}

/// A raw datapoint as returned by the statistics API, before tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsDatapoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub sample_count: Option<f64>,
    pub average: Option<f64>,
    pub sum: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub unit: Option<String>,
}

impl StatisticsDatapoint {
    fn from_sdk(datapoint: &Datapoint) -> Self {
        StatisticsDatapoint {
            timestamp: datapoint
                .timestamp()
                .and_then(|t| t.to_millis().ok())
                .and_then(DateTime::from_timestamp_millis),
            sample_count: datapoint.sample_count(),
            average: datapoint.average(),
            sum: datapoint.sum(),
            minimum: datapoint.minimum(),
            maximum: datapoint.maximum(),
            unit: datapoint.unit().map(|u| u.as_str().to_string()),
        }
    }
}

/// Issues one `GetMetricStatistics` call for the query. All five statistic
/// kinds are always requested.
pub async fn fetch_statistics(
    cloudwatch: &CloudWatchClient,
    query: &MetricQuery,
) -> Result<Vec<StatisticsDatapoint>, Error> {
    let output = cloudwatch
        .get_metric_statistics()
        .namespace(query.namespace)
        .metric_name(&query.metric_name)
        .period(query.period)
        .start_time(SdkDateTime::from_millis(query.window.start.timestamp_millis()))
        .end_time(SdkDateTime::from_millis(query.window.end.timestamp_millis()))
        .statistics(Statistic::SampleCount)
        .statistics(Statistic::Average)
        .statistics(Statistic::Sum)
        .statistics(Statistic::Minimum)
        .statistics(Statistic::Maximum)
        .dimensions(
            Dimension::builder()
                .name(&query.dimension_name)
                .value(&query.dimension_value)
                .build(),
        )
        .dimensions(
            Dimension::builder()
                .name("AvailabilityZone")
                .value(&query.availability_zone)
                .build(),
        )
        .send()
        .await?;

    let datapoints: Vec<StatisticsDatapoint> = output
        .datapoints()
        .iter()
        .map(StatisticsDatapoint::from_sdk)
        .collect();
    debug!(
        namespace = query.namespace,
        metric = %query.metric_name,
        datapoints = datapoints.len(),
        "statistics fetched"
    );
    Ok(datapoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_window_length() {
        let window = TimeWindow::trailing(15);
        assert_eq!(window.end - window.start, Duration::minutes(15));
    }

    #[test]
    fn test_query_construction() {
        let window = TimeWindow::trailing(15);
        let query = MetricQuery::new(
            LoadBalancerKind::Application,
            "app/my-alb/50dc6c495c0c9188",
            "RequestCount",
            "ap-south-1a",
            window,
            60,
        );
        assert_eq!(query.namespace, "AWS/ApplicationELB");
        assert_eq!(query.doc_type, "ApplicationLoadBalancer");
        assert_eq!(query.metric_name, "RequestCount");
        assert_eq!(query.dimension_name, "LoadBalancer");
        assert_eq!(query.dimension_value, "app/my-alb/50dc6c495c0c9188");
        assert_eq!(query.availability_zone, "ap-south-1a");
        assert_eq!(query.window, window);
        assert_eq!(query.period, 60);
    }
}
