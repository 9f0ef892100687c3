use lambda_runtime::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::discovery::{self, LoadBalancerDescriptor};
use crate::elastic::DynBulkExporter;
use crate::metrics::{self, MetricQuery, TimeWindow};
use crate::transform;
use crate::AwsClients;

/// Per-invocation accounting. Fetch and flush failures are recorded here and
/// logged instead of aborting the sweep; only a discovery failure is fatal.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub load_balancers: usize,
    pub fetches_attempted: usize,
    pub fetch_failures: Vec<String>,
    pub flushes: usize,
    pub flush_failures: Vec<String>,
    pub datapoints_indexed: usize,
}

/// Runs one full fetch-and-index sweep: discovery, then one statistics fetch
/// per (balancer, zone, metric) combination, each flushed to the sink as its
/// own bulk batch. Strictly sequential.
pub async fn run(
    clients: &AwsClients,
    exporter: DynBulkExporter,
    config: &Config,
) -> Result<SweepReport, Error> {
    let window = TimeWindow::trailing(config.window_minutes);
    info!(start = %window.start, end = %window.end, "sweep window");

    let descriptors = discovery::discover(&clients.elb, &clients.elbv2, config).await?;
    let mut report = SweepReport {
        load_balancers: descriptors.len(),
        ..Default::default()
    };

    for descriptor in &descriptors {
        sweep_load_balancer(clients, &exporter, config, descriptor, window, &mut report).await;
    }

    Ok(report)
}

async fn sweep_load_balancer(
    clients: &AwsClients,
    exporter: &DynBulkExporter,
    config: &Config,
    descriptor: &LoadBalancerDescriptor,
    window: TimeWindow,
    report: &mut SweepReport,
) {
    let kind = descriptor.kind;
    for zone in config.availability_zones() {
        for metric_name in kind.metric_names() {
            let query = MetricQuery::new(
                kind,
                &descriptor.dimension_value,
                metric_name,
                &zone,
                window,
                config.period_seconds,
            );

            report.fetches_attempted += 1;
            info!(
                namespace = query.namespace,
                metric = %query.metric_name,
                resource = %query.dimension_value,
                zone = %zone,
                "fetching metric statistics"
            );

            let datapoints = match metrics::fetch_statistics(&clients.cloudwatch, &query).await {
                Ok(datapoints) => datapoints,
                Err(e) => {
                    error!(
                        namespace = query.namespace,
                        metric = %query.metric_name,
                        zone = %zone,
                        error = %e,
                        "metric fetch failed"
                    );
                    report.fetch_failures.push(format!(
                        "{}:{} {} - {}",
                        query.namespace, query.metric_name, zone, e
                    ));
                    continue;
                }
            };

            let batch = transform::build_batch(config, &query, datapoints);
            if batch.is_empty() {
                continue;
            }

            let documents = batch.len();
            match exporter.bulk(batch).await {
                Ok(()) => {
                    report.flushes += 1;
                    report.datapoints_indexed += documents;
                }
                Err(e) => {
                    error!(
                        namespace = query.namespace,
                        metric = %query.metric_name,
                        zone = %zone,
                        error = %e,
                        "bulk flush failed"
                    );
                    report.flush_failures.push(format!(
                        "{}:{} {} - {}",
                        query.namespace, query.metric_name, zone, e
                    ));
                }
            }
        }
    }
}
