use aws_config::SdkConfig;
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use aws_sdk_elasticloadbalancing::Client as ElbClient;
use aws_sdk_elasticloadbalancingv2::Client as Elbv2Client;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod discovery;
pub mod elastic;
pub mod metrics;
pub mod sweep;
pub mod transform;

pub use elastic::DynBulkExporter;

pub fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();
}

pub fn set_up_bulk_exporter(config: &config::Config) -> Result<DynBulkExporter, Error> {
    let exporter = elastic::RestBulkExporter::new(&config.endpoint)?;
    Ok(Arc::new(exporter))
}

/// A type used to hold the AWS clients required to interact with AWS services
/// used by the lambda function.
#[derive(Clone)]
pub struct AwsClients {
    pub elb: ElbClient,
    pub elbv2: Elbv2Client,
    pub cloudwatch: CloudWatchClient,
}

impl AwsClients {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        AwsClients {
            elb: ElbClient::new(sdk_config),
            elbv2: Elbv2Client::new(sdk_config),
            cloudwatch: CloudWatchClient::new(sdk_config),
        }
    }
}

// lambda handler
pub async fn function_handler(
    clients: &AwsClients,
    exporter: DynBulkExporter,
    config: &config::Config,
    evt: LambdaEvent<Value>,
) -> Result<(), Error> {
    info!("Handling lambda invocation");
    debug!("Handling event payload: {:?}", evt.payload);

    let report = sweep::run(clients, exporter, config).await?;
    info!(
        load_balancers = report.load_balancers,
        fetches = report.fetches_attempted,
        fetch_failures = report.fetch_failures.len(),
        flushes = report.flushes,
        flush_failures = report.flush_failures.len(),
        datapoints = report.datapoints_indexed,
        "sweep completed"
    );

    Ok(())
}
