use aws_config::BehaviorVersion;
use elb_metrics_shipper::config;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    elb_metrics_shipper::set_up_logging();

    info!(
        "Initializing {} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let aws_config = aws_config::load_defaults(BehaviorVersion::v2023_11_09()).await;
    let clients = elb_metrics_shipper::AwsClients::new(&aws_config);
    let config = config::Config::load_from_env()?;

    let exporter = elb_metrics_shipper::set_up_bulk_exporter(&config)?;

    run(service_fn(|request: LambdaEvent<Value>| {
        elb_metrics_shipper::function_handler(&clients, exporter.clone(), &config, request)
    }))
    .await
}
