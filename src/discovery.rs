use aws_sdk_elasticloadbalancing::Client as ElbClient;
use aws_sdk_elasticloadbalancingv2::types::LoadBalancerTypeEnum;
use aws_sdk_elasticloadbalancingv2::Client as Elbv2Client;
use lambda_runtime::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, LoadBalancerKind};

/// A load balancer surviving discovery and the allow-list filter.
/// `dimension_value` is what CloudWatch expects in the identifying dimension:
/// the plain name for classic balancers, the ARN path suffix for v2 ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerDescriptor {
    pub name: String,
    pub kind: LoadBalancerKind,
    pub dimension_value: String,
}

/// Enumerates classic and v2 load balancers and applies the allow-list
/// filter. A failure of either listing call aborts the whole invocation;
/// everything downstream of discovery is best-effort.
pub async fn discover(
    elb: &ElbClient,
    elbv2: &Elbv2Client,
    config: &Config,
) -> Result<Vec<LoadBalancerDescriptor>, Error> {
    let mut descriptors = Vec::new();

    let classic = elb.describe_load_balancers().send().await?;
    let mut found = 0;
    for description in classic.load_balancer_descriptions() {
        let Some(name) = description.load_balancer_name() else {
            continue;
        };
        if !config.allows(name) {
            debug!(name, "classic load balancer filtered out by allow-list");
            continue;
        }
        found += 1;
        descriptors.push(LoadBalancerDescriptor {
            name: name.to_string(),
            kind: LoadBalancerKind::Classic,
            dimension_value: name.to_string(),
        });
    }
    if found == 0 {
        info!("no classic load balancer found");
    }

    let v2 = elbv2.describe_load_balancers().send().await?;
    let mut found = 0;
    for balancer in v2.load_balancers() {
        let (Some(name), Some(arn)) = (balancer.load_balancer_name(), balancer.load_balancer_arn())
        else {
            continue;
        };
        if !config.allows(name) {
            debug!(name, "v2 load balancer filtered out by allow-list");
            continue;
        }
        let kind = match balancer.r#type() {
            Some(LoadBalancerTypeEnum::Application) => LoadBalancerKind::Application,
            Some(LoadBalancerTypeEnum::Network) => LoadBalancerKind::Network,
            other => {
                warn!(name, kind = ?other, "unsupported load balancer type, skipping");
                continue;
            }
        };
        found += 1;
        descriptors.push(LoadBalancerDescriptor {
            name: name.to_string(),
            kind,
            dimension_value: arn_dimension_value(arn),
        });
    }
    if found == 0 {
        info!("no application/network load balancer found");
    }

    Ok(descriptors)
}

/// Derives the CloudWatch `LoadBalancer` dimension value from a v2 ARN by
/// dropping everything up to the first `/`, e.g.
/// `arn:aws:elasticloadbalancing:...:loadbalancer/app/my-lb/50dc6c495c0c9188`
/// becomes `app/my-lb/50dc6c495c0c9188`.
pub fn arn_dimension_value(arn: &str) -> String {
    arn.split('/').skip(1).collect::<Vec<_>>().join("/")
}
