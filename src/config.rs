use std::env;
use std::fmt;
use std::string::String;

/// The kind of load balancer a metric catalogue entry belongs to. Classic
/// balancers come from the ELB listing API, application and network balancers
/// from the ELBv2 listing API.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum LoadBalancerKind {
    Classic,
    Application,
    Network,
}

impl LoadBalancerKind {
    pub fn namespace(&self) -> &'static str {
        match self {
            LoadBalancerKind::Classic => "AWS/ELB",
            LoadBalancerKind::Application => "AWS/ApplicationELB",
            LoadBalancerKind::Network => "AWS/NetworkELB",
        }
    }

    /// Name of the CloudWatch dimension identifying the balancer. Classic
    /// balancers are keyed by name, v2 balancers by the ARN-derived path.
    pub fn dimension_name(&self) -> &'static str {
        match self {
            LoadBalancerKind::Classic => "LoadBalancerName",
            LoadBalancerKind::Application | LoadBalancerKind::Network => "LoadBalancer",
        }
    }

    /// Document category stamped on the bulk action metadata.
    pub fn doc_type(&self) -> &'static str {
        match self {
            LoadBalancerKind::Classic => "LoadBalancer",
            LoadBalancerKind::Application => "ApplicationLoadBalancer",
            LoadBalancerKind::Network => "NetworkLoadBalancer",
        }
    }

    pub fn metric_names(&self) -> &'static [&'static str] {
        match self {
            LoadBalancerKind::Classic => &[
                "HealthyHostCount",
                "UnHealthyHostCount",
                "RequestCount",
                "HTTPCode_Backend_2XX",
                "HTTPCode_Backend_3XX",
                "HTTPCode_Backend_4XX",
                "HTTPCode_Backend_5XX",
            ],
            LoadBalancerKind::Application => &[
                "ActiveConnectionCount",
                "ClientTLSNegotiationErrorCount",
                "ConsumedLCUs",
                "DroppedInvalidHeaderRequestCount",
                "ForwardedInvalidHeaderRequestCount",
                "HTTP_Fixed_Response_Count",
                "HTTP_Redirect_Count",
                "HTTP_Redirect_Url_Limit_Exceeded_Count",
                "HTTPCode_ELB_3XX_Count",
                "HTTPCode_ELB_4XX_Count",
                "HTTPCode_ELB_5XX_Count",
                "HTTPCode_ELB_500_Count",
                "HTTPCode_ELB_502_Count",
                "HTTPCode_ELB_503_Count",
                "HTTPCode_ELB_504_Count",
                "IPv6ProcessedBytes",
                "IPv6RequestCount",
                "NewConnectionCount",
                "ProcessedBytes",
                "RejectedConnectionCount",
                "RequestCount",
                "RuleEvaluations",
            ],
            LoadBalancerKind::Network => &[
                "ActiveFlowCount",
                "ActiveFlowCount_TCP",
                "ActiveFlowCount_TLS",
                "ActiveFlowCount_UDP",
                "ClientTLSNegotiationErrorCount",
                "ConsumedLCUs",
                "ConsumedLCUs_TCP",
                "ConsumedLCUs_TLS",
                "ConsumedLCUs_UDP",
                "HealthyHostCount",
                "NewFlowCount",
                "NewFlowCount_TCP",
                "NewFlowCount_TLS",
                "NewFlowCount_UDP",
                "ProcessedBytes",
                "ProcessedBytes_TCP",
                "ProcessedBytes_TLS",
                "ProcessedBytes_UDP",
                "TargetTLSNegotiationErrorCount",
                "TCP_Client_Reset_Count",
                "TCP_ELB_Reset_Count",
                "TCP_Target_Reset_Count",
                "UnHealthyHostCount",
            ],
        }
    }
}

impl fmt::Display for LoadBalancerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Load-balancer metric namespaces carry a per-zone dimension; documents for
/// other namespaces omit the zone field entirely.
pub fn namespace_carries_zone(namespace: &str) -> bool {
    matches!(
        namespace,
        "AWS/ELB" | "AWS/ApplicationELB" | "AWS/NetworkELB"
    )
}

pub struct Config {
    pub region: String,
    pub endpoint: String,
    pub environment: String,
    pub index_name: String,
    pub limit_load_balancers: bool,
    pub load_balancer_names: Vec<String>,
    pub zone_suffixes: Vec<String>,
    pub window_minutes: u64,
    pub period_seconds: i32,
}

impl Config {
    pub fn load_from_env() -> Result<Config, String> {
        let region = env::var("AWS_REGION").unwrap_or_else(|_| "ap-south-1".to_string());
        let endpoint = env::var("ELASTICSEARCH_ENDPOINT")
            .unwrap_or_else(|_| "https://localhost:9200".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string());
        let index_name = env::var("INDEX_NAME").unwrap_or_else(|_| "cloudwatch".to_string());

        let limit_load_balancers = env::var("LIMIT_LOAD_BALANCERS")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let load_balancer_names = env::var("LOAD_BALANCER_NAMES")
            .map(|v| split_csv(&v))
            .unwrap_or_default();
        let zone_suffixes = env::var("AVAILABILITY_ZONE_SUFFIXES")
            .map(|v| split_csv(&v))
            .unwrap_or_else(|_| vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        let window_minutes: u64 = env::var("WINDOW_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .map_err(|e| format!("Error parsing WINDOW_MINUTES to u64 - {}", e))?;
        let period_seconds: i32 = env::var("PERIOD_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|e| format!("Error parsing PERIOD_SECONDS to i32 - {}", e))?;

        Ok(Config {
            region,
            endpoint,
            environment,
            index_name,
            limit_load_balancers,
            load_balancer_names,
            zone_suffixes,
            window_minutes,
            period_seconds,
        })
    }

    /// Full availability-zone names, e.g. `ap-south-1a`.
    pub fn availability_zones(&self) -> Vec<String> {
        self.zone_suffixes
            .iter()
            .map(|suffix| format!("{}{}", self.region, suffix))
            .collect()
    }

    /// Allow-list filter. With the limit disabled every balancer passes;
    /// with it enabled only exact name matches do.
    pub fn allows(&self, name: &str) -> bool {
        !self.limit_load_balancers || self.load_balancer_names.iter().any(|n| n == name)
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
