use elb_metrics_shipper::elastic::{BulkExporter, ExporterError, RestBulkExporter};
use elb_metrics_shipper::transform::{BulkAction, BulkBatch, DocumentDimension, MetricDocument};

fn sample_batch(documents: usize) -> BulkBatch {
    let items = (0..documents)
        .map(|i| {
            let action = BulkAction {
                index: "cloudwatch".to_string(),
                doc_type: "LoadBalancer".to_string(),
                id: 1_700_000_000 + i as i64,
            };
            let document = MetricDocument {
                timestamp: None,
                sample_count: Some(3.0),
                average: Some(1.5),
                sum: Some(4.5),
                minimum: Some(1.0),
                maximum: Some(2.0),
                unit: Some("Count".to_string()),
                namespace: "AWS/ELB".to_string(),
                metric_name: "RequestCount".to_string(),
                dimension: DocumentDimension {
                    name: "LoadBalancerName".to_string(),
                    value: "lb1".to_string(),
                },
                environment: "production".to_string(),
                availability_zone: Some("ap-south-1a".to_string()),
            };
            (action, document)
        })
        .collect();
    BulkBatch { items }
}

#[test_log::test(tokio::test)]
async fn test_bulk_posts_ndjson() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/_bulk"))
        .and(wiremock::matchers::header(
            "Content-Type",
            "application/x-ndjson",
        ))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"took": 3, "errors": false, "items": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let exporter = RestBulkExporter::new(server.uri().as_str()).unwrap();
    exporter.bulk(sample_batch(2)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.ends_with('\n'));
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);

    let action: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(action["index"]["_index"], "cloudwatch");
    assert_eq!(action["index"]["_type"], "LoadBalancer");

    let document: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(document["Namespace"], "AWS/ELB");
    assert_eq!(document["MetricName"], "RequestCount");
    assert_eq!(document["Environment"], "production");
    assert_eq!(document["AvailabilityZone"], "ap-south-1a");
}

#[test_log::test(tokio::test)]
async fn test_bulk_skips_empty_batches() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let exporter = RestBulkExporter::new(server.uri().as_str()).unwrap();
    exporter.bulk(BulkBatch::default()).await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_bulk_surfaces_http_status_errors() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/_bulk"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let exporter = RestBulkExporter::new(server.uri().as_str()).unwrap();
    let result = exporter.bulk(sample_batch(1)).await;
    assert!(matches!(result, Err(ExporterError::Status(status)) if status.as_u16() == 503));
}

#[test_log::test(tokio::test)]
async fn test_bulk_surfaces_item_errors() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/_bulk"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"took": 3, "errors": true, "items": []})),
        )
        .mount(&server)
        .await;

    let exporter = RestBulkExporter::new(server.uri().as_str()).unwrap();
    let result = exporter.bulk(sample_batch(1)).await;
    assert!(matches!(result, Err(ExporterError::ItemErrors)));
}
