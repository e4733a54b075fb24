//! 📤 feeder — pushes kube-burner latency measurements into OpenSearch.
//!
//! ```text
//!   JSON file ──▶ load_records ──▶ DataTypeMode::resolve ──▶ Enricher ──▶ NdjsonComposer ──▶ OpenSearchClient::upload
//!                                                                                              ▲
//!   schema::build_template ──▶ OpenSearchClient::submit_template (best effort) ───────────────┘ (runs first)
//! ```

pub mod app_config;
pub mod backends;
pub mod common;
pub mod composers;
pub mod schema;
pub mod transforms;

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::app_config::AppConfig;
use crate::backends::{OpenSearchClient, UploadOutcome, load_records};
use crate::common::{DataTypeMode, Record};
use crate::composers::{BulkBatch, NdjsonComposer};
use crate::transforms::Enricher;

pub use crate::transforms::data_type::detect;

/// 🚀 Run the whole thing: template, load, enrich, compose, upload.
///
/// Returns `Err` for problems before anything is sent (bad client config, bad input
/// file). Once the bulk request goes out, every ending is an [`UploadOutcome`].
/// A failed template PUT is a warning, not an error.
pub async fn run(config: AppConfig, json_file: &Path) -> Result<UploadOutcome> {
    let client = OpenSearchClient::new(config.opensearch.clone())
        .context("💀 Could not set up the OpenSearch client")?;

    // -- 🗂️ best effort. without it the cluster falls back to dynamic mapping and we carry on.
    let template = schema::build_template(&config.index);
    match client
        .submit_template(schema::THE_TEMPLATE_NAME, &template)
        .await
    {
        Ok(()) => info!("✓ Index template created successfully"),
        Err(err) => warn!("✗ Failed to create index template: {:#}", err),
    }

    let mut records = load_records(json_file).await?;
    if records.is_empty() {
        bail!(
            "💀 '{}' holds no records. An empty bulk request is a 400 waiting to happen, so we didn't send one.",
            json_file.display()
        );
    }

    let batch = prepare_bulk(&mut records, &config)?;
    info!(
        "📦 Prepared {} documents for '{}'",
        batch.documents(),
        config.index
    );

    Ok(client.upload(batch).await)
}

/// 🔄 Detect (if asked to), enrich every record in place, and compose the bulk body.
pub fn prepare_bulk(records: &mut [Record], config: &AppConfig) -> Result<BulkBatch> {
    let enricher = Enricher::new(
        config.data_type.resolve(records),
        config.organization_id.clone(),
    );
    if config.data_type == DataTypeMode::Auto {
        info!("🔍 Detected data type: {}", enricher.data_type());
    }

    for record in records.iter_mut() {
        enricher.enrich(record);
    }

    NdjsonComposer.compose(records, enricher.data_type(), &config.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::OpenSearchConfig;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn json_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("💀 temp file");
        file.write_all(contents.as_bytes()).expect("💀 write");
        file
    }

    fn config_for(server: &MockServer, organization_id: Option<&str>) -> AppConfig {
        AppConfig {
            opensearch: OpenSearchConfig {
                url: server.uri(),
                ..OpenSearchConfig::default()
            },
            organization_id: organization_id.map(str::to_string),
            ..AppConfig::default()
        }
    }

    async fn mount_happy_cluster(server: &MockServer, items: usize) {
        let created = vec![json!({"index": {"status": 201}}); items];
        Mock::given(method("PUT"))
            .and(path("/_index_template/kube-burner-template"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": false,
                "items": created
            })))
            .mount(server)
            .await;
    }

    fn bulk_body(requests: &[wiremock::Request]) -> String {
        let bulk = requests
            .iter()
            .find(|request| request.url.path() == "/_bulk")
            .expect("💀 a bulk request should have been sent");
        String::from_utf8_lossy(&bulk.body).into_owned()
    }

    #[tokio::test]
    async fn the_one_where_a_dv_measurement_goes_all_the_way_home() -> Result<()> {
        let server = MockServer::start().await;
        mount_happy_cluster(&server, 1).await;
        let file = json_file(
            r#"{"metricName": "dvRunningLatency", "timestamp": "2024-01-01T00:00:00Z", "jobIteration": 2}"#,
        );

        let outcome = run(config_for(&server, Some("acme")), file.path()).await?;
        assert!(matches!(outcome, UploadOutcome::Indexed { count: 1 }));

        let requests = server.received_requests().await.expect("💀 recording is on");
        let body = bulk_body(&requests);
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);

        let action: serde_json::Value = serde_json::from_str(lines[0])?;
        assert_eq!(action["index"]["_index"], "kube-burner-data-dv-latency");

        let document: serde_json::Value = serde_json::from_str(lines[1])?;
        assert_eq!(document["dataType"], "dv-latency");
        assert_eq!(document["source"], "direct-api");
        assert_eq!(document["jobIteration"], "0002");
        assert_eq!(document["organizationID"], "acme");
        assert_eq!(document["@timestamp"], "2024-01-01T00:00:00Z");
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_template_goes_first_and_matches_the_prefix() -> Result<()> {
        let server = MockServer::start().await;
        mount_happy_cluster(&server, 2).await;
        let file = json_file(r#"[{"metricName":"podReadyLatency"},{"metricName":"podReadyLatency"}]"#);

        run(config_for(&server, None), file.path()).await?;

        let requests = server.received_requests().await.expect("💀 recording is on");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/_index_template/kube-burner-template");
        let template: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
        assert_eq!(template["index_patterns"], json!(["kube-burner-data*"]));
        assert_eq!(requests[1].url.path(), "/_bulk");
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_broken_template_does_not_stop_the_upload() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": false,
                "items": [{"index": {"status": 201}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let file = json_file(r#"{"metricName":"customThing"}"#);

        let outcome = run(config_for(&server, None), file.path()).await?;
        assert!(outcome.is_success());
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_bad_input_never_reaches_the_bulk_endpoint() {
        let server = MockServer::start().await;
        mount_happy_cluster(&server, 0).await;

        for contents in [r#""nope""#, "[]", "{not json"] {
            let file = json_file(contents);
            let result = run(config_for(&server, None), file.path()).await;
            assert!(result.is_err(), "{contents:?} should be an input error");
        }

        let requests = server.received_requests().await.expect("💀 recording is on");
        assert!(
            requests.iter().all(|request| request.url.path() != "/_bulk"),
            "no bulk request for bad input"
        );
    }

    #[tokio::test]
    async fn the_one_where_a_rejected_document_fails_the_run() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": true,
                "items": [
                    {"index": {"_index": "kube-burner-data", "status": 201}},
                    {"index": {"_index": "kube-burner-data", "status": 400,
                               "error": {"type": "mapper_parsing_exception", "reason": "bad timestamp"}}}
                ]
            })))
            .mount(&server)
            .await;
        let file = json_file(r#"[{"metricName":"a"},{"metricName":"b","timestamp":"yesterday"}]"#);

        match run(config_for(&server, None), file.path()).await? {
            UploadOutcome::PartialFailure { item_errors } => {
                assert_eq!(item_errors.len(), 1);
                assert_eq!(item_errors[0].error["reason"], "bad timestamp");
            }
            other => panic!("💀 expected a partial failure, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn the_one_where_an_explicit_mode_skips_detection() -> Result<()> {
        let mut records: Vec<Record> =
            vec![serde_json::from_value(json!({"metricName": "dvReadyLatency"}))?];
        let config = AppConfig {
            data_type: DataTypeMode::VmiLatency,
            index: "perf".to_string(),
            ..AppConfig::default()
        };

        let batch = prepare_bulk(&mut records, &config)?;

        assert_eq!(records[0]["dataType"], "vmiLatency");
        assert!(batch.payload().starts_with(r#"{"index":{"_index":"perf-vmiLatency"}}"#));
        Ok(())
    }

    #[test]
    fn the_one_where_auto_mode_labels_and_routes_by_the_first_record() -> Result<()> {
        let mut records: Vec<Record> = vec![
            serde_json::from_value(json!({"metricName": "vmiRunningLatency"}))?,
            serde_json::from_value(json!({"metricName": "podReadyLatency"}))?,
        ];

        let batch = prepare_bulk(&mut records, &AppConfig::default())?;

        assert_eq!(batch.documents(), 2);
        assert!(records.iter().all(|record| record["dataType"] == "vmi-latency"));
        assert_eq!(
            batch
                .payload()
                .matches(r#"{"index":{"_index":"kube-burner-data-vmi-latency"}}"#)
                .count(),
            2
        );
        Ok(())
    }
}
