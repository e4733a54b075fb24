//! 🚀 feeder-cli — the front door, the bouncer, the maitre d' of feeder.
//!
//! 🎬 *[narrator voice]* "It all started with a JSON file and a cluster that was definitely up."
//! 📦 This binary crate is the thin CLI wrapper: parse flags (and their env var
//! fallbacks), set up logging, print what we're about to do, and let the library
//! do the heavy lifting. Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, ContentArrangement, Table, presets::NOTHING};
use feeder::app_config::{AppConfig, ConfigOverrides};
use feeder::backends::UploadOutcome;
use feeder::common::DataTypeMode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const THE_EXAMPLES: &str = "\
Examples:
  # Auto-detect data type (default)
  feeder-cli sample_data.json

  # Explicitly specify DV latency data
  feeder-cli dvLatencyMeasurement-create-base-vm.json --data-type dvLatency

  # VMI latency data with custom index
  feeder-cli vmi_data.json --data-type vmiLatency --index my-vmi-data

  # Custom OpenSearch instance with TLS verification disabled
  feeder-cli data.json --url https://localhost:9200 --no-verify --org-id acme-corp

Environment Variables:
  OPENSEARCH_URL       Default OpenSearch URL
  OPENSEARCH_USER      Default OpenSearch username
  OPENSEARCH_PASSWORD  Default OpenSearch password
  OPENSEARCH_INDEX     Default index name prefix
  OPENSEARCH_TIMEOUT   Default request timeout in seconds
  DATA_TYPE            Default data type (auto, vmiLatency, dvLatency, podLatency, generic)
  ORGANIZATION_ID      Default organization ID
  FEEDER_CONFIG        Optional TOML config file
  RUST_LOG             Log filter (default: info)";

/// 📤 Push JSON data to OpenSearch using the bulk API, with support for multiple data types.
#[derive(Debug, Parser)]
#[command(name = "feeder-cli", version, after_help = THE_EXAMPLES)]
struct Cli {
    /// Path to the JSON file to upload (one object, or an array of objects)
    json_file: PathBuf,

    /// OpenSearch URL [default: http://localhost:9200]
    #[arg(long, env = "OPENSEARCH_URL")]
    url: Option<String>,

    /// OpenSearch username [default: admin]
    #[arg(long, env = "OPENSEARCH_USER")]
    username: Option<String>,

    /// OpenSearch password; empty sends no auth at all [default: empty]
    #[arg(long, env = "OPENSEARCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Disable TLS certificate verification
    #[arg(long)]
    no_verify: bool,

    /// Index name prefix [default: kube-burner-data]
    #[arg(long, env = "OPENSEARCH_INDEX")]
    index: Option<String>,

    /// Data type for processing and indexing: auto, vmiLatency, dvLatency, podLatency, generic [default: auto]
    #[arg(long, env = "DATA_TYPE", value_parser = parse_data_type)]
    data_type: Option<DataTypeMode>,

    /// Organization ID to add to each document
    #[arg(long, env = "ORGANIZATION_ID")]
    org_id: Option<String>,

    /// Request timeout in seconds, 0 disables it [default: 30]
    #[arg(long, env = "OPENSEARCH_TIMEOUT")]
    timeout: Option<u64>,

    /// Optional TOML file with the same settings (flags and env vars win over it)
    #[arg(long, env = "FEEDER_CONFIG")]
    config: Option<PathBuf>,
}

fn parse_data_type(raw: &str) -> Result<DataTypeMode, String> {
    raw.parse::<DataTypeMode>().map_err(|err| err.to_string())
}

impl Cli {
    /// 🎛️ Everything the operator actually said. Unsaid things stay `None`.
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            verify_tls: self.no_verify.then_some(false),
            request_timeout_secs: self.timeout,
            index: self.index.clone(),
            data_type: self.data_type,
            organization_id: self.org_id.clone(),
        }
    }
}

/// 🍽️ The "here's what's about to happen" table.
fn run_summary(cli: &Cli, config: &AppConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("📤 Uploading"),
        Cell::new(cli.json_file.display()),
    ]);
    table.add_row(vec![Cell::new("📡 OpenSearch"), Cell::new(&config.opensearch.url)]);
    table.add_row(vec![Cell::new("📋 Index"), Cell::new(&config.index)]);
    table.add_row(vec![Cell::new("🏷️  Data Type"), Cell::new(config.data_type)]);
    if let Some(ref organization_id) = config.organization_id {
        table.add_row(vec![Cell::new("🏢 Organization ID"), Cell::new(organization_id)]);
    }
    let auth = if config.opensearch.sends_auth() {
        format!("basic ({})", config.opensearch.username)
    } else {
        "none".to_string()
    };
    table.add_row(vec![Cell::new("🔒 Auth"), Cell::new(auth)]);
    if !config.opensearch.verify_tls {
        table.add_row(vec![Cell::new("⚠️  TLS"), Cell::new("certificate verification disabled")]);
    }
    table
}

/// 🚀 main() — where it all begins.
///
/// 🔧 Steps:
/// 1. Init tracing
/// 2. Parse args (flags, then env vars, then defaults)
/// 3. Load config
/// 4. Run the thing
/// 5. Exit 0 if every document went in, 1 otherwise
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let app_config = feeder::app_config::load_config(cli.config.as_deref(), &cli.overrides())
        .context("💀 We couldn't assemble a configuration. Check the flags, the env vars, and the config file if you passed one.")?;

    println!("{}", run_summary(&cli, &app_config));

    let result = feeder::run(app_config, &cli.json_file).await;

    match result {
        Ok(UploadOutcome::Indexed { .. }) => {
            info!("🎉 Upload completed successfully!");
            Ok(())
        }
        Ok(UploadOutcome::PartialFailure { .. }) => {
            error!("❌ Upload failed!");
            std::process::exit(1);
        }
        Ok(UploadOutcome::TransportFailure { cause }) => {
            // -- the uploader already logged the cause; all that's left is the hint
            hint_if_unreachable(&cause);
            error!("❌ Upload failed!");
            std::process::exit(1);
        }
        Err(err) => {
            report(&err);
            error!("❌ Upload failed!");
            std::process::exit(1);
        }
    }
}

/// 💀 Peel the error onion, one layer at a time.
fn report(err: &anyhow::Error) {
    error!("💀 error: {}", err);
    for cause in err.chain().skip(1) {
        error!("⚠️  cause: {}", cause);
    }
    hint_if_unreachable(err);
}

/// 🕵️ Sniff the chain like a truffle pig hunting for connection problems.
fn hint_if_unreachable(err: &anyhow::Error) {
    let the_vibes_are_giving_connection_issues = err.chain().any(|cause| {
        let cause_str = cause.to_string();
        cause_str.contains("error sending request")
            || cause_str.contains("onnection refused")
            || cause_str.contains("tcp connect error")
            || cause_str.contains("dns error")
    });

    if the_vibes_are_giving_connection_issues {
        error!(
            "🔧 hint: looks like OpenSearch isn't reachable. Double-check --url / OPENSEARCH_URL \
             and that the cluster is actually running. If you're using Docker, `docker ps` is your friend. ☕"
        );
    }
}
