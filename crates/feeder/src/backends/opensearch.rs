//! # 📡 THE OPENSEARCH BACKEND
//!
//! 🎬 COLD OPEN — INT. SERVER ROOM — 3:47 AM
//!
//! The load test is over. The latencies are in a file. The dashboard is empty.
//! One engineer types `feeder-cli results.json` and holds their breath.
//! Two requests leave the building: a template PUT and a bulk POST.
//! Only one of them has to land for the night to end well.
//!
//! 🚀 This module is the HTTP side of the tool. It registers the index
//! template, ships the bulk body, and reads the bulk response carefully,
//! because `_bulk` answers "200 OK" even when half your documents bounced.
//!
//! ## Knowledge Graph 🧠
//! - `PUT  <url>/_index_template/<name>` — best effort, failure is a warning upstream
//! - `POST <url>/_bulk` — `application/x-ndjson`, one shot, no retries
//! - Auth: basic auth when a password is configured, nothing at all otherwise
//! - Result: [`UploadOutcome`], a tagged type, never a bare bool
//!
//! ⚠️ If you are reading this at 3am during an incident, take a breath.
//! The data is fine. Probably. 🦆

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, trace};

use crate::composers::BulkBatch;

// 📡 OpenSearchConfig — "It's just OpenSearch", she said, before the cluster went yellow.
// Lives here, next to the client that uses it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OpenSearchConfig {
    /// 📡 Cluster base URL. Scheme + host + port. Trailing slashes are forgiven.
    #[serde(default = "default_url")]
    pub url: String,
    /// 🔒 Username. Only sent when a password is also set.
    #[serde(default = "default_username")]
    pub username: String,
    /// 🔒 Password. Empty means "send no auth at all", not "send an empty password".
    #[serde(default)]
    pub password: String,
    /// 🔒 Verify TLS certificates. Turn off for self-signed dev clusters, and feel bad about it.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    /// ⏱️ Per-request timeout in seconds. 0 disables it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_verify_tls() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: default_username(),
            password: String::new(),
            verify_tls: default_verify_tls(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl OpenSearchConfig {
    /// 🔒 True when requests will carry basic auth.
    pub fn sends_auth(&self) -> bool {
        !self.password.is_empty()
    }
}

// ============================================================
// 📊 UploadOutcome — what the bulk endpoint actually said
// ============================================================

/// 📊 The three ways a bulk upload can end.
///
/// - `Indexed`: the cluster said `errors: false`. Every item went in.
/// - `PartialFailure`: the cluster said `errors: true`. Some items bounced,
///   the rest may well be indexed. The bulk API doesn't do all-or-nothing.
/// - `TransportFailure`: nothing usable came back (network error, non-2xx,
///   or a body that wasn't a bulk response). Assume nothing was indexed.
#[derive(Debug)]
pub enum UploadOutcome {
    Indexed { count: usize },
    PartialFailure { item_errors: Vec<ItemError> },
    TransportFailure { cause: anyhow::Error },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Indexed { .. })
    }
}

/// 💀 One bulk item the cluster refused, with the cluster's own explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemError {
    /// 🔢 Position of the item in the batch (0-based, same order as the input records).
    pub position: usize,
    pub index: Option<String>,
    pub status: Option<u16>,
    /// 📜 The `error` object verbatim. Usually `{"type": ..., "reason": ...}`.
    pub error: Value,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}", self.position)?;
        if let Some(ref index) = self.index {
            write!(f, " → {}", index)?;
        }
        if let Some(status) = self.status {
            write!(f, " (status {})", status)?;
        }
        write!(f, ": {}", self.error)
    }
}

// -- 📜 The bulk response, only the parts we read. Everything else is ignored by serde.
#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<BulkResponseItem>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    // -- only `index` actions are ever sent, so only `index` results are read
    #[serde(default)]
    index: Option<BulkItemResult>,
}

#[derive(Debug, Deserialize)]
struct BulkItemResult {
    #[serde(rename = "_index", default)]
    index: Option<String>,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    error: Option<Value>,
}

impl BulkResponse {
    /// 🔍 Turn a parsed bulk response into an outcome.
    ///
    /// `errors: false` → `Indexed` with the item count.
    /// `errors: true` → `PartialFailure` with every `index` item that carries an `error`.
    pub(crate) fn into_outcome(self) -> UploadOutcome {
        if !self.errors {
            return UploadOutcome::Indexed {
                count: self.items.len(),
            };
        }

        let item_errors = self
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(position, item)| {
                let result = item.index?;
                let error = result.error?;
                Some(ItemError {
                    position,
                    index: result.index,
                    status: result.status,
                    error,
                })
            })
            .collect();

        UploadOutcome::PartialFailure { item_errors }
    }
}

// ============================================================
// 📡 OpenSearchClient — the HTTP muscle
// ============================================================

/// 📡 One HTTP client, reused for the template PUT and the bulk POST.
#[derive(Debug)]
pub struct OpenSearchClient {
    client: reqwest::Client,
    config: OpenSearchConfig,
}

impl OpenSearchClient {
    /// 🚀 Build the client. 10 second connect timeout, configurable request timeout,
    /// TLS verification unless the operator said `--no-verify`.
    ///
    /// No connectivity ping here: the template PUT is the first contact, and it's
    /// allowed to fail.
    pub fn new(config: OpenSearchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(!config.verify_tls);
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        let client = builder
            .build()
            .context("💀 The HTTP client refused to be born. The TLS stack wept. Probably a missing TLS cert or a cursed system setup. Either way: tragic.")?;

        Ok(Self { client, config })
    }

    // -- trim_end_matches('/'): without it, `https://host//_bulk`. One slash of difference.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.sends_auth() {
            request.basic_auth(&self.config.username, Some(&self.config.password))
        } else {
            request
        }
    }

    /// 🗂️ PUT an index template under `name`. Any 2xx is success.
    ///
    /// Overwrites whatever template already has that name. That's the idempotency.
    pub async fn submit_template(&self, name: &str, template: &Value) -> Result<()> {
        let template_url = self.endpoint(&format!("_index_template/{}", name));
        let body = serde_json::to_string(template)
            .context("💀 The index template refused to serialize. It's a json! literal. How.")?;

        debug!("🗂️ PUT {} ({} bytes)", template_url, body.len());
        let response = self
            .authorize(self.client.put(&template_url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .context("💀 The template PUT never made it to the cluster. Check the URL, check the network, check that something is actually listening.")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "💀 The cluster rejected the index template with {}. It said: '{}'",
                status,
                body
            );
        }

        trace!("✅ Template '{}' accepted", name);
        Ok(())
    }

    /// 📡 Ship a composed batch to `/_bulk` and report what happened.
    ///
    /// Consumes the batch. Every failure mode is logged here and folded into the
    /// returned [`UploadOutcome`]; nothing is retried.
    pub async fn upload(&self, batch: BulkBatch) -> UploadOutcome {
        let documents = batch.documents();
        debug!(
            "📡 Sending {} documents ({} bytes) to /_bulk",
            documents,
            batch.payload().len()
        );

        let response = match self.submit_bulk_request(batch.into_payload()).await {
            Ok(response) => response,
            Err(cause) => {
                error!("✗ Bulk upload failed: {:#}", cause);
                return UploadOutcome::TransportFailure { cause };
            }
        };

        let outcome = response.into_outcome();
        match &outcome {
            UploadOutcome::Indexed { count } => {
                info!("✓ Successfully uploaded {} documents", count);
            }
            UploadOutcome::PartialFailure { item_errors } => {
                error!(
                    "✗ Bulk upload had errors: {} of {} documents were rejected",
                    item_errors.len(),
                    documents
                );
                for item_error in item_errors {
                    error!("  - {}", item_error);
                }
            }
            UploadOutcome::TransportFailure { .. } => {}
        }
        outcome
    }

    /// 📡 POST the NDJSON body and parse the response. Non-2xx is an error, body unread
    /// except as text for the error message.
    async fn submit_bulk_request(&self, request_body: String) -> Result<BulkResponse> {
        let bulk_url = self.endpoint("_bulk");
        let response = self
            .authorize(self.client.post(&bulk_url))
            // ⚠️ application/x-ndjson — not application/json. The cluster cares.
            .header("Content-Type", "application/x-ndjson")
            .body(request_body)
            .send()
            .await
            .context("💀 The bulk request never made it to the cluster. We launched the payload into the network and the network responded with what can only be described as 'not vibing with it.'")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "💀 The bulk request arrived, but the cluster answered {}. The body read: '{}'",
                status,
                body
            );
        }

        let body = response
            .text()
            .await
            .context("💀 The cluster said 2xx and then hung up before finishing its sentence.")?;
        serde_json::from_str(&body).with_context(|| {
            format!(
                "💀 The bulk response wasn't a bulk response. Expected {{\"errors\":..,\"items\":[..]}}, got: '{}'",
                body
            )
        })
    }
}
