//! 🔧 App Configuration — the sacred defaults-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment. Layers, lowest priority first:
//!
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. An optional TOML file
//! 3. [`ConfigOverrides`] — whatever the CLI collected from flags and env vars
//!    (clap already settled flag-beats-env before we ever see it)
//!
//! The result is assembled once at startup and handed around by value. No globals.

use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backends::OpenSearchConfig;
use crate::common::DataTypeMode;

/// 📦 The AppConfig: one struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// 📡 Where the cluster lives and how to talk to it.
    #[serde(default)]
    pub opensearch: OpenSearchConfig,
    /// 🏷️ Index name prefix. The data type suffix is glued on per batch.
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub data_type: DataTypeMode,
    /// 🏢 Tenant id stamped onto every record as `organizationID`. None = no stamping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

fn default_index() -> String {
    "kube-burner-data".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opensearch: OpenSearchConfig::default(),
            index: default_index(),
            data_type: DataTypeMode::default(),
            organization_id: None,
        }
    }
}

/// 🎛️ Operator overrides. Every field optional; `None` means "not said, keep whatever's below".
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_tls: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub index: Option<String>,
    pub data_type: Option<DataTypeMode>,
    pub organization_id: Option<String>,
}

/// 🧩 The nested shape figment merges. Connection knobs live under `opensearch`.
#[derive(Serialize)]
struct OverrideLayer<'a> {
    opensearch: OpenSearchOverrideLayer<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_type: Option<DataTypeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<&'a str>,
}

#[derive(Serialize)]
struct OpenSearchOverrideLayer<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verify_tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    fn as_layer(&self) -> OverrideLayer<'_> {
        OverrideLayer {
            opensearch: OpenSearchOverrideLayer {
                url: self.url.as_deref(),
                username: self.username.as_deref(),
                password: self.password.as_deref(),
                verify_tls: self.verify_tls,
                request_timeout_secs: self.request_timeout_secs,
            },
            index: self.index.as_deref(),
            data_type: self.data_type,
            organization_id: self.organization_id.as_deref(),
        }
    }
}

/// 🚀 Load the config — defaults, then the optional TOML file, then the overrides.
///
/// 📐 If `config_file` is None, only defaults + overrides. No file. No assumptions.
///
/// 💀 Returns an error if the file is unparseable or names a data type we don't know.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file.unwrap_or(Path::new(""))
    );

    let config = Figment::from(Serialized::defaults(AppConfig::default()));

    // -- figment quietly skips a missing TOML file. we don't.
    let config = match config_file {
        Some(file_name) => {
            anyhow::ensure!(
                file_name.is_file(),
                "💀 Configuration file '{}' does not exist. Maybe it's a pwd/cwd thing. Use an absolute path to be absolutely certain.",
                file_name.display()
            );
            config.merge(Toml::file(file_name))
        }
        None => config,
    };

    let config = config.merge(Serialized::defaults(overrides.as_layer()));

    let context_msg = match config_file {
        Some(path) => format!(
            "💀 Failed to assemble configuration from file '{}' and the command line. \
             The file exists in our hearts, but apparently not in valid TOML.",
            path.display()
        ),
        None => "💀 Failed to assemble configuration from the command line and environment. \
                 No file was provided — this one's all on the flags. Classic."
            .to_string(),
    };

    config.extract().context(context_msg)
}
