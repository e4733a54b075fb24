// ai
//! 🗂️ The index template — one mapping to rule every kube-burner index.
//!
//! 🎬 COLD OPEN — INT. LIBRARY — THE CARD CATALOGUE
//!
//! Before the first document arrives, somebody has to tell the cluster what
//! a `jobIteration` is (a keyword, not a number, we padded it for a reason)
//! and that `vmiRunningLatency` is a float and not a string that happens to
//! look like one. That somebody is this module.
//!
//! ## Knowledge Graph 🧠
//! - Template name: [`THE_TEMPLATE_NAME`], PUT to `/_index_template/<name>`
//! - Pattern: `<index prefix>*`, so every suffixed index (`-dv-latency`,
//!   `-vmi-latency`, ...) picks it up
//! - Mapping: union of base, VMI and DV fields. No per-category templates.
//!   A pod-latency index happily carries an unused `dvBoundLatency` mapping.
//! - Built fresh on every run. Never diffed against what the cluster has.
//!
//! 🦆

use serde_json::{Map, Value, json};

/// 🏷️ The one template this tool owns. Re-PUTting it overwrites, which is the point.
pub const THE_TEMPLATE_NAME: &str = "kube-burner-template";

/// 📦 Base fields every record can carry, whatever its data type.
const THE_BASE_KEYWORDS: &[&str] = &[
    "metricName",
    "uuid",
    "namespace",
    "jobName",
    "jobIteration",
    "replica",
    "source",
    "dataType",
    "organizationID",
];

const THE_BASE_DATES: &[&str] = &["@timestamp", "timestamp"];

/// 🖥️ VMI measurement identifiers.
const THE_VMI_KEYWORDS: &[&str] = &["podName", "vmName", "vmiName", "nodeName"];

/// ⏱️ VMI measurement latencies.
const THE_VMI_LATENCIES: &[&str] = &[
    "podCreatedLatency",
    "podReadyLatency",
    "podScheduledLatency",
    "podInitializedLatency",
    "podContainersReadyLatency",
    "vmiCreatedLatency",
    "vmiPendingLatency",
    "vmiSchedulingLatency",
    "vmiScheduledLatency",
    "vmiRunningLatency",
    "vmReadyLatency",
];

/// 💾 DataVolume measurement fields.
const THE_DV_KEYWORDS: &[&str] = &["dvName"];
const THE_DV_LATENCIES: &[&str] = &["dvBoundLatency", "dvRunningLatency", "dvReadyLatency"];

/// 🏗️ Build the `_index_template` body for everything under `index_prefix`.
pub fn build_template(index_prefix: &str) -> Value {
    json!({
        "index_patterns": [format!("{}*", index_prefix)],
        "template": {
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 1,
                "index.refresh_interval": "30s"
            },
            "mappings": {
                "properties": build_properties()
            }
        }
    })
}

/// 🧩 Base ∪ VMI ∪ DV, in that order.
fn build_properties() -> Map<String, Value> {
    let mut properties = Map::new();

    typed(&mut properties, THE_BASE_DATES, "date");
    typed(&mut properties, THE_BASE_KEYWORDS, "keyword");
    properties.insert(
        "metadata".to_string(),
        json!({
            "type": "object",
            "properties": {
                "ocpMajorVersion": {"type": "keyword"},
                "ocpVersion": {"type": "keyword"}
            }
        }),
    );

    typed(&mut properties, THE_VMI_KEYWORDS, "keyword");
    typed(&mut properties, THE_VMI_LATENCIES, "float");

    typed(&mut properties, THE_DV_KEYWORDS, "keyword");
    typed(&mut properties, THE_DV_LATENCIES, "float");

    properties
}

fn typed(properties: &mut Map<String, Value>, fields: &[&str], field_type: &str) {
    for field in fields {
        properties.insert((*field).to_string(), json!({ "type": field_type }));
    }
}
