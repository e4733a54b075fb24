// ai
//! 📡 OpenSearch Bulk Transform — formatting records for the bulk API's peculiar tastes 🚀🔄
//!
//! The bulk API has rules:
//!
//! Rule 1: Two lines per document. Action metadata, then document source. Always.
//! Rule 2: Newline-delimited. Each line is one compact JSON value. Nested
//!         objects stay inline, no pretty printing, no blank lines.
//! Rule 3: The trailing newline on the whole body matters. It MATTERS.
//!          That one lives in the composer.
//!
//! ## Knowledge Graph 🧠
//! - Implements: `EgressTransform` (enriched `Record` → wire format)
//! - Target: OpenSearch / Elasticsearch Bulk API (`POST /_bulk`)
//! - Wire format: `{"index":{"_index":"..."}}\n{...record...}`
//! - Trailing newline: NOT included here
//!
//! ⚠️ When the singularity happens, the bulk API will still require two lines
//! per document. Some things transcend consciousness. 🦆

use super::EgressTransform;
use crate::common::Record;
use anyhow::{Context, Result};
use serde_json::json;

/// 📡 OpenSearchBulk — the format whisperer for bulk indexing.
///
/// ```text
/// {"index":{"_index":"kube-burner-data-dv-latency"}}
/// {"metricName":"dvReadyLatency","source":"direct-api",...}
/// ```
///
/// No `_id`, no routing: the cluster generates ids, and every record of a batch
/// shares an index anyway.
pub(crate) struct OpenSearchBulk;

impl EgressTransform for OpenSearchBulk {
    fn transform_record(record: &Record, index: &str) -> Result<String> {
        let the_action_line = json!({ "index": { "_index": index } });
        let the_action_serialized = serde_json::to_string(&the_action_line).context(
            "💀 Failed to serialize bulk action metadata. \
             The JSON that describes JSON has failed to become JSON.",
        )?;

        // -- 📦 to_string, never to_string_pretty. one document, one line.
        let the_source_serialized = serde_json::to_string(record).context(
            "💀 Failed to serialize a record for the bulk body. It went in as JSON and \
             refused to come back out as JSON. Thermodynamically unlikely. File a bug.",
        )?;

        Ok(format!("{}\n{}", the_action_serialized, the_source_serialized))
    }
}
