//! 📂 File backend — reads one JSON file into memory and hands back records.
//!
//! Accepted shapes:
//! - a single object → a batch of one
//! - an array of objects → a batch of many
//!
//! Anything else (a bare string, a number, an array with a stray `null` in it)
//! is an input error. The whole file is read at once; load-test result files
//! fit in memory, and if yours doesn't, this is the wrong tool. 🦆

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use crate::common::Record;

/// 📂 Load every record from `path`.
///
/// 💀 Errors on: missing/unreadable file, malformed JSON, a top-level value that
/// is neither an object nor an array, or an array element that isn't an object.
pub async fn load_records(path: &Path) -> Result<Vec<Record>> {
    let raw = tokio::fs::read_to_string(path).await.with_context(|| {
        format!(
            "💀 Error reading '{}'. We knocked. We checked if it existed (it might not). \
             We checked permissions (they might be wrong). The door remained closed.",
            path.display()
        )
    })?;
    debug!("📂 Read {} bytes from '{}'", raw.len(), path.display());

    let parsed: Value = serde_json::from_str(&raw).with_context(|| {
        format!(
            "💀 Error reading '{}': the contents are not valid JSON.",
            path.display()
        )
    })?;

    records_from_value(parsed)
        .with_context(|| format!("💀 Invalid JSON format in '{}'", path.display()))
}

/// 🔄 Unwrap a parsed document into a list of records.
pub fn records_from_value(parsed: Value) -> Result<Vec<Record>> {
    match parsed {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(elements) => elements
            .into_iter()
            .enumerate()
            .map(|(position, element)| match element {
                Value::Object(record) => Ok(record),
                honestly_who_knows => bail!(
                    "element {} is {}, expected an object",
                    position,
                    kind_of(&honestly_who_knows)
                ),
            })
            .collect(),
        honestly_who_knows => bail!(
            "expected an object or an array of objects, found {}",
            kind_of(&honestly_who_knows)
        ),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
