// ai
//! 🏷️ kube-burner record enrichment — tags, padding, and a borrowed timestamp 🔄
//!
//! 🎬 COLD OPEN — INT. LABEL PRINTER — THE LABEL PRINTER IS JAMMED
//!
//! Every record leaving this module wears the same uniform: a `source`, a
//! `dataType`, maybe an `organizationID`, and an `@timestamp` if it showed
//! up with a `timestamp`. Integers in `jobIteration` and `replica` get
//! dressed up as four-digit strings so dashboards sort them like humans do.
//!
//! ## What gets touched 🔧
//!
//! 1. `organizationID` ← the tenant id, when there is one (overwrites)
//! 2. `jobIteration`   ← `7` becomes `"0007"` (integers only)
//! 3. `replica`        ← same treatment
//! 4. `source`         ← always `"direct-api"`
//! 5. `dataType`       ← the batch-wide label
//! 6. `@timestamp`     ← copy of `timestamp`, verbatim, if present
//!
//! Nothing is ever removed. Unknown fields ride along untouched.
//!
//! ⚠️ Width 4 is a floor, not a ceiling: `12345` becomes `"12345"`. Sorting
//! breaks past iteration 9999. Nobody has run 10,000 iterations. Yet. 🦆

use serde_json::Value;

use crate::common::{DataType, Record};

/// 📡 The provenance tag every uploaded record carries.
pub const THE_SOURCE_TAG: &str = "direct-api";

/// 🔢 Fields whose integer values get zero-padded into strings.
const THE_PADDED_FIELDS: &[&str] = &["jobIteration", "replica"];

/// 🔢 Minimum digit count for the padded fields.
const THE_PAD_WIDTH: usize = 4;

/// 🏷️ Enricher — stamps every record in a batch with the same labels.
///
/// Built once per batch (the data type and tenant don't change mid-batch),
/// then applied to each record in place.
#[derive(Debug, Clone)]
pub struct Enricher {
    data_type: DataType,
    organization_id: Option<String>,
}

impl Enricher {
    /// 🚀 An empty organization id counts as "no tenant", same as `None`.
    pub fn new(data_type: DataType, organization_id: Option<String>) -> Self {
        Self {
            data_type,
            organization_id: organization_id.filter(|id| !id.is_empty()),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// 🔄 Enrich one record in place and hand it back.
    pub fn enrich<'a>(&self, record: &'a mut Record) -> &'a mut Record {
        if let Some(ref tenant) = self.organization_id {
            record.insert("organizationID".to_string(), Value::String(tenant.clone()));
        }

        for field in THE_PADDED_FIELDS {
            if let Some(padded) = record.get(*field).and_then(zero_pad) {
                record.insert((*field).to_string(), Value::String(padded));
            }
        }

        record.insert(
            "source".to_string(),
            Value::String(THE_SOURCE_TAG.to_string()),
        );
        record.insert(
            "dataType".to_string(),
            Value::String(self.data_type.as_str().to_string()),
        );

        // -- ⏰ no parsing, no validation. garbage in, identical garbage in @timestamp.
        if let Some(timestamp) = record.get("timestamp").cloned() {
            record.insert("@timestamp".to_string(), timestamp);
        }

        record
    }
}

/// 🔢 `Some("0007")` for integer 7, `None` for anything that isn't an integer.
///
/// Floats (even `7.0`), strings, and booleans are left alone. Negative numbers
/// pad the way `{:04}` pads them: `-7` → `"-007"`.
fn zero_pad(value: &Value) -> Option<String> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(signed) = number.as_i64() {
        Some(format!("{:0width$}", signed, width = THE_PAD_WIDTH))
    } else {
        number
            .as_u64()
            .map(|unsigned| format!("{:0width$}", unsigned, width = THE_PAD_WIDTH))
    }
}
