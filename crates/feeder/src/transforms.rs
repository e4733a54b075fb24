// ai
//! 🔄 Transforms — everything that happens to a record between disk and wire 🎭🚀
//!
//! 🎬 COLD OPEN — INT. SORTING FACILITY — NIGHT SHIFT
//!
//! The conveyor belt hums. Records roll in, raw and unlabelled, straight out
//! of a load-test run. A clerk squints at the first one, reads the metric
//! name, and stamps the whole pallet: "dv-latency". Nobody checks the rest
//! of the pallet. Nobody ever checks the rest of the pallet.
//!
//! ## The assembly line 📐
//!
//! ```text
//!   raw Record ──▶ data_type::detect ──▶ kube_burner::Enricher ──▶ OpenSearchBulk
//!   (from disk)    (first record only)    (tags, padding, @timestamp)  (action + source lines)
//! ```
//!
//! ## Knowledge Graph 🧠
//! - Depends on: `common::Record`, `common::DataType`
//! - Used by: `composers` (egress), `lib::run` (detect + enrich)
//! - Pattern: zero-sized marker types + static dispatch for the wire formatting
//!
//! 🦆

use crate::common::Record;
use anyhow::Result;

pub(crate) mod data_type;
pub(crate) mod elasticsearch;
pub(crate) mod kube_burner;

pub(crate) use elasticsearch::OpenSearchBulk;
pub use kube_burner::Enricher;

/// 📤 EgressTransform — turns an enriched record into the sink's wire format.
///
/// For the `_bulk` API that is an action line plus a source line, newline separated.
/// The trailing newline is the composer's job, not ours.
///
/// # Contract 📜
///
/// - Input: `&Record` — borrowed, the composer owns the batch
/// - Input: `index` — the fully resolved target index for this record
/// - Output: the exact text the composer appends for this record
pub(crate) trait EgressTransform {
    fn transform_record(record: &Record, index: &str) -> Result<String>;
}
