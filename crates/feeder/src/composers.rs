// ai
//! 🎬 *[the records are enriched. the transformer awaits. the cluster hungers.]*
//! *["Compose me," whispers the payload. "Make me whole."]*
//!
//! 🎼 The Composers module — turning enriched records into one `_bulk` body.
//!
//! 🧠 Knowledge graph:
//! - **NDJSON** (`NdjsonComposer`): every record becomes an action line and a
//!   source line (via `OpenSearchBulk`), every line ends in `\n`.
//! - Output: a [`BulkBatch`], which owns the payload and is consumed by
//!   `OpenSearchClient::upload`. You get one shot at sending it.
//!
//! ```text
//!   &[Record] ──▶ NdjsonComposer::compose ──▶ BulkBatch ──▶ OpenSearchClient::upload
//! ```
//!
//! 🦆 (the duck composes... symphonies? payloads? both? the duck has no comment.)

use anyhow::Result;

use crate::common::{DataType, Record};
use crate::transforms::{EgressTransform, OpenSearchBulk};

/// 📦 A ready-to-send `_bulk` body.
///
/// One action/document pair per record, in input order, with the trailing
/// newline already in place. Fields are private so nothing can sneak a line
/// in after composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkBatch {
    payload: String,
    documents: usize,
}

impl BulkBatch {
    /// 📊 How many documents ride in this batch.
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// 🗑️ Give up the body. Used by the uploader when it hands bytes to the HTTP client.
    pub fn into_payload(self) -> String {
        self.payload
    }
}

/// 📡 Newline-Delimited JSON — the format `/_bulk` demands.
///
/// After compose: `"action1\nsource1\naction2\nsource2\n"`.
/// No records in, empty payload out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonComposer;

impl NdjsonComposer {
    /// 🎼 Compose every record into one payload aimed at `index_prefix` + the data type suffix.
    pub fn compose(
        &self,
        records: &[Record],
        data_type: DataType,
        index_prefix: &str,
    ) -> Result<BulkBatch> {
        // -- every record in a batch shares the data type, so the index is computed once
        let final_index_name = data_type.index_name(index_prefix);

        let mut payload = String::new();
        for record in records {
            let item = OpenSearchBulk::transform_record(record, &final_index_name)?;
            payload.push_str(&item);
            payload.push('\n');
        }

        // -- ✅ Trailing \n included. Ancient proverb: "He who omits the trailing newline, debugs at 3am."
        Ok(BulkBatch {
            payload,
            documents: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Category;
    use serde_json::json;

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|position| {
                let mut record = Record::new();
                record.insert("position".to_string(), json!(position));
                record
            })
            .collect()
    }

    #[test]
    fn the_one_where_n_records_become_n_pairs_in_order() -> Result<()> {
        let batch = NdjsonComposer.compose(
            &records(3),
            DataType::from(Category::VmiLatency),
            "kube-burner-data",
        )?;

        assert_eq!(batch.documents(), 3);
        let lines: Vec<&str> = batch.payload().lines().collect();
        assert_eq!(lines.len(), 6, "three pairs, six lines");

        for (pair_number, pair) in lines.chunks(2).enumerate() {
            let action: serde_json::Value = serde_json::from_str(pair[0])?;
            let source: serde_json::Value = serde_json::from_str(pair[1])?;
            assert_eq!(action["index"]["_index"], "kube-burner-data-vmi-latency");
            assert_eq!(source["position"], pair_number, "input order must survive");
        }
        Ok(())
    }

    #[test]
    fn the_one_where_the_payload_ends_with_exactly_one_newline() -> Result<()> {
        let batch = NdjsonComposer.compose(&records(2), DataType::from(Category::Generic), "idx")?;
        let payload = batch.payload();

        assert!(payload.ends_with('\n'), "bulk bodies end in a newline. always.");
        assert!(!payload.ends_with("\n\n"), "one newline. not two. this isn't a paragraph.");
        assert!(!payload.contains("\n\n"), "no blank lines anywhere");
        assert_eq!(payload.matches('\n').count() % 2, 0, "lines come in pairs");
        Ok(())
    }

    #[test]
    fn the_one_where_generic_records_go_to_the_bare_prefix() -> Result<()> {
        let batch = NdjsonComposer.compose(
            &records(1),
            DataType::from(Category::Generic),
            "kube-burner-data",
        )?;
        let action: serde_json::Value =
            serde_json::from_str(batch.payload().lines().next().unwrap_or_default())?;
        assert_eq!(action["index"]["_index"], "kube-burner-data");
        Ok(())
    }

    #[test]
    fn the_one_where_nothing_in_means_nothing_out() -> Result<()> {
        let batch = NdjsonComposer.compose(&[], DataType::from(Category::Unknown), "idx")?;
        assert!(batch.is_empty());
        assert_eq!(batch.into_payload(), "");
        Ok(())
    }
}
