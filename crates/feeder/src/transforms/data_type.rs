// ai
//! 🔍 Data type detection — judging a whole batch by its first record.
//!
//! The heuristic is intentionally dumb: lower-case the first record's
//! `metricName`, look for a few magic substrings, first match wins.
//! Order matters. `"dv"` is checked before `"vmi"`, so a metric called
//! `vmiDvThing` is a dv-latency metric. Don't name metrics like that.
//!
//! 🦆 The duck was consulted. The duck said "pod". The duck is not the first record.

use crate::common::{Category, Record};

/// 🏷️ Substrings that mark a category, checked top to bottom.
const THE_CATEGORY_TELLS: &[(&[&str], Category)] = &[
    (&["dv", "datavolume"], Category::DvLatency),
    (&["vmi", "virtualmachine"], Category::VmiLatency),
    (&["pod"], Category::PodLatency),
];

/// 🔍 Classify a batch by the `metricName` of its first record.
///
/// Empty batch → [`Category::Unknown`]. Missing or non-string `metricName`
/// is treated as `""`, which matches nothing and lands on [`Category::Generic`].
pub fn detect(records: &[Record]) -> Category {
    let Some(the_chosen_one) = records.first() else {
        return Category::Unknown;
    };

    let metric_name = the_chosen_one
        .get("metricName")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_lowercase();

    THE_CATEGORY_TELLS
        .iter()
        .find(|(tells, _)| tells.iter().any(|tell| metric_name.contains(tell)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch_of_one(metric_name: serde_json::Value) -> Vec<Record> {
        let mut record = Record::new();
        record.insert("metricName".to_string(), metric_name);
        vec![record]
    }

    #[test]
    fn the_one_where_each_metric_finds_its_category() {
        let cases = [
            ("vmiCreationLatency", Category::VmiLatency),
            ("dvReadyLatency", Category::DvLatency),
            ("podScheduledLatency", Category::PodLatency),
            ("customThing", Category::Generic),
            ("DataVolumeLatencyMeasurement", Category::DvLatency),
            ("VirtualMachineReady", Category::VmiLatency),
        ];
        for (metric_name, expected) in cases {
            assert_eq!(
                detect(&batch_of_one(json!(metric_name))),
                expected,
                "metricName {metric_name:?} went to the wrong shelf"
            );
        }
    }

    #[test]
    fn the_one_where_an_empty_batch_is_unknown() {
        assert_eq!(detect(&[]), Category::Unknown);
    }

    #[test]
    fn the_one_where_dv_beats_vmi_because_it_got_there_first() {
        assert_eq!(
            detect(&batch_of_one(json!("vmiDvMashup"))),
            Category::DvLatency
        );
    }

    #[test]
    fn the_one_where_a_missing_or_weird_metric_name_is_generic() {
        assert_eq!(detect(&[Record::new()]), Category::Generic);
        assert_eq!(detect(&batch_of_one(json!(42))), Category::Generic);
    }

    #[test]
    fn the_one_where_only_the_first_record_gets_a_vote() {
        let mut records = batch_of_one(json!("customThing"));
        records.extend(batch_of_one(json!("podReadyLatency")));
        assert_eq!(detect(&records), Category::Generic);
    }
}
