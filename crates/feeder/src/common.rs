// ai
//! 📦 Common data structures — the building blocks of feeder
//!
//! ---
//!
//! 🎬 COLD OPEN — INT. CI RUNNER — 4:12 AM
//!
//! The load test finished an hour ago. Nobody was watching. Three thousand
//! virtual machines were born, measured, and destroyed, and all that remains
//! of them is a JSON file full of latencies. The file sits on disk. It waits.
//! It has no index. It has no home.
//!
//! ✅ This module defines what that file is made of: [`Record`]s, and the
//! labels we hang on them ([`Category`], [`DataTypeMode`], [`DataType`]) so the
//! cluster knows which shelf to put them on.
//!
//! 🦆
//!
//! ⚠️ The records are deliberately untyped. Load-test tools add fields faster
//! than we can write structs for them, so a record is a bag of JSON and the
//! fields we care about are looked up by name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transforms::data_type;

/// 📦 One measurement event. An open-ended JSON object.
///
/// Backed by `serde_json::Map` with `preserve_order`, so fields come out in the
/// order they went in and anything we add is appended at the end.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// 🎯 The closed set of categories the detector can land on.
///
/// `Unknown` only ever shows up for an empty batch. The others map to an
/// index suffix, except `Generic`, which goes to the bare prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    DvLatency,
    VmiLatency,
    PodLatency,
    Generic,
    Unknown,
}

impl Category {
    /// 🏷️ The label as it lands in `dataType` and in the index name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DvLatency => "dv-latency",
            Category::VmiLatency => "vmi-latency",
            Category::PodLatency => "pod-latency",
            Category::Generic => "generic",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 🎛️ What the operator asked for on the command line (or in env, or in the TOML).
///
/// `Auto` means "look at the first record and guess". Everything else is taken
/// at face value and written verbatim, camelCase and all. Yes, that means
/// `--data-type vmiLatency` lands in `kube-burner-data-vmiLatency` while auto
/// detection lands in `kube-burner-data-vmi-latency`. Two doors, two rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataTypeMode {
    #[default]
    Auto,
    VmiLatency,
    DvLatency,
    PodLatency,
    Generic,
}

impl DataTypeMode {
    /// 📋 Every accepted spelling, in the order the help text shows them.
    pub const ALL: [DataTypeMode; 5] = [
        DataTypeMode::Auto,
        DataTypeMode::VmiLatency,
        DataTypeMode::DvLatency,
        DataTypeMode::PodLatency,
        DataTypeMode::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataTypeMode::Auto => "auto",
            DataTypeMode::VmiLatency => "vmiLatency",
            DataTypeMode::DvLatency => "dvLatency",
            DataTypeMode::PodLatency => "podLatency",
            DataTypeMode::Generic => "generic",
        }
    }

    /// 🔮 Settle on the data type for the whole batch.
    ///
    /// Only `Auto` consults the records, and only the first one. A batch that
    /// mixes pod and dv measurements gets whatever the first record says.
    pub fn resolve(&self, records: &[Record]) -> DataType {
        match self {
            DataTypeMode::Auto => DataType::from(data_type::detect(records)),
            declared => DataType(declared.as_str()),
        }
    }
}

impl fmt::Display for DataTypeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataTypeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        DataTypeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "💀 '{}' is not a data type we know. Pick one of: auto, vmiLatency, dvLatency, podLatency, generic.",
                    s
                )
            })
    }
}

/// 🏷️ The resolved, batch-wide data type label.
///
/// Either a detected [`Category`] or a declared [`DataTypeMode`] spelled verbatim.
/// Small, `Copy`, and only ever holds one of a handful of static strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataType(&'static str);

impl DataType {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// 📡 `""` for generic data, `"-<label>"` for everything else.
    pub fn index_suffix(&self) -> String {
        if self.0 == Category::Generic.as_str() {
            String::new()
        } else {
            format!("-{}", self.0)
        }
    }

    /// 🎯 Prefix + suffix. The shelf this batch is headed for.
    pub fn index_name(&self, index_prefix: &str) -> String {
        format!("{}{}", index_prefix, self.index_suffix())
    }
}

impl From<Category> for DataType {
    fn from(category: Category) -> Self {
        DataType(category.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
