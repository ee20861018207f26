use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Columns of a raw, per-platform result file in positional order
pub const RAW_COLUMNS: [&str; 8] = [
    "data_structure",
    "test_case",
    "segment_size",
    "num_transactions",
    "txn_size",
    "thread_count",
    "elapsed_time_ns",
    "aborts",
];

/// Columns of an emitted report in positional order
pub const REPORT_COLUMNS: [&str; 11] = [
    "data_structure",
    "test_case",
    "segment_size",
    "num_transactions",
    "txn_size",
    "thread_count",
    "elapsed_time_ns",
    "aborts",
    "system",
    "throughput",
    "relative_speedup",
];

/// Optional trailing column holding `SYSTEM-DATA_STRUCTURE`
pub const JOINT_COLUMN: &str = "joint";

#[derive(Debug, Clone, PartialEq, Eq)]
/// outcome of a single benchmark execution as written by the harness
pub struct RunRecord {
    pub data_structure: String,
    pub test_case: u32,
    pub segment_size: u64,
    pub num_transactions: u64,
    pub txn_size: u64,
    pub thread_count: u32,
    pub elapsed_time_ns: u64,
    pub aborts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// a `RunRecord` stamped with the platform it was measured on
pub struct TaggedRecord {
    pub record: RunRecord,
    pub system: String,
}

impl TaggedRecord {
    pub fn new(record: RunRecord, system: impl Into<String>) -> Self {
        Self {
            record,
            system: system.into(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// The enumerated data structure and platform identifiers known ahead of time.
///
/// Records outside these sets are carried through every stage untouched, they are only
/// excluded from the single-thread baseline lookup.
pub struct KnownSets {
    #[serde(default = "default_structures")]
    pub structures: BTreeSet<String>,
    #[serde(default = "default_systems")]
    pub systems: BTreeSet<String>,
}

impl KnownSets {
    pub fn is_known(&self, data_structure: &str, system: &str) -> bool {
        self.structures.contains(data_structure) && self.systems.contains(system)
    }
}

impl Default for KnownSets {
    fn default() -> Self {
        Self {
            structures: default_structures(),
            systems: default_systems(),
        }
    }
}

fn default_structures() -> BTreeSet<String> {
    ["SEGME", "COMPA", "BOOST", "STMVE", "STOVEC"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_systems() -> BTreeSet<String> {
    ["INTEL", "AMD", "ARM", "NUMA"]
        .into_iter()
        .map(String::from)
        .collect()
}
