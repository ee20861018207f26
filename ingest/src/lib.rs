//! Reading of benchmark result tables.
//!
//! Raw result files are produced once per hardware platform by the benchmark harness, one
//! tab-separated row per run. Reports are the merged tables emitted by `tvbench-analysis`.

pub mod reader;
pub mod record;

#[cfg(test)]
mod reader_test;

pub use reader::{read_platform, read_platform_from, read_report, read_report_from};
pub use record::{KnownSets, RunRecord, TaggedRecord, JOINT_COLUMN, RAW_COLUMNS, REPORT_COLUMNS};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed input in {source_name} line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        source_name: String,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Malformed input in {source_name} line {line}: invalid {column} value '{value}'")]
    Field {
        source_name: String,
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("Malformed input in {source_name}: {source}")]
    Csv {
        source_name: String,
        source: csv::Error,
    },
}

impl IngestError {
    /// whether the error stems from the content of the input rather than from accessing it
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}
