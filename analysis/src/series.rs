use crate::{
    filter::RowFilter,
    table::{UnifiedRow, UnifiedTable},
};
use itertools::Itertools;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    #[default]
    Throughput,
    RelativeSpeedup,
}

impl Metric {
    pub fn of(self, row: &UnifiedRow) -> Option<f64> {
        match self {
            Self::Throughput => row.throughput,
            Self::RelativeSpeedup => row.relative_speedup,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Throughput => "throughput",
            Self::RelativeSpeedup => "relative_speedup",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// what distinguishes the lines of a plot
pub enum Hue {
    #[default]
    DataStructure,
    System,
    Joint,
}

impl Hue {
    pub fn label(self, row: &UnifiedRow) -> String {
        match self {
            Self::DataStructure => row.record.record.data_structure.clone(),
            Self::System => row.record.system.clone(),
            Self::Joint => joint_label(&row.record.system, &row.record.record.data_structure),
        }
    }
}

pub fn joint_label(system: &str, data_structure: &str) -> String {
    format!("{system}-{data_structure}")
}

#[derive(Debug, Clone, PartialEq)]
/// one plot line, `(thread_count, mean value)` ordered by thread count
pub struct Series {
    pub label: String,
    pub points: Vec<(u32, f64)>,
}

/// Group the filtered rows into one series per hue label, averaging repeated runs of the same
/// thread count. Rows without a value for `metric` are left out.
pub fn extract(table: &UnifiedTable, filter: &RowFilter, metric: Metric, hue: Hue) -> Vec<Series> {
    let mut lines: BTreeMap<String, BTreeMap<u32, (f64, usize)>> = BTreeMap::new();

    for row in table.iter().filter(|row| filter.matches(row)) {
        if let Some(value) = metric.of(row) {
            let entry = lines
                .entry(hue.label(row))
                .or_default()
                .entry(row.record.record.thread_count)
                .or_insert((0.0, 0));

            entry.0 += value;
            entry.1 += 1;
        }
    }

    lines
        .into_iter()
        .map(|(label, points)| Series {
            label,
            points: points
                .into_iter()
                .map(|(thread_count, (sum, count))| (thread_count, sum / count as f64))
                .collect_vec(),
        })
        .collect_vec()
}
