use crate::table::UnifiedRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// Selection of report rows, an empty set matches everything
pub struct RowFilter {
    #[serde(default)]
    pub systems: BTreeSet<String>,
    #[serde(default)]
    pub data_structures: BTreeSet<String>,
    #[serde(default)]
    pub test_cases: BTreeSet<u32>,
    #[serde(default)]
    pub txn_sizes: BTreeSet<u64>,
}

fn admits<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

impl RowFilter {
    pub fn matches(&self, row: &UnifiedRow) -> bool {
        let run = &row.record.record;

        admits(&self.systems, &row.record.system)
            && admits(&self.data_structures, &run.data_structure)
            && admits(&self.test_cases, &run.test_case)
            && admits(&self.txn_sizes, &run.txn_size)
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.systems.insert(system.into());
        self
    }

    pub fn data_structure(mut self, data_structure: impl Into<String>) -> Self {
        self.data_structures.insert(data_structure.into());
        self
    }

    pub fn test_case(mut self, test_case: u32) -> Self {
        self.test_cases.insert(test_case);
        self
    }

    pub fn txn_size(mut self, txn_size: u64) -> Self {
        self.txn_sizes.insert(txn_size);
        self
    }
}
