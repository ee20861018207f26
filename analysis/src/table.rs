use tvbench_ingest::TaggedRecord;

#[derive(Debug, Clone, PartialEq)]
/// a tagged record decorated with its derived metrics
/// `None` marks a metric that could not be derived
pub struct UnifiedRow {
    pub record: TaggedRecord,
    pub throughput: Option<f64>,
    pub relative_speedup: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTable {
    pub rows: Vec<UnifiedRow>,
}

impl UnifiedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedRow> {
        self.rows.iter()
    }

    /// the underlying records with all derived columns stripped
    pub fn records(&self) -> Vec<TaggedRecord> {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a UnifiedTable {
    type Item = &'a UnifiedRow;
    type IntoIter = std::slice::Iter<'a, UnifiedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// configuration shared by all rows normalized against the same single-thread baseline
pub struct GroupKey {
    pub data_structure: String,
    pub system: String,
    pub test_case: u32,
    pub txn_size: u64,
}

impl GroupKey {
    pub fn of(record: &TaggedRecord) -> Self {
        Self {
            data_structure: record.record.data_structure.clone(),
            system: record.system.clone(),
            test_case: record.record.test_case,
            txn_size: record.record.txn_size,
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, test case {}, txn size {})",
            self.data_structure, self.system, self.test_case, self.txn_size
        )
    }
}

/// concatenate per-platform tables, keeping source order and row order within each source
pub fn merge(tables: Vec<Vec<TaggedRecord>>) -> Vec<TaggedRecord> {
    let total = tables.iter().map(Vec::len).sum();

    tables
        .into_iter()
        .fold(Vec::with_capacity(total), |mut merged, table| {
            merged.extend(table);
            merged
        })
}
