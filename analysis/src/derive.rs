use crate::table::{GroupKey, UnifiedRow, UnifiedTable};
use itertools::Itertools;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use tvbench_ingest::{KnownSets, RunRecord, TaggedRecord};

const NANOS_PER_SEC: f64 = 1e9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeriveParams {
    /// test cases that never abort, only used to flag rows that report aborts anyway
    pub read_only_test_cases: BTreeSet<u32>,
    pub known: KnownSets,
}

impl Default for DeriveParams {
    fn default() -> Self {
        Self {
            read_only_test_cases: default_read_only_test_cases(),
            known: KnownSets::default(),
        }
    }
}

/// pure reads and ranged reads
pub fn default_read_only_test_cases() -> BTreeSet<u32> {
    BTreeSet::from([1, 2, 20])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// the group has no `thread_count == 1` row
    NoSingleThreadRun,
    /// the single-thread row exists but its throughput is undefined or zero
    UndefinedBaseline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// non-fatal: the rows of `key` carry no relative speedup
pub struct MissingBaseline {
    pub key: GroupKey,
    pub rows: usize,
    pub reason: MissingReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub table: UnifiedTable,
    /// sorted by group key
    pub missing_baselines: Vec<MissingBaseline>,
}

impl Derived {
    pub fn undefined_throughput(&self) -> usize {
        self.table
            .iter()
            .filter(|row| row.throughput.is_none())
            .count()
    }
}

/// completed operations per second, `None` if no time elapsed or more transactions aborted than
/// were run
pub fn throughput(record: &RunRecord) -> Option<f64> {
    if record.elapsed_time_ns == 0 {
        return None;
    }

    // only completed transactions count
    let completed = record.num_transactions.checked_sub(record.aborts)?;

    Some(completed as f64 * record.txn_size as f64 * NANOS_PER_SEC / record.elapsed_time_ns as f64)
}

/// Decorate `records` with throughput and relative speedup.
///
/// Rows are grouped by `GroupKey`, only rows whose data structure and system are both in
/// `params.known` take part. Within a group the first `thread_count == 1` row in input order is
/// the baseline. Groups are independent of each other, so the traversal order of the grouping
/// has no influence on the result.
pub fn derive(records: Vec<TaggedRecord>, params: &DeriveParams) -> Derived {
    let mut rows = records
        .into_iter()
        .map(|record| {
            let run = &record.record;

            if run.aborts > 0 && params.read_only_test_cases.contains(&run.test_case) {
                warn!(
                    data_structure = run.data_structure.as_str(),
                    system = record.system.as_str(),
                    test_case = run.test_case,
                    aborts = run.aborts,
                    "Read-only test case reports aborts, counting them anyway"
                );
            }
            if run.aborts > run.num_transactions {
                warn!(
                    data_structure = run.data_structure.as_str(),
                    system = record.system.as_str(),
                    "More aborts ({}) than transactions ({}), throughput left undefined",
                    run.aborts,
                    run.num_transactions
                );
            }

            let throughput = throughput(run);

            if throughput.is_none() && run.elapsed_time_ns == 0 {
                debug!(
                    data_structure = run.data_structure.as_str(),
                    system = record.system.as_str(),
                    thread_count = run.thread_count,
                    "Zero elapsed time, throughput left undefined"
                );
            }

            UnifiedRow {
                record,
                throughput,
                relative_speedup: None,
            }
        })
        .collect_vec();

    let groups = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            params
                .known
                .is_known(&row.record.record.data_structure, &row.record.system)
        })
        .map(|(index, row)| (GroupKey::of(&row.record), index))
        .into_group_map();

    let mut missing_baselines = Vec::new();

    for (key, indices) in groups {
        let baseline = indices
            .iter()
            .find(|&&index| rows[index].record.record.thread_count == 1);

        let base = match baseline {
            Some(&index) => match rows[index].throughput {
                Some(base) if base != 0.0 => base,
                _ => {
                    warn!("Baseline of {key} has no usable throughput, relative speedup left undefined");
                    missing_baselines.push(MissingBaseline {
                        key,
                        rows: indices.len(),
                        reason: MissingReason::UndefinedBaseline,
                    });
                    continue;
                }
            },
            None => {
                warn!("No single-thread run for {key}, relative speedup left undefined");
                missing_baselines.push(MissingBaseline {
                    key,
                    rows: indices.len(),
                    reason: MissingReason::NoSingleThreadRun,
                });
                continue;
            }
        };

        for index in indices {
            rows[index].relative_speedup = rows[index].throughput.map(|value| value / base);
        }
    }

    missing_baselines.sort_by(|a, b| a.key.cmp(&b.key));

    Derived {
        table: UnifiedTable { rows },
        missing_baselines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(data_structure: &str, thread_count: u32, elapsed_time_ns: u64) -> RunRecord {
        RunRecord {
            data_structure: data_structure.to_string(),
            test_case: 4,
            segment_size: 1024,
            num_transactions: 100000,
            txn_size: 5,
            thread_count,
            elapsed_time_ns,
            aborts: 0,
        }
    }

    fn intel(record: RunRecord) -> TaggedRecord {
        TaggedRecord::new(record, "INTEL")
    }

    #[test]
    fn throughput_of_example_row() {
        assert_eq!(throughput(&run("SEGME", 8, 2_000_000_000)), Some(250000.0));
    }

    #[test]
    fn throughput_counts_completed_transactions_only() {
        let mut record = run("STMVE", 4, 1_000_000_000);
        record.aborts = 40000;

        assert_eq!(throughput(&record), Some(300000.0));
    }

    #[test]
    fn zero_elapsed_time_is_undefined() {
        assert_eq!(throughput(&run("SEGME", 1, 0)), None);
    }

    #[test]
    fn more_aborts_than_transactions_is_undefined() {
        let mut record = run("SEGME", 1, 1_000_000_000);
        record.num_transactions = 10;
        record.aborts = 20;

        assert_eq!(throughput(&record), None);

        let derived = derive(
            vec![intel(record), intel(run("SEGME", 8, 2_000_000_000))],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.rows[0].throughput, None);
        assert!(derived
            .table
            .iter()
            .all(|row| row.relative_speedup.is_none()));
        assert_eq!(
            derived.missing_baselines[0].reason,
            MissingReason::UndefinedBaseline
        );
    }

    #[test]
    fn read_only_aborts_are_still_respected() {
        let mut record = run("COMPA", 2, 1_000_000_000);
        record.test_case = 1;
        record.aborts = 50000;

        let derived = derive(vec![intel(record)], &DeriveParams::default());

        assert_eq!(derived.table.rows[0].throughput, Some(250000.0));
    }

    #[test]
    fn relative_speedup_against_single_thread() {
        let derived = derive(
            vec![
                intel(run("SEGME", 1, 10_000_000_000)),
                intel(run("SEGME", 8, 2_000_000_000)),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.rows[0].throughput, Some(50000.0));
        assert_eq!(derived.table.rows[0].relative_speedup, Some(1.0));
        assert_eq!(derived.table.rows[1].relative_speedup, Some(5.0));
        assert!(derived.missing_baselines.is_empty());
    }

    #[test]
    fn baseline_may_follow_other_rows() {
        let derived = derive(
            vec![
                intel(run("SEGME", 8, 2_000_000_000)),
                intel(run("SEGME", 1, 10_000_000_000)),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.rows[0].relative_speedup, Some(5.0));
        assert_eq!(derived.table.rows[1].relative_speedup, Some(1.0));
    }

    #[test]
    fn missing_baseline_leaves_group_undefined() {
        let derived = derive(
            vec![
                intel(run("BOOST", 2, 1_000_000_000)),
                intel(run("BOOST", 4, 1_000_000_000)),
                intel(run("SEGME", 1, 1_000_000_000)),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.len(), 3);
        assert_eq!(derived.table.rows[0].relative_speedup, None);
        assert_eq!(derived.table.rows[1].relative_speedup, None);
        assert_eq!(derived.table.rows[2].relative_speedup, Some(1.0));
        assert_eq!(
            derived.missing_baselines,
            vec![MissingBaseline {
                key: GroupKey::of(&intel(run("BOOST", 2, 1))),
                rows: 2,
                reason: MissingReason::NoSingleThreadRun,
            }]
        );
    }

    #[test]
    fn undefined_baseline_throughput_leaves_group_undefined() {
        let derived = derive(
            vec![
                intel(run("COMPA", 1, 0)),
                intel(run("COMPA", 8, 1_000_000_000)),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.undefined_throughput(), 1);
        assert!(derived
            .table
            .iter()
            .all(|row| row.relative_speedup.is_none()));
        assert_eq!(
            derived.missing_baselines[0].reason,
            MissingReason::UndefinedBaseline
        );
    }

    #[test]
    fn duplicate_baselines_use_first_in_order() {
        let derived = derive(
            vec![
                intel(run("SEGME", 1, 10_000_000_000)),
                intel(run("SEGME", 1, 5_000_000_000)),
                intel(run("SEGME", 8, 2_000_000_000)),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.rows[1].relative_speedup, Some(2.0));
        assert_eq!(derived.table.rows[2].relative_speedup, Some(5.0));
    }

    #[test]
    fn unknown_identifiers_pass_through_without_speedup() {
        let derived = derive(
            vec![
                intel(run("SEGHF", 1, 1_000_000_000)),
                TaggedRecord::new(run("SEGME", 1, 1_000_000_000), "POWER9"),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.len(), 2);
        assert!(derived.table.iter().all(|row| row.throughput.is_some()));
        assert!(derived
            .table
            .iter()
            .all(|row| row.relative_speedup.is_none()));
        // these rows are not grouped at all, so no baseline is reported missing
        assert!(derived.missing_baselines.is_empty());
    }

    #[test]
    fn groups_are_split_by_platform_and_txn_size() {
        let mut small = run("SEGME", 8, 1_000_000_000);
        small.txn_size = 1;

        let derived = derive(
            vec![
                intel(run("SEGME", 1, 10_000_000_000)),
                TaggedRecord::new(run("SEGME", 8, 2_000_000_000), "AMD"),
                intel(small),
            ],
            &DeriveParams::default(),
        );

        assert_eq!(derived.table.rows[0].relative_speedup, Some(1.0));
        assert_eq!(derived.table.rows[1].relative_speedup, None);
        assert_eq!(derived.table.rows[2].relative_speedup, None);
        assert_eq!(derived.missing_baselines.len(), 2);
    }
}
