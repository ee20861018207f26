use crate::{filter::RowFilter, table::UnifiedTable};
use itertools::Itertools;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedupSummary {
    pub best_speedup: f64,
    pub best_thread: u32,
    pub average_speedup: f64,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// running best and average of per-thread-count speedups
pub struct SpeedupAccumulator {
    best: Option<(f64, u32)>,
    sum: f64,
    total: usize,
}

impl SpeedupAccumulator {
    pub fn push(&mut self, thread_count: u32, speedup: f64) {
        // ties keep the earlier thread count
        match self.best {
            Some((best, _)) if best >= speedup => {}
            _ => self.best = Some((speedup, thread_count)),
        }

        self.sum += speedup;
        self.total += 1;
    }

    /// `None` if nothing was pushed
    pub fn finish(self) -> Option<SpeedupSummary> {
        self.best.map(|(best_speedup, best_thread)| SpeedupSummary {
            best_speedup,
            best_thread,
            average_speedup: self.sum / self.total as f64,
            total: self.total,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonPoint {
    pub thread_count: u32,
    pub candidate: f64,
    pub reference: f64,
    pub speedup: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub candidate: String,
    pub reference: String,
    pub points: Vec<ComparisonPoint>,
    pub summary: Option<SpeedupSummary>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Compare the mean throughput of `candidate` against `reference` for every thread count of the
/// filtered rows, in order of first appearance.
pub fn compare(
    table: &UnifiedTable,
    filter: &RowFilter,
    candidate: &str,
    reference: &str,
) -> Comparison {
    let rows = table.iter().filter(|row| filter.matches(row)).collect_vec();
    let mut accumulator = SpeedupAccumulator::default();
    let mut points = Vec::new();

    for thread_count in rows
        .iter()
        .map(|row| row.record.record.thread_count)
        .unique()
    {
        let throughput_of = |data_structure: &str| {
            mean(
                rows.iter()
                    .filter(|row| {
                        row.record.record.thread_count == thread_count
                            && row.record.record.data_structure == data_structure
                    })
                    .filter_map(|row| row.throughput),
            )
        };

        match (throughput_of(candidate), throughput_of(reference)) {
            (Some(candidate), Some(reference)) if reference != 0.0 => {
                let speedup = candidate / reference;

                debug!("{thread_count} threads: {candidate} / {reference} = {speedup}");
                accumulator.push(thread_count, speedup);
                points.push(ComparisonPoint {
                    thread_count,
                    candidate,
                    reference,
                    speedup,
                });
            }
            (candidate_mean, reference_mean) => {
                warn!(
                    thread_count = thread_count,
                    "Skipping comparison, candidate mean {candidate_mean:?} reference mean {reference_mean:?}"
                );
            }
        }
    }

    Comparison {
        candidate: candidate.to_string(),
        reference: reference.to_string(),
        points,
        summary: accumulator.finish(),
    }
}
