use crate::{
    series::{joint_label, Metric, Series},
    stats::{Comparison, SpeedupSummary},
    table::UnifiedTable,
};
use csv::{Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tvbench_ingest::{JOINT_COLUMN, REPORT_COLUMNS};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EmitOptions {
    /// append a `SYSTEM-DATA_STRUCTURE` column
    #[serde(default)]
    pub joint: bool,
    /// written in place of undefined derived values
    #[serde(default)]
    pub missing_marker: String,
}

/// shortest representation that reads back to the same value, always with a decimal point
pub fn format_float(value: f64) -> String {
    let shortest = format!("{value:?}");

    match shortest.split_once('e') {
        // at this magnitude every f64 is integral, so all digits are exact
        Some(_) if value.abs() >= 1.0 => format!("{value:.1}"),
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0e{exponent}")
        }
        _ => shortest,
    }
}

fn format_optional(value: Option<f64>, options: &EmitOptions) -> String {
    value
        .map(format_float)
        .unwrap_or_else(|| options.missing_marker.clone())
}

fn tsv<W: Write>(writer: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

pub fn write_table<W: Write>(
    table: &UnifiedTable,
    writer: W,
    options: &EmitOptions,
) -> Result<(), csv::Error> {
    let mut writer = tsv(writer);
    let mut header = REPORT_COLUMNS.to_vec();

    if options.joint {
        header.push(JOINT_COLUMN);
    }
    writer.write_record(&header)?;

    for row in table {
        let run = &row.record.record;
        let mut fields = vec![
            run.data_structure.clone(),
            run.test_case.to_string(),
            run.segment_size.to_string(),
            run.num_transactions.to_string(),
            run.txn_size.to_string(),
            run.thread_count.to_string(),
            run.elapsed_time_ns.to_string(),
            run.aborts.to_string(),
            row.record.system.clone(),
            format_optional(row.throughput, options),
            format_optional(row.relative_speedup, options),
        ];

        if options.joint {
            fields.push(joint_label(&row.record.system, &run.data_structure));
        }

        writer.write_record(&fields)?;
    }

    writer.flush()?;

    Ok(())
}

/// long format, one `label, thread_count, value` row per point
pub fn write_series<W: Write>(
    series: &[Series],
    metric: Metric,
    writer: W,
) -> Result<(), csv::Error> {
    let mut writer = tsv(writer);

    writer.write_record(["label", "thread_count", metric.column()])?;
    for line in series {
        for (thread_count, value) in &line.points {
            writer.write_record([
                line.label.clone(),
                thread_count.to_string(),
                format_float(*value),
            ])?;
        }
    }

    writer.flush()?;

    Ok(())
}

pub fn write_comparison<W: Write>(comparison: &Comparison, writer: W) -> Result<(), csv::Error> {
    let mut writer = tsv(writer);

    writer.write_record([
        "thread_count",
        comparison.candidate.as_str(),
        comparison.reference.as_str(),
        "speedup",
    ])?;
    for point in &comparison.points {
        writer.write_record([
            point.thread_count.to_string(),
            format_float(point.candidate),
            format_float(point.reference),
            format_float(point.speedup),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

pub fn write_summary<W: Write>(summary: &SpeedupSummary, mut writer: W) -> std::io::Result<()> {
    writeln!(
        writer,
        "best_speedup\t{}\ton_thread\t{}",
        format_float(summary.best_speedup),
        summary.best_thread
    )?;
    writeln!(writer, "total\t{}", summary.total)?;
    writeln!(
        writer,
        "average_speedup\t{}",
        format_float(summary.average_speedup)
    )
}
