use crate::{read_platform, read_platform_from, read_report_from, IngestError, RunRecord};
use std::io::Write;

const HEADER: &str =
    "DATA STRUCTURE\tTESTCASE\tSGMT_SIZE\tNUM_TXN\tTXN_SIZE\tTHRD_CNT\tTIME\tABORTS\n";

fn segme(thread_count: u32, elapsed_time_ns: u64) -> RunRecord {
    RunRecord {
        data_structure: "SEGME".to_string(),
        test_case: 4,
        segment_size: 1024,
        num_transactions: 100000,
        txn_size: 5,
        thread_count,
        elapsed_time_ns,
        aborts: 0,
    }
}

#[test]
pub fn reads_and_tags_rows_in_order() {
    let input = format!(
        "{HEADER}SEGME\t4\t1024\t100000\t5\t1\t10000000000\t0\nSEGME\t4\t1024\t100000\t5\t8\t2000000000\t0\n"
    );
    let records = read_platform_from(input.as_bytes(), "intel.txt", "INTEL").unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record, segme(1, 10000000000));
    assert_eq!(records[1].record, segme(8, 2000000000));
    assert!(records.iter().all(|record| record.system == "INTEL"));
}

#[test]
pub fn first_line_is_always_discarded() {
    // even a line that would parse is treated as the header
    let input = "SEGME\t4\t1024\t100000\t5\t1\t10\t0\nSEGME\t4\t1024\t100000\t5\t8\t20\t0\n";
    let records = read_platform_from(input.as_bytes(), "amd.txt", "AMD").unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.thread_count, 8);
}

#[test]
pub fn blank_first_line_is_the_header() {
    let input = "\nSEGME\t4\t1024\t100000\t5\t1\t10\t0\nSEGME\t4\t1024\t100000\t5\t8\t20\t0\n";
    let records = read_platform_from(input.as_bytes(), "blank.txt", "AMD").unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record.thread_count, 1);
    assert_eq!(records[1].record.thread_count, 8);
}

#[test]
pub fn line_numbers_count_the_header() {
    let input = "\nSEGME\t4\t1024\t100000\t5\t1\t10\n";

    assert!(matches!(
        read_platform_from(input.as_bytes(), "blank.txt", "AMD"),
        Err(IngestError::ColumnCount { line: 2, .. })
    ));
}

#[test]
pub fn empty_input_has_no_rows() {
    assert!(read_platform_from("".as_bytes(), "empty.txt", "ARM")
        .unwrap()
        .is_empty());
    assert!(read_platform_from(HEADER.as_bytes(), "header.txt", "ARM")
        .unwrap()
        .is_empty());
}

#[test]
pub fn wrong_column_count_is_malformed() {
    let input = format!("{HEADER}SEGME\t4\t1024\t100000\t5\t1\t10\n");

    match read_platform_from(input.as_bytes(), "short.txt", "INTEL") {
        Err(IngestError::ColumnCount {
            line,
            expected,
            found,
            ..
        }) => {
            assert_eq!(line, 2);
            assert_eq!(expected, 8);
            assert_eq!(found, 7);
        }
        other => panic!("expected a column count error, got {other:?}"),
    }
}

#[test]
pub fn non_numeric_field_is_malformed() {
    let input = format!(
        "{HEADER}SEGME\t4\t1024\t100000\t5\t1\t10\t0\nCOMPA\t4\t1024\tmany\t5\t1\t10\t0\n"
    );
    let error = read_platform_from(input.as_bytes(), "bad.txt", "INTEL").unwrap_err();

    assert!(error.is_malformed());
    match error {
        IngestError::Field {
            line,
            column,
            value,
            ..
        } => {
            assert_eq!(line, 3);
            assert_eq!(column, "num_transactions");
            assert_eq!(value, "many");
        }
        other => panic!("expected a field error, got {other:?}"),
    }
}

#[test]
pub fn negative_counts_are_malformed() {
    let input = format!("{HEADER}SEGME\t4\t1024\t100000\t5\t1\t10\t-3\n");

    assert!(matches!(
        read_platform_from(input.as_bytes(), "neg.txt", "INTEL"),
        Err(IngestError::Field {
            column: "aborts",
            ..
        })
    ));
}

#[test]
pub fn unknown_identifiers_are_carried_through() {
    let input = format!("{HEADER}SEGHF\t21\t1024\t100000\t5\t1\t10\t0\n");
    let records = read_platform_from(input.as_bytes(), "power.txt", "POWER9").unwrap();

    assert_eq!(records[0].record.data_structure, "SEGHF");
    assert_eq!(records[0].system, "POWER9");
}

#[test]
pub fn report_derived_columns_are_ignored() {
    let input = "data_structure\ttest_case\tsegment_size\tnum_transactions\ttxn_size\tthread_count\telapsed_time_ns\taborts\tsystem\tthroughput\trelative_speedup\n\
        SEGME\t4\t1024\t100000\t5\t1\t10000000000\t0\tINTEL\t50000.0\t1.0\n\
        SEGME\t4\t1024\t100000\t5\t8\t2000000000\t0\tINTEL\t\t\n";
    let records = read_report_from(input.as_bytes(), "report.txt").unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].record, segme(8, 2000000000));
    assert_eq!(records[1].system, "INTEL");
}

#[test]
pub fn report_accepts_joint_column() {
    let input = "header\n\
        SEGME\t4\t1024\t100000\t5\t1\t10000000000\t0\tINTEL\t50000.0\t1.0\tINTEL-SEGME\n";
    let records = read_report_from(input.as_bytes(), "report.txt").unwrap();

    assert_eq!(records[0].system, "INTEL");
}

#[test]
pub fn report_without_system_is_malformed() {
    let input = "header\nSEGME\t4\t1024\t100000\t5\t1\t10\t0\n";

    assert!(matches!(
        read_report_from(input.as_bytes(), "report.txt"),
        Err(IngestError::ColumnCount { expected: 11, .. })
    ));
}

#[test]
pub fn reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{HEADER}BOOST\t7\t1024\t5000\t5\t2\t1000\t12\n").unwrap();

    let records = read_platform(file.path(), "NUMA").unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.aborts, 12);
    assert_eq!(records[0].system, "NUMA");
}

#[test]
pub fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = read_platform(&dir.path().join("missing.txt"), "INTEL").unwrap_err();

    assert!(matches!(error, IngestError::Io { .. }));
    assert!(!error.is_malformed());
}
