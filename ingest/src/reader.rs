use crate::{
    record::{RunRecord, TaggedRecord, RAW_COLUMNS, REPORT_COLUMNS},
    IngestError,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};
use tracing::{debug, error};

/// number of leading report columns carrying raw data, i.e., the raw columns plus `system`
const REPORT_DATA_COLUMNS: usize = RAW_COLUMNS.len() + 1;

/// read a raw result file of a single platform and tag every row with `system`
pub fn read_platform(path: &Path, system: &str) -> Result<Vec<TaggedRecord>, IngestError> {
    let file = open(path)?;
    let records = read_platform_from(file, &path.to_string_lossy(), system)?;

    debug!(path = ?path, system = system, rows = records.len(), "Read platform results");

    Ok(records)
}

/// same as `read_platform` but over any reader, `source_name` is only used for errors
pub fn read_platform_from<R: Read>(
    reader: R,
    source_name: &str,
    system: &str,
) -> Result<Vec<TaggedRecord>, IngestError> {
    rows(reader, source_name, &[RAW_COLUMNS.len()])?
        .into_iter()
        .map(|(line, row)| {
            parse_record(&row, source_name, line).map(|record| TaggedRecord::new(record, system))
        })
        .collect()
}

/// read an already built report, derived columns are dropped
pub fn read_report(path: &Path) -> Result<Vec<TaggedRecord>, IngestError> {
    let file = open(path)?;
    let records = read_report_from(file, &path.to_string_lossy())?;

    debug!(path = ?path, rows = records.len(), "Read report");

    Ok(records)
}

pub fn read_report_from<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<TaggedRecord>, IngestError> {
    // reports may carry the trailing joint column
    rows(
        reader,
        source_name,
        &[REPORT_COLUMNS.len(), REPORT_COLUMNS.len() + 1],
    )?
    .into_iter()
    .map(|(line, row)| -> Result<TaggedRecord, IngestError> {
        let record = parse_record(&row, source_name, line)?;
        let system = field(&row, REPORT_DATA_COLUMNS - 1, source_name, line)?;

        Ok(TaggedRecord::new(record, system))
    })
    .collect()
}

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| {
        error!(path = ?path, "Failed to open input: {source}");

        IngestError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// split the input into rows, skipping the header line, and check their width
fn rows<R: Read>(
    reader: R,
    source_name: &str,
    widths: &[usize],
) -> Result<Vec<(u64, StringRecord)>, IngestError> {
    let csv_error = |source: csv::Error| IngestError::Csv {
        source_name: source_name.to_string(),
        source,
    };

    // the header is the first physical line, even if blank, csv would skip a blank one
    let mut input = BufReader::new(reader);
    input
        .read_until(b'\n', &mut Vec::new())
        .map_err(|source| csv_error(source.into()))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);
    let mut rows = Vec::new();

    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        // line numbers of the file, the header being line 1
        let line = row
            .position()
            .map(|position| position.line() + 1)
            .unwrap_or(0);

        if !widths.contains(&row.len()) {
            return Err(IngestError::ColumnCount {
                source_name: source_name.to_string(),
                line,
                expected: widths[0],
                found: row.len(),
            });
        }

        rows.push((line, row));
    }

    Ok(rows)
}

fn parse_record(row: &StringRecord, source_name: &str, line: u64) -> Result<RunRecord, IngestError> {
    Ok(RunRecord {
        data_structure: field(row, 0, source_name, line)?,
        test_case: parse(row, 1, source_name, line)?,
        segment_size: parse(row, 2, source_name, line)?,
        num_transactions: parse(row, 3, source_name, line)?,
        txn_size: parse(row, 4, source_name, line)?,
        thread_count: parse(row, 5, source_name, line)?,
        elapsed_time_ns: parse(row, 6, source_name, line)?,
        aborts: parse(row, 7, source_name, line)?,
    })
}

fn field(row: &StringRecord, index: usize, source_name: &str, line: u64) -> Result<String, IngestError> {
    match row.get(index) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        value => Err(IngestError::Field {
            source_name: source_name.to_string(),
            line,
            column: REPORT_COLUMNS[index],
            value: value.unwrap_or_default().to_string(),
        }),
    }
}

fn parse<T: FromStr>(
    row: &StringRecord,
    index: usize,
    source_name: &str,
    line: u64,
) -> Result<T, IngestError> {
    let value = row.get(index).unwrap_or_default();

    value.parse().map_err(|_| IngestError::Field {
        source_name: source_name.to_string(),
        line,
        column: REPORT_COLUMNS[index],
        value: value.to_string(),
    })
}
