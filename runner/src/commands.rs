use crate::{
    cli::{BuildArgs, Command, CompareArgs, DeriveArgs, EmitArgs, RederiveArgs, SeriesArgs},
    config::{is_stdout, ConfigErrors, ReportConfig},
};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};
use thiserror::Error;
use tracing::{info, warn};
use tvbench_analysis::{
    emit::{write_comparison, write_series, write_summary, write_table},
    series, stats, BuildError, Derived, EmitOptions, ReportBuilder,
};
use tvbench_ingest::{read_report, IngestError};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigErrors),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("Failed to write output: {0}")]
    Csv(#[from] csv::Error),
}

pub fn run(command: Command) -> Result<(), RunError> {
    match command {
        Command::Build(args) => build(args),
        Command::Compare(args) => compare(args),
        Command::Series(args) => export_series(args),
        Command::Rederive(args) => rederive(args),
    }
}

impl DeriveArgs {
    fn apply(self, config: &mut ReportConfig) {
        if let Some(read_only) = self.read_only {
            config.read_only_test_cases = read_only.into_iter().collect();
        }
    }
}

impl EmitArgs {
    fn apply(self, mut options: EmitOptions) -> EmitOptions {
        options.joint |= self.joint;
        if let Some(marker) = self.missing_marker {
            options.missing_marker = marker;
        }

        options
    }
}

/// stdout if `path` is absent or `-`
fn sink(path: Option<&Path>) -> Result<Box<dyn Write>, io::Error> {
    match path {
        Some(path) if !is_stdout(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        _ => Ok(Box::new(io::stdout().lock())),
    }
}

fn build(args: BuildArgs) -> Result<(), RunError> {
    let mut config = ReportConfig::load_or_default(args.config.as_deref())?;

    if !args.inputs.is_empty() {
        config.platforms = args.inputs;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    args.derive.apply(&mut config);
    let options = args.emit.apply(config.emit.clone());

    if config.preflight_checks() {
        return Err(ConfigErrors::Preflight.into());
    }

    let builder = ReportBuilder::new(config.derive_params());
    let derived = builder.build(&config.platforms)?;

    for missing in derived.missing_baselines.iter() {
        info!("{} rows of {} lack a baseline ({:?})", missing.rows, missing.key, missing.reason);
    }

    if is_stdout(&config.output) {
        // rendered in full first, a failing build prints nothing
        let mut report = Vec::new();
        write_table(&derived.table, &mut report, &options)?;
        io::stdout().lock().write_all(&report)?;
    } else {
        builder.emit(&derived, &config.output, &options)?;
    }

    Ok(())
}

/// read a report and derive its metrics again with the parameters of `config`
fn rederived(report: &Path, config: &ReportConfig) -> Result<Derived, RunError> {
    let records = read_report(report)?;

    Ok(ReportBuilder::new(config.derive_params()).rederive(records))
}

fn rederive(args: RederiveArgs) -> Result<(), RunError> {
    let mut config = ReportConfig::load_or_default(args.config.as_deref())?;
    args.derive.apply(&mut config);
    let options = args.emit.apply(config.emit.clone());

    let derived = rederived(&args.report, &config)?;

    write_table(&derived.table, sink(args.output.as_deref())?, &options)?;

    Ok(())
}

fn compare(args: CompareArgs) -> Result<(), RunError> {
    let config = ReportConfig::load_or_default(args.config.as_deref())?;
    let filter = args.filter.apply(config.filter.clone());
    let derived = rederived(&args.report, &config)?;

    let comparison = stats::compare(&derived.table, &filter, &args.candidate, &args.reference);
    let mut out = io::stdout().lock();

    write_comparison(&comparison, &mut out)?;
    match comparison.summary {
        Some(summary) => write_summary(&summary, &mut out)?,
        None => warn!(
            "No thread count has throughput for both {} and {}",
            comparison.candidate, comparison.reference
        ),
    }

    Ok(())
}

fn export_series(args: SeriesArgs) -> Result<(), RunError> {
    let config = ReportConfig::load_or_default(args.config.as_deref())?;
    let filter = args.filter.apply(config.filter.clone());
    let derived = rederived(&args.report, &config)?;
    let metric = args.metric.into();

    let lines = series::extract(&derived.table, &filter, metric, args.hue.into());
    if lines.is_empty() {
        warn!("No rows match the selection");
    }

    write_series(&lines, metric, sink(args.output.as_deref())?)?;

    Ok(())
}
