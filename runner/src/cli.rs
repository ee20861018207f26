use crate::config::parse_platform;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tvbench_analysis::{
    series::{Hue, Metric},
    PlatformInput, RowFilter,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Throughput and speedup reports for concurrent vector benchmarks")]
pub struct Cli {
    /// increase log verbosity, RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// merge per-platform results into one report with derived metrics
    Build(BuildArgs),
    /// compare the mean throughput of two data structures per thread count
    Compare(CompareArgs),
    /// export plot series from a report
    Series(SeriesArgs),
    /// recompute the derived columns of an existing report
    Rederive(RederiveArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// platform input, repeatable, replaces the platforms of the config
    #[arg(short = 'i', long = "input", value_name = "SYSTEM=PATH", value_parser = parse_platform)]
    pub inputs: Vec<PlatformInput>,

    /// report path, `-` for stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub derive: DeriveArgs,

    #[command(flatten)]
    pub emit: EmitArgs,
}

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// test cases that never abort
    #[arg(long, value_delimiter = ',', value_name = "TEST_CASES")]
    pub read_only: Option<Vec<u32>>,
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// append a SYSTEM-DATA_STRUCTURE column
    #[arg(long)]
    pub joint: bool,

    /// written in place of undefined values
    #[arg(long)]
    pub missing_marker: Option<String>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    #[arg(long = "system", value_delimiter = ',')]
    pub systems: Vec<String>,

    #[arg(long = "structure", value_delimiter = ',')]
    pub data_structures: Vec<String>,

    #[arg(long = "test-case", value_delimiter = ',')]
    pub test_cases: Vec<u32>,

    #[arg(long = "txn-size", value_delimiter = ',')]
    pub txn_sizes: Vec<u64>,
}

impl FilterArgs {
    /// criteria given on the command line replace the matching criteria of `base`
    pub fn apply(self, mut base: RowFilter) -> RowFilter {
        if !self.systems.is_empty() {
            base.systems = self.systems.into_iter().collect();
        }
        if !self.data_structures.is_empty() {
            base.data_structures = self.data_structures.into_iter().collect();
        }
        if !self.test_cases.is_empty() {
            base.test_cases = self.test_cases.into_iter().collect();
        }
        if !self.txn_sizes.is_empty() {
            base.txn_sizes = self.txn_sizes.into_iter().collect();
        }

        base
    }
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(short, long)]
    pub report: PathBuf,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub candidate: String,

    #[arg(long)]
    pub reference: String,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum MetricArg {
    #[default]
    Throughput,
    Relative,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Throughput => Metric::Throughput,
            MetricArg::Relative => Metric::RelativeSpeedup,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum HueArg {
    #[default]
    Structure,
    System,
    Joint,
}

impl From<HueArg> for Hue {
    fn from(value: HueArg) -> Self {
        match value {
            HueArg::Structure => Hue::DataStructure,
            HueArg::System => Hue::System,
            HueArg::Joint => Hue::Joint,
        }
    }
}

#[derive(Args, Debug)]
pub struct SeriesArgs {
    #[arg(short, long)]
    pub report: PathBuf,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub metric: MetricArg,

    #[arg(long, value_enum, default_value_t)]
    pub hue: HueArg,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// defaults to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RederiveArgs {
    #[arg(short, long)]
    pub report: PathBuf,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// defaults to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub derive: DeriveArgs,

    #[command(flatten)]
    pub emit: EmitArgs,
}
