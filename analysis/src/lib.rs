//! Derivation of throughput and relative speedup from merged benchmark results, along with
//! the comparisons and plot series built on top of the derived report.

pub mod builder;
pub mod derive;
pub mod emit;
pub mod filter;
pub mod series;
pub mod stats;
pub mod table;

pub use builder::{BuildError, PlatformInput, ReportBuilder};
pub use derive::{derive, throughput, DeriveParams, Derived, MissingBaseline, MissingReason};
pub use emit::EmitOptions;
pub use filter::RowFilter;
pub use table::{merge, GroupKey, UnifiedRow, UnifiedTable};
