use crate::{
    derive::{derive, DeriveParams, Derived},
    emit::{write_table, EmitOptions},
    table::merge,
};
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, info, instrument};
use tvbench_ingest::{read_platform, IngestError, TaggedRecord};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Ingest failed: {0}")]
    Ingest(#[from] IngestError),
    #[error("Failed to write report {path:?}: {source}")]
    Emit {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize report {path:?}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// one raw result file and the platform it was measured on
pub struct PlatformInput {
    pub system: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    params: DeriveParams,
}

impl ReportBuilder {
    pub fn new(params: DeriveParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DeriveParams {
        &self.params
    }

    /// read and tag every input in order, the first failing input aborts the whole ingest
    #[instrument(skip_all, level = "info")]
    pub fn ingest(&self, inputs: &[PlatformInput]) -> Result<Vec<TaggedRecord>, BuildError> {
        let mut tables = Vec::with_capacity(inputs.len());

        for (counter, input) in inputs.iter().enumerate() {
            match read_platform(&input.path, &input.system) {
                Ok(table) => {
                    info!(
                        "Ingested {} rows for {} ({}/{})",
                        table.len(),
                        input.system,
                        counter + 1,
                        inputs.len()
                    );
                    tables.push(table);
                }
                Err(error) => {
                    error!(path = ?input.path, system = input.system.as_str(), "Failed to ingest: {error}");

                    return Err(error.into());
                }
            }
        }

        Ok(merge(tables))
    }

    #[instrument(skip_all, level = "info")]
    pub fn build(&self, inputs: &[PlatformInput]) -> Result<Derived, BuildError> {
        let records = self.ingest(inputs)?;

        Ok(self.rederive(records))
    }

    /// derive metrics for records that were already tagged and merged
    pub fn rederive(&self, records: Vec<TaggedRecord>) -> Derived {
        let derived = derive(records, &self.params);

        info!(
            rows = derived.table.len(),
            undefined_throughput = derived.undefined_throughput(),
            missing_baselines = derived.missing_baselines.len(),
            "Derived throughput and relative speedup"
        );

        derived
    }

    /// Write the report to `path`. The table is written to a sibling file first and renamed
    /// into place, a failed write leaves no partial report behind.
    #[instrument(skip(self, derived, options), level = "info")]
    pub fn emit(
        &self,
        derived: &Derived,
        path: &Path,
        options: &EmitOptions,
    ) -> Result<(), BuildError> {
        let partial = partial_path(path);
        let emit_error = |source| BuildError::Emit {
            path: path.to_path_buf(),
            source,
        };

        let written = File::create(&partial)
            .map_err(emit_error)
            .and_then(|file| {
                write_table(&derived.table, BufWriter::new(file), options).map_err(|source| {
                    BuildError::Csv {
                        path: path.to_path_buf(),
                        source,
                    }
                })
            })
            .and_then(|()| fs::rename(&partial, path).map_err(emit_error));

        if let Err(error) = written {
            error!("Failed to emit report: {error}");
            // best effort, the partial file may not even exist
            let _ = fs::remove_file(&partial);

            return Err(error);
        }

        info!("Wrote {} rows to {}", derived.table.len(), path.display());

        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut file_name = OsString::from(".");
    file_name.push(path.file_name().unwrap_or_default());
    file_name.push(".partial");

    path.with_file_name(file_name)
}
