use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, error, warn};
use tvbench_analysis::{
    derive::default_read_only_test_cases, DeriveParams, EmitOptions, PlatformInput, RowFilter,
};
use tvbench_ingest::KnownSets;

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Config is invalid: {0}")]
    Deserialize(#[from] serde_yaml::Error),
    #[error("Invalid input '{0}', expected SYSTEM=PATH")]
    InvalidPlatform(String),
    #[error("Preflight checks failed, see above")]
    Preflight,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    // ordered, the rows of earlier platforms precede the later ones in the report
    #[serde(default)]
    pub platforms: Vec<PlatformInput>,
    #[serde(default = "default_output_path")]
    pub output: PathBuf,
    #[serde(default = "default_read_only_test_cases")]
    pub read_only_test_cases: BTreeSet<u32>,
    #[serde(default)]
    pub known: KnownSets,
    #[serde(default)]
    pub emit: EmitOptions,
    // default selection for `compare` and `series`
    #[serde(default)]
    pub filter: RowFilter,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            platforms: Vec::new(),
            output: default_output_path(),
            read_only_test_cases: default_read_only_test_cases(),
            known: KnownSets::default(),
            emit: EmitOptions::default(),
            filter: RowFilter::default(),
        }
    }
}

impl ReportConfig {
    /// load a config file, relative paths are resolved against the directory of the file
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let content = fs::read_to_string(path).map_err(|source| ConfigErrors::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        debug!("Loaded config from {}: {config:?}", path.display());

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for platform in self.platforms.iter_mut() {
            if platform.path.is_relative() {
                platform.path = base.join(&platform.path);
            }
        }

        if self.output.is_relative() && !is_stdout(&self.output) {
            self.output = base.join(&self.output);
        }
    }

    /// load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigErrors> {
        path.map(Self::load).unwrap_or_else(|| Ok(Self::default()))
    }

    pub fn derive_params(&self) -> DeriveParams {
        DeriveParams {
            read_only_test_cases: self.read_only_test_cases.clone(),
            known: self.known.clone(),
        }
    }

    /// Check the config for problems, logging every one found instead of stopping at the first.
    /// Returns whether any error was found.
    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if self.platforms.is_empty() {
            error!("No platform was defined, unable to build a report");
            contains_error = true;
        }

        for platform in self.platforms.iter() {
            if platform.system.is_empty() {
                error!(
                    "Input {} has an empty system identifier",
                    platform.path.display()
                );
                contains_error = true;
            }

            if !platform.path.is_file() {
                error!(
                    "Failed to find input for {}. Either not a file or not found at {}",
                    platform.system,
                    platform.path.display()
                );
                contains_error = true;
            }

            if !self.known.systems.contains(&platform.system) {
                warn!(
                    "System {} is not a known system, its rows will carry no relative speedup",
                    platform.system
                );
            }
        }

        for (system, count) in self.platforms.iter().counts_by(|platform| &platform.system) {
            if count > 1 {
                warn!("System {system} is used by {count} inputs, their rows will be grouped together");
            }
        }

        if self.known.structures.is_empty() || self.known.systems.is_empty() {
            warn!("The set of known structures or systems is empty, no relative speedup will be derived");
        }

        contains_error
    }
}

/// parse a `SYSTEM=PATH` command line argument
pub fn parse_platform(argument: &str) -> Result<PlatformInput, ConfigErrors> {
    match argument.split_once('=') {
        Some((system, path)) if !system.is_empty() && !path.is_empty() => Ok(PlatformInput {
            system: system.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err(ConfigErrors::InvalidPlatform(argument.to_string())),
    }
}

pub fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn default_output_path() -> PathBuf {
    PathBuf::from("all_systems_final.txt")
}
