//! Runner configuration and parallel-run detection.

use crate::error::{Result, RunnerError};
use crate::process::{Prefix, find_on_path};
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

/// Set (to any value) to run the serial pass only
pub const DISABLE_PARALLEL_ENV: &str = "DISABLE_PARALLEL_TESTING";

/// Exported to every test program so that nothing opens a plot window
pub const NOPLOT_ENV: &str = "DOLFIN_NOPLOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerConfig {
    /// Root of the unit test tree (contains one directory per group)
    pub root: PathBuf,
    /// Skip the C++ flavour of every sub-test
    pub only_python: bool,
    /// Interpreter for Python tests
    pub python: String,
    /// MPI launcher used for the parallel pass
    pub launcher: String,
    pub num_procs: usize,
    /// Receives the output of the failing tests
    pub fail_log: PathBuf,
    /// Groups to run; empty means all
    pub groups: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            only_python: false,
            python: "python3".to_string(),
            launcher: "mpirun".to_string(),
            num_procs: 3,
            fail_log: PathBuf::from("fail.log"),
            groups: Vec::new(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(RunnerError::RootNotFound(self.root.display().to_string()));
        }
        if self.num_procs == 0 {
            return Err(RunnerError::InvalidConfig(
                "number of MPI processes must be positive".into(),
            ));
        }
        if self.python.is_empty() {
            return Err(RunnerError::InvalidConfig(
                "python interpreter must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Environment added to every test program
    pub fn child_env(&self) -> Vec<(String, String)> {
        vec![(NOPLOT_ENV.to_string(), "1".to_string())]
    }

    pub fn parallel_prefix(&self) -> Prefix {
        Prefix::Parallel {
            launcher: self.launcher.clone(),
            num_procs: self.num_procs,
        }
    }
}

/// Whether the parallel pass can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelSupport {
    Available,
    /// The MPI launcher is not on `PATH`
    LauncherMissing,
    /// Turned off through [`DISABLE_PARALLEL_ENV`]
    Disabled,
}

pub fn parallel_support(launcher_found: bool, disabled_by_env: bool) -> ParallelSupport {
    if !launcher_found {
        ParallelSupport::LauncherMissing
    } else if disabled_by_env {
        ParallelSupport::Disabled
    } else {
        ParallelSupport::Available
    }
}

/// Inspect `PATH` and the environment for `config`.
pub fn detect_parallel_support(config: &RunnerConfig) -> ParallelSupport {
    detect_parallel_support_with(config, |key| std::env::var_os(key))
}

/// Like [`detect_parallel_support`], reading variables through `lookup`.
pub fn detect_parallel_support_with(
    config: &RunnerConfig,
    lookup: impl Fn(&str) -> Option<OsString>,
) -> ParallelSupport {
    let launcher_found = find_on_path(&config.launcher).is_some();
    let disabled = lookup(DISABLE_PARALLEL_ENV).is_some();
    tracing::debug!(
        launcher = %config.launcher,
        launcher_found,
        disabled,
        "checked parallel test support"
    );
    parallel_support(launcher_found, disabled)
}

/// Serial pass first, then the parallel pass when supported.
pub fn prefixes(config: &RunnerConfig, support: ParallelSupport) -> Vec<Prefix> {
    let mut prefixes = vec![Prefix::Serial];
    if support == ParallelSupport::Available {
        prefixes.push(config.parallel_prefix());
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_pass_needs_launcher_and_no_override() {
        assert_eq!(parallel_support(true, false), ParallelSupport::Available);
        assert_eq!(parallel_support(true, true), ParallelSupport::Disabled);
        assert_eq!(parallel_support(false, false), ParallelSupport::LauncherMissing);
        assert_eq!(parallel_support(false, true), ParallelSupport::LauncherMissing);
    }

    #[test]
    fn prefixes_follow_support() {
        let config = RunnerConfig::default();
        assert_eq!(
            prefixes(&config, ParallelSupport::Available),
            vec![
                Prefix::Serial,
                Prefix::Parallel {
                    launcher: "mpirun".into(),
                    num_procs: 3
                }
            ]
        );
        assert_eq!(prefixes(&config, ParallelSupport::Disabled), vec![Prefix::Serial]);
        assert_eq!(
            prefixes(&config, ParallelSupport::LauncherMissing),
            vec![Prefix::Serial]
        );
    }

    #[test]
    fn validate_rejects_missing_root_and_zero_procs() {
        let config = RunnerConfig {
            root: PathBuf::from("/definitely/not/here"),
            ..RunnerConfig::default()
        };
        assert!(matches!(config.validate(), Err(RunnerError::RootNotFound(_))));

        let dir = tempfile::tempdir().unwrap();
        let config = RunnerConfig {
            root: dir.path().to_path_buf(),
            num_procs: 0,
            ..RunnerConfig::default()
        };
        assert!(matches!(config.validate(), Err(RunnerError::InvalidConfig(_))));
    }

    #[test]
    fn disable_variable_is_consulted() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = dir.path().join("mpirun");
        std::fs::write(&launcher, "").unwrap();
        let config = RunnerConfig {
            launcher: launcher.display().to_string(),
            ..RunnerConfig::default()
        };

        let disabled = |key: &str| (key == DISABLE_PARALLEL_ENV).then(|| OsString::from("1"));
        assert_eq!(
            detect_parallel_support_with(&config, disabled),
            ParallelSupport::Disabled
        );
        assert_eq!(
            detect_parallel_support_with(&config, |_| None),
            ParallelSupport::Available
        );

        let missing = RunnerConfig {
            launcher: dir.path().join("absent").display().to_string(),
            ..RunnerConfig::default()
        };
        assert_eq!(
            detect_parallel_support_with(&missing, disabled),
            ParallelSupport::LauncherMissing
        );
    }

    #[test]
    fn children_run_without_plotting() {
        let env = RunnerConfig::default().child_env();
        assert_eq!(env, vec![("DOLFIN_NOPLOT".to_string(), "1".to_string())]);
    }
}
