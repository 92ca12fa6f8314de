use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dolfin_unit::config::DISABLE_PARALLEL_ENV;
use dolfin_unit::{
    ParallelSupport, RunnerConfig, SystemRunner, UNIT_TESTS, UnitTestRunner,
    detect_parallel_support, prefixes,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "dolfin-unit")]
#[command(about = "Run all DOLFIN unit tests (C++ and Python), serially and in parallel")]
struct Cli {
    /// Run only the Python tests
    #[arg(long)]
    only_python: bool,
    /// Root of the unit test tree
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Python interpreter used for the Python tests
    #[arg(long, default_value = "python3")]
    python: String,
    /// MPI launcher used for the parallel pass
    #[arg(long, default_value = "mpirun")]
    launcher: String,
    /// Number of MPI processes in the parallel pass
    #[arg(long, default_value = "3")]
    num_procs: usize,
    /// File receiving the output of failed tests
    #[arg(long, default_value = "fail.log")]
    fail_log: PathBuf,
    /// Restrict the run to these groups (repeatable)
    #[arg(short, long = "group")]
    groups: Vec<String>,
    /// Write a JSON summary of the run
    #[arg(long)]
    json_report: Option<PathBuf>,
    /// List test groups and linear algebra backends, then exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn config(&self) -> RunnerConfig {
        RunnerConfig {
            root: self.root.clone(),
            only_python: self.only_python,
            python: self.python.clone(),
            launcher: self.launcher.clone(),
            num_procs: self.num_procs,
            fail_log: self.fail_log.clone(),
            groups: self.groups.clone(),
        }
    }
}

fn print_catalog() {
    for group in UNIT_TESTS {
        println!("{}: {}", group.name, group.subtests.join(", "));
    }
    println!(
        "linear algebra backends: {}",
        dolfin_la::available_backends().join(", ")
    );
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.list {
        print_catalog();
        return ExitCode::SUCCESS;
    }

    let config = cli.config();
    let support = detect_parallel_support(&config);
    match support {
        ParallelSupport::LauncherMissing => println!(
            "{} not found. Unit tests will not be run in parallel.",
            config.launcher
        ),
        ParallelSupport::Disabled => info!("parallel testing disabled by {DISABLE_PARALLEL_ENV}"),
        ParallelSupport::Available => {}
    }
    let prefixes = prefixes(&config, support);

    let stdout = std::io::stdout();
    let mut runner = UnitTestRunner::new(&config, SystemRunner, stdout.lock());
    let summary = match runner.run(&prefixes) {
        Ok(summary) => summary,
        Err(err) => {
            error!("unit test run aborted: {err}");
            eprintln!("dolfin-unit: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut report_written = true;
    if let Some(path) = &cli.json_report {
        if let Err(err) = summary.write_json(path) {
            error!("failed to write JSON report {}: {err}", path.display());
            eprintln!("dolfin-unit: failed to write {}: {err}", path.display());
            report_written = false;
        }
    }

    ExitCode::from(exit_status(summary.exit_code(), report_written))
}

/// Failure count, or 1 when the tests passed but the report could not be
/// written.
fn exit_status(failures: u8, report_written: bool) -> u8 {
    if failures == 0 && !report_written {
        1
    } else {
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_runner_config() {
        let cli = Cli::try_parse_from(["dolfin-unit"]).unwrap();
        assert!(!cli.list);
        assert!(cli.json_report.is_none());
        assert_eq!(cli.config(), RunnerConfig::default());
    }

    #[test]
    fn flags_reach_runner_config() {
        let cli = Cli::try_parse_from([
            "dolfin-unit",
            "--only-python",
            "--root",
            "test/unit",
            "--num-procs",
            "4",
            "--group",
            "la",
            "-g",
            "mesh",
        ])
        .unwrap();
        let config = cli.config();
        assert!(config.only_python);
        assert_eq!(config.root, PathBuf::from("test/unit"));
        assert_eq!(config.num_procs, 4);
        assert_eq!(config.groups, vec!["la".to_string(), "mesh".to_string()]);
        assert_eq!(config.launcher, "mpirun");
    }

    #[test]
    fn rejects_non_numeric_process_count() {
        assert!(Cli::try_parse_from(["dolfin-unit", "--num-procs", "three"]).is_err());
    }

    #[test]
    fn unwritable_report_fails_a_clean_run() {
        assert_eq!(exit_status(0, true), 0);
        assert_eq!(exit_status(0, false), 1);
        assert_eq!(exit_status(3, false), 3);
    }
}
