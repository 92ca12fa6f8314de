//! The unit test loop.
//!
//! Every sub-test of every selected group is run once per prefix, C++
//! flavour first, then Python. Failures are recorded and the loop carries
//! on; the summary decides the exit status.

use crate::catalog::{Interface, select_groups};
use crate::config::RunnerConfig;
use crate::error::Result;
use crate::outcome::{Outcome, evaluate};
use crate::process::{CommandRunner, CommandSpec, Prefix};
use crate::report::{Failure, PassRecord, RunSummary};
use std::io::Write;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 70;

/// File name of the C++ test executable for `subtest`
pub fn cpp_executable_name(subtest: &str) -> String {
    format!("test_{subtest}{}", std::env::consts::EXE_SUFFIX)
}

pub fn cpp_test_dir(root: &Path, group: &str) -> PathBuf {
    root.join(group).join("cpp")
}

pub fn python_test_dir(root: &Path, group: &str) -> PathBuf {
    root.join(group).join("python")
}

/// One sub-test of one group, run under one prefix
struct TestCase<'p> {
    group: &'static str,
    subtest: &'static str,
    prefix: &'p Prefix,
}

pub struct UnitTestRunner<'a, R: CommandRunner, W: Write> {
    config: &'a RunnerConfig,
    runner: R,
    out: W,
}

impl<'a, R: CommandRunner, W: Write> UnitTestRunner<'a, R, W> {
    pub fn new(config: &'a RunnerConfig, runner: R, out: W) -> Self {
        Self {
            config,
            runner,
            out,
        }
    }

    /// Run every selected sub-test under each prefix in turn.
    pub fn run(&mut self, prefixes: &[Prefix]) -> Result<RunSummary> {
        self.config.validate()?;
        let groups = select_groups(&self.config.groups)?;
        let root = std::fs::canonicalize(&self.config.root)?;
        let mut summary = RunSummary::new(prefixes.iter().map(Prefix::label).collect());

        tracing::info!(
            root = %root.display(),
            groups = groups.len(),
            passes = prefixes.len(),
            "starting unit tests"
        );

        for prefix in prefixes {
            for group in &groups {
                for &subtest in group.subtests {
                    let case = TestCase {
                        group: group.name,
                        subtest,
                        prefix,
                    };
                    self.run_case(&root, &case, &mut summary)?;
                }
            }
        }

        self.report_failures(&summary)?;
        summary.finish();
        tracing::info!(
            passed = summary.passes.len(),
            failed = summary.failures.len(),
            skipped = summary.skipped,
            "unit tests finished"
        );
        Ok(summary)
    }

    fn run_case(
        &mut self,
        root: &Path,
        case: &TestCase<'_>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        writeln!(
            self.out,
            "Running unit tests for {} ({}) with prefix '{}'",
            case.group,
            case.subtest,
            case.prefix.label()
        )?;
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;

        write!(self.out, "C++:    ")?;
        let cpp_dir = cpp_test_dir(root, case.group);
        let executable = cpp_dir.join(cpp_executable_name(case.subtest));
        if self.config.only_python {
            writeln!(self.out, "Skipping tests as requested (--only-python)")?;
            summary.skipped += 1;
        } else if !executable.is_file() {
            writeln!(self.out, "This test set does not have a C++ version")?;
            summary.skipped += 1;
        } else {
            let program = executable.to_string_lossy().into_owned();
            self.execute(case, Interface::Cpp, program, Vec::new(), cpp_dir, summary)?;
        }

        write!(self.out, "Python: ")?;
        let python_dir = python_test_dir(root, case.group);
        let script = format!("{}.py", case.subtest);
        if python_dir.join(&script).is_file() {
            let program = self.config.python.clone();
            self.execute(case, Interface::Python, program, vec![script], python_dir, summary)?;
        } else {
            writeln!(self.out, "Skipping")?;
            summary.skipped += 1;
        }

        writeln!(self.out)?;
        Ok(())
    }

    fn execute(
        &mut self,
        case: &TestCase<'_>,
        interface: Interface,
        program: String,
        args: Vec<String>,
        dir: PathBuf,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let (program, args) = case.prefix.wrap(program, args);
        let spec = CommandSpec {
            program,
            args,
            current_dir: dir,
            env: self.config.child_env(),
        };
        let result = self.runner.run(&spec);

        match evaluate(interface, &result) {
            Outcome::Passed { tests } => {
                match tests {
                    Some(n) => writeln!(self.out, "OK ({n} tests)")?,
                    None => writeln!(self.out, "OK")?,
                }
                summary.passes.push(PassRecord {
                    group: case.group.to_string(),
                    subtest: case.subtest.to_string(),
                    interface,
                    prefix: case.prefix.label(),
                    tests,
                });
            }
            Outcome::Failed => {
                writeln!(self.out, "*** Failed")?;
                tracing::debug!(
                    group = case.group,
                    subtest = case.subtest,
                    %interface,
                    status = ?result.status,
                    "test program failed"
                );
                summary.failures.push(Failure {
                    group: case.group.to_string(),
                    subtest: case.subtest.to_string(),
                    interface,
                    prefix: case.prefix.label(),
                    output: result.output,
                });
            }
        }
        Ok(())
    }

    /// Print every failure and leave the last one's output in the fail log.
    fn report_failures(&mut self, summary: &RunSummary) -> Result<()> {
        for failure in &summary.failures {
            writeln!(
                self.out,
                "One or more unit tests failed for {} ({}, {}):",
                failure.group, failure.subtest, failure.interface
            )?;
            writeln!(self.out, "{}", failure.output)?;
            std::fs::write(&self.config.fail_log, &failure.output)?;
        }
        Ok(())
    }
}
