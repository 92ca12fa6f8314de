//! Unit test orchestration for DOLFIN.
//!
//! Runs the C++ and Python flavours of every unit test in the source tree,
//! first serially and then under an MPI launcher, and aggregates failures.

pub mod catalog;
pub mod config;
pub mod error;
pub mod outcome;
pub mod process;
pub mod report;
pub mod runner;

pub use catalog::{Interface, TestGroup, UNIT_TESTS, find_group, select_groups};
pub use config::{
    ParallelSupport, RunnerConfig, detect_parallel_support, detect_parallel_support_with, prefixes,
};
pub use error::{Result, RunnerError};
pub use outcome::{Outcome, evaluate};
pub use process::{CommandOutput, CommandRunner, CommandSpec, Prefix, SystemRunner};
pub use report::{Failure, PassRecord, RunSummary};
pub use runner::UnitTestRunner;
