//! Pass/fail evaluation of test program output.
//!
//! C++ tests (CppUnit) end with `OK (N)` on success; Python tests
//! (unittest) print `Ran N tests` followed by `OK`. A run passes when the
//! program exits with status 0 and its output contains `OK`.

use crate::catalog::Interface;
use crate::process::CommandOutput;
use regex::Regex;
use std::sync::LazyLock;

const SUCCESS_MARKER: &str = "OK";

static CPP_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OK \((\d+)\)").expect("valid regex"));
static PYTHON_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ran (\d+) test").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Test count, when the output reports one
    Passed { tests: Option<usize> },
    Failed,
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Passed { .. })
    }
}

pub fn evaluate(interface: Interface, result: &CommandOutput) -> Outcome {
    if !result.success() || !result.output.contains(SUCCESS_MARKER) {
        return Outcome::Failed;
    }
    Outcome::Passed {
        tests: test_count(interface, &result.output),
    }
}

/// Number of tests reported in `output`, if present.
pub fn test_count(interface: Interface, output: &str) -> Option<usize> {
    let pattern = match interface {
        Interface::Cpp => &*CPP_COUNT,
        Interface::Python => &*PYTHON_COUNT,
    };
    pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(status: i32, text: &str) -> CommandOutput {
        CommandOutput {
            status: Some(status),
            output: text.to_string(),
        }
    }

    #[test]
    fn cpp_pass_with_count() {
        let out = output(0, "...........\n\nOK (11)\n");
        assert_eq!(
            evaluate(Interface::Cpp, &out),
            Outcome::Passed { tests: Some(11) }
        );
    }

    #[test]
    fn python_pass_with_count() {
        let rule = "-".repeat(70);
        let out = output(0, &format!("....\n{rule}\nRan 4 tests in 0.512s\n\nOK\n"));
        assert_eq!(
            evaluate(Interface::Python, &out),
            Outcome::Passed { tests: Some(4) }
        );
    }

    #[test]
    fn pass_without_count() {
        let out = output(0, "OK");
        assert_eq!(evaluate(Interface::Cpp, &out), Outcome::Passed { tests: None });
    }

    #[test]
    fn nonzero_status_fails_even_with_marker() {
        let out = output(1, "Ran 3 tests\nOK\n");
        assert_eq!(evaluate(Interface::Python, &out), Outcome::Failed);
    }

    #[test]
    fn missing_marker_fails() {
        let out = output(0, "Ran 3 tests\n\nFAILED (failures=1)\n");
        assert_eq!(evaluate(Interface::Python, &out), Outcome::Failed);
        assert!(!Outcome::Failed.is_pass());
    }

    #[test]
    fn unstarted_program_fails() {
        let out = CommandOutput {
            status: None,
            output: "OK".into(),
        };
        assert_eq!(evaluate(Interface::Cpp, &out), Outcome::Failed);
    }
}
