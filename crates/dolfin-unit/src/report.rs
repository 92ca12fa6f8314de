//! Run summary and JSON report.

use crate::catalog::Interface;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A failed test run with the raw output of the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub group: String,
    pub subtest: String,
    pub interface: Interface,
    pub prefix: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassRecord {
    pub group: String,
    pub subtest: String,
    pub interface: Interface,
    pub prefix: String,
    /// Number of tests reported by the program, if any
    pub tests: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub prefixes: Vec<String>,
    pub passes: Vec<PassRecord>,
    pub failures: Vec<Failure>,
    pub skipped: usize,
}

impl RunSummary {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            prefixes,
            passes: Vec::new(),
            failures: Vec::new(),
            skipped: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Sum of the test counts reported by passing programs
    pub fn tests_reported(&self) -> usize {
        self.passes.iter().filter_map(|p| p.tests).sum()
    }

    /// Process exit code: the number of failures, saturated to fit a byte.
    pub fn exit_code(&self) -> u8 {
        self.failures.len().min(u8::MAX as usize) as u8
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(n: usize) -> Failure {
        Failure {
            group: "mesh".into(),
            subtest: format!("Sub{n}"),
            interface: Interface::Cpp,
            prefix: String::new(),
            output: "boom".into(),
        }
    }

    #[test]
    fn exit_code_counts_failures() {
        let mut summary = RunSummary::new(vec![String::new()]);
        assert_eq!(summary.exit_code(), 0);
        assert!(summary.is_success());
        summary.failures.extend((0..3).map(failure));
        assert_eq!(summary.exit_code(), 3);
        summary.failures.extend((0..300).map(failure));
        assert_eq!(summary.exit_code(), 255);
    }

    #[test]
    fn json_report_round_trips_through_serde_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut summary = RunSummary::new(vec![String::new(), "mpirun -np 3 ".into()]);
        summary.passes.push(PassRecord {
            group: "la".into(),
            subtest: "Vector".into(),
            interface: Interface::Python,
            prefix: String::new(),
            tests: Some(4),
        });
        summary.failures.push(failure(1));
        summary.finish();
        summary.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["passes"][0]["tests"], 4);
        assert_eq!(value["failures"][0]["interface"], "C++");
        assert_eq!(value["prefixes"][1], "mpirun -np 3 ");
        assert!(value["finished_at"].is_string());
    }
}
