//! Running test programs as child processes.
//!
//! Test programs are run to completion with stdout and stderr captured; the
//! runner only looks at the exit status and the combined text.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// How a test program is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Prefix {
    /// Run the program directly
    Serial,
    /// Run the program under an MPI launcher (`<launcher> -np <n> <program>`)
    Parallel { launcher: String, num_procs: usize },
}

impl Prefix {
    /// Command-line prefix as shown in progress output ("" when serial)
    pub fn label(&self) -> String {
        match self {
            Prefix::Serial => String::new(),
            Prefix::Parallel {
                launcher,
                num_procs,
            } => format!("{launcher} -np {num_procs} "),
        }
    }

    /// Wrap `program args...` in this prefix.
    pub fn wrap(&self, program: String, args: Vec<String>) -> (String, Vec<String>) {
        match self {
            Prefix::Serial => (program, args),
            Prefix::Parallel {
                launcher,
                num_procs,
            } => {
                let mut wrapped = vec!["-np".to_string(), num_procs.to_string(), program];
                wrapped.extend(args);
                (launcher.clone(), wrapped)
            }
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A fully resolved child process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and combined output of a finished child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal or could
    /// not be started
    pub status: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Trait for launching test programs.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutput;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutput {
        tracing::debug!(
            command = %spec.command_line(),
            dir = %spec.current_dir.display(),
            "spawning test program"
        );
        let result = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.current_dir)
            .envs(spec.env.iter().cloned())
            .output();

        match result {
            Ok(out) => {
                let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&out.stderr));
                CommandOutput {
                    status: out.status.code(),
                    output,
                }
            }
            Err(err) => {
                tracing::warn!(
                    command = %spec.command_line(),
                    error = %err,
                    "failed to start test program"
                );
                CommandOutput {
                    status: None,
                    output: format!("failed to run {}: {err}", spec.command_line()),
                }
            }
        }
    }
}

/// Look up `program` on `PATH`, as a shell would.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in_dirs(program, std::env::split_paths(&path))
}

fn find_in_dirs(program: &str, dirs: impl Iterator<Item = PathBuf>) -> Option<PathBuf> {
    let candidate = PathBuf::from(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then_some(candidate);
    }
    dirs.map(|dir| dir.join(format!("{program}{}", std::env::consts::EXE_SUFFIX)))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_prefix_leaves_command_alone() {
        let (program, args) = Prefix::Serial.wrap("./test_Mesh".into(), vec![]);
        assert_eq!(program, "./test_Mesh");
        assert!(args.is_empty());
        assert_eq!(Prefix::Serial.label(), "");
    }

    #[test]
    fn parallel_prefix_wraps_in_launcher() {
        let prefix = Prefix::Parallel {
            launcher: "mpirun".into(),
            num_procs: 3,
        };
        let (program, args) = prefix.wrap("python3".into(), vec!["Mesh.py".into()]);
        assert_eq!(program, "mpirun");
        assert_eq!(args, vec!["-np", "3", "python3", "Mesh.py"]);
        assert_eq!(prefix.label(), "mpirun -np 3 ");
    }

    #[test]
    fn missing_program_becomes_failed_output() {
        let spec = CommandSpec {
            program: "definitely-not-a-real-program-dolfin".into(),
            args: vec![],
            current_dir: std::env::temp_dir(),
            env: vec![],
        };
        let out = SystemRunner.run(&spec);
        assert!(!out.success());
        assert_eq!(out.status, None);
        assert!(out.output.contains("failed to run"));
    }

    #[test]
    fn find_in_dirs_checks_each_directory() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir
            .path()
            .join(format!("fake-launcher{}", std::env::consts::EXE_SUFFIX));
        std::fs::write(&exe, "").unwrap();
        let dirs = vec![PathBuf::from("/nonexistent"), dir.path().to_path_buf()];
        let found = find_in_dirs("fake-launcher", dirs.into_iter());
        assert_eq!(found, Some(exe));
        assert_eq!(find_in_dirs("other", std::iter::once(dir.path().to_path_buf())), None);
    }
}
