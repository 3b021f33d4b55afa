use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::plan::Invocation;

/// Executes planned invocations. The launcher only ever calls `run` once.
pub trait CommandRunner {
    /// Runs `invocation` to completion and reports how it exited.
    fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus>;
}

/// Exit status of a finished child process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStatus {
    code: Option<i32>,
}

impl RunStatus {
    pub fn from_code(code: i32) -> Self {
        RunStatus { code: Some(code) }
    }

    /// A child terminated without an exit code (e.g. by a signal).
    pub fn terminated() -> Self {
        RunStatus { code: None }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        RunStatus {
            code: status.code(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("no exit code (terminated by signal)"),
        }
    }
}

/// Spawns real processes, inheriting stdio, and blocks until they exit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus> {
        debug!(
            command = %invocation,
            working_dir = %invocation.working_dir.display(),
            "spawning"
        );
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .status()?;
        Ok(status.into())
    }
}
