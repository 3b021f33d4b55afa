//! Shared test harness utilities for build-launcher crates.

use std::io;
use std::path::{Path, PathBuf};

use build_launcher_config::{canonical_path, Config};
use build_launcher_core::{CommandRunner, Invocation, RunStatus};
use tempfile::TempDir;

/// A scratch project root with its canonical path.
pub struct ScratchRoot {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchRoot {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = canonical_path(dir.path()).expect("canonicalize tempdir");
        ScratchRoot { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Baseline configuration rooted here.
    pub fn config(&self) -> Config {
        Config::builtin(&self.path)
    }
}

impl Default for ScratchRoot {
    fn default() -> Self {
        Self::new()
    }
}

enum Reply {
    Exit(i32),
    Terminated,
    SpawnError(io::ErrorKind),
}

/// Records invocations instead of spawning them.
pub struct RecordingRunner {
    reply: Reply,
    pub invocations: Vec<Invocation>,
}

impl RecordingRunner {
    /// Every invocation "exits" with code 0.
    pub fn succeeding() -> Self {
        Self::exiting_with(0)
    }

    pub fn exiting_with(code: i32) -> Self {
        RecordingRunner {
            reply: Reply::Exit(code),
            invocations: Vec::new(),
        }
    }

    /// Every invocation is killed by a signal before exiting.
    pub fn terminated() -> Self {
        RecordingRunner {
            reply: Reply::Terminated,
            invocations: Vec::new(),
        }
    }

    /// Every invocation fails to start with `kind`.
    pub fn failing_to_spawn(kind: io::ErrorKind) -> Self {
        RecordingRunner {
            reply: Reply::SpawnError(kind),
            invocations: Vec::new(),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus> {
        self.invocations.push(invocation.clone());
        match self.reply {
            Reply::Exit(code) => Ok(RunStatus::from_code(code)),
            Reply::Terminated => Ok(RunStatus::terminated()),
            Reply::SpawnError(kind) => Err(io::Error::new(kind, "recorded spawn failure")),
        }
    }
}
