use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::runner::RunStatus;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to locate the launcher executable: {0}")]
    ResolveRoot(#[source] io::Error),

    #[error("launcher executable {0} has no parent directory")]
    RootlessExecutable(PathBuf),

    #[error("failed to create directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("failed to start {}: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },

    #[error("{} exited with {status}", .program.display())]
    ToolFailed { program: PathBuf, status: RunStatus },

    #[error("failed to write launcher output: {0}")]
    Output(#[from] io::Error),
}

impl LaunchError {
    /// Process exit code for this failure. A failed tool forwards its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolFailed { status, .. } => status.code().filter(|code| *code != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

pub type LaunchResult<T> = Result<T, LaunchError>;
