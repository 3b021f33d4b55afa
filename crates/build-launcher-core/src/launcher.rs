use std::io::{self, Write};

use build_launcher_config::Config;
use tracing::{debug, warn};

use crate::error::{LaunchError, LaunchResult};
use crate::layout::ProjectLayout;
use crate::plan::{plan, Invocation};
use crate::platform::Platform;
use crate::runner::{CommandRunner, RunStatus};
use crate::target::Target;

/// What to launch and how strictly to treat the child's failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    pub platform: Platform,
    pub target: Target,
    /// Turn spawn failures and non-zero child exits into errors.
    pub strict: bool,
}

impl LaunchRequest {
    pub fn new(platform: Platform, target: Target) -> Self {
        LaunchRequest {
            platform,
            target,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Result of a launch that did not abort.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The platform has no generator; nothing was spawned.
    Skipped { platform: Platform },
    /// The child ran to completion, successfully or not.
    Finished {
        invocation: Invocation,
        status: RunStatus,
    },
    /// The child could not be started (tolerated outside strict mode).
    NotStarted {
        invocation: Invocation,
        error: io::Error,
    },
}

impl LaunchOutcome {
    pub fn invocation(&self) -> Option<&Invocation> {
        match self {
            LaunchOutcome::Skipped { .. } => None,
            LaunchOutcome::Finished { invocation, .. }
            | LaunchOutcome::NotStarted { invocation, .. } => Some(invocation),
        }
    }
}

/// Drives one launcher run against a resolved configuration.
pub struct Launcher {
    config: Config,
    layout: ProjectLayout,
}

impl Launcher {
    pub fn new(config: Config) -> Self {
        let layout = ProjectLayout::from_config(&config);
        Launcher { config, layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// The invocation `request` would spawn, without touching the filesystem.
    pub fn plan(&self, request: &LaunchRequest) -> Option<Invocation> {
        plan(&request.platform, &request.target, &self.config, &self.layout)
    }

    /// Writes the two informational banner lines.
    pub fn announce<W: Write + ?Sized>(&self, platform: &Platform, out: &mut W) -> LaunchResult<()> {
        writeln!(out, "Building On {platform} System")?;
        writeln!(out, "Current Path is {}", self.layout.root().display())?;
        out.flush()?;
        Ok(())
    }

    /// Announces, creates the output directories, then runs the planned
    /// invocation (if any) and waits for it.
    pub fn launch<R, W>(
        &self,
        request: &LaunchRequest,
        runner: &mut R,
        out: &mut W,
    ) -> LaunchResult<LaunchOutcome>
    where
        R: CommandRunner + ?Sized,
        W: Write + ?Sized,
    {
        self.announce(&request.platform, out)?;
        self.layout.ensure()?;

        let Some(invocation) = self.plan(request) else {
            debug!(platform = %request.platform, "no generator for platform, nothing to do");
            return Ok(LaunchOutcome::Skipped {
                platform: request.platform.clone(),
            });
        };

        match runner.run(&invocation) {
            Ok(status) if status.success() => Ok(LaunchOutcome::Finished { invocation, status }),
            Ok(status) => {
                warn!(command = %invocation, %status, "build tool reported failure");
                if request.strict {
                    return Err(LaunchError::ToolFailed {
                        program: invocation.program,
                        status,
                    });
                }
                Ok(LaunchOutcome::Finished { invocation, status })
            }
            Err(error) => {
                warn!(command = %invocation, %error, "failed to start build tool");
                if request.strict {
                    return Err(LaunchError::Spawn {
                        program: invocation.program,
                        source: error,
                    });
                }
                Ok(LaunchOutcome::NotStarted { invocation, error })
            }
        }
    }
}
