use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use build_launcher_config::{Config, LoadOptions};
use build_launcher_core::{
    launcher_root, CommandRunner, LaunchError, LaunchRequest, Launcher, Platform, SystemRunner,
    Target,
};
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::debug;

mod logging;

#[derive(Parser, Debug)]
#[command(name = "build-launcher", version, about = "Build Mozi", long_about = None)]
pub struct Cli {
    /// The target to build (Doc, VS2022, VS2019, XCode)
    #[arg(long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Project root (defaults to the directory containing this executable)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Override configuration file, applied over the project's .build-launcher.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Plan as if running on this host system (Windows, Darwin, ...)
    #[arg(long, value_name = "SYSTEM")]
    pub host: Option<String>,

    /// Print the command that would run without creating directories or spawning it
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for --dry-run
    #[arg(long, value_enum, requires = "dry_run")]
    pub format: Option<PlanFormatValue>,

    /// Fail when the build tool cannot start, and forward its non-zero exit code
    #[arg(long, conflicts_with = "dry_run")]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PlanFormatValue {
    Plain,
    Json,
}

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    execute(cli, &mut SystemRunner, &mut handle)
}

/// Runs a parsed command line against `runner`, writing user-facing output to `out`.
pub fn execute<R, W>(cli: Cli, runner: &mut R, out: &mut W) -> Result<i32>
where
    R: CommandRunner + ?Sized,
    W: Write,
{
    let root = match cli.root {
        Some(root) => root,
        None => launcher_root()?,
    };

    let mut options = LoadOptions::default().with_root(root);
    if let Some(path) = cli.config {
        let path = if path.is_relative() {
            env::current_dir()
                .context("failed to resolve current directory")?
                .join(path)
        } else {
            path
        };
        options = options.with_override_path(path);
    }
    let config = Config::load(options)?;
    debug!(
        root = %config.sources.root.display(),
        layers = config.sources.layers.len(),
        "configuration loaded"
    );

    let target = Target::parse(
        cli.target
            .as_deref()
            .unwrap_or(&config.launcher.default_target),
    );
    let platform = cli
        .host
        .as_deref()
        .map(Platform::from_name)
        .unwrap_or_else(Platform::detect);
    let request = LaunchRequest::new(platform, target).strict(cli.strict);
    let launcher = Launcher::new(config);

    if cli.dry_run {
        let format = cli.format.unwrap_or(PlanFormatValue::Plain);
        render_plan(&launcher, &request, format, out)?;
        return Ok(0);
    }

    match launcher.launch(&request, runner, out) {
        Ok(_) => Ok(0),
        Err(err @ (LaunchError::ToolFailed { .. } | LaunchError::Spawn { .. })) => {
            eprintln!("build-launcher: {err}");
            Ok(err.exit_code())
        }
        Err(err) => Err(err.into()),
    }
}

fn render_plan<W: Write>(
    launcher: &Launcher,
    request: &LaunchRequest,
    format: PlanFormatValue,
    out: &mut W,
) -> Result<()> {
    let invocation = launcher.plan(request);
    let layout = launcher.layout();

    match format {
        PlanFormatValue::Plain => {
            launcher.announce(&request.platform, out)?;
            match &invocation {
                Some(invocation) => {
                    writeln!(out, "{invocation}")?;
                    writeln!(out, "  in {}", invocation.working_dir.display())?;
                }
                None => writeln!(out, "nothing to run on {}", request.platform)?,
            }
        }
        PlanFormatValue::Json => {
            let payload = json!({
                "platform": request.platform.name(),
                "target": request.target.as_str(),
                "root": layout.root().to_string_lossy(),
                "build_dir": layout.build_dir().to_string_lossy(),
                "bin_dir": layout.bin_dir().to_string_lossy(),
                "invocation": invocation.as_ref().map(|invocation| {
                    json!({
                        "program": invocation.program.to_string_lossy(),
                        "args": invocation
                            .args
                            .iter()
                            .map(|arg| arg.to_string_lossy())
                            .collect::<Vec<_>>(),
                        "working_dir": invocation.working_dir.to_string_lossy(),
                    })
                }),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
        }
    }

    out.flush()?;
    Ok(())
}
