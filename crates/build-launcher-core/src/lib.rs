pub mod error;
pub mod launcher;
pub mod layout;
pub mod plan;
pub mod platform;
pub mod runner;
pub mod target;

pub use build_launcher_config::Config;
pub use error::LaunchError;
pub use launcher::{LaunchOutcome, LaunchRequest, Launcher};
pub use layout::{launcher_root, ProjectLayout};
pub use plan::{plan, Generator, Invocation};
pub use platform::Platform;
pub use runner::{CommandRunner, RunStatus, SystemRunner};
pub use target::Target;
