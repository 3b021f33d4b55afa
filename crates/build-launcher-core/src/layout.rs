use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use build_launcher_config::{canonical_path, Config, LayoutSettings};
use tracing::debug;

use crate::error::{LaunchError, LaunchResult};

/// Directory containing the running launcher executable, with symlinks resolved.
pub fn launcher_root() -> LaunchResult<PathBuf> {
    let exe = env::current_exe().map_err(LaunchError::ResolveRoot)?;
    let exe = canonical_path(&exe).map_err(LaunchError::ResolveRoot)?;
    let root = exe.parent().map(Path::to_path_buf);
    root.ok_or(LaunchError::RootlessExecutable(exe))
}

/// The project root and the output directories beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    build_dir: PathBuf,
    bin_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, settings: &LayoutSettings) -> Self {
        let root = root.into();
        ProjectLayout {
            build_dir: root.join(&settings.build_dir),
            bin_dir: root.join(&settings.bin_dir),
            root,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sources.root.clone(), &config.layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Creates the build and bin directories when missing. Existing
    /// directories are left as they are.
    pub fn ensure(&self) -> LaunchResult<()> {
        for dir in [&self.build_dir, &self.bin_dir] {
            if dir.is_dir() {
                continue;
            }
            fs::create_dir(dir).map_err(|source| LaunchError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            debug!(path = %dir.display(), "created directory");
        }
        Ok(())
    }
}
