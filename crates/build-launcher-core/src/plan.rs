//! Mapping from host platform and target to the one external command to run.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use build_launcher_config::Config;
use tracing::warn;

use crate::layout::ProjectLayout;
use crate::platform::Platform;
use crate::target::Target;

/// CMake generators the launcher knows how to request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generator {
    VisualStudio2022,
    VisualStudio2019,
    Xcode,
}

impl Generator {
    pub fn name(self) -> &'static str {
        match self {
            Generator::VisualStudio2022 => "Visual Studio 17 2022",
            Generator::VisualStudio2019 => "Visual Studio 16 2019",
            Generator::Xcode => "Xcode",
        }
    }

    /// Visual Studio generators take an explicit `-A` platform.
    pub fn takes_architecture(self) -> bool {
        matches!(
            self,
            Generator::VisualStudio2022 | Generator::VisualStudio2019
        )
    }
}

/// A fully resolved external command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// `cmake -G <generator> [-A <arch>] <root>`, run from the build directory.
    pub fn cmake(config: &Config, generator: Generator, layout: &ProjectLayout) -> Self {
        let mut args: Vec<OsString> = vec!["-G".into(), generator.name().into()];
        if generator.takes_architecture() {
            args.push("-A".into());
            args.push(config.cmake.architecture.clone().into());
        }
        args.push(layout.root().as_os_str().to_owned());

        Invocation {
            program: PathBuf::from(&config.cmake.program),
            args,
            working_dir: layout.build_dir().to_path_buf(),
        }
    }

    /// The bundled doxygen, run without arguments from the project root.
    pub fn doxygen(config: &Config, layout: &ProjectLayout) -> Self {
        Invocation {
            program: config.doxygen.program.clone(),
            args: Vec::new(),
            working_dir: layout.root().to_path_buf(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_word(f, self.program.as_os_str())?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_word(f, arg)?;
        }
        Ok(())
    }
}

fn write_word(f: &mut fmt::Formatter<'_>, word: &OsStr) -> fmt::Result {
    let word = word.to_string_lossy();
    if word.is_empty() || word.contains(char::is_whitespace) {
        write!(f, "\"{word}\"")
    } else {
        f.write_str(&word)
    }
}

/// Chooses the invocation for `platform` and `target`.
///
/// Returns `None` on platforms without a supported generator; nothing should
/// be spawned in that case.
pub fn plan(
    platform: &Platform,
    target: &Target,
    config: &Config,
    layout: &ProjectLayout,
) -> Option<Invocation> {
    match platform {
        Platform::Windows => Some(match target {
            Target::Doc => Invocation::doxygen(config, layout),
            Target::Vs2022 => Invocation::cmake(config, Generator::VisualStudio2022, layout),
            Target::Vs2019 | Target::Xcode => {
                Invocation::cmake(config, Generator::VisualStudio2019, layout)
            }
            Target::Unrecognized(value) => {
                warn!(requested = %value, "unrecognized target, generating Visual Studio 2019");
                Invocation::cmake(config, Generator::VisualStudio2019, layout)
            }
        }),
        Platform::Darwin => Some(Invocation::cmake(config, Generator::Xcode, layout)),
        Platform::Other(_) => None,
    }
}
