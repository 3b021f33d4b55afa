//! Configuration primitives and loader for the build launcher.
//!
//! Settings are resolved from a precedence stack:
//! built-in defaults → project file at the root → override flag.
//! Each layer only replaces the keys it sets. Parsed settings are validated
//! and normalised into typed structures so the launcher never touches raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name looked up at the project root.
pub const CONFIG_FILE_NAME: &str = ".build-launcher.toml";

const DEFAULT_TARGET: &str = "VS2019";
const DEFAULT_BUILD_DIR: &str = "Build";
const DEFAULT_BIN_DIR: &str = "Bin";
const DEFAULT_CMAKE_PROGRAM: &str = "cmake";
const DEFAULT_ARCHITECTURE: &str = "x64";
const DEFAULT_DOXYGEN_PROGRAM: &str = "Tools/Doxygen/Win64/doxygen.exe";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub launcher: LauncherSettings,
    pub layout: LayoutSettings,
    pub cmake: CmakeSettings,
    pub doxygen: DoxygenSettings,
    pub sources: ConfigSources,
}

/// Settings that shape argument defaults.
#[derive(Clone, Debug)]
pub struct LauncherSettings {
    /// Target used when `--target` is not given on the command line.
    pub default_target: String,
}

/// Names of the output directories created beneath the root.
#[derive(Clone, Debug)]
pub struct LayoutSettings {
    pub build_dir: String,
    pub bin_dir: String,
}

/// CMake generator invocation settings.
#[derive(Clone, Debug)]
pub struct CmakeSettings {
    pub program: String,
    pub architecture: String,
}

/// Documentation generator settings.
#[derive(Clone, Debug)]
pub struct DoxygenSettings {
    /// Absolute path of the doxygen executable; relative values in the
    /// config are resolved against the project root.
    pub program: PathBuf,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub root: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/project/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn default() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    Project,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::Project => "project config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub root: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve project root {attempted}: {source}")]
    Root {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let root = resolve_root(options.root)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &root));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default();
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(&default_source));
        let mut layers = vec![default_source];

        let project_path = root.join(CONFIG_FILE_NAME);
        if project_path.is_file() && Some(&project_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Project, project_path.clone());
            merged.merge(load_layer(&project_path, source.clone())?);
            layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            layers.push(source);
        }

        merged
            .finalize(&root, layers)
            .map_err(ConfigError::Validation)
    }

    /// Built-in defaults for `root`, without consulting the filesystem.
    pub fn builtin(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Config {
            launcher: LauncherSettings {
                default_target: DEFAULT_TARGET.to_owned(),
            },
            layout: LayoutSettings {
                build_dir: DEFAULT_BUILD_DIR.to_owned(),
                bin_dir: DEFAULT_BIN_DIR.to_owned(),
            },
            cmake: CmakeSettings {
                program: DEFAULT_CMAKE_PROGRAM.to_owned(),
                architecture: DEFAULT_ARCHITECTURE.to_owned(),
            },
            doxygen: DoxygenSettings {
                program: root.join(DEFAULT_DOXYGEN_PROGRAM),
            },
            sources: ConfigSources {
                root,
                layers: vec![ConfigSource::default()],
            },
        }
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match root {
        Some(path) => canonical_path(&path).map_err(|source| ConfigError::Root {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::Root {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

/// Like [`fs::canonicalize`], but without the `\\?\` verbatim prefix Windows
/// adds. The prefix is kept when the plain form would exceed `MAX_PATH`.
pub fn canonical_path(path: &Path) -> io::Result<PathBuf> {
    fs::canonicalize(path).map(strip_verbatim)
}

#[cfg(windows)]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    const MAX_PATH: usize = 260;

    match plain_form(&path) {
        Some(plain) if plain.as_os_str().len() < MAX_PATH => plain,
        _ => path,
    }
}

#[cfg(not(windows))]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    path
}

#[cfg(windows)]
fn plain_form(path: &Path) -> Option<PathBuf> {
    use std::path::Prefix;

    let mut components = path.components();
    let prefix = match components.next() {
        Some(Component::Prefix(prefix)) => match prefix.kind() {
            Prefix::VerbatimDisk(letter) => format!("{}:\\", letter as char),
            Prefix::VerbatimUNC(server, share) => format!(
                "\\\\{}\\{}\\",
                server.to_string_lossy(),
                share.to_string_lossy()
            ),
            _ => return None,
        },
        _ => return None,
    };
    if matches!(components.clone().next(), Some(Component::RootDir)) {
        components.next();
    }

    let mut plain = PathBuf::from(prefix);
    plain.push(components.as_path());
    Some(plain)
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.into(),
        source: err,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.into(),
        source: err,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: &ConfigSource) -> PartialConfig {
    let at = |value: &str| Some(Located::new(value.to_owned(), source.clone()));
    PartialConfig {
        default_target: at(DEFAULT_TARGET),
        build_dir: at(DEFAULT_BUILD_DIR),
        bin_dir: at(DEFAULT_BIN_DIR),
        cmake_program: at(DEFAULT_CMAKE_PROGRAM),
        architecture: at(DEFAULT_ARCHITECTURE),
        doxygen_program: at(DEFAULT_DOXYGEN_PROGRAM),
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    default_target: Option<Located<String>>,
    build_dir: Option<Located<String>>,
    bin_dir: Option<Located<String>>,
    cmake_program: Option<Located<String>>,
    architecture: Option<Located<String>>,
    doxygen_program: Option<Located<String>>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        fn take(slot: &mut Option<Located<String>>, other: Option<Located<String>>) {
            if other.is_some() {
                *slot = other;
            }
        }
        take(&mut self.default_target, other.default_target);
        take(&mut self.build_dir, other.build_dir);
        take(&mut self.bin_dir, other.bin_dir);
        take(&mut self.cmake_program, other.cmake_program);
        take(&mut self.architecture, other.architecture);
        take(&mut self.doxygen_program, other.doxygen_program);
    }

    fn finalize(
        self,
        root: &Path,
        layers: Vec<ConfigSource>,
    ) -> Result<Config, ConfigValidationErrors> {
        let mut errors = Vec::new();

        let default_target = required(self.default_target, DEFAULT_TARGET);
        let build_dir = required(self.build_dir, DEFAULT_BUILD_DIR);
        let bin_dir = required(self.bin_dir, DEFAULT_BIN_DIR);
        let cmake_program = required(self.cmake_program, DEFAULT_CMAKE_PROGRAM);
        let architecture = required(self.architecture, DEFAULT_ARCHITECTURE);
        let doxygen_program = required(self.doxygen_program, DEFAULT_DOXYGEN_PROGRAM);

        check_non_empty(&default_target, "launcher.default_target", &mut errors);
        check_non_empty(&cmake_program, "cmake.program", &mut errors);
        check_non_empty(&architecture, "cmake.architecture", &mut errors);
        check_non_empty(&doxygen_program, "doxygen.program", &mut errors);
        check_directory_name(&build_dir, "layout.build_dir", &mut errors);
        check_directory_name(&bin_dir, "layout.bin_dir", &mut errors);

        if build_dir.value == bin_dir.value {
            errors.push(
                ConfigValidationError::new(
                    Some(bin_dir.source.clone()),
                    format!("must differ from layout.build_dir ('{}')", build_dir.value),
                )
                .with_context("layout.bin_dir"),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(Config {
            launcher: LauncherSettings {
                default_target: default_target.value,
            },
            layout: LayoutSettings {
                build_dir: build_dir.value,
                bin_dir: bin_dir.value,
            },
            cmake: CmakeSettings {
                program: cmake_program.value,
                architecture: architecture.value,
            },
            doxygen: DoxygenSettings {
                program: make_absolute(Path::new(&doxygen_program.value), root),
            },
            sources: ConfigSources {
                root: root.to_path_buf(),
                layers,
            },
        })
    }
}

fn required(slot: Option<Located<String>>, fallback: &str) -> Located<String> {
    let located =
        slot.unwrap_or_else(|| Located::new(fallback.to_owned(), ConfigSource::default()));
    Located::new(located.value.trim().to_owned(), located.source)
}

fn check_non_empty(
    value: &Located<String>,
    key: &str,
    errors: &mut Vec<ConfigValidationError>,
) {
    if value.value.is_empty() {
        errors.push(
            ConfigValidationError::new(Some(value.source.clone()), "cannot be empty".into())
                .with_context(key),
        );
    }
}

fn check_directory_name(
    value: &Located<String>,
    key: &str,
    errors: &mut Vec<ConfigValidationError>,
) {
    let mut components = Path::new(&value.value).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal {
        errors.push(
            ConfigValidationError::new(
                Some(value.source.clone()),
                format!(
                    "'{}' must be a single relative directory name",
                    value.value
                ),
            )
            .with_context(key),
        );
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

/// Collection of validation failures, rendered one per line.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    launcher: Option<RawLauncher>,
    #[serde(default)]
    layout: Option<RawLayout>,
    #[serde(default)]
    cmake: Option<RawCmake>,
    #[serde(default)]
    doxygen: Option<RawDoxygen>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLauncher {
    default_target: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLayout {
    build_dir: Option<String>,
    bin_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCmake {
    program: Option<String>,
    architecture: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDoxygen {
    program: Option<String>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let at = |value: Option<String>| value.map(|v| Located::new(v, source.clone()));
        let mut partial = PartialConfig::default();

        if let Some(launcher) = self.launcher {
            partial.default_target = at(launcher.default_target);
        }
        if let Some(layout) = self.layout {
            partial.build_dir = at(layout.build_dir);
            partial.bin_dir = at(layout.bin_dir);
        }
        if let Some(cmake) = self.cmake {
            partial.cmake_program = at(cmake.program);
            partial.architecture = at(cmake.architecture);
        }
        if let Some(doxygen) = self.doxygen {
            partial.doxygen_program = at(doxygen.program);
        }

        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(value: &str) -> Located<String> {
        Located::new(value.to_owned(), ConfigSource::default())
    }

    #[test]
    fn directory_names_must_be_single_components() {
        let mut errors = Vec::new();
        check_directory_name(&located("Build"), "layout.build_dir", &mut errors);
        assert!(errors.is_empty());

        for bad in ["", "out/Build", "../Build", "/abs", "."] {
            let mut errors = Vec::new();
            check_directory_name(&located(bad), "layout.build_dir", &mut errors);
            assert_eq!(errors.len(), 1, "expected '{bad}' to be rejected");
        }
    }

    #[test]
    fn later_layers_replace_only_the_keys_they_set() {
        let mut merged = defaults_layer(&ConfigSource::default());
        let project = ConfigSource::for_file(ConfigSourceKind::Project, PathBuf::from("p.toml"));
        merged.merge(PartialConfig {
            architecture: Some(Located::new("ARM64".into(), project.clone())),
            ..PartialConfig::default()
        });

        let config = merged
            .finalize(Path::new("/root"), vec![project])
            .expect("valid config");
        assert_eq!(config.cmake.architecture, "ARM64");
        assert_eq!(config.cmake.program, "cmake");
        assert_eq!(config.layout.build_dir, "Build");
    }

    #[cfg(windows)]
    #[test]
    fn verbatim_prefixes_are_stripped() {
        assert_eq!(
            strip_verbatim(PathBuf::from(r"\\?\C:\proj\Mozi")),
            PathBuf::from(r"C:\proj\Mozi")
        );
        assert_eq!(
            strip_verbatim(PathBuf::from(r"\\?\UNC\server\share\proj")),
            PathBuf::from(r"\\server\share\proj")
        );
        assert_eq!(
            strip_verbatim(PathBuf::from(r"C:\proj")),
            PathBuf::from(r"C:\proj")
        );

        let long = format!(r"\\?\C:\{}", "a".repeat(300));
        assert_eq!(strip_verbatim(PathBuf::from(&long)), PathBuf::from(long));
    }

    #[test]
    fn validation_errors_name_their_source_layer() {
        let source = ConfigSource::for_file(ConfigSourceKind::Override, PathBuf::from("o.toml"));
        let err = ConfigValidationError::new(Some(source), "cannot be empty".into())
            .with_context("cmake.program");
        assert_eq!(
            err.to_string(),
            "cmake.program: cannot be empty (override config at o.toml)"
        );
    }
}
