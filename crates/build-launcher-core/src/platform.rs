use std::env;
use std::fmt;

/// Host operating system as far as dispatch is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Darwin,
    /// Any other system, carrying its reported name (`Linux`, `FreeBSD`, ...).
    Other(String),
}

impl Platform {
    /// Detects the platform the launcher was compiled for.
    pub fn detect() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Maps a Rust `target_os` identifier to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::Darwin,
            other => Platform::Other(system_name(other)),
        }
    }

    /// Maps a user-supplied system name, as accepted by `--host`.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("windows") {
            Platform::Windows
        } else if name.eq_ignore_ascii_case("darwin") || name.eq_ignore_ascii_case("macos") {
            Platform::Darwin
        } else {
            Platform::Other(name.to_owned())
        }
    }

    /// System name in the spelling used for the "Building On" banner.
    pub fn name(&self) -> &str {
        match self {
            Platform::Windows => "Windows",
            Platform::Darwin => "Darwin",
            Platform::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn system_name(os: &str) -> String {
    let known = match os {
        "linux" => "Linux",
        "freebsd" => "FreeBSD",
        "netbsd" => "NetBSD",
        "openbsd" => "OpenBSD",
        "dragonfly" => "DragonFly",
        "solaris" | "illumos" => "SunOS",
        "android" => "Android",
        "ios" => "iOS",
        _ => "",
    };
    if !known.is_empty() {
        return known.to_owned();
    }

    let mut chars = os.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
