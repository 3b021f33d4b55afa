use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Requested build-system flavour.
///
/// Parsing never fails: values outside the known set are kept as
/// [`Target::Unrecognized`] and take the same route as the default on Windows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Target {
    Doc,
    Vs2022,
    #[default]
    Vs2019,
    Xcode,
    Unrecognized(String),
}

impl Target {
    pub const KNOWN: &'static [Target] = &[
        Target::Doc,
        Target::Vs2022,
        Target::Vs2019,
        Target::Xcode,
    ];

    /// Exact, case-sensitive match against the known spellings.
    pub fn parse(value: &str) -> Self {
        match value {
            "Doc" => Target::Doc,
            "VS2022" => Target::Vs2022,
            "VS2019" => Target::Vs2019,
            "XCode" => Target::Xcode,
            other => Target::Unrecognized(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Target::Doc => "Doc",
            Target::Vs2022 => "VS2022",
            Target::Vs2019 => "VS2019",
            Target::Xcode => "XCode",
            Target::Unrecognized(value) => value,
        }
    }
}

impl FromStr for Target {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Target::parse(value))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_spellings_round_trip() {
        for target in Target::KNOWN {
            assert_eq!(&Target::parse(target.as_str()), target);
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(Target::parse("vs2022"), Target::Unrecognized("vs2022".into()));
        assert_eq!(Target::parse("Xcode"), Target::Unrecognized("Xcode".into()));
        assert_eq!(Target::parse(""), Target::Unrecognized(String::new()));
    }

    #[test]
    fn default_is_vs2019() {
        assert_eq!(Target::default(), Target::Vs2019);
    }
}
