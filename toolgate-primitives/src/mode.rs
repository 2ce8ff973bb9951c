//! Runtime access mode and discovery strategy selectors.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runtime policy deciding whether mutating operations are reachable.
///
/// Fixed for the lifetime of one loaded catalog or one inbound request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    /// Only read-only operations are visible and callable.
    #[default]
    Restricted,
    /// Every operation is visible and callable.
    Full,
}

impl Mode {
    /// Human-facing label used in logs and server instructions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Restricted => "Safe Mode",
            Self::Full => "Unsafe Mode",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Restricted => "safe",
            Self::Full => "unsafe",
        })
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" | "restricted" | "read-only" | "readonly" => Ok(Self::Restricted),
            "unsafe" | "full" | "read-write" | "readwrite" => Ok(Self::Full),
            _ => Err(Error::UnknownMode { value: s.into() }),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(value: Mode) -> Self {
        value.to_string()
    }
}

/// How operations are presented to an agent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStrategy {
    /// Category browsing through navigation tools.
    #[default]
    Hierarchical,
    /// One tool per visible operation, listed up front.
    #[serde(alias = "static", alias = "flat")]
    Flat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_aliases() {
        assert_eq!("safe".parse::<Mode>().unwrap(), Mode::Restricted);
        assert_eq!(" READ-ONLY ".parse::<Mode>().unwrap(), Mode::Restricted);
        assert_eq!("unsafe".parse::<Mode>().unwrap(), Mode::Full);
        assert_eq!("full".parse::<Mode>().unwrap(), Mode::Full);
    }

    #[test]
    fn unknown_mode_errors() {
        assert!(matches!(
            "admin".parse::<Mode>(),
            Err(Error::UnknownMode { value }) if value == "admin"
        ));
    }

    #[test]
    fn default_mode_is_restricted() {
        assert_eq!(Mode::default(), Mode::Restricted);
    }

    #[test]
    fn discovery_accepts_static_alias() {
        let parsed: DiscoveryStrategy = serde_json::from_str("\"static\"").unwrap();
        assert_eq!(parsed, DiscoveryStrategy::Flat);
    }
}
