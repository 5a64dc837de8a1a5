use crate::error::{GitReleaseError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn semver_core_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("static regex"))
}

/// Plain `MAJOR.MINOR.PATCH` version.
///
/// Pre-release and build metadata are rejected: every configured file must
/// carry exactly three numeric components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(semver::Version);

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version(semver::Version::new(major, minor, patch))
    }

    /// Parse a bare `X.Y.Z` string (surrounding whitespace is ignored).
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let captures = semver_core_regex().captures(trimmed).ok_or_else(|| {
            GitReleaseError::InvalidVersion(format!(
                "'{}' - expected <major>.<minor>.<patch> (e.g. 1.2.3)",
                trimmed
            ))
        })?;

        let component = |index: usize| -> Result<u64> {
            captures[index].parse::<u64>().map_err(|_| {
                GitReleaseError::InvalidVersion(format!(
                    "'{}' - component '{}' is out of range",
                    trimmed, &captures[index]
                ))
            })
        };

        Ok(Version::new(component(1)?, component(2)?, component(3)?))
    }

    /// Parse a release tag of the form `vX.Y.Z`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.strip_prefix('v').and_then(|rest| Version::parse(rest).ok())
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Tag name for this version (`v1.2.3`).
    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }

    /// Bump version according to the release level
    ///
    /// Fails when the incremented component does not fit in a `u64`.
    pub fn bump(&self, level: ReleaseLevel) -> Result<Self> {
        let increment = |component: u64| {
            component.checked_add(1).ok_or_else(|| {
                GitReleaseError::InvalidVersion(format!(
                    "'{}' - cannot apply a {} bump, component {} is at its maximum",
                    self, level, component
                ))
            })
        };

        Ok(match level {
            ReleaseLevel::Major => Version::new(increment(self.major())?, 0, 0),
            ReleaseLevel::Minor => Version::new(self.major(), increment(self.minor())?, 0),
            ReleaseLevel::Patch => {
                Version::new(self.major(), self.minor(), increment(self.patch())?)
            }
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = GitReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Which component a release increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ReleaseLevel {
    Major,
    Minor,
    Patch,
}

impl ReleaseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseLevel::Major => "major",
            ReleaseLevel::Minor => "minor",
            ReleaseLevel::Patch => "patch",
        }
    }

    /// Whether a release of this level is promoted to the main-line branch.
    ///
    /// Patch releases stop at the integration branch.
    pub fn promotes_to_master(&self) -> bool {
        !matches!(self, ReleaseLevel::Patch)
    }
}

impl fmt::Display for ReleaseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bump a textual version, e.g. `bump("1.2.3", Patch) == "1.2.4"`.
pub fn bump(current: &str, level: ReleaseLevel) -> Result<String> {
    Ok(Version::parse(current)?.bump(level)?.to_string())
}
