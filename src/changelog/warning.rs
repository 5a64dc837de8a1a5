use std::fmt;

/// Non-fatal conditions met while assembling a changelog.
/// These are reported to the user but never abort the command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangelogWarning {
    /// The remote has no URL that maps onto a hosted repository
    OriginUnavailable { remote: String },
    /// No `vX.Y.Z` tag exists yet
    NoReleaseTags,
    /// A tag range produced no conventional commits
    EmptyRelease { tag: String },
}

impl fmt::Display for ChangelogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangelogWarning::OriginUnavailable { remote } => {
                write!(
                    f,
                    "Remote '{}' has no parseable URL; the History links are omitted",
                    remote
                )
            }
            ChangelogWarning::NoReleaseTags => {
                write!(f, "No release tags found; only unreleased changes are listed")
            }
            ChangelogWarning::EmptyRelease { tag } => {
                write!(f, "Release '{}' has no conventional commits", tag)
            }
        }
    }
}
