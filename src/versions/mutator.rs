use regex::Regex;
use std::fs;
use std::path::Path;

use crate::config::VersionRule;
use crate::domain::Version;
use crate::error::{GitReleaseError, Result};
use crate::versions::locator::{collect_files, compile_rule, detect_canonical_version, read_text};

/// Result of a version change request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChange {
    /// Files already carry the requested version; nothing was written
    AlreadyCurrent(String),
    Applied {
        previous: String,
        current: String,
        replacements: usize,
    },
}

impl VersionChange {
    /// Whether the applied version sorts after the previous one.
    pub fn is_upgrade(&self) -> bool {
        match self {
            VersionChange::AlreadyCurrent(_) => false,
            VersionChange::Applied {
                previous, current, ..
            } => match (Version::parse(previous), Version::parse(current)) {
                (Ok(previous), Ok(current)) => current > previous,
                _ => false,
            },
        }
    }
}

/// Replace every version token in `text` with `replacement`.
///
/// The first non-empty capture group of each match is replaced (or the
/// whole match when the regex has no groups); everything else is preserved
/// byte for byte. Returns the new text and the number of replacements.
pub fn replace_versions_in_text(text: &str, regex: &Regex, replacement: &str) -> (String, usize) {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for captures in regex.captures_iter(text) {
        let span = if captures.len() == 1 {
            captures.get(0)
        } else {
            captures
                .iter()
                .skip(1)
                .flatten()
                .find(|m| !m.as_str().is_empty())
        };
        let Some(span) = span else {
            continue;
        };

        output.push_str(&text[last..span.start()]);
        output.push_str(replacement);
        last = span.end();
        count += 1;
    }

    output.push_str(&text[last..]);
    (output, count)
}

/// Rewrite every configured version location to `requested`, then confirm.
///
/// A request equal to the current version touches nothing. After rewriting,
/// the locator runs again; any disagreement with `requested` is fatal.
pub fn apply_version(root: &Path, rules: &[VersionRule], requested: &str) -> Result<VersionChange> {
    let target = Version::parse(requested)?.to_string();
    let previous = detect_canonical_version(root, rules)?;

    if previous == target {
        return Ok(VersionChange::AlreadyCurrent(target));
    }

    let mut replacements = 0;
    for rule in rules {
        let regex = compile_rule(rule)?;
        for relative in collect_files(root, &rule.pattern)? {
            let path = root.join(&relative);
            let text = read_text(&path)?;
            let (updated, count) = replace_versions_in_text(&text, &regex, &target);
            if count > 0 && updated != text {
                fs::write(&path, updated)?;
                tracing::info!(path = %relative.display(), count, "Version updated");
            }
            replacements += count;
        }
    }

    if replacements == 0 {
        return Err(GitReleaseError::version_detection(
            "No version entries were updated. Check the configured version rules.",
        ));
    }

    let confirmed = detect_canonical_version(root, rules)?;
    if confirmed != target {
        return Err(GitReleaseError::version_detection(format!(
            "Fatal error: the updated files report version {} instead of {}",
            confirmed, target
        )));
    }

    Ok(VersionChange::Applied {
        previous,
        current: target,
        replacements,
    })
}
