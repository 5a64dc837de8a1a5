//! Conventional commit helper (`git-release commit <type> <message...>`)

use regex::Regex;
use std::sync::OnceLock;

use crate::config::Config;
use crate::domain::CommitType;
use crate::error::{GitReleaseError, Result};
use crate::git::{has_staged_changes, has_unstaged_changes, Repository};

fn module_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<module>[A-Za-z0-9_]+):\s*(?P<body>.*)$").expect("static regex")
    })
}

/// Build `type(scope): body` from the words typed after the commit type.
///
/// A leading `module:` token selects the scope; otherwise `default_module`
/// is used.
pub fn build_commit_message(
    commit_type: CommitType,
    words: &[String],
    default_module: &str,
) -> Result<String> {
    let text = words.join(" ");
    let text = text.trim();
    if text.is_empty() {
        return Err(GitReleaseError::usage(format!(
            "commit {} requires a message after the type.",
            commit_type
        )));
    }

    let (scope, body) = match module_prefix_regex().captures(text) {
        Some(captures) => (
            captures["module"].to_string(),
            captures["body"].trim().to_string(),
        ),
        None => (default_module.to_string(), text.to_string()),
    };

    if body.is_empty() {
        return Err(GitReleaseError::usage(format!(
            "commit {} requires text after the '<module>:' prefix to complete the message.",
            commit_type
        )));
    }

    Ok(format!("{}({}): {}", commit_type, scope, body))
}

/// Commit the staged changes with a conventional message.
///
/// Requires something staged and nothing left unstaged. Returns the message.
pub fn run_commit(
    repo: &dyn Repository,
    config: &Config,
    commit_type: CommitType,
    words: &[String],
) -> Result<String> {
    let message = build_commit_message(commit_type, words, &config.default_module)?;

    let status = repo.status_lines()?;
    if has_unstaged_changes(&status) {
        return Err(GitReleaseError::usage(
            "Unstaged changes detected. Stage or stash them before committing.",
        ));
    }
    if !has_staged_changes(&status) {
        return Err(GitReleaseError::usage("No staged changes to commit."));
    }

    repo.commit(&message)?;
    Ok(message)
}
