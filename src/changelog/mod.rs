//! Changelog assembly from tags and conventional commits
//!
//! [section] renders one release block, [document] assembles the whole
//! `CHANGELOG.md` with its History index, and [write_changelog] applies the
//! command-line overwrite and print policies.

pub mod document;
pub mod links;
pub mod section;
pub mod warning;

pub use document::{build_document, build_document_on, build_history, Changelog};
pub use links::{compare_url, origin_base_url};
pub use section::render_section;
pub use warning::ChangelogWarning;

use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{GitReleaseError, Result};
use crate::git::Repository;

/// Flags shared by the changelog command and the release commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangelogOptions {
    pub include_unreleased: bool,
    pub force_write: bool,
    pub print_only: bool,
}

/// Where the generated document ended up
#[derive(Debug, Clone, PartialEq)]
pub enum ChangelogOutput {
    Printed(String),
    Written(PathBuf),
}

/// Generate the changelog and either print it or write it into the repository root.
///
/// An existing file is only replaced when `force_write` is set.
pub fn write_changelog(
    repo: &dyn Repository,
    config: &Config,
    options: ChangelogOptions,
) -> Result<(ChangelogOutput, Vec<ChangelogWarning>)> {
    let changelog = build_document(repo, &config.remote, options.include_unreleased);

    if options.print_only {
        return Ok((ChangelogOutput::Printed(changelog.markdown), changelog.warnings));
    }

    let path = repo.root().join(&config.changelog_file);
    if path.exists() && !options.force_write {
        return Err(GitReleaseError::changelog(format!(
            "{} already exists. Use --force-write to overwrite it.",
            path.display()
        )));
    }

    fs::write(&path, &changelog.markdown)?;
    tracing::info!(path = %path.display(), "Changelog written");
    Ok((ChangelogOutput::Written(path), changelog.warnings))
}
