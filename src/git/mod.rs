//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! tool, allowing the changelog builder, the version workflow and the release
//! orchestrator to run against a real repository or an in-memory mock.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::SystemRepository]: inspection through `git2`, history and
//!   mutations through the system `git` binary
//! - [mock::MockRepository]: an in-memory implementation that records calls
//!
//! # Usage
//!
//! ```rust
//! # use git_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) {
//! for tag in repo.list_tags(None) {
//!     println!("{} ({})", tag.name, tag.iso_date);
//! }
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::SystemRepository;

use crate::domain::TagInfo;
use crate::error::Result;
use std::path::Path;

/// Common git operation trait for abstraction
///
/// ## Failure policy
///
/// History queries ([Repository::list_tags], [Repository::commit_messages],
/// [Repository::remote_url]) never fail: a missing range, a repository without
/// tags or a missing remote are all "nothing to report" and yield an empty
/// result. Every other method returns [crate::error::Result], and a failing
/// `git` invocation surfaces as [crate::error::GitReleaseError::Command]
/// carrying the trimmed stderr and exit code.
///
/// ## Implementations
///
/// - [SystemRepository](repository::SystemRepository): real repository
/// - [MockRepository](mock::MockRepository): test double
pub trait Repository {
    /// Working tree root of the repository
    fn root(&self) -> &Path;

    /// Release tags ordered ascending by creation date
    ///
    /// Only tags named `vMAJOR.MINOR.PATCH` are returned.
    ///
    /// # Arguments
    /// * `merged` - When set, restrict to tags reachable from this reference
    fn list_tags(&self, merged: Option<&str>) -> Vec<TagInfo>;

    /// Full messages of non-merge commits in a revision range, newest first
    ///
    /// # Arguments
    /// * `range` - A revision range such as `v1.0.0..v1.1.0`, or a single ref
    fn commit_messages(&self, range: &str) -> Vec<String>;

    /// URL configured for a remote, if any
    fn remote_url(&self, remote: &str) -> Option<String>;

    fn local_branch_exists(&self, branch: &str) -> bool;

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> bool;

    /// Commits only on the local branch and commits only on its remote
    /// counterpart, as `(ahead, behind)`.
    fn remote_divergence(&self, branch: &str, remote: &str) -> Result<(usize, usize)>;

    /// Update every remote-tracking reference (`git remote -v update`)
    fn refresh_remotes(&self) -> Result<()>;

    /// Name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Working tree status in porcelain v1 format, one entry per line
    fn status_lines(&self) -> Result<Vec<String>>;

    /// Stage every change, including deletions and untracked files
    fn stage_all(&self) -> Result<()>;

    fn stage_path(&self, path: &Path) -> Result<()>;

    fn commit(&self, message: &str) -> Result<()>;

    /// Amend the last commit keeping its message
    fn amend_no_edit(&self) -> Result<()>;

    /// Create an annotated tag on HEAD, replacing an existing one when `force` is set
    fn tag_annotated(&self, name: &str, message: &str, force: bool) -> Result<()>;

    fn checkout(&self, branch: &str) -> Result<()>;

    /// Merge a branch into the checked-out branch
    fn merge(&self, branch: &str) -> Result<()>;

    fn push(&self, remote: &str, refname: &str) -> Result<()>;

    fn push_tags(&self, remote: &str) -> Result<()>;

    /// Print the details of a reference (`git show`) to the terminal
    fn show(&self, refname: &str) -> Result<()>;
}

/// Whether porcelain status reports untracked files or unstaged modifications.
pub fn has_unstaged_changes(lines: &[String]) -> bool {
    lines.iter().any(|line| {
        if line.starts_with("??") {
            return true;
        }
        matches!(line.chars().nth(1), Some(c) if c != ' ')
    })
}

/// Whether porcelain status reports anything in the index.
pub fn has_staged_changes(lines: &[String]) -> bool {
    lines.iter().any(|line| {
        if line.starts_with("??") {
            return false;
        }
        matches!(line.chars().next(), Some(c) if c != ' ')
    })
}
