use crate::config::Config;
use crate::domain::{BranchRole, ReleaseLevel};
use crate::error::{GitReleaseError, Result};
use crate::git::{has_staged_changes, has_unstaged_changes, Repository};

/// Step name reported for precondition failures.
pub const PREFLIGHT_STEP: &str = "check prerequisites";

/// Verify the repository is in a releasable state.
///
/// Checks, in order: local branches, remote refresh, remote branches,
/// pending upstream commits, the checked-out branch and a clean working tree.
/// Nothing is modified apart from remote-tracking references.
pub fn ensure_prerequisites(
    repo: &dyn Repository,
    config: &Config,
    level: ReleaseLevel,
) -> Result<()> {
    let fail = |message: String| GitReleaseError::release(level, PREFLIGHT_STEP, message);
    let branches = config.release_branches();
    let remote = config.remote.as_str();

    let missing_local: Vec<&str> = branches
        .local_required()
        .into_iter()
        .filter(|branch| !repo.local_branch_exists(branch))
        .collect();
    if !missing_local.is_empty() {
        return Err(fail(format!(
            "Unable to run release command: missing local branches {}.",
            missing_local.join(", ")
        )));
    }

    repo.refresh_remotes().map_err(|e| fail(e.to_string()))?;

    let missing_remote: Vec<String> = branches
        .remote_required()
        .into_iter()
        .filter(|branch| !repo.remote_branch_exists(remote, branch))
        .map(|branch| format!("{}/{}", remote, branch))
        .collect();
    if !missing_remote.is_empty() {
        return Err(fail(format!(
            "Unable to run release command: missing remote branches {}.",
            missing_remote.join(", ")
        )));
    }

    for branch in branches.remote_required() {
        let (ahead, behind) = repo
            .remote_divergence(branch, remote)
            .map_err(|e| fail(e.to_string()))?;
        tracing::debug!(branch = %branch, ahead, behind, "Remote divergence");
        if behind > 0 {
            return Err(fail(format!(
                "Remote branch {}/{} has pending updates. Please pull them first.",
                remote, branch
            )));
        }
    }

    let work = branches.name(BranchRole::Work);
    let current = repo.current_branch().map_err(|e| fail(e.to_string()))?;
    if current != work {
        return Err(fail(format!(
            "Release commands must be executed from the {} branch (current: {}).",
            work, current
        )));
    }

    let status = repo.status_lines().map_err(|e| fail(e.to_string()))?;
    if has_unstaged_changes(&status) {
        return Err(fail(
            "Working tree changes detected. Commit or stash them before releasing.".to_string(),
        ));
    }
    if has_staged_changes(&status) {
        return Err(fail(
            "Staging area is not empty. Commit or unstage the changes before releasing."
                .to_string(),
        ));
    }

    Ok(())
}
