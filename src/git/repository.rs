use crate::domain::tag::is_release_tag;
use crate::domain::TagInfo;
use crate::error::{GitReleaseError, Result};
use git2::{BranchType, Repository as Git2Repo, Status, StatusOptions};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Separator between fields of one `for-each-ref` line.
const FIELD_SEPARATOR: char = '\x1f';
/// Terminator appended to every commit message by `git log`.
const RECORD_SEPARATOR: char = '\x1e';
/// Date shown for a tag without a creation date.
const UNKNOWN_DATE: &str = "unknown-date";

/// Real repository: `git2` for inspection, the `git` binary for everything else
pub struct SystemRepository {
    repo: Git2Repo,
    root: PathBuf,
}

impl SystemRepository {
    /// Open or discover a git repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| {
                GitReleaseError::config("A bare repository has no working tree to release from")
            })?
            .to_path_buf();
        Ok(SystemRepository { repo, root })
    }

    /// Run `git` in the repository root and return its stdout.
    ///
    /// Non-zero exits become [GitReleaseError::Command] with the captured stderr.
    fn run_git(&self, args: &[&str]) -> Result<String> {
        let rendered = format!("git {}", args.join(" "));
        tracing::debug!(command = %rendered, "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| {
                GitReleaseError::command(&rendered, None, &format!("Failed to run git: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitReleaseError::command(
                rendered,
                output.status.code(),
                &stderr,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn branch_oid(&self, name: &str, kind: BranchType) -> Result<git2::Oid> {
        let branch = self.repo.find_branch(name, kind)?;
        branch.get().target().ok_or_else(|| {
            GitReleaseError::command(
                format!("git rev-parse {}", name),
                None,
                &format!("Branch '{}' has no target", name),
            )
        })
    }
}

/// Parse `for-each-ref` output into release tags, keeping the input order.
fn parse_tag_lines(output: &str) -> Vec<TagInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split(FIELD_SEPARATOR);
            let name = fields.next()?.trim();
            if !is_release_tag(name) {
                return None;
            }
            let date = match fields.next().map(str::trim) {
                Some(date) if !date.is_empty() => date,
                _ => UNKNOWN_DATE,
            };
            let object_id = fields.next().unwrap_or("").trim();
            Some(TagInfo::new(name, date, object_id))
        })
        .collect()
}

/// Split `git log` output on the record separator, dropping empty records.
fn parse_commit_records(output: &str) -> Vec<String> {
    output
        .split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render one `git2` status entry as a porcelain v1 `XY path` line.
fn porcelain_line(status: Status, path: &str) -> Option<String> {
    if status.is_ignored() {
        return None;
    }
    if status.is_wt_new() && !status.intersects(Status::INDEX_NEW) {
        return Some(format!("?? {}", path));
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };

    if status.is_conflicted() {
        return Some(format!("UU {}", path));
    }
    if index == ' ' && worktree == ' ' {
        return None;
    }
    Some(format!("{}{} {}", index, worktree, path))
}

impl super::Repository for SystemRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self, merged: Option<&str>) -> Vec<TagInfo> {
        let format = "--format=%(refname:strip=2)%1f%(creatordate:short)%1f%(objectname)";
        let mut args = vec!["for-each-ref", "--sort=creatordate", format];
        if let Some(reference) = merged {
            args.push("--merged");
            args.push(reference);
        }
        args.push("refs/tags");

        match self.run_git(&args) {
            Ok(output) => parse_tag_lines(&output),
            Err(e) => {
                tracing::debug!(error = %e, "Tag listing unavailable");
                Vec::new()
            }
        }
    }

    fn commit_messages(&self, range: &str) -> Vec<String> {
        match self.run_git(&["log", "--no-merges", "--pretty=format:%B%x1e", range]) {
            Ok(output) => parse_commit_records(&output),
            Err(e) => {
                tracing::debug!(range = %range, error = %e, "Commit history unavailable");
                Vec::new()
            }
        }
    }

    fn remote_url(&self, remote: &str) -> Option<String> {
        let remote = self.repo.find_remote(remote).ok()?;
        remote
            .url()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    fn local_branch_exists(&self, branch: &str) -> bool {
        self.repo.find_branch(branch, BranchType::Local).is_ok()
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> bool {
        self.repo
            .find_branch(&format!("{}/{}", remote, branch), BranchType::Remote)
            .is_ok()
    }

    fn remote_divergence(&self, branch: &str, remote: &str) -> Result<(usize, usize)> {
        let local = self.branch_oid(branch, BranchType::Local)?;
        let upstream = self.branch_oid(&format!("{}/{}", remote, branch), BranchType::Remote)?;
        Ok(self.repo.graph_ahead_behind(local, upstream)?)
    }

    fn refresh_remotes(&self) -> Result<()> {
        self.run_git(&["remote", "-v", "update"]).map(|_| ())
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Ok("HEAD".to_string());
        }
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn status_lines(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter_map(|entry| porcelain_line(entry.status(), entry.path().unwrap_or("")))
            .collect())
    }

    fn stage_all(&self) -> Result<()> {
        self.run_git(&["add", "--all"]).map(|_| ())
    }

    fn stage_path(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_git(&["add", "--", path.as_ref()]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_git(&["commit", "-m", message]).map(|_| ())
    }

    fn amend_no_edit(&self) -> Result<()> {
        self.run_git(&["commit", "--amend", "--no-edit"]).map(|_| ())
    }

    fn tag_annotated(&self, name: &str, message: &str, force: bool) -> Result<()> {
        let mut args = vec!["tag"];
        if force {
            args.push("--force");
        }
        args.extend(["-a", name, "-m", message]);
        self.run_git(&args).map(|_| ())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run_git(&["checkout", branch]).map(|_| ())
    }

    fn merge(&self, branch: &str) -> Result<()> {
        self.run_git(&["merge", branch]).map(|_| ())
    }

    fn push(&self, remote: &str, refname: &str) -> Result<()> {
        self.run_git(&["push", remote, refname]).map(|_| ())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        self.run_git(&["push", remote, "--tags"]).map(|_| ())
    }

    fn show(&self, refname: &str) -> Result<()> {
        let output = self.run_git(&["--no-pager", "show", "--no-patch", refname])?;
        println!("{}", output.trim_end());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_lines_filters_convention() {
        let output = "v1.0.0\x1f2024-01-01\x1faaa\nnightly\x1f2024-01-02\x1fbbb\nv1.1.0\x1f2024-02-01\x1fccc\n";
        let tags = parse_tag_lines(output);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], TagInfo::new("v1.0.0", "2024-01-01", "aaa"));
        assert_eq!(tags[1].name, "v1.1.0");
    }

    #[test]
    fn test_parse_tag_lines_tolerates_missing_fields() {
        let tags = parse_tag_lines("v2.0.0\n");
        assert_eq!(tags, vec![TagInfo::new("v2.0.0", "unknown-date", "")]);
    }

    #[test]
    fn test_parse_commit_records_keeps_bodies() {
        let output = "fix(core): a\n\nbody line\n\x1e\nnew: b\n\x1e\n";
        assert_eq!(
            parse_commit_records(output),
            vec!["fix(core): a\n\nbody line".to_string(), "new: b".to_string()]
        );
        assert!(parse_commit_records("").is_empty());
    }

    #[test]
    fn test_porcelain_line_columns() {
        assert_eq!(
            porcelain_line(Status::WT_NEW, "a.txt"),
            Some("?? a.txt".to_string())
        );
        assert_eq!(
            porcelain_line(Status::INDEX_MODIFIED, "b.rs"),
            Some("M  b.rs".to_string())
        );
        assert_eq!(
            porcelain_line(Status::WT_MODIFIED, "c.rs"),
            Some(" M c.rs".to_string())
        );
        assert_eq!(porcelain_line(Status::CURRENT, "d.rs"), None);
        assert_eq!(porcelain_line(Status::IGNORED, "target"), None);
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nowhere");
        assert!(SystemRepository::discover(&missing).is_err());
    }
}
