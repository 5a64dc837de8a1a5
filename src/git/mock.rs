use crate::domain::TagInfo;
use crate::error::{GitReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Mock repository for testing without actual git operations
///
/// Every mutating call is recorded as the `git` argument string it stands
/// for (e.g. `"push origin develop"`), so tests can assert on ordering.
pub struct MockRepository {
    root: PathBuf,
    tags: Vec<TagInfo>,
    merged_tags: Option<Vec<TagInfo>>,
    commits: HashMap<String, Vec<String>>,
    remote_urls: HashMap<String, String>,
    local_branches: HashSet<String>,
    remote_branches: HashSet<String>,
    divergence: HashMap<String, (usize, usize)>,
    current_branch: RefCell<String>,
    status: Vec<String>,
    fail_on: Option<String>,
    calls: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a new empty mock repository rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockRepository {
            root: root.into(),
            tags: Vec::new(),
            merged_tags: None,
            commits: HashMap::new(),
            remote_urls: HashMap::new(),
            local_branches: HashSet::new(),
            remote_branches: HashSet::new(),
            divergence: HashMap::new(),
            current_branch: RefCell::new("HEAD".to_string()),
            status: Vec::new(),
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Append a release tag; tags are listed in insertion order
    pub fn add_tag(&mut self, name: &str, iso_date: &str) {
        self.tags
            .push(TagInfo::new(name, iso_date, format!("oid-{}", name)));
    }

    /// Restrict the tags reported as reachable from a reference
    pub fn set_merged_tags(&mut self, names: &[&str]) {
        let merged = self
            .tags
            .iter()
            .filter(|tag| names.contains(&tag.name.as_str()))
            .cloned()
            .collect();
        self.merged_tags = Some(merged);
    }

    /// Register the commit messages a revision range yields
    pub fn set_commits(&mut self, range: &str, messages: &[&str]) {
        self.commits.insert(
            range.to_string(),
            messages.iter().map(|m| m.to_string()).collect(),
        );
    }

    pub fn set_remote_url(&mut self, remote: &str, url: &str) {
        self.remote_urls.insert(remote.to_string(), url.to_string());
    }

    pub fn add_local_branch(&mut self, branch: &str) {
        self.local_branches.insert(branch.to_string());
    }

    pub fn add_remote_branch(&mut self, remote: &str, branch: &str) {
        self.remote_branches.insert(format!("{}/{}", remote, branch));
    }

    pub fn set_divergence(&mut self, branch: &str, ahead: usize, behind: usize) {
        self.divergence.insert(branch.to_string(), (ahead, behind));
    }

    pub fn set_current_branch(&mut self, branch: &str) {
        *self.current_branch.borrow_mut() = branch.to_string();
    }

    /// Porcelain lines returned by [Repository::status_lines]
    pub fn set_status(&mut self, lines: &[&str]) {
        self.status = lines.iter().map(|l| l.to_string()).collect();
    }

    /// Make every recorded call starting with `prefix` fail
    pub fn fail_on(&mut self, prefix: &str) {
        self.fail_on = Some(prefix.to_string());
    }

    /// Recorded mutating calls, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        tracing::debug!(call = %call, "Mock git call");
        let failed = self
            .fail_on
            .as_deref()
            .is_some_and(|prefix| call.starts_with(prefix));
        self.calls.borrow_mut().push(call.clone());
        if failed {
            return Err(GitReleaseError::command(
                format!("git {}", call),
                Some(1),
                &format!("mock failure for '{}'", call),
            ));
        }
        Ok(())
    }
}

impl Repository for MockRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self, merged: Option<&str>) -> Vec<TagInfo> {
        match (merged, &self.merged_tags) {
            (Some(_), Some(merged_tags)) => merged_tags.clone(),
            _ => self.tags.clone(),
        }
    }

    fn commit_messages(&self, range: &str) -> Vec<String> {
        self.commits.get(range).cloned().unwrap_or_default()
    }

    fn remote_url(&self, remote: &str) -> Option<String> {
        self.remote_urls.get(remote).cloned()
    }

    fn local_branch_exists(&self, branch: &str) -> bool {
        self.local_branches.contains(branch)
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> bool {
        self.remote_branches
            .contains(&format!("{}/{}", remote, branch))
    }

    fn remote_divergence(&self, branch: &str, _remote: &str) -> Result<(usize, usize)> {
        Ok(self.divergence.get(branch).copied().unwrap_or((0, 0)))
    }

    fn refresh_remotes(&self) -> Result<()> {
        self.record("remote -v update".to_string())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.current_branch.borrow().clone())
    }

    fn status_lines(&self) -> Result<Vec<String>> {
        Ok(self.status.clone())
    }

    fn stage_all(&self) -> Result<()> {
        self.record("add --all".to_string())
    }

    fn stage_path(&self, path: &Path) -> Result<()> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.record(format!("add {}", relative.display()))
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(format!("commit -m {}", message))
    }

    fn amend_no_edit(&self) -> Result<()> {
        self.record("commit --amend --no-edit".to_string())
    }

    fn tag_annotated(&self, name: &str, message: &str, force: bool) -> Result<()> {
        let flag = if force { "--force -a" } else { "-a" };
        self.record(format!("tag {} {} -m {}", flag, name, message))
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch))?;
        *self.current_branch.borrow_mut() = branch.to_string();
        Ok(())
    }

    fn merge(&self, branch: &str) -> Result<()> {
        self.record(format!("merge {}", branch))
    }

    fn push(&self, remote: &str, refname: &str) -> Result<()> {
        self.record(format!("push {} {}", remote, refname))
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        self.record(format!("push {} --tags", remote))
    }

    fn show(&self, refname: &str) -> Result<()> {
        self.record(format!("show {}", refname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new("/tmp/project");
        repo.add_tag("v1.0.0", "2024-01-01");
        repo.add_tag("v1.1.0", "2024-02-01");
        repo.set_merged_tags(&["v1.0.0"]);

        assert_eq!(repo.list_tags(None).len(), 2);
        let merged = repo.list_tags(Some("HEAD"));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "v1.0.0");
    }

    #[test]
    fn test_mock_repository_unknown_range_is_empty() {
        let mut repo = MockRepository::new("/tmp/project");
        repo.set_commits("v1.0.0..HEAD", &["fix: a"]);
        assert_eq!(repo.commit_messages("v1.0.0..HEAD"), vec!["fix: a"]);
        assert!(repo.commit_messages("v2.0.0..HEAD").is_empty());
    }

    #[test]
    fn test_mock_repository_records_calls() {
        let repo = MockRepository::new("/tmp/project");
        repo.checkout("develop").unwrap();
        repo.merge("work").unwrap();
        repo.push("origin", "develop").unwrap();

        assert_eq!(
            repo.calls(),
            vec!["checkout develop", "merge work", "push origin develop"]
        );
        assert_eq!(repo.current_branch().unwrap(), "develop");
    }

    #[test]
    fn test_mock_repository_failure_injection() {
        let mut repo = MockRepository::new("/tmp/project");
        repo.fail_on("push");

        let err = repo.push("origin", "develop").unwrap_err();
        assert_eq!(err.to_string(), "mock failure for 'push origin develop'");
        assert_eq!(err.exit_code(), 1);
        assert!(repo.merge("work").is_ok());
    }
}
