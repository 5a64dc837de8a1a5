use git_release::config::{Config, VersionRule};
use git_release::domain::ReleaseLevel;
use git_release::git::MockRepository;
use git_release::release::execute_release;
use git_release::GitReleaseError;
use std::fs;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new(version: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("VERSION"), format!("{}\n", version)).unwrap();
        let mut config = Config::default();
        config.version_rules = vec![VersionRule::new("VERSION", r"(\d+\.\d+\.\d+)")];
        Fixture { dir, config }
    }

    /// A repository that passes every release precondition
    fn ready_repo(&self) -> MockRepository {
        let mut repo = MockRepository::new(self.dir.path());
        for branch in ["master", "develop", "work"] {
            repo.add_local_branch(branch);
        }
        repo.add_remote_branch("origin", "master");
        repo.add_remote_branch("origin", "develop");
        repo.set_current_branch("work");
        repo.set_remote_url("origin", "https://example.com/repo.git");
        repo.add_tag("v1.2.3", "2024-01-01");
        repo.set_commits("v1.2.3", &["new: first release"]);
        repo.set_commits("v1.2.3..HEAD", &["fix: pending fix"]);
        repo
    }

    fn version_file(&self) -> String {
        fs::read_to_string(self.dir.path().join("VERSION")).unwrap()
    }
}

fn release(
    repo: &MockRepository,
    config: &Config,
    level: ReleaseLevel,
) -> (Result<String, GitReleaseError>, Vec<String>) {
    let mut reported = Vec::new();
    let result = execute_release(repo, config, level, false, &mut |line: &str| {
        reported.push(line.to_string())
    })
    .map(|v| v.to_string());
    (result, reported)
}

// ============================================================================
// Successful releases
// ============================================================================

#[test]
fn test_minor_release_runs_full_workflow() {
    let fixture = Fixture::new("1.2.3");
    let repo = fixture.ready_repo();

    let (result, reported) = release(&repo, &fixture.config, ReleaseLevel::Minor);
    assert_eq!(result.unwrap(), "1.3.0");
    assert_eq!(fixture.version_file(), "1.3.0\n");

    assert_eq!(
        repo.calls(),
        vec![
            "remote -v update",
            "add --all",
            "commit -m release version: 1.3.0",
            "tag -a v1.3.0 -m release version: 1.3.0",
            "add CHANGELOG.md",
            "commit --amend --no-edit",
            "tag --force -a v1.3.0 -m release version: 1.3.0",
            "checkout develop",
            "merge work",
            "push origin develop",
            "checkout master",
            "merge develop",
            "push origin master",
            "checkout work",
            "show v1.3.0",
            "push origin --tags",
        ]
    );

    assert_eq!(reported.len(), 18);
    assert_eq!(
        reported[0],
        "[release:minor] Step 'compute release version' completed successfully"
    );
    assert_eq!(
        reported.last().unwrap(),
        "[release:minor] Step 'push tags' completed successfully"
    );

    let changelog = fs::read_to_string(fixture.dir.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.starts_with("# Changelog\n"));
    assert!(changelog.contains("- first release"));
}

#[test]
fn test_changelog_warnings_are_reported_during_release() {
    let fixture = Fixture::new("1.2.3");
    let mut repo = fixture.ready_repo();
    repo.set_remote_url("origin", "/srv/git/repo.git");

    let (result, reported) = release(&repo, &fixture.config, ReleaseLevel::Patch);
    assert_eq!(result.unwrap(), "1.2.4");

    let warning_at = reported
        .iter()
        .position(|line| {
            line == "WARNING: Remote 'origin' has no parseable URL; the History links are omitted"
        })
        .expect("origin warning reported");
    assert_eq!(
        reported[warning_at + 1],
        "[release:patch] Step 'regenerate changelog' completed successfully"
    );

    let changelog = fs::read_to_string(fixture.dir.path().join("CHANGELOG.md")).unwrap();
    assert!(!changelog.contains("# History"));
}

#[test]
fn test_patch_release_stays_off_master() {
    let fixture = Fixture::new("1.2.3");
    let repo = fixture.ready_repo();

    let (result, _) = release(&repo, &fixture.config, ReleaseLevel::Patch);
    assert_eq!(result.unwrap(), "1.2.4");

    let calls = repo.calls();
    assert!(!calls.iter().any(|c| c.contains("master")));
    assert_eq!(calls.last().unwrap(), "push origin --tags");
    assert!(calls.contains(&"push origin develop".to_string()));
}

#[test]
fn test_major_release_resets_minor_and_patch() {
    let fixture = Fixture::new("1.2.3");
    let repo = fixture.ready_repo();

    let (result, _) = release(&repo, &fixture.config, ReleaseLevel::Major);
    assert_eq!(result.unwrap(), "2.0.0");
    assert!(repo
        .calls()
        .contains(&"tag -a v2.0.0 -m release version: 2.0.0".to_string()));
}

// ============================================================================
// Aborted releases
// ============================================================================

#[test]
fn test_dirty_tree_aborts_before_any_change() {
    let fixture = Fixture::new("1.2.3");
    let mut repo = fixture.ready_repo();
    repo.set_status(&["?? scratch.txt"]);

    let (result, reported) = release(&repo, &fixture.config, ReleaseLevel::Minor);
    let err = result.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("[release:minor] Step 'check prerequisites' failed: Working tree changes"));
    assert_eq!(repo.calls(), vec!["remote -v update"]);
    assert!(reported.is_empty());
    assert_eq!(fixture.version_file(), "1.2.3\n");
}

#[test]
fn test_wrong_branch_aborts() {
    let fixture = Fixture::new("1.2.3");
    let mut repo = fixture.ready_repo();
    repo.set_current_branch("develop");

    let (result, _) = release(&repo, &fixture.config, ReleaseLevel::Patch);
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("must be executed from the work branch (current: develop)"));
}

#[test]
fn test_unreadable_version_fails_compute_step() {
    let fixture = Fixture::new("1.2.3");
    fs::write(fixture.dir.path().join("VERSION"), "unversioned\n").unwrap();
    let repo = fixture.ready_repo();

    let (result, _) = release(&repo, &fixture.config, ReleaseLevel::Minor);
    let err = result.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("[release:minor] Step 'compute release version' failed:"));
    assert_eq!(repo.calls(), vec!["remote -v update"]);
}

#[test]
fn test_failed_push_stops_the_release() {
    let fixture = Fixture::new("1.2.3");
    let mut repo = fixture.ready_repo();
    repo.fail_on("push origin develop");

    let (result, reported) = release(&repo, &fixture.config, ReleaseLevel::Minor);
    let err = result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "[release:minor] Step 'push develop' failed: mock failure for 'push origin develop'"
    );
    assert!(matches!(err, GitReleaseError::Release { .. }));

    let calls = repo.calls();
    assert_eq!(calls.last().unwrap(), "push origin develop");
    assert!(!calls.contains(&"push origin --tags".to_string()));
    assert!(!calls.contains(&"checkout master".to_string()));
    assert!(!reported.iter().any(|line| line.contains("'push develop'")));

    // Completed steps are left in place
    assert_eq!(fixture.version_file(), "1.3.0\n");
    assert!(calls.contains(&"tag -a v1.3.0 -m release version: 1.3.0".to_string()));
}
