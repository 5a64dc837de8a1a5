// tests/config_test.rs
use git_release::config::{default_version_rules, load_config, write_default_config, Config};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.branches.master, "master");
    assert_eq!(config.branches.develop, "develop");
    assert_eq!(config.branches.work, "work");
    assert_eq!(config.changelog_file, "CHANGELOG.md");
    assert_eq!(config.version_rules.len(), 3);
}

#[test]
fn test_load_from_explicit_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
remote = "upstream"
default_module = "engine"

[branches]
master = "main"
develop = "next"
work = "dev"

[[version_rules]]
pattern = "Cargo.toml"
regex = '^version\s*=\s*"(\d+\.\d+\.\d+)"'
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let repo_root = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), repo_root.path()).unwrap();

    assert_eq!(config.remote, "upstream");
    assert_eq!(config.default_module, "engine");
    let branches = config.release_branches();
    assert_eq!(branches.master, "main");
    assert_eq!(branches.develop, "next");
    assert_eq!(branches.work, "dev");
    assert_eq!(config.version_rules.len(), 1);
    assert_eq!(config.version_rules[0].pattern, "Cargo.toml");
}

#[test]
fn test_repository_file_is_picked_up() {
    let repo_root = TempDir::new().unwrap();
    fs::write(
        repo_root.path().join("gitrelease.toml"),
        "changelog_file = \"HISTORY.md\"\n",
    )
    .unwrap();

    let config = load_config(None, repo_root.path()).unwrap();
    assert_eq!(config.changelog_file, "HISTORY.md");
    assert_eq!(config.version_rules, default_version_rules());
}

#[test]
fn test_malformed_file_is_reported() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[branches\nmaster = ").unwrap();
    temp_file.flush().unwrap();

    let repo_root = TempDir::new().unwrap();
    let err = load_config(Some(temp_file.path()), repo_root.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_missing_explicit_file_is_reported() {
    let repo_root = TempDir::new().unwrap();
    let missing = repo_root.path().join("absent.toml");
    assert!(load_config(Some(&missing), repo_root.path()).is_err());
}

#[test]
fn test_written_defaults_load_back() {
    let repo_root = TempDir::new().unwrap();
    let path = write_default_config(repo_root.path(), false).unwrap();
    assert!(path.ends_with("gitrelease.toml"));

    let config = load_config(None, repo_root.path()).unwrap();
    assert_eq!(config, Config::default());
}
