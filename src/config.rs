use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ReleaseBranches;
use crate::error::{GitReleaseError, Result};

/// File name looked up in the repository root.
pub const CONFIG_FILENAME: &str = "gitrelease.toml";

/// Represents the complete configuration for git-release.
///
/// Built once at startup and passed by reference to every component that needs it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_module")]
    pub default_module: String,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default = "default_version_rules")]
    pub version_rules: Vec<VersionRule>,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_module() -> String {
    "core".to_string()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

/// Names of the three branches the release workflow promotes through.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_master")]
    pub master: String,

    #[serde(default = "default_develop")]
    pub develop: String,

    #[serde(default = "default_work")]
    pub work: String,
}

fn default_master() -> String {
    "master".to_string()
}

fn default_develop() -> String {
    "develop".to_string()
}

fn default_work() -> String {
    "work".to_string()
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            master: default_master(),
            develop: default_develop(),
            work: default_work(),
        }
    }
}

/// A glob pattern paired with a regex whose first capture group is the version.
///
/// When the regex has no capture group, the whole match is the version token.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct VersionRule {
    pub pattern: String,
    pub regex: String,
}

impl VersionRule {
    pub fn new(pattern: impl Into<String>, regex: impl Into<String>) -> Self {
        VersionRule {
            pattern: pattern.into(),
            regex: regex.into(),
        }
    }
}

/// Returns the built-in README / module / manifest rules.
pub fn default_version_rules() -> Vec<VersionRule> {
    vec![
        VersionRule::new("README.md", r#"\s*"(\d+\.\d+\.\d+)"\s*"#),
        VersionRule::new(
            "src/**/*.py",
            r#"__version__\s*=\s*["']?(\d+\.\d+\.\d+)["']?"#,
        ),
        VersionRule::new("pyproject.toml", r#"\bversion\s*=\s*"(\d+\.\d+\.\d+)""#),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            default_module: default_module(),
            changelog_file: default_changelog_file(),
            branches: BranchesConfig::default(),
            version_rules: default_version_rules(),
        }
    }
}

impl Config {
    /// Branch names as a domain value
    pub fn release_branches(&self) -> ReleaseBranches {
        ReleaseBranches::new(
            &self.branches.master,
            &self.branches.develop,
            &self.branches.work,
        )
    }

    /// Configured rules, or the built-in ones when the list is empty.
    pub fn effective_version_rules(&self) -> Vec<VersionRule> {
        let rules: Vec<VersionRule> = self
            .version_rules
            .iter()
            .map(|r| VersionRule::new(r.pattern.trim(), r.regex.trim()))
            .filter(|r| !r.pattern.is_empty() && !r.regex.is_empty())
            .collect();

        if rules.is_empty() {
            default_version_rules()
        } else {
            rules
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GitReleaseError::config(e.to_string()))
    }

    /// Serialize configuration as TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GitReleaseError::config(e.to_string()))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in the repository root
/// 3. `~/.config/.gitrelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repo_root: &Path) -> Result<Config> {
    let candidate = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if repo_root.join(CONFIG_FILENAME).exists() {
        Some(repo_root.join(CONFIG_FILENAME))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(format!(".{}", CONFIG_FILENAME)))
            .filter(|path| path.exists())
    };

    let Some(path) = candidate else {
        tracing::debug!("No configuration file found, using defaults");
        return Ok(Config::default());
    };

    tracing::debug!(path = %path.display(), "Loading configuration");
    let text = fs::read_to_string(&path).map_err(|e| {
        GitReleaseError::config(format!("Unable to read {}: {}", path.display(), e))
    })?;
    toml::from_str(&text)
        .map_err(|e| GitReleaseError::config(format!("{}: {}", path.display(), e)))
}

/// Writes the default configuration into the repository root.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(repo_root: &Path, force: bool) -> Result<PathBuf> {
    let path = repo_root.join(CONFIG_FILENAME);
    if path.exists() && !force {
        return Err(GitReleaseError::config(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }
    fs::write(&path, Config::default().to_toml()?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_branches() {
        let config = Config::default();
        let branches = config.release_branches();
        assert_eq!(branches.master, "master");
        assert_eq!(branches.develop, "develop");
        assert_eq!(branches.work, "work");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.default_module, "core");
    }

    #[test]
    fn test_default_rules_have_capture_groups() {
        for rule in default_version_rules() {
            let re = regex::Regex::new(&rule.regex).unwrap();
            assert!(re.captures_len() > 1, "{} lacks a group", rule.regex);
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
default_module = "ui"

[branches]
master = "main"
"#,
        )
        .unwrap();
        assert_eq!(config.default_module, "ui");
        assert_eq!(config.branches.master, "main");
        assert_eq!(config.branches.develop, "develop");
        assert_eq!(config.version_rules, default_version_rules());
    }

    #[test]
    fn test_empty_rule_list_falls_back() {
        let config = Config::from_toml("version_rules = []").unwrap();
        assert_eq!(config.effective_version_rules(), default_version_rules());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("branches = 3").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_round_trip_defaults() {
        let text = Config::default().to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }
}
