use ignore::gitignore::{Gitignore, GitignoreBuilder};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::VersionRule;
use crate::error::{GitReleaseError, Result};

/// Directories never searched for version files.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".cache",
    ".venv",
    "venv",
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    ".tox",
    "tmp",
    "temp",
    "target",
];

/// One version token and the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatch {
    /// Path relative to the project root
    pub path: PathBuf,
    pub version: String,
}

/// The canonical version plus every token that agreed on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub version: String,
    pub matches: Vec<VersionMatch>,
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

fn build_matcher(root: &Path, pattern: &str) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    builder.add_line(None, pattern).map_err(|e| {
        GitReleaseError::version_detection(format!("Invalid file pattern '{}': {}", pattern, e))
    })?;
    builder.build().map_err(|e| {
        GitReleaseError::version_detection(format!("Invalid file pattern '{}': {}", pattern, e))
    })
}

/// Files under `root` matching an ignore-file style pattern, sorted by path.
///
/// Paths are returned relative to `root`. Directories in [EXCLUDED_DIRS] are
/// skipped entirely.
pub fn collect_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = build_matcher(root, pattern)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e));

    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matcher.matched(relative, false).is_ignore() {
            files.push(relative.to_path_buf());
        }
    }

    Ok(files)
}

/// Compile a rule's regex, reporting the rule on failure.
pub fn compile_rule(rule: &VersionRule) -> Result<Regex> {
    Regex::new(&rule.regex).map_err(|e| {
        GitReleaseError::version_detection(format!(
            "Invalid regex '{}' for pattern '{}': {}",
            rule.regex, rule.pattern, e
        ))
    })
}

/// Every version token in `text`: the first non-empty capture group of each
/// match, or the whole match when the regex has no groups.
pub fn extract_versions(text: &str, regex: &Regex) -> Vec<String> {
    regex
        .captures_iter(text)
        .filter_map(|captures| {
            if captures.len() == 1 {
                return captures.get(0).map(|m| m.as_str().to_string());
            }
            captures
                .iter()
                .skip(1)
                .flatten()
                .find(|m| !m.as_str().is_empty())
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Read a file as text, replacing invalid UTF-8 sequences.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Detect the canonical version and report every contributing file.
///
/// Fails when a rule matches no file, when a rule's files yield no version
/// token, or when two tokens disagree.
pub fn detect_version_report(root: &Path, rules: &[VersionRule]) -> Result<VersionReport> {
    let mut matches: Vec<VersionMatch> = Vec::new();

    for rule in rules {
        let files = collect_files(root, &rule.pattern)?;
        if files.is_empty() {
            return Err(GitReleaseError::version_detection(format!(
                "Version rule '{}' did not match any file",
                rule.pattern
            )));
        }
        let regex = compile_rule(rule)?;

        let mut found = 0;
        for relative in files {
            let text = read_text(&root.join(&relative))?;
            for version in extract_versions(&text, &regex) {
                tracing::debug!(path = %relative.display(), version = %version, "Version token");
                if let Some(first) = matches.first() {
                    if first.version != version {
                        return Err(GitReleaseError::version_detection(format!(
                            "Version mismatch between {} ({}) and {} ({})",
                            first.path.display(),
                            first.version,
                            relative.display(),
                            version
                        )));
                    }
                }
                matches.push(VersionMatch {
                    path: relative.clone(),
                    version,
                });
                found += 1;
            }
        }

        if found == 0 {
            return Err(GitReleaseError::version_detection(format!(
                "Version rule '{}' matched files but '{}' found no version string",
                rule.pattern, rule.regex
            )));
        }
    }

    let version = matches
        .first()
        .map(|m| m.version.clone())
        .ok_or_else(|| {
            GitReleaseError::version_detection("No version string matched the configured rule list.")
        })?;

    Ok(VersionReport { version, matches })
}

/// The single version every configured file agrees on.
pub fn detect_canonical_version(root: &Path, rules: &[VersionRule]) -> Result<String> {
    detect_version_report(root, rules).map(|report| report.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_collect_files_is_anchored_and_recursive() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/pkg/__init__.py", "");
        write(dir.path(), "src/pkg/sub/mod.py", "");
        write(dir.path(), "other/src/pkg/x.py", "");
        write(dir.path(), "src/notes.txt", "");

        let files = collect_files(dir.path(), "src/**/*.py").unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/pkg/__init__.py"),
                PathBuf::from("src/pkg/sub/mod.py")
            ]
        );
    }

    #[test]
    fn test_collect_files_skips_infrastructure_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/app.py", "");
        write(dir.path(), "src/__pycache__/app.py", "");
        write(dir.path(), ".venv/src/lib.py", "");
        write(dir.path(), "node_modules/src/x.py", "");

        let files = collect_files(dir.path(), "**/*.py").unwrap();
        assert_eq!(files, vec![PathBuf::from("src/app.py")]);
    }

    #[test]
    fn test_extract_first_non_empty_group() {
        let regex = Regex::new(r#"(?:v(\d+\.\d+\.\d+)|"(\d+\.\d+\.\d+)")"#).unwrap();
        assert_eq!(
            extract_versions(r#"v1.0.0 and "1.0.0""#, &regex),
            vec!["1.0.0", "1.0.0"]
        );
    }

    #[test]
    fn test_extract_whole_match_without_groups() {
        let regex = Regex::new(r"\d+\.\d+\.\d+").unwrap();
        assert_eq!(extract_versions("at 3.4.5 now", &regex), vec!["3.4.5"]);
    }

    #[test]
    fn test_detect_agreeing_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "Current: \"1.2.3\"\n");
        write(dir.path(), "pyproject.toml", "[project]\nversion = \"1.2.3\"\n");
        let rules = vec![
            VersionRule::new("README.md", r#"\s*"(\d+\.\d+\.\d+)"\s*"#),
            VersionRule::new("pyproject.toml", r#"\bversion\s*=\s*"(\d+\.\d+\.\d+)""#),
        ];

        let report = detect_version_report(dir.path(), &rules).unwrap();
        assert_eq!(report.version, "1.2.3");
        assert_eq!(report.matches.len(), 2);
    }

    #[test]
    fn test_rule_without_files_fails() {
        let dir = TempDir::new().unwrap();
        let rules = vec![VersionRule::new("VERSION", r"(\d+\.\d+\.\d+)")];
        let err = detect_canonical_version(dir.path(), &rules).unwrap_err();
        assert!(err.to_string().contains("'VERSION' did not match any file"));
    }

    #[test]
    fn test_rule_without_tokens_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "VERSION", "unknown\n");
        let rules = vec![VersionRule::new("VERSION", r"(\d+\.\d+\.\d+)")];
        assert!(detect_canonical_version(dir.path(), &rules).is_err());
    }

    #[test]
    fn test_invalid_regex_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "VERSION", "1.0.0\n");
        let rules = vec![VersionRule::new("VERSION", r"(\d+")];
        let err = detect_canonical_version(dir.path(), &rules).unwrap_err();
        assert!(err.to_string().starts_with("Invalid regex"));
    }
}
