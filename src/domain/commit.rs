use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Changelog section a conventional commit is filed under.
///
/// Declaration order is the rendering order inside a release block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Features,
    Implementations,
    BugFixes,
    Changes,
    Refactor,
    Documentation,
    Styling,
    Cover,
    MiscellaneousTasks,
    Revert,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Features,
        Section::Implementations,
        Section::BugFixes,
        Section::Changes,
        Section::Refactor,
        Section::Documentation,
        Section::Styling,
        Section::Cover,
        Section::MiscellaneousTasks,
        Section::Revert,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Features => "Features",
            Section::Implementations => "Implementations",
            Section::BugFixes => "Bug Fixes",
            Section::Changes => "Changes",
            Section::Refactor => "Refactor",
            Section::Documentation => "Documentation",
            Section::Styling => "Styling",
            Section::Cover => "Cover",
            Section::MiscellaneousTasks => "Miscellaneous Tasks",
            Section::Revert => "Revert",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Section::Features => "⛰️",
            Section::Implementations => "🏗️",
            Section::BugFixes => "🐛",
            Section::Changes => "🚜",
            Section::Refactor => "🔨",
            Section::Documentation => "📚",
            Section::Styling => "🎨",
            Section::Cover => "🎯",
            Section::MiscellaneousTasks => "⚙️",
            Section::Revert => "◀️",
        }
    }

    /// Markdown header line, e.g. `### 🐛  Bug Fixes`.
    pub fn header(&self) -> String {
        format!("### {}  {}", self.glyph(), self.title())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Leading type token of a conventional commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CommitType {
    New,
    Implement,
    Fix,
    Change,
    Refactor,
    Docs,
    Style,
    Cover,
    Misc,
    Revert,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::New => "new",
            CommitType::Implement => "implement",
            CommitType::Fix => "fix",
            CommitType::Change => "change",
            CommitType::Refactor => "refactor",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Cover => "cover",
            CommitType::Misc => "misc",
            CommitType::Revert => "revert",
        }
    }

    /// Case-insensitive lookup of a type token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "new" => Some(CommitType::New),
            "implement" => Some(CommitType::Implement),
            "fix" => Some(CommitType::Fix),
            "change" => Some(CommitType::Change),
            "refactor" => Some(CommitType::Refactor),
            "docs" => Some(CommitType::Docs),
            "style" => Some(CommitType::Style),
            "cover" => Some(CommitType::Cover),
            "misc" => Some(CommitType::Misc),
            "revert" => Some(CommitType::Revert),
            _ => None,
        }
    }

    pub fn section(&self) -> Section {
        match self {
            CommitType::New => Section::Features,
            CommitType::Implement => Section::Implementations,
            CommitType::Fix => Section::BugFixes,
            CommitType::Change => Section::Changes,
            CommitType::Refactor => Section::Refactor,
            CommitType::Docs => Section::Documentation,
            CommitType::Style => Section::Styling,
            CommitType::Cover => Section::Cover,
            CommitType::Misc => Section::MiscellaneousTasks,
            CommitType::Revert => Section::Revert,
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn conventional_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?P<type>new|implement|fix|change|refactor|docs|style|cover|misc|revert)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?:\s+(?P<desc>.+)$",
        )
        .expect("static regex")
    })
}

fn release_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:(?:[a-z]+(?:\([^)]*\))?!?:\s*)?release version:\s+(?P<legacy>\d+\.\d+\.\d+)|release:\s+release version\s+(?P<current>\d+\.\d+\.\d+))",
        )
        .expect("static regex")
    })
}

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

impl ParsedCommit {
    /// Parse a full commit message (subject plus body).
    ///
    /// The message is flattened first, so a description may span several
    /// lines. Returns `None` when the leading type token is not recognised.
    pub fn parse(message: &str) -> Option<Self> {
        let flattened = normalize_message(message);
        let captures = conventional_regex().captures(&flattened)?;

        let commit_type = CommitType::from_token(&captures["type"])?;
        let scope = captures
            .name("scope")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        let description = captures["desc"].trim().to_string();

        Some(ParsedCommit {
            commit_type,
            scope,
            description,
            is_breaking_change: captures.name("breaking").is_some(),
        })
    }

    pub fn section(&self) -> Section {
        self.commit_type.section()
    }

    /// Changelog list item: `- [BREAKING CHANGE: ]desc[ *(scope)*]`.
    pub fn render_line(&self) -> String {
        let mut line = String::from("- ");
        if self.is_breaking_change {
            line.push_str("BREAKING CHANGE: ");
        }
        line.push_str(&self.description);
        if let Some(scope) = &self.scope {
            line.push_str(&format!(" *({})*", scope));
        }
        line
    }
}

/// A commit mapped onto a changelog section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub section: Option<Section>,
    pub rendered_line: String,
}

impl ClassifiedCommit {
    fn excluded() -> Self {
        ClassifiedCommit {
            section: None,
            rendered_line: String::new(),
        }
    }
}

/// Collapse a multi-line message into one line.
///
/// Carriage returns are stripped, blank lines dropped and the remaining
/// lines joined with single spaces.
pub fn normalize_message(message: &str) -> String {
    message
        .replace('\r', "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Version embedded by a release commit, if any.
///
/// Only a subject that starts with the marker counts: `release version: X.Y.Z`
/// (optionally behind a conventional `type(scope):` prefix) or
/// `release: Release version X.Y.Z`. Prose mentioning a release version does not.
pub fn extract_release_version(message: &str) -> Option<String> {
    let captures = release_marker_regex().captures(message.trim_start())?;
    captures
        .name("legacy")
        .or_else(|| captures.name("current"))
        .map(|m| m.as_str().to_string())
}

/// Map one raw commit message to its changelog section and line.
///
/// Non-conventional messages and release commits yield no section and an
/// empty line.
pub fn classify(message: &str) -> ClassifiedCommit {
    if extract_release_version(message).is_some() {
        return ClassifiedCommit::excluded();
    }

    match ParsedCommit::parse(message) {
        Some(parsed) => ClassifiedCommit {
            section: Some(parsed.section()),
            rendered_line: parsed.render_line(),
        },
        None => ClassifiedCommit::excluded(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_with_scope() {
        let c = classify("fix(core): repair bug");
        assert_eq!(c.section, Some(Section::BugFixes));
        assert_eq!(c.rendered_line, "- repair bug *(core)*");
    }

    #[test]
    fn test_classify_breaking_multiline() {
        let c = classify("change(core)!: first line\nsecond line");
        assert_eq!(c.section, Some(Section::Changes));
        assert_eq!(
            c.rendered_line,
            "- BREAKING CHANGE: first line second line *(core)*"
        );
    }

    #[test]
    fn test_classify_without_scope() {
        let c = classify("docs: explain setup");
        assert_eq!(c.section, Some(Section::Documentation));
        assert_eq!(c.rendered_line, "- explain setup");
    }

    #[test]
    fn test_classify_breaking_without_scope() {
        let c = classify("new!: drop legacy flags");
        assert_eq!(c.section, Some(Section::Features));
        assert_eq!(c.rendered_line, "- BREAKING CHANGE: drop legacy flags");
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let c = classify("FIX(Api): handle timeouts");
        assert_eq!(c.section, Some(Section::BugFixes));
        assert_eq!(c.rendered_line, "- handle timeouts *(Api)*");
    }

    #[test]
    fn test_classify_extended_types() {
        assert_eq!(
            classify("implement(core): Add implementation command").rendered_line,
            "- Add implementation command *(core)*"
        );
        assert_eq!(
            classify("implement(core): x").section,
            Some(Section::Implementations)
        );
        assert_eq!(classify("refactor: x").section, Some(Section::Refactor));
        assert_eq!(classify("cover: x").section, Some(Section::Cover));
        assert_eq!(
            classify("misc: x").section,
            Some(Section::MiscellaneousTasks)
        );
        assert_eq!(classify("revert: x").section, Some(Section::Revert));
        assert_eq!(classify("style: x").section, Some(Section::Styling));
    }

    #[test]
    fn test_classify_non_conventional() {
        for message in [
            "Random commit message",
            "feat: unknown type",
            "chore(deps): bump",
            "fix:missing space",
            "newfeature: glued token",
            "",
        ] {
            let c = classify(message);
            assert_eq!(c.section, None, "{message:?} should be excluded");
            assert_eq!(c.rendered_line, "");
        }
    }

    #[test]
    fn test_classify_excludes_release_commits() {
        assert_eq!(classify("release version: 1.2.3").section, None);
        assert_eq!(classify("new(core): release version: 1.2.3").section, None);
        assert_eq!(classify("release: Release version 1.2.3").section, None);
    }

    #[test]
    fn test_normalize_drops_blank_lines_and_crlf() {
        assert_eq!(
            normalize_message("fix: a\r\n\r\n  b  \n\nc\n"),
            "fix: a b c"
        );
    }

    #[test]
    fn test_extract_release_version_phrasings() {
        assert_eq!(
            extract_release_version("release version: 1.2.3"),
            Some("1.2.3".to_string())
        );
        assert_eq!(
            extract_release_version("release: Release version 1.2.3"),
            Some("1.2.3".to_string())
        );
        assert_eq!(extract_release_version("fix: version 1.2.3"), None);
        assert_eq!(
            extract_release_version("new(core): release version: 1.2.3"),
            Some("1.2.3".to_string())
        );
    }

    #[test]
    fn test_release_version_in_prose_is_not_a_marker() {
        assert_eq!(
            extract_release_version("docs: explain release version 2.0.0 migration steps"),
            None
        );
        assert_eq!(
            extract_release_version("fix: bump the release version: 2.0.0 check"),
            None
        );

        let c = classify("docs: explain release version 2.0.0 migration steps");
        assert_eq!(c.section, Some(Section::Documentation));
        assert_eq!(
            c.rendered_line,
            "- explain release version 2.0.0 migration steps"
        );
    }

    #[test]
    fn test_section_order_matches_declaration() {
        let mut sorted = Section::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Section::ALL.to_vec());
        assert_eq!(Section::ALL[0], Section::Features);
        assert_eq!(Section::ALL[9], Section::Revert);
    }

    #[test]
    fn test_section_header() {
        assert_eq!(Section::BugFixes.header(), "### 🐛  Bug Fixes");
    }
}
