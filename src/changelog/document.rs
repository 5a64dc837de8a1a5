use crate::changelog::links::{compare_url, origin_base_url, release_url};
use crate::changelog::section::render_section;
use crate::changelog::warning::ChangelogWarning;
use crate::domain::TagInfo;
use crate::git::Repository;

/// Title used for changes not yet covered by a tag.
pub const UNRELEASED_TITLE: &str = "Unreleased";

/// A rendered changelog together with the warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Changelog {
    pub markdown: String,
    pub warnings: Vec<ChangelogWarning>,
}

/// Today's date in UTC, formatted `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Build the full changelog document dated with today's date.
pub fn build_document(repo: &dyn Repository, remote: &str, include_unreleased: bool) -> Changelog {
    build_document_on(repo, remote, include_unreleased, &today())
}

/// Build the full changelog document.
///
/// Release sections are computed oldest tag first and then reversed, so the
/// newest release leads the document. The History index is built only from
/// tags reachable from `HEAD` and is omitted when the remote has no
/// parseable URL.
///
/// # Arguments
/// * `repo` - Repository to read tags and commits from
/// * `remote` - Remote whose URL provides the link base
/// * `include_unreleased` - Prepend a section for commits after the last tag
/// * `today` - Date stamped on unreleased sections
pub fn build_document_on(
    repo: &dyn Repository,
    remote: &str,
    include_unreleased: bool,
    today: &str,
) -> Changelog {
    let tags = repo.list_tags(None);
    let history_tags = repo.list_tags(Some("HEAD"));
    let base = repo.remote_url(remote).and_then(|url| origin_base_url(&url));

    let mut warnings = Vec::new();
    if base.is_none() {
        warnings.push(ChangelogWarning::OriginUnavailable {
            remote: remote.to_string(),
        });
    }

    let mut lines: Vec<String> = vec!["# Changelog".to_string(), String::new()];

    let mut unreleased_rendered = false;
    if include_unreleased {
        let range = match tags.last() {
            Some(last) => format!("{}..HEAD", last.name),
            None => "HEAD".to_string(),
        };
        if let Some(section) = render_section(repo, UNRELEASED_TITLE, today, &range, None) {
            lines.push(section);
            unreleased_rendered = true;
        }
    }

    let mut release_sections = Vec::new();
    if tags.is_empty() {
        warnings.push(ChangelogWarning::NoReleaseTags);
        if !include_unreleased {
            if let Some(section) = render_section(repo, UNRELEASED_TITLE, today, "HEAD", None) {
                release_sections.push(section);
            }
        }
    } else {
        let mut previous: Option<&str> = None;
        for tag in &tags {
            let range = match previous {
                Some(previous) => format!("{}..{}", previous, tag.name),
                None => tag.name.clone(),
            };
            let version = tag.display_version();
            let title = match &base {
                Some(base) => format!("[{}]({})", version, compare_url(base, previous, &tag.name)),
                None => version.to_string(),
            };

            match render_section(repo, &title, &tag.iso_date, &range, Some(version)) {
                Some(section) => release_sections.push(section),
                None => warnings.push(ChangelogWarning::EmptyRelease {
                    tag: tag.name.clone(),
                }),
            }
            previous = Some(tag.name.as_str());
        }
    }

    lines.extend(release_sections.into_iter().rev());

    if let Some(base) = &base {
        lines.push(String::new());
        lines.push(build_history(base, &history_tags, unreleased_rendered));
    }

    Changelog {
        markdown: format!("{}\n", lines.join("\n").trim_end()),
        warnings,
    }
}

/// Render the trailing `# History` index.
///
/// Lists each release page, then one reference definition per tag linking to
/// its compare view (the first tag links to its release page). The
/// `[unreleased]` link is added only when `unreleased_rendered` is set and a
/// tag exists.
pub fn build_history(base: &str, tags: &[TagInfo], unreleased_rendered: bool) -> String {
    let mut lines = vec!["# History".to_string(), String::new()];

    for tag in tags {
        lines.push(format!(
            "- \\[{}\\]: {}",
            tag.display_version(),
            release_url(base, &tag.name)
        ));
    }
    if !tags.is_empty() {
        lines.push(String::new());
    }

    let mut previous: Option<&str> = None;
    for tag in tags {
        lines.push(format!(
            "[{}]: {}",
            tag.display_version(),
            compare_url(base, previous, &tag.name)
        ));
        previous = Some(tag.name.as_str());
    }

    if unreleased_rendered {
        if let Some(last) = tags.last() {
            lines.push(format!(
                "[unreleased]: {}",
                compare_url(base, Some(last.name.as_str()), "HEAD")
            ));
        }
    }

    format!("{}\n", lines.join("\n").trim_end())
}
