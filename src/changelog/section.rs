use std::collections::BTreeMap;

use crate::domain::commit::{classify, extract_release_version};
use crate::domain::Section;
use crate::git::Repository;

/// Render one `## title - date` block for a revision range.
///
/// Commits are bucketed by section and emitted in [Section] order. When
/// `expected_version` is set, commits whose release marker names another
/// version are dropped. Returns `None` when no commit classifies into any
/// section.
pub fn render_section(
    repo: &dyn Repository,
    title: &str,
    date: &str,
    range: &str,
    expected_version: Option<&str>,
) -> Option<String> {
    let messages = repo.commit_messages(range);
    tracing::debug!(range = %range, commits = messages.len(), "Rendering changelog section");
    render_messages(&messages, title, date, expected_version)
}

/// Same as [render_section] over already collected commit messages.
pub fn render_messages(
    messages: &[String],
    title: &str,
    date: &str,
    expected_version: Option<&str>,
) -> Option<String> {
    let mut buckets: BTreeMap<Section, Vec<String>> = BTreeMap::new();

    for message in messages {
        if let (Some(expected), Some(marker)) = (expected_version, extract_release_version(message))
        {
            if marker != expected {
                continue;
            }
        }

        let classified = classify(message);
        if let Some(section) = classified.section {
            if !classified.rendered_line.is_empty() {
                buckets
                    .entry(section)
                    .or_default()
                    .push(classified.rendered_line);
            }
        }
    }

    if buckets.is_empty() {
        return None;
    }

    let mut lines = vec![format!("## {} - {}", title, date)];
    for (section, entries) in &buckets {
        lines.push(section.header());
        lines.extend(entries.iter().cloned());
        lines.push(String::new());
    }

    Some(format!("{}\n", lines.join("\n").trim_end()))
}
