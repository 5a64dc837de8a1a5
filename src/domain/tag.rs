use crate::domain::Version;

/// A release tag as reported by `git for-each-ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub iso_date: String,
    pub object_id: String,
}

impl TagInfo {
    /// Create a tag snapshot
    pub fn new(
        name: impl Into<String>,
        iso_date: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Self {
        TagInfo {
            name: name.into(),
            iso_date: iso_date.into(),
            object_id: object_id.into(),
        }
    }

    /// Version part of the tag name (e.g., "v1.2.3" -> "1.2.3")
    pub fn display_version(&self) -> &str {
        self.name.strip_prefix('v').unwrap_or(&self.name)
    }
}

/// Whether a tag name follows the `vMAJOR.MINOR.PATCH` convention.
pub fn is_release_tag(name: &str) -> bool {
    Version::from_tag(name).is_some()
}
