//! Cross-file version detection and rewriting

pub mod locator;
pub mod mutator;

pub use locator::{
    collect_files, detect_canonical_version, detect_version_report, VersionMatch, VersionReport,
};
pub use mutator::{apply_version, replace_versions_in_text, VersionChange};
