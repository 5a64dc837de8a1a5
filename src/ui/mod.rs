//! User interface module - terminal output.
//!
//! The commands never print directly; they go through [formatter].

pub mod formatter;

pub use formatter::{
    display_changelog_warning, display_error, display_status, display_step, display_success,
    display_version_report, format_version_change,
};
