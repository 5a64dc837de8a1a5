//! Pure formatting functions for UI output.
//!
//! Every line printed by the commands goes through here. Functions come in
//! pairs: `format_*` builds the text, `display_*` prints it.

use console::style;

use crate::changelog::ChangelogWarning;
use crate::versions::{VersionChange, VersionReport};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Report a completed release step.
pub fn display_step(line: &str) {
    println!("{}", line);
}

/// Display a changelog warning to the user.
pub fn display_changelog_warning(warning: &ChangelogWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Lines describing which files contributed to the canonical version.
pub fn format_version_report(report: &VersionReport) -> Vec<String> {
    report
        .matches
        .iter()
        .map(|m| format!("{}: {}", m.path.display(), m.version))
        .collect()
}

/// Print the verbose `ver` report followed by the version itself.
pub fn display_version_report(report: &VersionReport) {
    println!("{}", style("Version sources:").bold());
    for line in format_version_report(report) {
        println!("  {}", line);
    }
}

/// Summary line for a version change request.
pub fn format_version_change(change: &VersionChange) -> String {
    match change {
        VersionChange::AlreadyCurrent(version) => {
            format!("The project version is already {}", version)
        }
        VersionChange::Applied { current, .. } if change.is_upgrade() => {
            format!("Upgrade completed: version is now {}", current)
        }
        VersionChange::Applied { current, .. } => {
            format!("Downgrade completed: version is now {}", current)
        }
    }
}
