//! Command handlers
//!
//! Each handler receives the repository and the configuration built once at
//! startup and reports through [crate::ui].

use crate::changelog::{write_changelog, ChangelogOptions, ChangelogOutput};
use crate::cli::commit::run_commit;
use crate::cli::{ChangelogArgs, Commands, ReleaseArgs};
use crate::config::{write_default_config, Config};
use crate::domain::{CommitType, ReleaseLevel};
use crate::error::Result;
use crate::git::Repository;
use crate::release::execute_release;
use crate::ui;
use crate::versions::{apply_version, detect_version_report};

/// Execute one command against an opened repository.
pub fn run(repo: &dyn Repository, config: &Config, command: Commands) -> Result<()> {
    tracing::debug!(root = %repo.root().display(), "Running command");

    match command {
        Commands::Changelog(args) => changelog(repo, config, args),
        Commands::Ver { verbose, debug } => ver(repo, config, verbose || debug),
        Commands::Chver { target } => chver(repo, config, &target),
        Commands::Major(args) => release(repo, config, ReleaseLevel::Major, args),
        Commands::Minor(args) => release(repo, config, ReleaseLevel::Minor, args),
        Commands::Patch(args) => release(repo, config, ReleaseLevel::Patch, args),
        Commands::Commit {
            commit_type,
            message,
        } => commit(repo, config, commit_type, &message),
        Commands::WriteConfig { force } => write_config(repo, force),
    }
}

pub fn changelog(repo: &dyn Repository, config: &Config, args: ChangelogArgs) -> Result<()> {
    let options = ChangelogOptions {
        include_unreleased: args.include_unreleased,
        force_write: args.force_write,
        print_only: args.print_only,
    };
    let (output, warnings) = write_changelog(repo, config, options)?;

    for warning in &warnings {
        ui::display_changelog_warning(warning);
    }
    match output {
        ChangelogOutput::Printed(markdown) => print!("{}", markdown),
        ChangelogOutput::Written(path) => {
            ui::display_success(&format!("Changelog written to {}", path.display()))
        }
    }
    Ok(())
}

pub fn ver(repo: &dyn Repository, config: &Config, verbose: bool) -> Result<()> {
    let report = detect_version_report(repo.root(), &config.effective_version_rules())?;
    if verbose {
        ui::display_version_report(&report);
    }
    println!("{}", report.version);
    Ok(())
}

pub fn chver(repo: &dyn Repository, config: &Config, version: &str) -> Result<()> {
    let change = apply_version(repo.root(), &config.effective_version_rules(), version)?;
    ui::display_success(&ui::format_version_change(&change));
    Ok(())
}

pub fn release(
    repo: &dyn Repository,
    config: &Config,
    level: ReleaseLevel,
    args: ReleaseArgs,
) -> Result<()> {
    ui::display_status(&format!("Starting {} release", level));
    let version = execute_release(
        repo,
        config,
        level,
        args.include_unreleased,
        &mut |line: &str| ui::display_step(line),
    )?;
    ui::display_success(&format!("Release {} completed successfully.", version));
    Ok(())
}

pub fn commit(
    repo: &dyn Repository,
    config: &Config,
    commit_type: CommitType,
    words: &[String],
) -> Result<()> {
    let message = run_commit(repo, config, commit_type, words)?;
    ui::display_success(&format!("Committed: {}", message));
    Ok(())
}

pub fn write_config(repo: &dyn Repository, force: bool) -> Result<()> {
    let path = write_default_config(repo.root(), force)?;
    ui::display_success(&format!("Configuration written to {}", path.display()));
    Ok(())
}
