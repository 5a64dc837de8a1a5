//! Command-line surface
//!
//! Parsing lives here; the work of each command is in [commands]. Commands
//! are a closed enum dispatched by one exhaustive match.

pub mod commands;
pub mod commit;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::CommitType;

#[derive(Parser, Debug)]
#[command(
    name = "git-release",
    version,
    about = "Generate changelogs, manage project versions and run releases"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate CHANGELOG.md from tags and conventional commits
    Changelog(ChangelogArgs),

    /// Print the canonical project version
    Ver {
        /// List every file that contributed a version token
        #[arg(long)]
        verbose: bool,

        /// Also log every git call and token match
        #[arg(long)]
        debug: bool,
    },

    /// Rewrite every configured version location to VERSION
    Chver {
        /// Target version (MAJOR.MINOR.PATCH)
        #[arg(value_name = "VERSION")]
        target: String,
    },

    /// Release a new major version
    Major(ReleaseArgs),

    /// Release a new minor version
    Minor(ReleaseArgs),

    /// Release a new patch version (integration branch only)
    Patch(ReleaseArgs),

    /// Create a conventional commit from the staged changes
    Commit {
        #[arg(value_enum)]
        commit_type: CommitType,

        /// Message words, optionally starting with `module:`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// Write the default gitrelease.toml into the repository root
    WriteConfig {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ChangelogArgs {
    /// Add a section for commits after the last tag
    #[arg(long)]
    pub include_unreleased: bool,

    /// Overwrite an existing changelog file
    #[arg(long)]
    pub force_write: bool,

    /// Print the changelog instead of writing it
    #[arg(long)]
    pub print_only: bool,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ReleaseArgs {
    /// Add a section for commits after the last tag to the regenerated changelog
    #[arg(long)]
    pub include_unreleased: bool,
}

impl Cli {
    /// Default tracing filter for this invocation; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.command {
            Commands::Ver { debug: true, .. } => "debug",
            Commands::Ver { verbose: true, .. } => "info",
            _ => "warn",
        }
    }
}
