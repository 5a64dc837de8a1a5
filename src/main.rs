use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_release::cli::{commands, Cli};
use git_release::config::load_config;
use git_release::git::{Repository, SystemRepository};
use git_release::ui;

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    let cwd = std::env::current_dir().context("Unable to determine the current directory")?;
    let repo = SystemRepository::discover(&cwd)
        .with_context(|| format!("{} is not inside a git repository", cwd.display()))?;
    let config = load_config(cli.config.as_deref(), repo.root())
        .context("Unable to load the git-release configuration")?;

    if let Err(e) = commands::run(&repo, &config, cli.command) {
        ui::display_error(&e.to_string());
        std::process::exit(e.exit_code());
    }

    Ok(())
}
