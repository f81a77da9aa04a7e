mod config;
mod copier;
mod copy_task;
mod error;
mod progress;

use crate::config::Config;
use crate::copier::{AssetCopier, CopyPolicy};
use crate::error::CopyError;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SUCCESS_MESSAGE: &str = "Successfully copied files.";

/// Copy the app logo and splash image into the app's asset folder.
#[derive(Parser, Debug)]
#[command(name = "asset-copier", version)]
struct Cli {
    /// Read settings from this file instead of the per-user config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image used for icon.png and adaptive-icon.png
    #[arg(long, value_name = "FILE")]
    logo: Option<PathBuf>,

    /// Image used for splash-icon.png
    #[arg(long, value_name = "FILE")]
    splash: Option<PathBuf>,

    /// Existing asset directory to copy into
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Stage all files first and only replace destinations if every copy succeeds
    #[arg(long)]
    atomic: bool,

    /// Fail early if the destination disk cannot hold the sources
    #[arg(long)]
    check_space: bool,

    /// Remember the resulting settings in the per-user config once every path is set
    #[arg(long)]
    save: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("ASSET_COPIER_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config, CopyError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(logo) = &cli.logo {
        config.logo = Some(logo.clone());
    }
    if let Some(splash) = &cli.splash {
        config.splash = Some(splash.clone());
    }
    if let Some(dest) = &cli.dest {
        config.destination = Some(dest.clone());
    }
    if cli.atomic {
        config.policy = CopyPolicy::Atomic;
    }
    if cli.check_space {
        config.check_space = true;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), CopyError> {
    let config = resolve_config(cli)?;
    let tasks = config.tasks()?;
    if cli.save {
        match config.save() {
            Ok(path) => info!(path = %path.display(), "saved config"),
            Err(e) => warn!(error = %e, "could not save config"),
        }
    }
    let mut copier = AssetCopier::new(tasks, config.options());
    let report = copier.run()?;
    for outcome in &report.outcomes {
        match outcome.dimensions {
            Some((w, h)) => info!(asset = %outcome.task.dest.display(), bytes = outcome.bytes, "{w}x{h}"),
            None => info!(asset = %outcome.task.dest.display(), bytes = outcome.bytes, "copied"),
        }
    }
    let progress = copier.progress();
    info!(
        completed = progress.completed_tasks,
        total = progress.total_tasks,
        bytes = progress.copied_bytes,
        percent = progress.total_progress() * 100.0,
        "all tasks finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => {
            println!("{SUCCESS_MESSAGE}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "logo": "/file/logo.png", "splash": "/file/splash.png", "destination": "/file/out" }"#)
            .unwrap();

        let cli = Cli::parse_from([
            "asset-copier",
            "--config",
            path.to_str().unwrap(),
            "--dest",
            "/flag/out",
            "--atomic",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.logo, Some(PathBuf::from("/file/logo.png")));
        assert_eq!(config.destination, Some(PathBuf::from("/flag/out")));
        assert_eq!(config.policy, CopyPolicy::Atomic);
        assert!(!config.check_space);
    }
}
