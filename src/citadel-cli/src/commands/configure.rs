//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up citadel defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Settings given on the command line
#[derive(Debug, Default)]
pub struct ConfigureArgs {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub wiki_api: Option<String>,
    pub wiki_user: Option<String>,
    pub show: bool,
}

impl ConfigureArgs {
    fn is_empty(&self) -> bool {
        self.data_dir.is_none() && self.output_dir.is_none() && self.wiki_api.is_none() && self.wiki_user.is_none()
    }
}

/// Handle the configure command
pub fn handle(args: ConfigureArgs) -> Result<()> {
    let mut config = Config::load()?;

    if args.show {
        show_config(&config);
        return Ok(());
    }

    if args.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, args);
    config.save()?;

    println!("Configuration updated");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Copy the given settings into the config, leaving the others alone
fn apply(config: &mut Config, args: ConfigureArgs) {
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = Some(dir);
    }
    if let Some(api) = args.wiki_api {
        config.wiki_api = Some(api);
    }
    if let Some(user) = args.wiki_user {
        config.wiki_user = Some(user);
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    let show = |label: &str, value: Option<String>| match value {
        Some(v) => println!("{}: {}", label, v),
        None => println!("{}: (not set)", label),
    };
    show("Data directory", config.data_dir.as_ref().map(|d| d.display().to_string()));
    show("Output directory", config.output_dir.as_ref().map(|d| d.display().to_string()));
    show("Wiki API", config.wiki_api.clone());
    show("Wiki user", config.wiki_user.clone());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: citadel configure --data-dir DIR --output-dir DIR");
    println!("       citadel configure --wiki-api URL --wiki-user NAME");
    println!("   or: citadel configure --show");
    println!();
    println!("Note: the wiki password is never stored. Set CITADEL_WIKI_PASSWORD");
    println!("      before running `citadel publish`.");
}
