//! CLI argument definitions for citadel

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "citadel")]
#[command(about = "Game data extraction and wiki publishing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Input and output locations, defaulting to the configured ones
#[derive(Args, Debug, Clone, Default)]
pub struct Dirs {
    /// Decompiled game data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Output directory for JSON and wikitext
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Entity parsing switches
#[derive(Args, Debug, Clone, Default)]
pub struct ParseArgs {
    /// Skip NPCs that fail to parse instead of aborting
    #[arg(long)]
    pub lenient: bool,

    /// Languages to load besides english (all if omitted)
    #[arg(short, long = "language")]
    pub languages: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse heroes, abilities, items and NPCs into JSON
    #[command(visible_alias = "p")]
    Parse {
        #[command(flatten)]
        dirs: Dirs,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Tag changelogs and format them as wikitext
    #[command(visible_alias = "cl")]
    Changelogs {
        #[command(flatten)]
        dirs: Dirs,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Push generated JSON and wikitext to the wiki
    Publish {
        /// Output directory of a previous parse/changelogs run
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// MediaWiki api.php endpoint
        #[arg(long)]
        api: Option<String>,

        /// Wiki user (bot password user name)
        #[arg(short, long)]
        user: Option<String>,

        /// Wiki password
        #[arg(long, env = "CITADEL_WIKI_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Edit summary
        #[arg(short, long, default_value = "Automated data update")]
        summary: String,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Set default output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Set default wiki API endpoint
        #[arg(long)]
        wiki_api: Option<String>,

        /// Set default wiki user
        #[arg(long)]
        wiki_user: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
