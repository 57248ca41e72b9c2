mod cli;
mod commands;
mod config;
mod wiki;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;
use commands::configure::ConfigureArgs;
use commands::publish::PublishArgs;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { dirs, parse } => {
            commands::parse::handle(dirs, &parse)?;
        }

        Commands::Changelogs { dirs, parse } => {
            commands::changelogs::handle(dirs, &parse)?;
        }

        Commands::Publish {
            output_dir,
            api,
            user,
            password,
            summary,
            dry_run,
        } => {
            commands::publish::handle(PublishArgs {
                output_dir,
                api,
                user,
                password,
                summary,
                dry_run,
            })?;
        }

        Commands::Configure {
            data_dir,
            output_dir,
            wiki_api,
            wiki_user,
            show,
        } => {
            commands::configure::handle(ConfigureArgs {
                data_dir,
                output_dir,
                wiki_api,
                wiki_user,
                show,
            })?;
        }
    }

    Ok(())
}
