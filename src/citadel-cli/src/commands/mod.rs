//! Command handlers for citadel CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod changelogs;
pub mod configure;
pub mod parse;
pub mod publish;

use anyhow::{Context, Result};
use citadel::pipeline::{self, ParsedData};
use citadel::{Localizations, ParseMode, ParseOptions};
use std::path::Path;

use crate::cli::ParseArgs;

pub(crate) fn parse_options(args: &ParseArgs) -> ParseOptions {
    ParseOptions {
        languages: args.languages.clone(),
        npc_mode: if args.lenient {
            ParseMode::Lenient
        } else {
            ParseMode::Strict
        },
        ..ParseOptions::default()
    }
}

/// Load and parse everything under `data_dir`
pub(crate) fn load_and_parse(data_dir: &Path, options: &ParseOptions) -> Result<(ParsedData, Localizations)> {
    let raw = pipeline::load_game_data(data_dir)
        .with_context(|| format!("Failed to load game data from {}", data_dir.display()))?;
    let localizations = pipeline::load_localizations(data_dir, options)
        .with_context(|| format!("Failed to load localizations from {}", data_dir.display()))?;
    let parsed = pipeline::parse_entities(&raw, &localizations, options).context("Failed to parse entities")?;
    Ok((parsed, localizations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let args = ParseArgs {
            lenient: true,
            languages: vec!["spanish".to_string()],
        };
        let options = parse_options(&args);
        assert_eq!(options.npc_mode, ParseMode::Lenient);
        assert_eq!(options.reference_language, "english");
        assert!(options.wants_language("spanish"));
        assert!(!options.wants_language("german"));

        assert_eq!(parse_options(&ParseArgs::default()).npc_mode, ParseMode::Strict);
    }
}
