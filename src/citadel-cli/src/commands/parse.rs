//! Parse command handler

use anyhow::{Context, Result};
use citadel::pipeline;

use crate::cli::{Dirs, ParseArgs};
use crate::config::Config;

/// Handle the parse command
pub fn handle(dirs: Dirs, args: &ParseArgs) -> Result<()> {
    let config = Config::load()?;
    let data_dir = config.data_dir(dirs.data_dir)?;
    let output_dir = config.output_dir(dirs.output_dir)?;

    let options = super::parse_options(args);
    let run = pipeline::run_parse(&data_dir, &output_dir, &options).with_context(|| {
        format!(
            "Failed to parse {} into {}",
            data_dir.display(),
            output_dir.display()
        )
    })?;
    let localizations = &run.localizations;

    let entities = &run.parsed.entities;
    println!(
        "Parsed {} heroes, {} abilities, {} items, {} NPCs",
        entities.heroes.len(),
        entities.abilities.len(),
        entities.items.len(),
        entities.npcs.len()
    );
    println!("Wrote {} files to {}", run.outputs.len(), output_dir.display());

    if localizations.miss_count() > 0 {
        println!(
            "{} keys have no {} localization",
            localizations.miss_count(),
            options.reference_language
        );
    }

    Ok(())
}
