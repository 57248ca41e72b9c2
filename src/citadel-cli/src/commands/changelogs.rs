//! Changelogs command handler

use anyhow::{Context, Result};
use citadel::pipeline;

use crate::cli::{Dirs, ParseArgs};
use crate::config::Config;

/// Handle the changelogs command
///
/// Entities are parsed again in memory so changelog tags always match the
/// current data.
pub fn handle(dirs: Dirs, args: &ParseArgs) -> Result<()> {
    let config = Config::load()?;
    let data_dir = config.data_dir(dirs.data_dir)?;
    let output_dir = config.output_dir(dirs.output_dir)?;

    let options = super::parse_options(args);
    let (parsed, _) = super::load_and_parse(&data_dir, &options)?;

    let changelogs = pipeline::load_changelogs(&data_dir)
        .with_context(|| format!("Failed to load changelogs from {}", data_dir.display()))?;
    let link_targets = pipeline::load_link_targets(&data_dir).context("Failed to load link targets")?;

    let run = pipeline::process_changelogs(&changelogs, &parsed.entities, link_targets.as_ref());
    pipeline::write_changelog_outputs(&output_dir, &run)
        .with_context(|| format!("Failed to write changelogs to {}", output_dir.display()))?;

    let entries: usize = run.documents.iter().map(|d| d.entries.len()).sum();
    println!(
        "Tagged {} changelogs ({} entries, {} tags, {} tag groups)",
        run.documents.len(),
        entries,
        run.taxonomy.tags.len(),
        run.taxonomy.tag_groups.len()
    );

    Ok(())
}
