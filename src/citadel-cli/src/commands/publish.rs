//! Publish command handler

use anyhow::{bail, Context, Result};
use citadel::{pipeline, Publisher};
use std::path::PathBuf;

use crate::config::Config;
use crate::wiki::MediaWiki;

pub struct PublishArgs {
    pub output_dir: Option<PathBuf>,
    pub api: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub summary: String,
    pub dry_run: bool,
}

/// Handle the publish command
pub fn handle(args: PublishArgs) -> Result<()> {
    let config = Config::load()?;
    let output_dir = config.output_dir(args.output_dir)?;
    let api = config.wiki_api(args.api)?;

    let pages = pipeline::collect_wiki_pages(&output_dir)
        .with_context(|| format!("Failed to read outputs from {}", output_dir.display()))?;
    if pages.is_empty() {
        bail!(
            "Nothing to publish in {}. Run `citadel parse` or `citadel changelogs` first",
            output_dir.display()
        );
    }

    let mut wiki = MediaWiki::new(api);
    if !args.dry_run {
        let user = config.wiki_user(args.user)?;
        let password = args
            .password
            .context("No wiki password. Set CITADEL_WIKI_PASSWORD or pass --password")?;
        wiki.login(&user, &password)?;
    }

    let mut publisher = Publisher::new(wiki, args.summary).dry_run(args.dry_run);
    let report = publisher
        .publish_all(pages.iter().map(|(title, content)| (title.as_str(), content.as_str())))
        .context("Publishing failed")?;

    println!("\nPublish complete:");
    println!("  Written: {}", report.written.len());
    println!("  Unchanged: {}", report.unchanged.len());
    if args.dry_run {
        println!("  Would write: {}", report.would_write.len());
        for title in &report.would_write {
            println!("    {}", title);
        }
    }

    Ok(())
}
