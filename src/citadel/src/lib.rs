//! # citadel
//!
//! Game data extraction library - turns decompiled game data into stable JSON
//! records and wiki markup.
//!
//! This library provides functionality to:
//! - Merge per-language localization tables and resolve display strings
//! - Normalize engine field names, enum literals and distance units
//! - Parse heroes, abilities, items and NPCs into flat attribute records
//! - Compute weapon DPS and level/spirit scaling deltas
//! - Tag changelog entries and build a tag taxonomy
//! - Format wikitext with entity icons and links
//! - Publish generated pages to a wiki, skipping unchanged content
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> citadel::Result<()> {
//! let options = citadel::ParseOptions::default();
//! let run = citadel::pipeline::run_parse(Path::new("decompiled"), Path::new("output"), &options)?;
//! println!("{} heroes", run.parsed.entities.heroes.len());
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod changelog;
pub mod dps;
pub mod entity;
pub mod localization;
pub mod numbers;
pub mod parsers;
pub mod pipeline;
pub mod publish;
pub mod raw;
pub mod wikitext;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used items
#[doc(inline)]
pub use attributes::{map_enum, strip_prefix, units_to_meters, AttributeError, AttributeOrder};
#[doc(inline)]
pub use changelog::{ChangelogDocument, ChangelogEntry, ChangelogError, TagTaxonomy, TaggingSession};
#[doc(inline)]
pub use dps::{burst_dps, sustained_dps, CalcError, WeaponStats};
#[doc(inline)]
pub use entity::{Entity, EntityKind, EntitySet, ScalingMap};
#[doc(inline)]
pub use localization::{LocalizationError, Localizations};
#[doc(inline)]
pub use numbers::fix_float_garbage;
#[doc(inline)]
pub use parsers::{DescriptionError, ParseError, ParseMode, ParseOptions};
#[doc(inline)]
pub use publish::{PublishError, PublishReport, Publisher, WikiPages};
#[doc(inline)]
pub use wikitext::format_wikitext;

/// Errors from any stage of a parse run
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Localization(#[from] LocalizationError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Failed to parse {key}: {source}")]
    Entity {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Attach the key of the record being parsed
    pub fn in_entity(key: &str) -> impl FnOnce(Error) -> Error + '_ {
        move |source| Error::Entity {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}
