//! Wiki publishing boundary
//!
//! The library never talks HTTP itself. A [`WikiPages`] implementation (the
//! CLI ships one for the MediaWiki action API) reads and writes pages; the
//! [`Publisher`] decides which pages actually need a write.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Wiki request for {title} failed: {message}")]
    Backend { title: String, message: String },

    #[error("Wiki rejected the edit to {title}: {reason}")]
    Rejected { title: String, reason: String },

    #[error("Not logged in to the wiki")]
    NotAuthenticated,
}

/// Page storage on the wiki side
pub trait WikiPages {
    /// Current content of a page, `None` if it does not exist
    fn read_page(&mut self, title: &str) -> Result<Option<String>, PublishError>;

    fn write_page(&mut self, title: &str, content: &str, summary: &str) -> Result<(), PublishError>;
}

/// Outcome of a publish run, as page titles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
    /// Pages a dry run would have written
    pub would_write: Vec<String>,
}

impl PublishReport {
    pub fn changed(&self) -> usize {
        self.written.len() + self.would_write.len()
    }
}

/// Pushes generated pages, skipping pages whose content is already current
pub struct Publisher<P: WikiPages> {
    pages: P,
    dry_run: bool,
    summary: String,
}

impl<P: WikiPages> Publisher<P> {
    pub fn new(pages: P, summary: impl Into<String>) -> Self {
        Self {
            pages,
            dry_run: false,
            summary: summary.into(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn into_inner(self) -> P {
        self.pages
    }

    /// Publish one page, recording the outcome in `report`
    pub fn publish(
        &mut self,
        title: &str,
        content: &str,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let current = self.pages.read_page(title)?;
        if current.as_deref().map(str::trim_end) == Some(content.trim_end()) {
            tracing::info!(title, "page unchanged, skipping");
            report.unchanged.push(title.to_string());
            return Ok(());
        }

        if self.dry_run {
            tracing::info!(title, bytes = content.len(), "dry run, would write page");
            report.would_write.push(title.to_string());
            return Ok(());
        }

        self.pages.write_page(title, content, &self.summary)?;
        tracing::info!(title, bytes = content.len(), "page written");
        report.written.push(title.to_string());
        Ok(())
    }

    /// Publish pages in order, stopping at the first failure
    pub fn publish_all<'a, I>(&mut self, pages: I) -> Result<PublishReport, PublishError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut report = PublishReport::default();
        for (title, content) in pages {
            self.publish(title, content, &mut report)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryWiki {
        pages: BTreeMap<String, String>,
        writes: Vec<(String, String)>,
        fail_on: Option<String>,
    }

    impl WikiPages for MemoryWiki {
        fn read_page(&mut self, title: &str) -> Result<Option<String>, PublishError> {
            if self.fail_on.as_deref() == Some(title) {
                return Err(PublishError::Backend {
                    title: title.to_string(),
                    message: "timeout".to_string(),
                });
            }
            Ok(self.pages.get(title).cloned())
        }

        fn write_page(&mut self, title: &str, content: &str, summary: &str) -> Result<(), PublishError> {
            self.writes.push((title.to_string(), summary.to_string()));
            self.pages.insert(title.to_string(), content.to_string());
            Ok(())
        }
    }

    fn wiki() -> MemoryWiki {
        MemoryWiki {
            pages: BTreeMap::from([
                ("Data:HeroData.json".to_string(), "{\"a\": 1}".to_string()),
                ("Changelog 05-01".to_string(), "* old\n".to_string()),
            ]),
            ..MemoryWiki::default()
        }
    }

    #[test]
    fn test_skips_unchanged_pages() {
        let mut publisher = Publisher::new(wiki(), "Automated update");
        let report = publisher
            .publish_all([
                ("Data:HeroData.json", "{\"a\": 1}\n"),
                ("Changelog 05-01", "* new\n"),
                ("Changelog 05-02", "* brand new\n"),
            ])
            .unwrap();

        assert_eq!(report.unchanged, ["Data:HeroData.json"]);
        assert_eq!(report.written, ["Changelog 05-01", "Changelog 05-02"]);
        assert!(report.would_write.is_empty());

        let wiki = publisher.into_inner();
        assert_eq!(wiki.writes.len(), 2);
        assert_eq!(wiki.writes[0].1, "Automated update");
        assert_eq!(wiki.pages["Changelog 05-01"], "* new\n");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut publisher = Publisher::new(wiki(), "Automated update").dry_run(true);
        let report = publisher
            .publish_all([("Changelog 05-01", "* new\n"), ("Data:HeroData.json", "{\"a\": 1}")])
            .unwrap();

        assert_eq!(report.would_write, ["Changelog 05-01"]);
        assert_eq!(report.unchanged, ["Data:HeroData.json"]);
        assert_eq!(report.changed(), 1);
        assert!(publisher.into_inner().writes.is_empty());
    }

    #[test]
    fn test_backend_failure_stops_run() {
        let mut backend = wiki();
        backend.fail_on = Some("Changelog 05-01".to_string());
        let mut publisher = Publisher::new(backend, "Automated update");

        let err = publisher
            .publish_all([("Changelog 05-01", "* new\n"), ("Changelog 05-02", "* x\n")])
            .unwrap_err();
        assert!(matches!(err, PublishError::Backend { .. }));
        assert!(publisher.into_inner().writes.is_empty());
    }
}
