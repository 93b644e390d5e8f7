//! Page source backed by saved HTML.
//!
//! Serves the listing and timetable pages from memory, either added one by
//! one or loaded from a directory of saved pages. Useful for tests and for
//! re-running extraction on a crawl captured earlier.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::RouteIdentifier;

use super::PageSource;
use super::error::FetchError;

/// File name of the saved listing page.
pub const LISTING_FILE: &str = "listing.html";

/// Page source serving pre-loaded HTML.
#[derive(Debug, Clone, Default)]
pub struct MockPageSource {
    listing: Option<String>,
    details: HashMap<String, String>,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, html: impl Into<String>) -> Self {
        self.listing = Some(html.into());
        self
    }

    /// Add the timetable page for an identifier such as "34-1(평일)".
    pub fn with_detail(mut self, identifier: impl Into<String>, html: impl Into<String>) -> Self {
        self.details.insert(identifier.into(), html.into());
        self
    }

    /// Load pages from a directory.
    ///
    /// `listing.html` is the listing page; every other `.html` file is a
    /// timetable page whose file stem is its identifier
    /// (`34-1(평일).html`).
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let dir = dir.as_ref();
        let io_error = |path: &Path, e: std::io::Error| FetchError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut source = Self::new();
        for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
            let path = entry.map_err(|e| io_error(dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("html") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let html = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            if path.file_name().and_then(|s| s.to_str()) == Some(LISTING_FILE) {
                source.listing = Some(html);
            } else {
                source.details.insert(stem.to_string(), html);
            }
        }

        Ok(source)
    }

    /// Number of timetable pages available.
    pub fn detail_count(&self) -> usize {
        self.details.len()
    }
}

impl PageSource for MockPageSource {
    async fn listing(&self) -> Result<String, FetchError> {
        self.listing
            .clone()
            .ok_or_else(|| FetchError::Missing(LISTING_FILE.to_string()))
    }

    async fn detail(&self, identifier: &RouteIdentifier) -> Result<String, FetchError> {
        self.details
            .get(identifier.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Missing(identifier.to_string()))
    }
}
