//! The crawl pipeline.
//!
//! listing page → route index → (fan out) fetch + parse each timetable page
//! → (join) merge per route → write. A timetable page that cannot be
//! fetched is logged and left out; the routes it belonged to simply end up
//! with fewer day types. Only a missing listing page stops the crawl.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::config::CrawlConfig;
use crate::domain::{MergedRoute, RouteIdentifier, RouteNumber, ScheduleDocument};
use crate::extract::{MergeError, RouteIndex, ScheduleMerger, extract_route_index, parse_schedule};
use crate::html::Document;
use crate::its::{FetchError, PageSource};
use crate::output::{ScheduleWriter, WriteError};

/// Errors that stop a crawl.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The listing page could not be fetched
    #[error("listing page unavailable: {0}")]
    Listing(#[source] FetchError),

    /// Documents were merged into the wrong route
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Schedule files could not be written
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Outcome of a crawl.
#[derive(Debug)]
pub struct CrawlReport {
    /// Timetable pages listed (after filtering).
    pub identifiers: usize,

    /// Timetable pages fetched and parsed.
    pub fetched: usize,

    /// Timetable pages that could not be fetched, with the reason.
    pub failed: Vec<(RouteIdentifier, String)>,

    /// Merged routes, by route number.
    pub routes: BTreeMap<RouteNumber, MergedRoute>,
}

/// Runs the crawl against a page source.
pub struct Crawler<S> {
    source: S,
    config: CrawlConfig,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, config: CrawlConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl and merge, without writing anything.
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let listing = self.source.listing().await.map_err(CrawlError::Listing)?;
        let index = extract_route_index(&Document::parse(&listing));
        info!(
            routes = index.routes.len(),
            pages = index.identifiers.len(),
            "read listing page"
        );

        let targets: Vec<&RouteIdentifier> = index
            .identifiers
            .iter()
            .filter(|id| self.config.matches(id))
            .collect();

        if let Some(route) = &self.config.route_filter {
            if targets.is_empty() {
                warn!(route = %route, "no timetable pages for route");
            } else {
                info!(route = %route, pages = targets.len(), "filtered timetable pages");
            }
        }

        let results: Vec<(&RouteIdentifier, Result<ScheduleDocument, FetchError>)> =
            stream::iter(targets.iter().copied())
                .map(|identifier| self.fetch_and_parse(identifier, &index))
                .buffer_unordered(self.config.concurrency.max(1))
                .collect()
                .await;

        let mut documents = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (identifier, result) in results {
            match result {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!(route = %identifier, error = %e, "skipping timetable page");
                    failed.push((identifier.clone(), e.to_string()));
                }
            }
        }

        let routes = ScheduleMerger::new(self.config.today).merge(&documents, &index.routes)?;
        info!(
            fetched = documents.len(),
            failed = failed.len(),
            routes = routes.len(),
            "crawl finished"
        );

        Ok(CrawlReport {
            identifiers: targets.len(),
            fetched: documents.len(),
            failed,
            routes,
        })
    }

    /// Crawl, merge and write one file per route.
    pub async fn crawl_and_save(&self, writer: &ScheduleWriter) -> Result<CrawlReport, CrawlError> {
        let report = self.run().await?;
        writer.write_all(report.routes.values())?;
        Ok(report)
    }

    async fn fetch_and_parse<'a>(
        &self,
        identifier: &'a RouteIdentifier,
        index: &RouteIndex,
    ) -> (&'a RouteIdentifier, Result<ScheduleDocument, FetchError>) {
        let result = self.source.detail(identifier).await.map(|html| {
            let metadata = index.metadata(identifier.route_number());
            let document = parse_schedule(&Document::parse(&html), identifier, metadata);
            info!(
                route = %identifier,
                departures = document.departure_count(),
                "parsed timetable page"
            );
            document
        });
        (identifier, result)
    }
}
