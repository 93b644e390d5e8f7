//! Crawl configuration.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::domain::RouteIdentifier;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./storage";

/// Default number of timetable pages fetched and parsed at once.
const DEFAULT_CONCURRENCY: usize = 4;

/// Configuration for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Only crawl this route number (all routes when `None`).
    pub route_filter: Option<String>,

    /// Directory receiving `schedules/<route>.json`.
    pub output_dir: PathBuf,

    /// Timetable pages in flight at once.
    pub concurrency: usize,

    /// Date stamped into every route as `lastUpdated`.
    pub today: NaiveDate,
}

impl CrawlConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_route_filter(mut self, route: Option<String>) -> Self {
        self.route_filter = route.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        self
    }

    /// Set concurrency (at least one).
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Whether the filter lets this timetable page through.
    ///
    /// The filter matches the route number exactly, so "30" selects
    /// "30(평일)" but not "300".
    pub fn matches(&self, identifier: &RouteIdentifier) -> bool {
        match &self.route_filter {
            Some(route) => identifier.route_number().as_str() == route,
            None => true,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            route_filter: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            today: Local::now().date_naive(),
        }
    }
}
