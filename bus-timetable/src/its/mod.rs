//! Page retrieval from the transit information centre.
//!
//! The extractors work on HTML strings; this module is how those strings
//! are obtained. `ItsClient` talks to the live site, `MockPageSource`
//! serves saved pages. Both implement `PageSource`.
//!
//! Key characteristics of the site:
//! - The listing page links every timetable through a `goDetail('<id>')`
//!   click handler rather than a URL
//! - Timetable pages are fetched by POSTing the identifier as `no`
//! - Pages are UTF-8 regardless of the declared charset

mod client;
mod error;
mod mock;

use std::future::Future;

use crate::domain::RouteIdentifier;

pub use client::{DEFAULT_DETAIL_URL, DEFAULT_LISTING_URL, ItsClient, ItsConfig};
pub use error::FetchError;
pub use mock::{LISTING_FILE, MockPageSource};

/// Source of listing and timetable pages.
pub trait PageSource {
    /// Fetch the listing page.
    fn listing(&self) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Fetch the timetable page for one identifier.
    fn detail(
        &self,
        identifier: &RouteIdentifier,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}
