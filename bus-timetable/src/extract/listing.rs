//! Route index extraction from the timetable listing page.
//!
//! The listing is one big table with a row per timetable page. The first
//! cell of each row calls `goDetail('<identifier>')` when clicked; the
//! second and third cells hold the route's origin and destination.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::domain::{DirectionList, RouteIdentifier, RouteMetadata, RouteNumber};
use crate::html::{Cell, Document};

/// Minimum number of data cells in a listing row.
const MIN_LISTING_CELLS: usize = 6;

/// Attribute carrying the detail-page handler call.
const HANDLER_ATTR: &str = "onclick";

fn handler_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"goDetail\('([^']+)'\)").expect("handler pattern is a valid regex")
    })
}

/// Everything the listing page tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteIndex {
    /// Metadata per route number.
    pub routes: BTreeMap<RouteNumber, RouteMetadata>,
    /// Timetable pages to fetch, deduplicated, in page order.
    pub identifiers: Vec<RouteIdentifier>,
}

impl RouteIndex {
    pub fn metadata(&self, number: &RouteNumber) -> Option<&RouteMetadata> {
        self.routes.get(number)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.identifiers.is_empty()
    }
}

/// Accumulates rows of one route number before directions are finalised.
struct RouteEntry {
    origin: String,
    destination: String,
    directions: BTreeSet<String>,
}

/// Build the route index from a listing page.
///
/// Rows that are too short or have no handler call are skipped. A page
/// without any qualifying row gives an empty index.
pub fn extract_route_index(document: &Document) -> RouteIndex {
    let mut entries: BTreeMap<RouteNumber, RouteEntry> = BTreeMap::new();
    let mut identifiers: Vec<RouteIdentifier> = Vec::new();

    for row in document.tables().iter().flat_map(|t| t.rows()) {
        let cells = row.data_cells();
        if cells.len() < MIN_LISTING_CELLS {
            continue;
        }

        let Some(identifier) = embedded_identifier(cells[0]) else {
            trace!(text = cells[0].text(), "listing row without identifier");
            continue;
        };

        let origin = cells[1].text();
        let destination = cells[2].text();

        let entry = entries
            .entry(identifier.route_number().clone())
            .or_insert_with(|| RouteEntry {
                origin: origin.to_string(),
                destination: destination.to_string(),
                directions: BTreeSet::new(),
            });
        entry.directions.insert(origin.to_string());
        entry.directions.insert(destination.to_string());

        if !identifiers.contains(&identifier) {
            identifiers.push(identifier);
        }
    }

    let routes: BTreeMap<RouteNumber, RouteMetadata> = entries
        .into_iter()
        .map(|(number, entry)| {
            let meta = RouteMetadata::new(
                number.clone(),
                entry.origin,
                entry.destination,
                DirectionList::from_labels(entry.directions),
            );
            (number, meta)
        })
        .collect();

    debug!(
        routes = routes.len(),
        identifiers = identifiers.len(),
        "extracted route index"
    );

    RouteIndex {
        routes,
        identifiers,
    }
}

/// Pull the identifier out of a cell's `goDetail('...')` handler.
fn embedded_identifier(cell: &Cell) -> Option<RouteIdentifier> {
    let handler = cell.attr(HANDLER_ATTR)?;
    let caps = handler_pattern().captures(handler)?;
    RouteIdentifier::parse(&caps[1]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_row(identifier: &str, origin: &str, destination: &str) -> String {
        format!(
            "<tr><td onclick=\"goDetail('{identifier}')\">{identifier}</td>\
             <td>{origin}</td><td>{destination}</td><td>06:00</td><td>22:30</td><td>20</td></tr>"
        )
    }

    fn listing(rows: &[String]) -> Document {
        Document::parse(&format!(
            "<table><tr><th>노선</th><th>기점</th><th>종점</th><th>첫차</th><th>막차</th><th>간격</th></tr>{}</table>",
            rows.concat()
        ))
    }

    #[test]
    fn extracts_routes_and_identifiers() {
        let doc = listing(&[
            listing_row("30", "문막", "단구동"),
            listing_row("34-1(평일)", "학성동", "귀래"),
            listing_row("34-1(주말)", "학성동", "귀래"),
        ]);

        let index = extract_route_index(&doc);

        assert_eq!(index.routes.len(), 2);
        let ids: Vec<_> = index.identifiers.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["30", "34-1(평일)", "34-1(주말)"]);

        let meta = index.metadata(&RouteNumber::new("30")).unwrap();
        assert_eq!(meta.origin, "문막");
        assert_eq!(meta.destination, "단구동");
    }

    #[test]
    fn directions_are_sorted_union_of_end_points() {
        let doc = listing(&[
            listing_row("2(평일)", "태장동", "관설동"),
            listing_row("2(주말)", "관설동", "흥업"),
        ]);

        let index = extract_route_index(&doc);
        let meta = index.metadata(&RouteNumber::new("2")).unwrap();

        let mut expected = vec!["관설동", "태장동", "흥업"];
        expected.sort();
        assert_eq!(meta.directions.iter().collect::<Vec<_>>(), expected);
        // First row wins for origin/destination
        assert_eq!(meta.origin, "태장동");
        assert_eq!(meta.destination, "관설동");
    }

    #[test]
    fn skips_short_rows_and_rows_without_handler() {
        let doc = Document::parse(&format!(
            "<table>\
             <tr><td onclick=\"goDetail('9')\">9</td><td>a</td><td>b</td></tr>\
             <tr><td>51</td><td>a</td><td>b</td><td>1</td><td>2</td><td>3</td></tr>\
             <tr><td onclick=\"location.href='/'\">52</td><td>a</td><td>b</td><td>1</td><td>2</td><td>3</td></tr>\
             {}</table>",
            listing_row("41", "지정", "원주역")
        ));

        let index = extract_route_index(&doc);
        assert_eq!(index.routes.len(), 1);
        assert_eq!(index.identifiers.len(), 1);
        assert_eq!(index.identifiers[0].as_str(), "41");
    }

    #[test]
    fn duplicate_identifiers_kept_once() {
        let doc = listing(&[
            listing_row("30", "문막", "단구동"),
            listing_row("30", "문막", "단구동"),
        ]);
        let index = extract_route_index(&doc);
        assert_eq!(index.identifiers.len(), 1);
    }

    #[test]
    fn empty_listing_gives_empty_index() {
        let index = extract_route_index(&Document::parse("<p>no tables</p>"));
        assert!(index.is_empty());
    }
}
