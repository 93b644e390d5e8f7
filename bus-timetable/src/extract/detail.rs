//! Timetable extraction from a route's detail page.
//!
//! Detail pages are not uniformly built. Some repeat the timetable in
//! several tables and only one of them has real headers; some have no
//! headers at all; some carry a free-text notes column ("비고") at an
//! arbitrary position. Extraction therefore runs in two heuristic stages,
//! each an ordered list of strategies where the first success wins:
//!
//! 1. table selection: the first table with departure-style headers, else
//!    the first table on the page;
//! 2. direction assignment: the columns named by the headers, else the
//!    time-bearing columns labelled from route metadata (or placeholders).
//!
//! A page that defeats every strategy yields an empty `ScheduleDocument`
//! rather than an error.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::domain::{
    DEPARTURE_MARKER, DepartureTime, DirectionColumnMap, NoteId, RouteIdentifier, RouteMetadata,
    ScheduleDocument, TimeEntry,
};
use crate::html::{Document, Table};

/// Header text of the notes column.
pub const NOTES_LABEL: &str = "비고";

/// Header labels that never name a direction.
const NOISE_LABELS: &[&str] = &["순번", "운행순번", NOTES_LABEL, "시", "분", ""];

fn hour_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+시$").expect("hour label pattern is a valid regex"))
}

/// A strategy for picking the timetable among a page's tables.
type TableStrategy = fn(&[Table]) -> Option<&Table>;

const TABLE_STRATEGIES: &[(&str, TableStrategy)] = &[
    ("departure headers", table_with_departure_headers),
    ("first table", first_table),
];

/// The first table with a header ending in the departure marker.
fn table_with_departure_headers(tables: &[Table]) -> Option<&Table> {
    tables
        .iter()
        .find(|t| t.header_texts().any(|h| h.ends_with(DEPARTURE_MARKER)))
}

fn first_table(tables: &[Table]) -> Option<&Table> {
    tables.first()
}

/// Pick the timetable table of a detail page.
pub fn select_table(document: &Document) -> Option<&Table> {
    TABLE_STRATEGIES.iter().find_map(|(name, strategy)| {
        let table = strategy(document.tables())?;
        trace!(strategy = name, "selected schedule table");
        Some(table)
    })
}

fn is_noise_label(label: &str) -> bool {
    NOISE_LABELS.contains(&label) || hour_label_pattern().is_match(label)
}

/// Read the column assignment named by a table's header cells.
///
/// The notes column is recorded but never mapped. A trailing departure
/// marker is stripped from direction labels; structural labels (sequence
/// number, hour, minute, "N시") are ignored.
pub fn resolve_headers(table: &Table) -> DirectionColumnMap {
    let mut map = DirectionColumnMap::new();

    for row in table.header_rows() {
        for (column, cell) in row.header_cells().into_iter().enumerate() {
            let text = cell.text();

            if text == NOTES_LABEL {
                map.set_notes_column(column);
                continue;
            }

            let label = text.strip_suffix(DEPARTURE_MARKER).unwrap_or(text);
            if is_noise_label(label) {
                continue;
            }

            if map.direction_for(column).is_none() {
                map.insert(column, label);
            }
        }
    }

    map
}

/// A time-bearing cell before it is assigned a direction.
#[derive(Debug, Clone, Copy)]
struct RawEntry {
    column: usize,
    time: DepartureTime,
    note: Option<NoteId>,
}

/// What the direction strategies get to look at.
struct DirectionInput<'a> {
    headers: &'a DirectionColumnMap,
    entries: &'a [RawEntry],
    metadata: Option<&'a RouteMetadata>,
}

/// A strategy for mapping columns to directions.
type DirectionStrategy = fn(&DirectionInput<'_>) -> Option<DirectionColumnMap>;

const DIRECTION_STRATEGIES: &[(&str, DirectionStrategy)] = &[
    ("headers", directions_from_headers),
    ("time columns", directions_from_time_columns),
];

/// Use the header assignment as-is when it names any direction.
fn directions_from_headers(input: &DirectionInput<'_>) -> Option<DirectionColumnMap> {
    (!input.headers.is_empty()).then(|| input.headers.clone())
}

/// Label each time-bearing column, in ascending column order, with the
/// route's known directions, then with "Direction N" placeholders. The
/// notes column is never a candidate.
fn directions_from_time_columns(input: &DirectionInput<'_>) -> Option<DirectionColumnMap> {
    let notes = input.headers.notes_column();
    let columns: BTreeSet<usize> = input
        .entries
        .iter()
        .map(|e| e.column)
        .filter(|c| Some(*c) != notes)
        .collect();
    if columns.is_empty() {
        return None;
    }

    let mut map = DirectionColumnMap::new();
    if let Some(notes) = notes {
        map.set_notes_column(notes);
    }

    for (position, column) in columns.into_iter().enumerate() {
        let label = input
            .metadata
            .and_then(|m| m.directions.get(position))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Direction {}", position + 1));
        map.insert(column, label);
    }

    Some(map)
}

fn assign_directions(input: &DirectionInput<'_>) -> DirectionColumnMap {
    DIRECTION_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let map = strategy(input)?;
            trace!(strategy = name, columns = map.len(), "assigned directions");
            Some(map)
        })
        .unwrap_or_default()
}

/// Extract one timetable page.
///
/// `metadata` is the listing's view of the route and is only consulted
/// when the page's headers name no direction.
pub fn parse_schedule(
    document: &Document,
    identifier: &RouteIdentifier,
    metadata: Option<&RouteMetadata>,
) -> ScheduleDocument {
    let mut schedule = ScheduleDocument::new(identifier.clone());

    let Some(table) = select_table(document) else {
        debug!(route = %identifier, "no table on detail page");
        return schedule;
    };

    let headers = resolve_headers(table);

    // Only the selected table's rows: other tables may be shaped differently
    let mut entries: Vec<RawEntry> = Vec::new();
    for row in table.data_rows() {
        let cells = row.data_cells();

        let note = headers
            .notes_column()
            .and_then(|column| cells.get(column))
            .map(|cell| cell.text())
            .filter(|text| !text.is_empty())
            .map(|text| schedule.register_note(text));

        for (column, cell) in cells.iter().enumerate() {
            if headers.notes_column() == Some(column) {
                continue;
            }
            if let Ok(time) = DepartureTime::parse(cell.text()) {
                entries.push(RawEntry { column, time, note });
            }
        }
    }

    let directions = assign_directions(&DirectionInput {
        headers: &headers,
        entries: &entries,
        metadata,
    });
    schedule.set_directions(directions.directions());
    schedule.set_departure_count(entries.len());

    let mut unassigned = 0usize;
    for entry in &entries {
        match directions.direction_for(entry.column) {
            Some(direction) => {
                schedule.push_time(direction, TimeEntry::new(entry.time, entry.note));
            }
            None => unassigned += 1,
        }
    }

    debug!(
        route = %identifier,
        day_type = %schedule.day_type(),
        directions = schedule.directions().len(),
        departures = entries.len(),
        unassigned,
        "parsed detail page"
    );

    schedule
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::html::{Cell, CellKind, Row};
    use proptest::prelude::*;

    fn header_label() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(NOTES_LABEL.to_string()),
            Just("순번".to_string()),
            Just("시".to_string()),
            "[1-9]시",
            "[가-힣]{1,4}발",
            "[가-힣]{1,4}",
        ]
    }

    proptest! {
        /// The notes column never ends up carrying a direction
        #[test]
        fn notes_column_never_a_direction(labels in prop::collection::vec(header_label(), 0..8)) {
            let cells = labels.iter().map(|l| Cell::new(CellKind::Header, l.clone())).collect();
            let table = Table::new(vec![Row::new(cells)]);

            let map = resolve_headers(&table);

            if let Some(notes) = map.notes_column() {
                prop_assert_eq!(map.direction_for(notes), None);
                prop_assert_eq!(labels.iter().position(|l| l == NOTES_LABEL), Some(notes));
            }
            for (_, label) in map.columns() {
                prop_assert!(!is_noise_label(label));
            }
        }
    }
}
