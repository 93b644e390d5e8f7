//! Folding per-page results into one record per route.
//!
//! Every route number gets a fresh `RouteBuilder` with its own note
//! registry, so footnote ids never leak between routes. Within a route,
//! documents are absorbed in canonical day-type order, which makes the
//! result independent of the order the pages were fetched in.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{
    DayType, Hour, MergedRoute, MinuteEntry, NoteId, RouteIdentifier, RouteMetadata, RouteNumber,
    ScheduleDocument,
};

/// Errors from merging documents into a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A document for one route was handed to another route's builder
    #[error("document for route {found} cannot be merged into route {expected}")]
    RouteMismatch {
        expected: RouteNumber,
        found: RouteNumber,
    },

    /// The same timetable page was handed to a builder twice
    #[error("timetable page {0} already merged")]
    DuplicateDocument(RouteIdentifier),
}

/// Builds the `MergedRoute` of a single route number.
///
/// Each timetable page is absorbed at most once, and `finish` consumes
/// the builder, so a finished route can never be appended to again.
#[derive(Debug)]
pub struct RouteBuilder {
    route: MergedRoute,
    absorbed: HashSet<RouteIdentifier>,
}

impl RouteBuilder {
    /// Start a route seeded from listing metadata, if the listing knew it.
    pub fn new(number: RouteNumber, metadata: Option<&RouteMetadata>, today: NaiveDate) -> Self {
        let description = metadata.map(RouteMetadata::description).unwrap_or_default();
        let directions = metadata.map(|m| m.directions.clone()).unwrap_or_default();
        Self {
            route: MergedRoute::new(number, description, directions, today),
            absorbed: HashSet::new(),
        }
    }

    /// Fold one document into the route.
    ///
    /// A document whose identifier was already absorbed is rejected, as is
    /// a document of another route.
    ///
    /// Footnotes are re-keyed into the route's registry by exact text, and
    /// departures are bucketed by hour, keeping page order within a bucket.
    pub fn absorb(&mut self, document: &ScheduleDocument) -> Result<(), MergeError> {
        if document.route_number() != self.route.route_id() {
            return Err(MergeError::RouteMismatch {
                expected: self.route.route_id().clone(),
                found: document.route_number().clone(),
            });
        }

        if !self.absorbed.insert(document.identifier().clone()) {
            return Err(MergeError::DuplicateDocument(document.identifier().clone()));
        }

        let remap: HashMap<NoteId, NoteId> = document
            .notes()
            .iter()
            .map(|(local, text)| (local, self.route.notes_mut().register(text)))
            .collect();

        let day_type = document.day_type();
        self.route.touch_day(day_type);

        for (direction, times) in document.times_by_direction() {
            self.route.directions_mut().push(direction);
            for entry in times {
                let minute = MinuteEntry {
                    minute: entry.time.minute_str(),
                    note: entry.note.and_then(|n| remap.get(&n).copied()),
                };
                self.route
                    .push_minute(day_type, Hour::of(&entry.time), direction, minute);
            }
        }

        Ok(())
    }

    pub fn finish(self) -> MergedRoute {
        self.route
    }
}

/// Merges parsed documents into per-route records.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleMerger {
    today: NaiveDate,
}

impl ScheduleMerger {
    /// `today` is stamped into every route as its last-updated date.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Merge documents, one `MergedRoute` per route number.
    ///
    /// Documents of a route are processed in day-type order (general,
    /// weekday, weekend), ties broken by identifier, whatever the input
    /// order. Every call builds fresh routes.
    pub fn merge(
        &self,
        documents: &[ScheduleDocument],
        metadata: &BTreeMap<RouteNumber, RouteMetadata>,
    ) -> Result<BTreeMap<RouteNumber, MergedRoute>, MergeError> {
        let mut groups: BTreeMap<&RouteNumber, Vec<&ScheduleDocument>> = BTreeMap::new();
        for document in documents {
            groups.entry(document.route_number()).or_default().push(document);
        }

        let mut routes = BTreeMap::new();
        for (number, mut group) in groups {
            group.sort_by(|a, b| {
                a.day_type()
                    .cmp(&b.day_type())
                    .then_with(|| a.identifier().as_str().cmp(b.identifier().as_str()))
            });

            let mut builder = RouteBuilder::new(number.clone(), metadata.get(number), self.today);
            for document in &group {
                builder.absorb(document)?;
            }
            let route = builder.finish();

            debug!(
                route = %number,
                documents = group.len(),
                day_types = route.schedule().len(),
                notes = route.notes().len(),
                "merged route"
            );
            routes.insert(number.clone(), route);
        }

        Ok(routes)
    }
}

/// Day types present in a merged route, in canonical order.
pub fn day_types(route: &MergedRoute) -> Vec<DayType> {
    route.schedule().keys().copied().collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{DepartureTime, RouteIdentifier, TimeEntry};
    use proptest::prelude::*;

    fn document(identifier: &str, notes: &[&str], hour: u32) -> ScheduleDocument {
        let mut doc = ScheduleDocument::new(RouteIdentifier::parse(identifier).unwrap());
        for (i, text) in notes.iter().enumerate() {
            let note = doc.register_note(text);
            let time = DepartureTime::from_hm(hour, i as u32).unwrap();
            doc.push_time("A", TimeEntry::new(time, Some(note)));
        }
        doc
    }

    fn documents() -> Vec<ScheduleDocument> {
        vec![
            document("30", &["x", "y"], 6),
            document("30(평일)", &["y", "z"], 7),
            document("30(주말)", &["z", "x", "w"], 8),
            document("31(주말)", &["x"], 9),
            document("31", &["q"], 10),
        ]
    }

    proptest! {
        /// Input order does not change the merged output
        #[test]
        fn merge_is_order_independent(shuffled in Just(documents()).prop_shuffle()) {
            let merger = ScheduleMerger::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
            let meta = BTreeMap::new();

            let expected = merger.merge(&documents(), &meta).unwrap();
            let actual = merger.merge(&shuffled, &meta).unwrap();

            prop_assert_eq!(
                serde_json::to_string(&expected).unwrap(),
                serde_json::to_string(&actual).unwrap()
            );
        }
    }
}
