//! Per-document and per-route schedule records.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::{
    DayType, DepartureTime, DirectionList, NoteId, NoteRegistry, RouteIdentifier, RouteNumber,
};

/// One departure in a direction's time list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeEntry {
    pub time: DepartureTime,
    #[serde(rename = "noteId", skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteId>,
}

impl TimeEntry {
    pub fn new(time: DepartureTime, note: Option<NoteId>) -> Self {
        Self { time, note }
    }
}

/// Parse result for one timetable page: one (route number, day type) pair.
///
/// Footnote ids inside refer to this document's own `notes`; they are
/// remapped when the document is merged into a route.
#[derive(Debug, Clone)]
pub struct ScheduleDocument {
    identifier: RouteIdentifier,
    day_type: DayType,
    directions: DirectionList,
    times: HashMap<String, Vec<TimeEntry>>,
    notes: NoteRegistry,
    departure_count: usize,
}

impl ScheduleDocument {
    /// An empty document for `identifier`, with the day type taken from
    /// its label.
    pub fn new(identifier: RouteIdentifier) -> Self {
        let day_type = identifier.day_type();
        Self {
            identifier,
            day_type,
            directions: DirectionList::new(),
            times: HashMap::new(),
            notes: NoteRegistry::new(),
            departure_count: 0,
        }
    }

    /// Replace the direction list; every direction gets an (initially
    /// empty) time list.
    pub fn set_directions(&mut self, directions: DirectionList) {
        for direction in directions.iter() {
            self.times.entry(direction.to_string()).or_default();
        }
        self.directions = directions;
    }

    /// Append a departure to a direction, registering the direction if new.
    pub fn push_time(&mut self, direction: &str, entry: TimeEntry) {
        self.directions.push(direction);
        self.times.entry(direction.to_string()).or_default().push(entry);
    }

    /// Register footnote text with this document's local notes.
    pub fn register_note(&mut self, text: &str) -> NoteId {
        self.notes.register(text)
    }

    pub(crate) fn set_departure_count(&mut self, count: usize) {
        self.departure_count = count;
    }

    pub fn identifier(&self) -> &RouteIdentifier {
        &self.identifier
    }

    pub fn route_number(&self) -> &RouteNumber {
        self.identifier.route_number()
    }

    pub fn day_type(&self) -> DayType {
        self.day_type
    }

    pub fn directions(&self) -> &DirectionList {
        &self.directions
    }

    /// Departures for a direction, in page order.
    pub fn times_for(&self, direction: &str) -> &[TimeEntry] {
        self.times.get(direction).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Directions paired with their departures, in direction order.
    pub fn times_by_direction(&self) -> impl Iterator<Item = (&str, &[TimeEntry])> {
        self.directions.iter().map(|d| (d, self.times_for(d)))
    }

    pub fn notes(&self) -> &NoteRegistry {
        &self.notes
    }

    /// Number of time-bearing cells found on the page, before direction
    /// assignment.
    pub fn departure_count(&self) -> usize {
        self.departure_count
    }

    /// Whether any direction received a departure.
    pub fn is_empty(&self) -> bool {
        self.times.values().all(Vec::is_empty)
    }
}

/// Hour-of-day bucket key, serialized zero-padded ("07").
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hour(u8);

impl Hour {
    pub fn of(time: &DepartureTime) -> Self {
        Self(time.hour() as u8)
    }

    pub fn new(hour: u8) -> Option<Self> {
        (hour < 24).then_some(Self(hour))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hour({:02})", self.0)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl Serialize for Hour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A departure within an hour bucket of a merged schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteEntry {
    /// Two-digit minute ("05").
    pub minute: String,
    #[serde(rename = "noteId", skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteId>,
}

/// Departures of one hour, keyed by direction in the route's direction
/// order.
pub type HourSlot = IndexMap<String, Vec<MinuteEntry>>;

/// One day type's schedule, keyed by hour.
pub type DaySchedule = BTreeMap<Hour, HourSlot>;

/// The persisted per-route record: every day type of one route number.
///
/// Only the merge step can build one, and a finished `MergedRoute` cannot
/// be added to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRoute {
    route_id: RouteNumber,
    route_name: String,
    description: String,
    last_updated: NaiveDate,
    directions: DirectionList,
    route_details: Vec<String>,
    featured_stops: BTreeMap<DayType, Vec<String>>,
    schedule: BTreeMap<DayType, DaySchedule>,
    notes: NoteRegistry,
}

impl MergedRoute {
    pub(crate) fn new(
        route_id: RouteNumber,
        description: String,
        directions: DirectionList,
        last_updated: NaiveDate,
    ) -> Self {
        Self {
            route_name: format!("{}번", route_id),
            route_id,
            description,
            last_updated,
            directions,
            route_details: Vec::new(),
            featured_stops: BTreeMap::from([(DayType::General, Vec::new())]),
            schedule: BTreeMap::new(),
            notes: NoteRegistry::new(),
        }
    }

    pub(crate) fn notes_mut(&mut self) -> &mut NoteRegistry {
        &mut self.notes
    }

    pub(crate) fn directions_mut(&mut self) -> &mut DirectionList {
        &mut self.directions
    }

    /// Make sure a day type appears, even if it has no departures.
    pub(crate) fn touch_day(&mut self, day_type: DayType) {
        self.schedule.entry(day_type).or_default();
    }

    pub(crate) fn push_minute(
        &mut self,
        day_type: DayType,
        hour: Hour,
        direction: &str,
        entry: MinuteEntry,
    ) {
        let directions = &self.directions;
        let rank = |label: &str| {
            directions
                .iter()
                .position(|d| d == label)
                .unwrap_or(usize::MAX)
        };

        let slot = self
            .schedule
            .entry(day_type)
            .or_default()
            .entry(hour)
            .or_default();

        if !slot.contains_key(direction) {
            let own = rank(direction);
            let index = slot.keys().take_while(|k| rank(k.as_str()) <= own).count();
            slot.shift_insert(index, direction.to_string(), Vec::new());
        }
        if let Some(minutes) = slot.get_mut(direction) {
            minutes.push(entry);
        }
    }

    pub fn route_id(&self) -> &RouteNumber {
        &self.route_id
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn last_updated(&self) -> NaiveDate {
        self.last_updated
    }

    pub fn directions(&self) -> &DirectionList {
        &self.directions
    }

    /// Free-form route details; the listing carries none.
    pub fn route_details(&self) -> &[String] {
        &self.route_details
    }

    /// Highlighted stops per day type; the listing carries none.
    pub fn featured_stops(&self) -> &BTreeMap<DayType, Vec<String>> {
        &self.featured_stops
    }

    pub fn schedule(&self) -> &BTreeMap<DayType, DaySchedule> {
        &self.schedule
    }

    pub fn day(&self, day_type: DayType) -> Option<&DaySchedule> {
        self.schedule.get(&day_type)
    }

    /// Departures for one (day type, hour, direction) cell, in page order.
    pub fn minutes(&self, day_type: DayType, hour: Hour, direction: &str) -> &[MinuteEntry] {
        self.schedule
            .get(&day_type)
            .and_then(|day| day.get(&hour))
            .and_then(|slot| slot.get(direction))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn notes(&self) -> &NoteRegistry {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> DepartureTime {
        DepartureTime::parse(s).unwrap()
    }

    #[test]
    fn document_takes_day_type_from_identifier() {
        let doc = ScheduleDocument::new(RouteIdentifier::parse("30(주말)").unwrap());
        assert_eq!(doc.day_type(), DayType::Weekend);
        assert_eq!(doc.route_number().as_str(), "30");
        assert!(doc.is_empty());
    }

    #[test]
    fn document_groups_times_by_direction() {
        let mut doc = ScheduleDocument::new(RouteIdentifier::parse("30").unwrap());
        doc.set_directions(DirectionList::from_labels(["A", "B"]));
        doc.push_time("B", TimeEntry::new(time("7:10"), None));
        doc.push_time("A", TimeEntry::new(time("7:05"), None));
        doc.push_time("A", TimeEntry::new(time("8:05"), None));

        let grouped: Vec<_> = doc
            .times_by_direction()
            .map(|(d, times)| (d, times.len()))
            .collect();
        assert_eq!(grouped, vec![("A", 2), ("B", 1)]);
        assert!(doc.times_for("C").is_empty());
    }

    #[test]
    fn time_entry_json_shape() {
        let mut notes = NoteRegistry::new();
        let id = notes.register("출근시간");

        let with_note = TimeEntry::new(time("7:05"), Some(id));
        assert_eq!(
            serde_json::to_string(&with_note).unwrap(),
            r#"{"time":"07:05","noteId":"1"}"#
        );

        let without = TimeEntry::new(time("7:05"), None);
        assert_eq!(
            serde_json::to_string(&without).unwrap(),
            r#"{"time":"07:05"}"#
        );
    }

    #[test]
    fn hour_bounds_and_display() {
        assert!(Hour::new(23).is_some());
        assert!(Hour::new(24).is_none());
        assert_eq!(Hour::of(&time("6:30")).to_string(), "06");
    }

    #[test]
    fn merged_route_json_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut route = MergedRoute::new(
            RouteNumber::new("30"),
            "A ↔ B".to_string(),
            DirectionList::from_labels(["A", "B"]),
            date,
        );
        let note = route.notes_mut().register("학교경유");
        route.push_minute(
            DayType::Weekday,
            Hour::new(7).unwrap(),
            "A",
            MinuteEntry {
                minute: "05".to_string(),
                note: Some(note),
            },
        );

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["routeId"], "30");
        assert_eq!(json["routeName"], "30번");
        assert_eq!(json["description"], "A ↔ B");
        assert_eq!(json["lastUpdated"], "2024-03-15");
        assert_eq!(json["directions"], serde_json::json!(["A", "B"]));
        assert_eq!(
            json["schedule"]["weekday"]["07"]["A"],
            serde_json::json!([{"minute": "05", "noteId": "1"}])
        );
        assert_eq!(json["notes"]["1"], "학교경유");
        assert_eq!(json["routeDetails"], serde_json::json!([]));
        assert_eq!(json["featuredStops"], serde_json::json!({"general": []}));
    }

    #[test]
    fn hour_slot_follows_direction_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut route = MergedRoute::new(
            RouteNumber::new("30"),
            String::new(),
            DirectionList::from_labels(["문막", "단구동", "귀래"]),
            date,
        );
        let minute = |m: &str| MinuteEntry {
            minute: m.to_string(),
            note: None,
        };
        let hour = Hour::new(6).unwrap();

        route.push_minute(DayType::General, hour, "귀래", minute("50"));
        route.push_minute(DayType::General, hour, "문막", minute("10"));
        route.push_minute(DayType::General, hour, "단구동", minute("40"));
        route.push_minute(DayType::General, hour, "문막", minute("30"));

        let slot = &route.day(DayType::General).unwrap()[&hour];
        assert_eq!(
            slot.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["문막", "단구동", "귀래"]
        );
        assert_eq!(route.minutes(DayType::General, hour, "문막").len(), 2);

        let json = serde_json::to_string(&route).unwrap();
        let first = json.find("\"문막\":[").unwrap();
        let second = json.find("\"단구동\":[").unwrap();
        let third = json.find("\"귀래\":[").unwrap();
        assert!(first < second && second < third);
    }
}
