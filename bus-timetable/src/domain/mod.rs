//! Domain types for the timetable extractor.
//!
//! Everything here is validated at construction time: a `DepartureTime`
//! is always a real HH:MM value, a `DayType` is one of the three canonical
//! keys, and a `DirectionColumnMap` never maps its notes column.

mod day_type;
mod direction;
mod note;
mod route;
mod schedule;
mod time;

pub use day_type::DayType;
pub use direction::{DirectionColumnMap, DirectionList};
pub use note::{NoteId, NoteRegistry};
pub use route::{InvalidRouteIdentifier, RouteIdentifier, RouteMetadata, RouteNumber};
pub use schedule::{
    DaySchedule, Hour, HourSlot, MergedRoute, MinuteEntry, ScheduleDocument, TimeEntry,
};
pub use time::{DEPARTURE_MARKER, DepartureTime, TimeError};
