//! Schedule extraction and normalization.
//!
//! Pure, synchronous functions over already-fetched pages:
//!
//! - `listing` turns the listing page into route metadata and the list of
//!   timetable pages to fetch;
//! - `detail` turns one timetable page into a `ScheduleDocument`;
//! - `merge` folds the documents of each route into a `MergedRoute`.
//!
//! Nothing here performs I/O, so detail pages can be parsed in parallel;
//! merging is the single join point.

mod detail;
mod listing;
mod merge;

pub use detail::{NOTES_LABEL, parse_schedule, resolve_headers, select_table};
pub use listing::{RouteIndex, extract_route_index};
pub use merge::{MergeError, RouteBuilder, ScheduleMerger, day_types};
