//! Bus timetable extractor.
//!
//! Turns a transit authority's HTML timetable pages (irregular nested
//! tables, optional headers, free-text footnotes) into one canonical
//! schedule per route, keyed by day type, hour and direction.

pub mod config;
pub mod crawler;
pub mod domain;
pub mod extract;
pub mod html;
pub mod its;
pub mod output;
