//! Writes merged routes as JSON files, one per route.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::domain::{MergedRoute, RouteNumber};

/// Subdirectory of the output directory holding schedule files.
pub const SCHEDULES_DIR: &str = "schedules";

/// Errors from writing schedule files.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Directory creation or file write failed
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed
    #[error("failed to serialize route {route}: {message}")]
    Json { route: String, message: String },
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\-]").expect("file name pattern is a valid regex"))
}

/// File name for a route: unsafe characters become `_`.
///
/// # Examples
///
/// ```
/// use bus_timetable::domain::RouteNumber;
/// use bus_timetable::output::file_name;
///
/// assert_eq!(file_name(&RouteNumber::new("34-1")), "34-1.json");
/// assert_eq!(file_name(&RouteNumber::new("좌석/급행")), "좌석_급행.json");
/// ```
pub fn file_name(route: &RouteNumber) -> String {
    format!("{}.json", unsafe_chars().replace_all(route.as_str(), "_"))
}

/// Writes `MergedRoute`s into `<output>/schedules/`.
#[derive(Debug, Clone)]
pub struct ScheduleWriter {
    dir: PathBuf,
}

impl ScheduleWriter {
    /// A writer for the given output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: output_dir.as_ref().join(SCHEDULES_DIR),
        }
    }

    /// Directory the schedule files go to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one route, creating the directory if needed.
    ///
    /// Returns the path written. An existing file for the route is
    /// replaced.
    pub fn write(&self, route: &MergedRoute) -> Result<PathBuf, WriteError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| WriteError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let json = to_pretty_json(route).map_err(|e| WriteError::Json {
            route: route.route_id().to_string(),
            message: e.to_string(),
        })?;

        let path = self.dir.join(file_name(route.route_id()));
        std::fs::write(&path, json).map_err(|source| WriteError::Io {
            path: path.display().to_string(),
            source,
        })?;

        info!(route = %route.route_id(), path = %path.display(), "saved schedule");
        Ok(path)
    }

    /// Write every route, stopping at the first failure.
    pub fn write_all<'a>(
        &self,
        routes: impl IntoIterator<Item = &'a MergedRoute>,
    ) -> Result<Vec<PathBuf>, WriteError> {
        routes.into_iter().map(|r| self.write(r)).collect()
    }
}

/// Serialize with four-space indentation, non-ASCII left as-is.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
