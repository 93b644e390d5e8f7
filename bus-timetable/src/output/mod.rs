//! Persistence of merged routes.

mod writer;

pub use writer::{SCHEDULES_DIR, ScheduleWriter, WriteError, file_name};
