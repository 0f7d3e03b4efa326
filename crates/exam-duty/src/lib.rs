//! Exam duty allocation: timetable generation, revision and invigilation walks, reports,
//! and the persisted session document.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
