//! Domain logic shared by the pipeline, persistence and HTTP crates.
//!
//! Everything in here is pure: no I/O, no async. Attendance records are
//! built here, and the analytics projections over stored records live here
//! so they can be tested without a database.

pub mod analytics;
pub mod attendance;
pub mod data_url;
pub mod error;
pub mod types;
