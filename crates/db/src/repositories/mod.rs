//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod attendance_log_repo;

pub use attendance_log_repo::AttendanceLogRepo;
