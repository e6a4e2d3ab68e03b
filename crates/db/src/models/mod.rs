//! Row structs for the attendance tables.

pub mod attendance_log;
