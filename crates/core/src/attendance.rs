//! Attendance record construction.
//!
//! A record is built once from a submitted detection count and the number of
//! students the lecture expected, stamped with the current UTC instant, and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// When `true`, over-detection (detected > expected) records zero absentees
/// instead of a negative count.
pub const CLAMP_ABSENT_TO_ZERO: bool = false;

/// Longest accepted identifier (classroom, module, lecture).
pub const MAX_NAME_LEN: usize = 256;

/// Largest accepted head count for a single lecture.
pub const MAX_COUNT: i64 = 1_000_000;

/// Submitted attendance counts for one lecture.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendanceLog {
    pub classroom_id: String,
    pub module_name: String,
    pub lecture_name: String,
    pub num_students_detected: i64,
    pub total_students_expected: i64,
}

/// A stored attendance record as it crosses the wire.
///
/// The storage surrogate key is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub classroom_id: String,
    pub module_name: String,
    pub lecture_name: String,
    pub timestamp: Timestamp,
    pub num_students_detected: i64,
    pub total_students_expected: i64,
    pub absent_students: i64,
}

/// `expected - detected`, negative when more students were detected than
/// expected unless [`CLAMP_ABSENT_TO_ZERO`] is set.
pub fn absent_students(total_students_expected: i64, num_students_detected: i64) -> i64 {
    let absent = total_students_expected - num_students_detected;
    if CLAMP_ABSENT_TO_ZERO {
        absent.max(0)
    } else {
        absent
    }
}

/// Reject empty or oversized identifiers and counts outside `0..=MAX_COUNT`.
pub fn validate_new_log(input: &NewAttendanceLog) -> Result<(), CoreError> {
    validate_name(&input.classroom_id, "classroom_id")?;
    validate_name(&input.module_name, "module_name")?;
    validate_name(&input.lecture_name, "lecture_name")?;
    validate_count(input.num_students_detected, "num_students_detected")?;
    validate_count(input.total_students_expected, "total_students_expected")?;
    Ok(())
}

fn validate_count(value: i64, field: &str) -> Result<(), CoreError> {
    if !(0..=MAX_COUNT).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between 0 and {MAX_COUNT}, got {value}"
        )));
    }
    Ok(())
}

fn validate_name(value: &str, field: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Build a record stamped with the current UTC instant.
pub fn build_log(input: NewAttendanceLog) -> AttendanceLog {
    build_log_at(input, chrono::Utc::now())
}

/// Build a record with an explicit timestamp.
pub fn build_log_at(input: NewAttendanceLog, timestamp: Timestamp) -> AttendanceLog {
    let absent = absent_students(input.total_students_expected, input.num_students_detected);
    AttendanceLog {
        classroom_id: input.classroom_id,
        module_name: input.module_name,
        lecture_name: input.lecture_name,
        timestamp,
        num_students_detected: input.num_students_detected,
        total_students_expected: input.total_students_expected,
        absent_students: absent,
    }
}
