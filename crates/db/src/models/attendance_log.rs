//! `attendance_logs` row model.

use rollcall_core::attendance::AttendanceLog;
use rollcall_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row of `attendance_logs`, including the surrogate key.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceLogRow {
    pub id: DbId,
    pub classroom_id: String,
    pub module_name: String,
    pub lecture_name: String,
    pub logged_at: Timestamp,
    pub num_students_detected: i64,
    pub total_students_expected: i64,
    pub absent_students: i64,
}

impl From<AttendanceLogRow> for AttendanceLog {
    fn from(row: AttendanceLogRow) -> Self {
        AttendanceLog {
            classroom_id: row.classroom_id,
            module_name: row.module_name,
            lecture_name: row.lecture_name,
            timestamp: row.logged_at,
            num_students_detected: row.num_students_detected,
            total_students_expected: row.total_students_expected,
            absent_students: row.absent_students,
        }
    }
}
