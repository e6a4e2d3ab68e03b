//! Repository for the `attendance_logs` table.

use rollcall_core::attendance::AttendanceLog;
use sqlx::PgPool;

use crate::models::attendance_log::AttendanceLogRow;

/// Column list for `attendance_logs` SELECT queries.
const COLUMNS: &str = "\
    id, classroom_id, module_name, lecture_name, logged_at, \
    num_students_detected, total_students_expected, absent_students";

/// Column list for INSERT (excludes auto-generated `id`).
const INSERT_COLUMNS: &str = "\
    classroom_id, module_name, lecture_name, logged_at, \
    num_students_detected, total_students_expected, absent_students";

/// Append-only access to attendance records.
pub struct AttendanceLogRepo;

impl AttendanceLogRepo {
    /// Append one record.
    pub async fn insert(pool: &PgPool, log: &AttendanceLog) -> Result<AttendanceLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_logs ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceLogRow>(&query)
            .bind(&log.classroom_id)
            .bind(&log.module_name)
            .bind(&log.lecture_name)
            .bind(log.timestamp)
            .bind(log.num_students_detected)
            .bind(log.total_students_expected)
            .bind(log.absent_students)
            .fetch_one(pool)
            .await
    }

    /// Records for one classroom, newest first.
    pub async fn list_by_classroom(
        pool: &PgPool,
        classroom_id: &str,
    ) -> Result<Vec<AttendanceLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_logs \
             WHERE classroom_id = $1 \
             ORDER BY logged_at DESC, id DESC"
        );
        sqlx::query_as::<_, AttendanceLogRow>(&query)
            .bind(classroom_id)
            .fetch_all(pool)
            .await
    }

    /// Records for one subject, newest first.
    pub async fn list_by_module(
        pool: &PgPool,
        module_name: &str,
    ) -> Result<Vec<AttendanceLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_logs \
             WHERE module_name = $1 \
             ORDER BY logged_at DESC, id DESC"
        );
        sqlx::query_as::<_, AttendanceLogRow>(&query)
            .bind(module_name)
            .fetch_all(pool)
            .await
    }

    /// Distinct subject names, alphabetical.
    pub async fn list_modules(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT module_name FROM attendance_logs ORDER BY module_name",
        )
        .fetch_all(pool)
        .await
    }
}
