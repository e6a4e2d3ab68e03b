//! Per-subject attendance analytics.
//!
//! Two read-only projections over the stored records of one subject
//! (`module_name`): a summary and a per-lecture trend series. Both are
//! recomputed from the current records on every query.
//!
//! The average and the totals deliberately disagree about lectures that
//! expected nobody: such lectures are left out of the average but still
//! counted in the totals. The two policy constants below make that a
//! one-line change.

use serde::Serialize;

use crate::attendance::AttendanceLog;
use crate::error::CoreError;

/// Leave lectures with `total_students_expected == 0` out of the average
/// (neither numerator nor denominator).
pub const EXCLUDE_ZERO_EXPECTED_FROM_AVERAGE: bool = true;

/// Leave lectures with `total_students_expected == 0` out of
/// `total_detected` / `total_expected`.
pub const EXCLUDE_ZERO_EXPECTED_FROM_TOTALS: bool = false;

/// Percentages are reported with this many decimal places.
pub const PERCENT_DECIMALS: i32 = 2;

/// Aggregate statistics for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub total_lectures: usize,
    pub average_attendance: f64,
    pub total_detected: i64,
    pub total_expected: i64,
}

/// One point of the attendance trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub attendance: f64,
}

/// Round half away from zero to [`PERCENT_DECIMALS`] places.
pub fn round_percent(value: f64) -> f64 {
    let scale = 10f64.powi(PERCENT_DECIMALS);
    (value * scale).round() / scale
}

/// Unrounded attendance rate in percent. `None` when nobody was expected.
pub fn attendance_rate(log: &AttendanceLog) -> Option<f64> {
    if log.total_students_expected > 0 {
        Some(log.num_students_detected as f64 / log.total_students_expected as f64 * 100.0)
    } else {
        None
    }
}

/// Summarize every record of `subject`.
///
/// Fails with [`CoreError::NotFound`] when there are no records, rather than
/// reporting an average over nothing, and with [`CoreError::Internal`] if a
/// running total overflows.
pub fn summarize(subject: &str, logs: &[AttendanceLog]) -> Result<SubjectSummary, CoreError> {
    if logs.is_empty() {
        return Err(CoreError::NotFound {
            entity: "Attendance logs for subject",
            key: subject.to_string(),
        });
    }

    let rates: Vec<f64> = logs
        .iter()
        .filter_map(|log| match attendance_rate(log) {
            Some(rate) => Some(rate),
            None if EXCLUDE_ZERO_EXPECTED_FROM_AVERAGE => None,
            None => Some(0.0),
        })
        .collect();

    let average_attendance = if rates.is_empty() {
        0.0
    } else {
        round_percent(rates.iter().sum::<f64>() / rates.len() as f64)
    };

    let counted = logs
        .iter()
        .filter(|log| !EXCLUDE_ZERO_EXPECTED_FROM_TOTALS || log.total_students_expected > 0);
    let mut total_detected: i64 = 0;
    let mut total_expected: i64 = 0;
    for log in counted {
        total_detected = total_detected
            .checked_add(log.num_students_detected)
            .ok_or_else(|| overflow(subject, "detected"))?;
        total_expected = total_expected
            .checked_add(log.total_students_expected)
            .ok_or_else(|| overflow(subject, "expected"))?;
    }

    Ok(SubjectSummary {
        subject: subject.to_string(),
        total_lectures: logs.len(),
        average_attendance,
        total_detected,
        total_expected,
    })
}

fn overflow(subject: &str, which: &str) -> CoreError {
    CoreError::Internal(format!("{which} total overflowed for subject {subject}"))
}

/// Attendance trend, oldest first, one point per lecture that expected
/// anyone. Lectures on the same day stay separate points.
pub fn trend(logs: &[AttendanceLog]) -> Vec<ChartPoint> {
    let mut ordered: Vec<&AttendanceLog> = logs.iter().collect();
    ordered.sort_by_key(|log| log.timestamp);

    ordered
        .into_iter()
        .filter_map(|log| {
            attendance_rate(log).map(|rate| ChartPoint {
                date: log.timestamp.date_naive().format("%Y-%m-%d").to_string(),
                attendance: round_percent(rate),
            })
        })
        .collect()
}
