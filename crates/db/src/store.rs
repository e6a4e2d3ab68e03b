//! The append/query seam between request handlers and persistence.
//!
//! Handlers hold an `Arc<dyn AttendanceStore>` built once at startup.
//! Implementations must be safe to share across requests: the Postgres store
//! goes through the connection pool, the in-memory store through an async
//! `RwLock`. Records are only ever appended, never updated in place.

use std::collections::BTreeSet;

use async_trait::async_trait;
use rollcall_core::attendance::AttendanceLog;
use tokio::sync::RwLock;

use crate::repositories::AttendanceLogRepo;
use crate::{DbPool, StoreError};

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Append one record. Identical records are stored twice.
    async fn append(&self, log: &AttendanceLog) -> Result<(), StoreError>;

    /// Records for one classroom, newest first.
    async fn list_by_classroom(&self, classroom_id: &str) -> Result<Vec<AttendanceLog>, StoreError>;

    /// Records for one subject (`module_name`), newest first.
    async fn list_by_subject(&self, module_name: &str) -> Result<Vec<AttendanceLog>, StoreError>;

    /// Distinct subject names, alphabetical.
    async fn list_subjects(&self) -> Result<Vec<String>, StoreError>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// Store backed by the `attendance_logs` table.
#[derive(Clone)]
pub struct PgAttendanceStore {
    pool: DbPool,
}

impl PgAttendanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn append(&self, log: &AttendanceLog) -> Result<(), StoreError> {
        let row = AttendanceLogRepo::insert(&self.pool, log).await?;
        tracing::debug!(id = row.id, classroom_id = %row.classroom_id, "Attendance log inserted");
        Ok(())
    }

    async fn list_by_classroom(&self, classroom_id: &str) -> Result<Vec<AttendanceLog>, StoreError> {
        let rows = AttendanceLogRepo::list_by_classroom(&self.pool, classroom_id).await?;
        Ok(rows.into_iter().map(AttendanceLog::from).collect())
    }

    async fn list_by_subject(&self, module_name: &str) -> Result<Vec<AttendanceLog>, StoreError> {
        let rows = AttendanceLogRepo::list_by_module(&self.pool, module_name).await?;
        Ok(rows.into_iter().map(AttendanceLog::from).collect())
    }

    async fn list_subjects(&self) -> Result<Vec<String>, StoreError> {
        Ok(AttendanceLogRepo::list_modules(&self.pool).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local store, used when no `DATABASE_URL` is configured and in tests.
#[derive(Default)]
pub struct MemoryAttendanceStore {
    logs: RwLock<Vec<AttendanceLog>>,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first; among equal timestamps the later insert comes first.
    async fn newest_first<F>(&self, keep: F) -> Vec<AttendanceLog>
    where
        F: Fn(&AttendanceLog) -> bool,
    {
        let logs = self.logs.read().await;
        let mut matched: Vec<AttendanceLog> =
            logs.iter().rev().filter(|log| keep(log)).cloned().collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn append(&self, log: &AttendanceLog) -> Result<(), StoreError> {
        self.logs.write().await.push(log.clone());
        Ok(())
    }

    async fn list_by_classroom(&self, classroom_id: &str) -> Result<Vec<AttendanceLog>, StoreError> {
        Ok(self.newest_first(|log| log.classroom_id == classroom_id).await)
    }

    async fn list_by_subject(&self, module_name: &str) -> Result<Vec<AttendanceLog>, StoreError> {
        Ok(self.newest_first(|log| log.module_name == module_name).await)
    }

    async fn list_subjects(&self) -> Result<Vec<String>, StoreError> {
        let logs = self.logs.read().await;
        let subjects: BTreeSet<&str> = logs.iter().map(|log| log.module_name.as_str()).collect();
        Ok(subjects.into_iter().map(str::to_string).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
