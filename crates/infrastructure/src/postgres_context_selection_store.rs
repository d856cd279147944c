use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use presensi_application::{ContextSelectionStore, ContextSessionId};
use presensi_core::{AppError, AppResult, EmployeeId};
use presensi_domain::{ActiveContextSelection, AssignmentId};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed selection store.
///
/// Rows expire after the session inactivity window; every read or write
/// slides the expiry forward.
#[derive(Clone)]
pub struct PostgresContextSelectionStore {
    pool: PgPool,
    ttl: Duration,
}

#[derive(Debug, FromRow)]
struct SelectionRow {
    employee_id: i64,
    selected_assignment_id: Option<i64>,
    updated_at: DateTime<Utc>,
}

impl From<SelectionRow> for ActiveContextSelection {
    fn from(row: SelectionRow) -> Self {
        ActiveContextSelection::new(
            EmployeeId::new(row.employee_id),
            row.selected_assignment_id.map(AssignmentId::new),
            row.updated_at,
        )
    }
}

impl PostgresContextSelectionStore {
    /// Creates a store with the provided connection pool and row lifetime.
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.ttl
    }

    /// Deletes rows whose session went idle past the expiry.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM active_context_selections
            WHERE expires_at <= now()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to purge expired context selections: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ContextSelectionStore for PostgresContextSelectionStore {
    async fn find_selection(
        &self,
        session_id: ContextSessionId,
    ) -> AppResult<Option<ActiveContextSelection>> {
        let row = sqlx::query_as::<_, SelectionRow>(
            r#"
            UPDATE active_context_selections
            SET expires_at = $2
            WHERE session_id = $1 AND expires_at > now()
            RETURNING employee_id, selected_assignment_id, updated_at
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(self.expires_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load context selection: {error}"))
        })?;

        Ok(row.map(ActiveContextSelection::from))
    }

    async fn initialize_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<ActiveContextSelection> {
        // An expired row counts as absent and is overwritten.
        sqlx::query(
            r#"
            INSERT INTO active_context_selections (
                session_id,
                employee_id,
                selected_assignment_id,
                updated_at,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id) DO UPDATE
            SET employee_id = EXCLUDED.employee_id,
                selected_assignment_id = EXCLUDED.selected_assignment_id,
                updated_at = EXCLUDED.updated_at,
                expires_at = EXCLUDED.expires_at
            WHERE active_context_selections.expires_at <= now()
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(selection.employee_id().as_i64())
        .bind(selection.selected_assignment_id().map(|id| id.as_i64()))
        .bind(selection.updated_at())
        .bind(self.expires_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to initialise context selection: {error}"))
        })?;

        self.find_selection(session_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "context selection for session '{session_id}' vanished after initialisation"
            ))
        })
    }

    async fn save_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO active_context_selections (
                session_id,
                employee_id,
                selected_assignment_id,
                updated_at,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id) DO UPDATE
            SET employee_id = EXCLUDED.employee_id,
                selected_assignment_id = EXCLUDED.selected_assignment_id,
                updated_at = EXCLUDED.updated_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(selection.employee_id().as_i64())
        .bind(selection.selected_assignment_id().map(|id| id.as_i64()))
        .bind(selection.updated_at())
        .bind(self.expires_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save context selection: {error}"))
        })?;

        Ok(())
    }

    async fn delete_selection(&self, session_id: ContextSessionId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM active_context_selections
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete context selection: {error}"))
        })?;

        Ok(())
    }
}
