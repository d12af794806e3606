//! PostgreSQL implementation of MaintenanceEventRepository.
//!
//! The partial unique index `maintenance_events_one_active_per_application`
//! rejects a second active event even when writers live in different
//! processes; that violation surfaces as `ErrorCode::ActiveEventConflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    ApplicationId, DomainError, ErrorCode, MaintenanceEventId, Timestamp,
};
use crate::domain::maintenance::{
    MaintenanceEvent, MaintenanceStatus, NewMaintenanceEvent, ACTIVE_STATUSES,
};
use crate::ports::MaintenanceEventRepository;

const EVENT_COLUMNS: &str =
    "id, application_id, status, scheduled_start, scheduled_end, started, ended, reason";

/// PostgreSQL implementation of MaintenanceEventRepository.
#[derive(Clone)]
pub struct PostgresMaintenanceEventRepository {
    pool: PgPool,
}

impl PostgresMaintenanceEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Maps a failed write, turning unique violations into conflicts that
    /// name the application.
    async fn write_error(&self, application_id: ApplicationId, err: sqlx::Error, op: &str) -> DomainError {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let name = self
                    .application_name(application_id)
                    .await
                    .unwrap_or_else(|| application_id.to_string());
                DomainError::new(
                    ErrorCode::ActiveEventConflict,
                    format!("Active event already exists for {}", name),
                )
                .with_detail("application", name)
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => DomainError::new(
                ErrorCode::ApplicationNotFound,
                format!("Application not found: {}", application_id),
            )
            .with_detail("id", application_id.to_string()),
            e => DomainError::database(op, e),
        }
    }

    async fn application_name(&self, id: ApplicationId) -> Option<String> {
        let row = sqlx::query("SELECT slug, tier FROM applications WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .ok()??;
        let slug: String = row.try_get("slug").ok()?;
        let tier: String = row.try_get("tier").ok()?;
        Some(format!("{} {}", slug, tier))
    }
}

#[async_trait]
impl MaintenanceEventRepository for PostgresMaintenanceEventRepository {
    async fn insert(
        &self,
        application_id: ApplicationId,
        event: &NewMaintenanceEvent,
    ) -> Result<MaintenanceEvent, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO maintenance_events (
                application_id, status, scheduled_start, scheduled_end, started, ended, reason
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let result = sqlx::query(&sql)
            .bind(application_id.as_i64())
            .bind(event.status.as_str())
            .bind(event.scheduled_start.map(|ts| *ts.as_datetime()))
            .bind(event.scheduled_end.map(|ts| *ts.as_datetime()))
            .bind(event.started.map(|ts| *ts.as_datetime()))
            .bind(event.ended.map(|ts| *ts.as_datetime()))
            .bind(event.reason.as_deref())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => row_to_event(row),
            Err(e) => Err(self.write_error(application_id, e, "insert maintenance event").await),
        }
    }

    async fn update(&self, event: &MaintenanceEvent) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE maintenance_events SET
                status = $2,
                scheduled_start = $3,
                scheduled_end = $4,
                started = $5,
                ended = $6,
                reason = $7
            WHERE id = $1
            "#,
        )
        .bind(event.id.as_i64())
        .bind(event.status.as_str())
        .bind(event.scheduled_start.map(|ts| *ts.as_datetime()))
        .bind(event.scheduled_end.map(|ts| *ts.as_datetime()))
        .bind(event.started.map(|ts| *ts.as_datetime()))
        .bind(event.ended.map(|ts| *ts.as_datetime()))
        .bind(event.reason.as_deref())
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                return Err(self
                    .write_error(event.application_id, e, "update maintenance event")
                    .await)
            }
        };

        if result.rows_affected() == 0 {
            return Err(event_not_found(event.id));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: MaintenanceEventId,
    ) -> Result<Option<MaintenanceEvent>, DomainError> {
        let sql = format!("SELECT {} FROM maintenance_events WHERE id = $1", EVENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch maintenance event", e))?;

        row.map(row_to_event).transpose()
    }

    async fn list(&self) -> Result<Vec<MaintenanceEvent>, DomainError> {
        let sql = format!("SELECT {} FROM maintenance_events ORDER BY id", EVENT_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("list maintenance events", e))?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn list_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, DomainError> {
        let sql = format!(
            "SELECT {} FROM maintenance_events WHERE application_id = $1 ORDER BY id",
            EVENT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(application_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("list maintenance events", e))?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn find_active(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<MaintenanceEvent>, DomainError> {
        let sql = format!(
            "SELECT {} FROM maintenance_events \
             WHERE application_id = $1 AND status = ANY($2) ORDER BY id",
            EVENT_COLUMNS
        );
        let active: Vec<&str> = ACTIVE_STATUSES.iter().map(|s| s.as_str()).collect();
        let rows = sqlx::query(&sql)
            .bind(application_id.as_i64())
            .bind(active)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch active maintenance events", e))?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn delete(&self, id: MaintenanceEventId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM maintenance_events WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("delete maintenance event", e))?;

        if result.rows_affected() == 0 {
            return Err(event_not_found(id));
        }
        Ok(())
    }
}

fn event_not_found(id: MaintenanceEventId) -> DomainError {
    DomainError::new(
        ErrorCode::MaintenanceEventNotFound,
        format!("Maintenance event not found: {}", id),
    )
    .with_detail("id", id.to_string())
}

fn timestamp(row: &sqlx::postgres::PgRow, column: &str) -> Result<Option<Timestamp>, DomainError> {
    let value: Option<DateTime<Utc>> = row
        .try_get(column)
        .map_err(|e| DomainError::database(&format!("get {}", column), e))?;
    Ok(value.map(Timestamp::from_datetime))
}

fn row_to_event(row: sqlx::postgres::PgRow) -> Result<MaintenanceEvent, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::database("get id", e))?;
    let application_id: i64 = row
        .try_get("application_id")
        .map_err(|e| DomainError::database("get application_id", e))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| DomainError::database("get status", e))?;
    let status: MaintenanceStatus = status.parse().map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid maintenance status: {}", status),
        )
    })?;
    let reason: Option<String> = row
        .try_get("reason")
        .map_err(|e| DomainError::database("get reason", e))?;

    Ok(MaintenanceEvent {
        id: MaintenanceEventId::new(id),
        application_id: ApplicationId::new(application_id),
        status,
        scheduled_start: timestamp(&row, "scheduled_start")?,
        scheduled_end: timestamp(&row, "scheduled_end")?,
        started: timestamp(&row, "started")?,
        ended: timestamp(&row, "ended")?,
        reason,
    })
}
