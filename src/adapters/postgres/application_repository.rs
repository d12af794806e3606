//! PostgreSQL implementation of ApplicationRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{ApplicationId, DomainError, ErrorCode};
use crate::domain::maintenance::{Application, NewApplication};
use crate::ports::ApplicationRepository;

/// PostgreSQL implementation of ApplicationRepository.
#[derive(Clone)]
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn insert(&self, application: &NewApplication) -> Result<Application, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO applications (slug, tier)
            VALUES ($1, $2)
            RETURNING id, slug, tier
            "#,
        )
        .bind(&application.slug)
        .bind(&application.tier)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_application(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::new(
                    ErrorCode::Conflict,
                    format!(
                        "Application already exists: {} {}",
                        application.slug, application.tier
                    ),
                )
                .with_detail("slug", application.slug.clone())
                .with_detail("tier", application.tier.clone()))
            }
            Err(e) => Err(DomainError::database("insert application", e)),
        }
    }

    async fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, DomainError> {
        let row = sqlx::query("SELECT id, slug, tier FROM applications WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch application", e))?;

        row.map(row_to_application).transpose()
    }

    async fn find_by_slug_and_tier(
        &self,
        slug: &str,
        tier: &str,
    ) -> Result<Option<Application>, DomainError> {
        let row = sqlx::query("SELECT id, slug, tier FROM applications WHERE slug = $1 AND tier = $2")
            .bind(slug)
            .bind(tier)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch application by route", e))?;

        row.map(row_to_application).transpose()
    }

    async fn list(&self) -> Result<Vec<Application>, DomainError> {
        let rows = sqlx::query("SELECT id, slug, tier FROM applications ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("list applications", e))?;

        rows.into_iter().map(row_to_application).collect()
    }

    async fn delete(&self, id: ApplicationId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("delete application", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ApplicationNotFound,
                format!("Application not found: {}", id),
            )
            .with_detail("id", id.to_string()));
        }
        Ok(())
    }
}

fn row_to_application(row: sqlx::postgres::PgRow) -> Result<Application, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::database("get id", e))?;
    let slug: String = row
        .try_get("slug")
        .map_err(|e| DomainError::database("get slug", e))?;
    let tier: String = row
        .try_get("tier")
        .map_err(|e| DomainError::database("get tier", e))?;

    Ok(Application {
        id: ApplicationId::new(id),
        slug,
        tier,
    })
}
