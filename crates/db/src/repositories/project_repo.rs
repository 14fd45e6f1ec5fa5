//! Repository for the `projects` table.

use managix_core::project::{NewProject, Project};
use managix_core::types::{DbId, Timestamp};
use sqlx::PgExecutor;

use crate::models::project::ProjectRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, deadline, budget_cents, status, is_closed, \
                       created_by, created_at, version";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `new` status at version 1.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewProject,
        created_by: DbId,
        now: Timestamp,
    ) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, description, deadline, budget_cents, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.deadline)
            .bind(input.budget_cents)
            .bind(created_by)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all projects ordered by most recently created first.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(executor)
            .await
    }

    /// Overwrite the project root if its stored version is still
    /// `project.version`, bumping the version by one.
    ///
    /// Returns `false` when no row matched (missing or concurrently modified).
    pub async fn update_if_version<'e>(
        executor: impl PgExecutor<'e>,
        project: &Project,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET
                title = $3,
                description = $4,
                deadline = $5,
                budget_cents = $6,
                status = $7,
                is_closed = $8,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $2",
        )
        .bind(project.id)
        .bind(project.version)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.deadline)
        .bind(project.budget_cents)
        .bind(project.status.as_str())
        .bind(project.is_closed)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether a project row exists, regardless of version.
    pub async fn exists<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }
}
