//! Repository for the `milestones` table.

use managix_core::project::Milestone;
use managix_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::milestone::MilestoneRow;

const COLUMNS: &str =
    "project_id, id, title, description, deadline, completed, created_at, completed_at";

pub struct MilestoneRepo;

impl MilestoneRepo {
    pub async fn list_by_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<Vec<MilestoneRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        milestone: &Milestone,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO milestones
                (project_id, id, title, description, deadline, completed, created_at, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (project_id, id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                deadline = EXCLUDED.deadline,
                completed = EXCLUDED.completed,
                completed_at = EXCLUDED.completed_at",
        )
        .bind(milestone.project_id)
        .bind(milestone.id)
        .bind(&milestone.title)
        .bind(&milestone.description)
        .bind(milestone.deadline)
        .bind(milestone.completed)
        .bind(milestone.created_at)
        .bind(milestone.completed_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Delete the project's milestones whose ids are not in `keep`.
    pub async fn delete_except<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        keep: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM milestones WHERE project_id = $1 AND NOT (id = ANY($2))")
                .bind(project_id)
                .bind(keep)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
