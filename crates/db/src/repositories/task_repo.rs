//! Repository for the `tasks` table.

use managix_core::project::Task;
use managix_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::task::TaskRow;

const COLUMNS: &str =
    "project_id, id, title, description, completed, assignee_id, created_at, completed_at";

pub struct TaskRepo;

impl TaskRepo {
    /// All tasks of a project in id order.
    pub async fn list_by_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Insert the task, or overwrite the existing row with the same
    /// `(project_id, id)`.
    pub async fn upsert<'e>(executor: impl PgExecutor<'e>, task: &Task) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tasks
                (project_id, id, title, description, completed, assignee_id, created_at, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (project_id, id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                completed = EXCLUDED.completed,
                assignee_id = EXCLUDED.assignee_id,
                completed_at = EXCLUDED.completed_at",
        )
        .bind(task.project_id)
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.assignee_id)
        .bind(task.created_at)
        .bind(task.completed_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Delete the project's tasks whose ids are not in `keep`.
    pub async fn delete_except<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        keep: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM tasks WHERE project_id = $1 AND NOT (id = ANY($2))")
                .bind(project_id)
                .bind(keep)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
