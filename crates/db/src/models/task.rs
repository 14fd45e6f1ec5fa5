//! Task row model.

use managix_core::project::Task;
use managix_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub project_id: DbId,
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub assignee_id: Option<DbId>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            assignee_id: row.assignee_id,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}
