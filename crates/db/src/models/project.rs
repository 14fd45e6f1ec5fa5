//! Project row model.

use managix_core::error::CoreError;
use managix_core::project::{Project, ProjectStatus};
use managix_core::types::{Cents, DbId, Timestamp};
use sqlx::FromRow;

use super::corrupt_row;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Timestamp,
    pub budget_cents: Cents,
    pub status: String,
    pub is_closed: bool,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub version: i64,
}

impl TryFrom<ProjectRow> for Project {
    type Error = CoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status =
            ProjectStatus::from_str_value(&row.status).map_err(|e| corrupt_row("projects", e))?;
        Ok(Project {
            id: row.id,
            title: row.title,
            description: row.description,
            deadline: row.deadline,
            budget_cents: row.budget_cents,
            status,
            is_closed: row.is_closed,
            created_by: row.created_by,
            created_at: row.created_at,
            version: row.version,
        })
    }
}
