//! Milestone row model.

use managix_core::project::Milestone;
use managix_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `milestones` table.
#[derive(Debug, Clone, FromRow)]
pub struct MilestoneRow {
    pub project_id: DbId,
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
    pub completed: bool,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl From<MilestoneRow> for Milestone {
    fn from(row: MilestoneRow) -> Self {
        Milestone {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            deadline: row.deadline,
            completed: row.completed,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}
