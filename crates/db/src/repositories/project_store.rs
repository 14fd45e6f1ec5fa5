//! Postgres-backed [`ProjectStore`].
//!
//! A save writes the project root and every task and milestone in one
//! transaction, and deletes child rows the aggregate no longer holds. The
//! root update is conditional on the loaded version, so a concurrent save
//! makes it match zero rows and the whole transaction is rolled back.

use async_trait::async_trait;
use managix_core::error::CoreError;
use managix_core::project::{Milestone, NewProject, Project, ProjectAggregate, Task};
use managix_core::store::ProjectStore;
use managix_core::types::{DbId, Timestamp};

use crate::repositories::{MilestoneRepo, ProjectRepo, TaskRepo};
use crate::DbPool;

/// Log a database failure and hide it behind `CoreError::Internal`.
fn db_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}

#[derive(Clone)]
pub struct PgProjectStore {
    pool: DbPool,
}

impl PgProjectStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn load_project_aggregate(&self, id: DbId) -> Result<ProjectAggregate, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        // Read the root and its children from one snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let row = ProjectRepo::find_by_id(&mut *tx, id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })?;
        let tasks = TaskRepo::list_by_project(&mut *tx, id)
            .await
            .map_err(db_error)?;
        let milestones = MilestoneRepo::list_by_project(&mut *tx, id)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        ProjectAggregate::from_parts(
            Project::try_from(row)?,
            tasks.into_iter().map(Task::from),
            milestones.into_iter().map(Milestone::from),
        )
    }

    async fn save_project_aggregate(
        &self,
        aggregate: &ProjectAggregate,
    ) -> Result<ProjectAggregate, CoreError> {
        let project_id = aggregate.id();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let updated = ProjectRepo::update_if_version(&mut *tx, &aggregate.project)
            .await
            .map_err(db_error)?;
        if !updated {
            let exists = ProjectRepo::exists(&mut *tx, project_id)
                .await
                .map_err(db_error)?;
            // Dropping `tx` rolls back.
            return Err(if exists {
                CoreError::ConcurrencyConflict {
                    project_id,
                    expected_version: aggregate.project.version,
                }
            } else {
                CoreError::NotFound {
                    entity: "Project",
                    id: project_id,
                }
            });
        }

        let task_ids: Vec<DbId> = aggregate.tasks.keys().copied().collect();
        let milestone_ids: Vec<DbId> = aggregate.milestones.keys().copied().collect();
        TaskRepo::delete_except(&mut *tx, project_id, &task_ids)
            .await
            .map_err(db_error)?;
        MilestoneRepo::delete_except(&mut *tx, project_id, &milestone_ids)
            .await
            .map_err(db_error)?;

        for task in aggregate.tasks.values() {
            TaskRepo::upsert(&mut *tx, task).await.map_err(db_error)?;
        }
        for milestone in aggregate.milestones.values() {
            MilestoneRepo::upsert(&mut *tx, milestone)
                .await
                .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)?;

        let mut saved = aggregate.clone();
        saved.project.version += 1;
        tracing::debug!(project_id, version = saved.project.version, "Project saved");
        Ok(saved)
    }

    async fn insert_project(
        &self,
        input: &NewProject,
        created_by: DbId,
        now: Timestamp,
    ) -> Result<Project, CoreError> {
        let row = ProjectRepo::create(&self.pool, input, created_by, now)
            .await
            .map_err(db_error)?;
        Project::try_from(row)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        ProjectRepo::list(&self.pool)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }
}
