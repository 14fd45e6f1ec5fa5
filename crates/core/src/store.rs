//! Persistence collaborator for project aggregates.
//!
//! [`ProjectStore`] is the seam between the engine and whatever storage the
//! host uses. Every save is version-checked: a store must refuse to save an
//! aggregate whose `project.version` no longer matches the stored one and
//! report [`CoreError::ConcurrencyConflict`] instead.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::project::{NewProject, Project, ProjectAggregate, ProjectStatus};
use crate::types::{DbId, Timestamp};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Load a project with all of its tasks and milestones.
    async fn load_project_aggregate(&self, id: DbId) -> Result<ProjectAggregate, CoreError>;

    /// Persist the aggregate if its version still matches the stored one.
    ///
    /// Returns the saved aggregate with its version bumped by one.
    async fn save_project_aggregate(
        &self,
        aggregate: &ProjectAggregate,
    ) -> Result<ProjectAggregate, CoreError>;

    /// Insert a new project in `new` status with no work items.
    async fn insert_project(
        &self,
        input: &NewProject,
        created_by: DbId,
        now: Timestamp,
    ) -> Result<Project, CoreError>;

    /// List project roots, most recently created first.
    async fn list_projects(&self) -> Result<Vec<Project>, CoreError>;
}

/// Build the root row for a freshly created project.
pub fn new_project_root(id: DbId, input: &NewProject, created_by: DbId, now: Timestamp) -> Project {
    Project {
        id,
        title: input.title.trim().to_string(),
        description: input.description.clone(),
        deadline: input.deadline,
        budget_cents: input.budget_cents,
        status: ProjectStatus::New,
        is_closed: false,
        created_by,
        created_at: now,
        version: 1,
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    next_id: DbId,
    projects: HashMap<DbId, ProjectAggregate>,
}

/// Process-local store used in development mode and in tests.
#[derive(Default)]
pub struct InMemoryProjectStore {
    inner: RwLock<Inner>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fully built aggregate, replacing any existing one with the same id.
    pub async fn seed(&self, aggregate: ProjectAggregate) {
        let mut inner = self.inner.write().await;
        inner.next_id = inner.next_id.max(aggregate.id());
        inner.projects.insert(aggregate.id(), aggregate);
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn load_project_aggregate(&self, id: DbId) -> Result<ProjectAggregate, CoreError> {
        let inner = self.inner.read().await;
        inner.projects.get(&id).cloned().ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })
    }

    async fn save_project_aggregate(
        &self,
        aggregate: &ProjectAggregate,
    ) -> Result<ProjectAggregate, CoreError> {
        let mut inner = self.inner.write().await;
        let id = aggregate.id();
        let stored = inner.projects.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;

        if stored.project.version != aggregate.project.version {
            return Err(CoreError::ConcurrencyConflict {
                project_id: id,
                expected_version: aggregate.project.version,
            });
        }

        let mut saved = aggregate.clone();
        saved.project.version += 1;
        *stored = saved.clone();
        Ok(saved)
    }

    async fn insert_project(
        &self,
        input: &NewProject,
        created_by: DbId,
        now: Timestamp,
    ) -> Result<Project, CoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let project = new_project_root(inner.next_id, input, created_by, now);
        let aggregate = ProjectAggregate::from_parts(project.clone(), Vec::new(), Vec::new())?;
        inner.projects.insert(project.id, aggregate);
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .map(|a| a.project.clone())
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
