//! Engine facade: the use cases the host application calls.
//!
//! Every mutating use case follows the same shape:
//!
//! 1. load the aggregate from the [`ProjectStore`],
//! 2. run the authorization gate (a denial returns before anything changes),
//! 3. apply the change to a working copy, recomputing progress where the
//!    lifecycle depends on it,
//! 4. check invariants and save with the loaded version.
//!
//! A concurrent write surfaces as [`CoreError::ConcurrencyConflict`]; the
//! engine never retries or merges. The caller reloads and reapplies.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::authorization::{authorize, authorize_project_creation, Decision, Operation};
use crate::dashboard::{
    compute_assignee_performance, compute_dashboard, AssigneePerformance, ProjectDashboard,
};
use crate::error::CoreError;
use crate::lifecycle::{apply_transition, ensure_work_items_mutable};
use crate::project::{
    apply_milestone_update, apply_project_update, validate_milestone_update,
    validate_new_project, validate_project_update, validate_title, Milestone, MilestoneUpdate,
    NewMilestone, NewProject, NewTask, Project, ProjectAggregate, ProjectStatus, ProjectUpdate,
    Task,
};
use crate::roles::User;
use crate::store::ProjectStore;
use crate::types::DbId;

/// Facade over a [`ProjectStore`]. Cheap to clone.
pub struct ProjectEngine<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ProjectEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Run the gate and log denials.
fn gate(user: &User, operation: Operation, project: &Project) -> Result<(), CoreError> {
    let decision = authorize(user, operation, project);
    if let Decision::Denied(reason) = decision {
        tracing::warn!(
            project_id = project.id,
            user_id = user.id,
            role = %user.role,
            operation = operation.name(),
            reason = reason.as_str(),
            "Operation denied"
        );
    }
    decision.into_result()
}

impl<S: ProjectStore + ?Sized> ProjectEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn commit(&self, aggregate: ProjectAggregate) -> Result<ProjectAggregate, CoreError> {
        aggregate.check_invariants()?;
        self.store.save_project_aggregate(&aggregate).await
    }

    // -- Reads ------------------------------------------------------------

    pub async fn get_project(&self, project_id: DbId) -> Result<ProjectAggregate, CoreError> {
        self.store.load_project_aggregate(project_id).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        self.store.list_projects().await
    }

    /// Regenerate the dashboard from the project's current work items.
    pub async fn get_dashboard(&self, project_id: DbId) -> Result<ProjectDashboard, CoreError> {
        let aggregate = self.store.load_project_aggregate(project_id).await?;
        Ok(compute_dashboard(&aggregate))
    }

    pub async fn get_assignee_performance(
        &self,
        project_id: DbId,
    ) -> Result<Vec<AssigneePerformance>, CoreError> {
        let aggregate = self.store.load_project_aggregate(project_id).await?;
        Ok(compute_assignee_performance(&aggregate))
    }

    // -- Project ----------------------------------------------------------

    /// Create a project in `new` status. Managers only.
    pub async fn create_project(
        &self,
        user: &User,
        input: NewProject,
    ) -> Result<Project, CoreError> {
        let decision = authorize_project_creation(user);
        if let Decision::Denied(reason) = decision {
            tracing::warn!(
                user_id = user.id,
                role = %user.role,
                reason = reason.as_str(),
                "Project creation denied"
            );
        }
        decision.into_result()?;
        let now = Utc::now();
        validate_new_project(&input, now)?;

        let project = self.store.insert_project(&input, user.id, now).await?;
        tracing::info!(project_id = project.id, user_id = user.id, "Project created");
        Ok(project)
    }

    /// Edit title, description, deadline or budget.
    pub async fn update_project(
        &self,
        user: &User,
        project_id: DbId,
        input: ProjectUpdate,
    ) -> Result<ProjectAggregate, CoreError> {
        validate_project_update(&input)?;
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        gate(user, Operation::EditProject, &aggregate.project)?;

        apply_project_update(&mut aggregate.project, &input);
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, user_id = user.id, "Project updated");
        Ok(saved)
    }

    /// Move the project to `target`, enforcing the lifecycle rules.
    pub async fn transition_project(
        &self,
        user: &User,
        project_id: DbId,
        target: ProjectStatus,
    ) -> Result<ProjectAggregate, CoreError> {
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        gate(user, Operation::TransitionProject { target }, &aggregate.project)?;

        let from = apply_transition(&mut aggregate, target)?;
        let saved = self.commit(aggregate).await?;
        tracing::info!(
            project_id,
            user_id = user.id,
            from = %from,
            to = %target,
            "Project status changed"
        );
        Ok(saved)
    }

    // -- Tasks ------------------------------------------------------------

    /// Add a pending task. Managers and employees.
    pub async fn add_task(
        &self,
        user: &User,
        project_id: DbId,
        input: NewTask,
    ) -> Result<ProjectAggregate, CoreError> {
        input.validate()?;
        validate_title(&input.title)?;
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        gate(user, Operation::CreateTask, &aggregate.project)?;
        ensure_work_items_mutable(aggregate.project.status)?;

        let task_id = aggregate.next_task_id();
        aggregate.tasks.insert(
            task_id,
            Task {
                id: task_id,
                project_id,
                title: input.title.trim().to_string(),
                description: input.description,
                completed: false,
                assignee_id: input.assignee_id,
                created_at: Utc::now(),
                completed_at: None,
            },
        );
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, task_id, user_id = user.id, "Task added");
        Ok(saved)
    }

    /// Mark a task completed. Completing an already completed task is a no-op.
    pub async fn complete_task(
        &self,
        user: &User,
        project_id: DbId,
        task_id: DbId,
    ) -> Result<ProjectAggregate, CoreError> {
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        let task = aggregate.task(task_id)?;
        gate(
            user,
            Operation::CompleteTask {
                assignee_id: task.assignee_id,
            },
            &aggregate.project,
        )?;

        if task.completed {
            tracing::debug!(project_id, task_id, "Task already completed");
            return Ok(aggregate);
        }

        if let Some(task) = aggregate.tasks.get_mut(&task_id) {
            task.completed = true;
            task.completed_at = Some(Utc::now());
        }
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, task_id, user_id = user.id, "Task completed");
        Ok(saved)
    }

    /// Explicitly return a completed task to pending.
    ///
    /// Reopening a pending task is a no-op. Not allowed once the project is
    /// completed, since it would drop progress below 100%.
    pub async fn reopen_task(
        &self,
        user: &User,
        project_id: DbId,
        task_id: DbId,
    ) -> Result<ProjectAggregate, CoreError> {
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        let task = aggregate.task(task_id)?;
        gate(
            user,
            Operation::ReopenTask {
                assignee_id: task.assignee_id,
            },
            &aggregate.project,
        )?;

        if !task.completed {
            tracing::debug!(project_id, task_id, "Task already pending");
            return Ok(aggregate);
        }
        ensure_work_items_mutable(aggregate.project.status)?;

        if let Some(task) = aggregate.tasks.get_mut(&task_id) {
            task.completed = false;
            task.completed_at = None;
        }
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, task_id, user_id = user.id, "Task reopened");
        Ok(saved)
    }

    // -- Milestones -------------------------------------------------------

    /// Add a milestone. Managers only.
    pub async fn add_milestone(
        &self,
        user: &User,
        project_id: DbId,
        input: NewMilestone,
    ) -> Result<ProjectAggregate, CoreError> {
        input.validate()?;
        validate_title(&input.title)?;
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        gate(user, Operation::CreateMilestone, &aggregate.project)?;
        ensure_work_items_mutable(aggregate.project.status)?;

        let milestone_id = aggregate.next_milestone_id();
        aggregate.milestones.insert(
            milestone_id,
            Milestone {
                id: milestone_id,
                project_id,
                title: input.title.trim().to_string(),
                description: input.description,
                deadline: input.deadline,
                completed: false,
                created_at: Utc::now(),
                completed_at: None,
            },
        );
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, milestone_id, user_id = user.id, "Milestone added");
        Ok(saved)
    }

    /// Edit a milestone's title, description or deadline. Managers only.
    pub async fn update_milestone(
        &self,
        user: &User,
        project_id: DbId,
        milestone_id: DbId,
        input: MilestoneUpdate,
    ) -> Result<ProjectAggregate, CoreError> {
        validate_milestone_update(&input)?;
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        aggregate.milestone(milestone_id)?;
        gate(user, Operation::EditMilestone, &aggregate.project)?;
        ensure_work_items_mutable(aggregate.project.status)?;

        if let Some(milestone) = aggregate.milestones.get_mut(&milestone_id) {
            apply_milestone_update(milestone, &input);
        }
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, milestone_id, user_id = user.id, "Milestone updated");
        Ok(saved)
    }

    /// Remove a milestone; it drops out of the dashboard totals. Managers only.
    pub async fn delete_milestone(
        &self,
        user: &User,
        project_id: DbId,
        milestone_id: DbId,
    ) -> Result<ProjectAggregate, CoreError> {
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        aggregate.milestone(milestone_id)?;
        gate(user, Operation::EditMilestone, &aggregate.project)?;
        ensure_work_items_mutable(aggregate.project.status)?;

        aggregate.milestones.remove(&milestone_id);
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, milestone_id, user_id = user.id, "Milestone deleted");
        Ok(saved)
    }

    /// Mark a milestone completed. Completing it twice is a no-op.
    pub async fn complete_milestone(
        &self,
        user: &User,
        project_id: DbId,
        milestone_id: DbId,
    ) -> Result<ProjectAggregate, CoreError> {
        let mut aggregate = self.store.load_project_aggregate(project_id).await?;
        let already_completed = aggregate.milestone(milestone_id)?.completed;
        gate(user, Operation::CompleteMilestone, &aggregate.project)?;

        if already_completed {
            tracing::debug!(project_id, milestone_id, "Milestone already completed");
            return Ok(aggregate);
        }

        if let Some(milestone) = aggregate.milestones.get_mut(&milestone_id) {
            milestone.completed = true;
            milestone.completed_at = Some(Utc::now());
        }
        let saved = self.commit(aggregate).await?;
        tracing::info!(project_id, milestone_id, user_id = user.id, "Milestone completed");
        Ok(saved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
