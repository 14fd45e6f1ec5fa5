//! Role-based authorization for project operations.
//!
//! The policy is a single lookup over `(role, operation)` pairs. It is
//! evaluated before any mutation, so a denial never leaves partial changes.

use serde::Serialize;

use crate::error::CoreError;
use crate::project::{Project, ProjectStatus};
use crate::roles::{Role, User};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An operation a user asks to perform against a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create or edit the project's title, budget or deadline.
    EditProject,
    /// Move the project to `target`.
    TransitionProject { target: ProjectStatus },
    /// Complete a task assigned to `assignee_id`.
    CompleteTask { assignee_id: Option<DbId> },
    /// Return a completed task to pending.
    ReopenTask { assignee_id: Option<DbId> },
    CompleteMilestone,
    CreateTask,
    CreateMilestone,
    /// Edit or delete an existing milestone.
    EditMilestone,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EditProject => "edit_project",
            Self::TransitionProject { target } if target.is_terminal() => "terminate_project",
            Self::TransitionProject { .. } => "advance_status",
            Self::CompleteTask { .. } => "complete_task",
            Self::ReopenTask { .. } => "reopen_task",
            Self::CompleteMilestone => "complete_milestone",
            Self::CreateTask => "create_task",
            Self::CreateMilestone => "create_milestone",
            Self::EditMilestone => "edit_milestone",
        }
    }
}

/// Why the gate refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    #[error("role not permitted for this operation")]
    RoleMismatch,
    #[error("task is not assigned to the requesting user")]
    NotAssignee,
    #[error("project is closed")]
    ProjectClosed,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleMismatch => "role_mismatch",
            Self::NotAssignee => "not_assignee",
            Self::ProjectClosed => "project_closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenialReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(reason) => Err(CoreError::Authorization(reason)),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Role-only policy table.
///
/// | Operation                      | Manager | Employee      | QA    |
/// |--------------------------------|---------|---------------|-------|
/// | edit project                   | allow   | deny          | deny  |
/// | transition forward             | allow   | allow         | deny  |
/// | transition to closed/cancelled | allow   | deny          | deny  |
/// | complete/reopen task           | allow   | if assignee   | deny  |
/// | complete milestone             | allow   | deny          | allow |
/// | create task                    | allow   | allow         | deny  |
/// | create/edit/delete milestone   | allow   | deny          | deny  |
fn role_decision(user: &User, operation: Operation) -> Decision {
    use Decision::*;
    use DenialReason::*;
    use Operation::*;

    match (user.role, operation) {
        (Role::Manager, _) => Allowed,

        (Role::Employee, TransitionProject { target }) if !target.is_terminal() => Allowed,
        (Role::Employee, CreateTask) => Allowed,
        (Role::Employee, CompleteTask { assignee_id } | ReopenTask { assignee_id }) => {
            if assignee_id == Some(user.id) {
                Allowed
            } else {
                Denied(NotAssignee)
            }
        }

        (Role::Qa, CompleteMilestone) => Allowed,

        _ => Denied(RoleMismatch),
    }
}

/// Decide whether `user` may perform `operation` on `project`.
///
/// Every operation here mutates. Closed projects reject all of them except
/// status transitions; those are left to the lifecycle machine, which reports
/// a transition out of a terminal state as an invalid transition. Reads
/// (dashboard, performance) are open to every role and skip the gate.
pub fn authorize(user: &User, operation: Operation, project: &Project) -> Decision {
    let is_transition = matches!(operation, Operation::TransitionProject { .. });
    if project.is_closed && !is_transition {
        return Decision::Denied(DenialReason::ProjectClosed);
    }
    role_decision(user, operation)
}

/// Only managers create projects. There is no project yet to check.
pub fn authorize_project_creation(user: &User) -> Decision {
    role_decision(user, Operation::EditProject)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
