//! Project aggregate: the project root plus the tasks and milestones it owns.
//!
//! The `core` crate contains no database dependencies; the host loads the
//! whole aggregate and hands it in, and saves it back as one unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{Cents, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_NEW: &str = "new";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CLOSED: &str = "closed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid project status strings, in lifecycle order.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_NEW,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_CLOSED,
    STATUS_CANCELLED,
];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a project. See [`crate::lifecycle`] for the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    New,
    InProgress,
    Completed,
    Closed,
    Cancelled,
}

impl ProjectStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_NEW => Ok(Self::New),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_CLOSED => Ok(Self::Closed),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid project status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => STATUS_NEW,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Closed => STATUS_CLOSED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Terminal states admit no further transitions and imply `is_closed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Timestamp,
    pub budget_cents: Cents,
    pub status: ProjectStatus,
    pub is_closed: bool,
    pub created_by: DbId,
    pub created_at: Timestamp,
    /// Optimistic concurrency counter, bumped by every successful save.
    pub version: i64,
}

impl Project {
    /// Set the status and the closed flag together.
    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.is_closed = status.is_terminal();
    }

    /// Check the project-level invariants.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.is_closed != self.status.is_terminal() {
            return Err(CoreError::Internal(format!(
                "Project {} has is_closed={} but status '{}'",
                self.id, self.is_closed, self.status
            )));
        }
        validate_budget(self.budget_cents)
    }
}

/// A unit of work owned by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Weak reference to a user id; lookup only.
    pub assignee_id: Option<DbId>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// A coarse checkpoint owned by a project. Independent of task completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
    pub completed: bool,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// A project together with every task and milestone it owns.
///
/// Task and milestone ids are unique within the aggregate and are allocated
/// by the aggregate itself (see [`ProjectAggregate::next_task_id`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAggregate {
    pub project: Project,
    pub tasks: BTreeMap<DbId, Task>,
    pub milestones: BTreeMap<DbId, Milestone>,
}

impl ProjectAggregate {
    /// Build an aggregate from loaded rows, rejecting children that belong
    /// to a different project.
    pub fn from_parts(
        project: Project,
        tasks: impl IntoIterator<Item = Task>,
        milestones: impl IntoIterator<Item = Milestone>,
    ) -> Result<Self, CoreError> {
        let mut aggregate = Self {
            project,
            tasks: BTreeMap::new(),
            milestones: BTreeMap::new(),
        };
        for task in tasks {
            if task.project_id != aggregate.project.id {
                return Err(CoreError::Internal(format!(
                    "Task {} belongs to project {}, not {}",
                    task.id, task.project_id, aggregate.project.id
                )));
            }
            aggregate.tasks.insert(task.id, task);
        }
        for milestone in milestones {
            if milestone.project_id != aggregate.project.id {
                return Err(CoreError::Internal(format!(
                    "Milestone {} belongs to project {}, not {}",
                    milestone.id, milestone.project_id, aggregate.project.id
                )));
            }
            aggregate.milestones.insert(milestone.id, milestone);
        }
        Ok(aggregate)
    }

    pub fn id(&self) -> DbId {
        self.project.id
    }

    pub fn task(&self, task_id: DbId) -> Result<&Task, CoreError> {
        self.tasks.get(&task_id).ok_or(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        })
    }

    pub fn milestone(&self, milestone_id: DbId) -> Result<&Milestone, CoreError> {
        self.milestones.get(&milestone_id).ok_or(CoreError::NotFound {
            entity: "Milestone",
            id: milestone_id,
        })
    }

    pub fn next_task_id(&self) -> DbId {
        self.tasks.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn next_milestone_id(&self) -> DbId {
        self.milestones.keys().next_back().map_or(1, |id| id + 1)
    }

    /// Check every aggregate invariant. Called before any mutation is committed.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        self.project.check_invariants()?;
        let pid = self.project.id;
        if let Some(task) = self.tasks.values().find(|t| t.project_id != pid) {
            return Err(CoreError::Internal(format!(
                "Task {} is not owned by project {pid}",
                task.id
            )));
        }
        if let Some(m) = self.milestones.values().find(|m| m.project_id != pid) {
            return Err(CoreError::Internal(format!(
                "Milestone {} is not owned by project {pid}",
                m.id
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// Input for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub deadline: Timestamp,
    #[validate(range(min = 0))]
    pub budget_cents: Cents,
}

/// Partial edit of a project's title, description, deadline or budget.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
    #[validate(range(min = 0))]
    pub budget_cents: Option<Cents>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMilestone {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
}

/// Partial edit of a milestone. Completion is not editable here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MilestoneUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_budget(budget_cents: Cents) -> Result<(), CoreError> {
    if budget_cents < 0 {
        return Err(CoreError::Validation(format!(
            "Budget must not be negative (got {budget_cents})"
        )));
    }
    Ok(())
}

/// Titles must contain something other than whitespace.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be blank".to_string()));
    }
    Ok(())
}

/// Validate a creation request against the current time.
pub fn validate_new_project(input: &NewProject, now: Timestamp) -> Result<(), CoreError> {
    input.validate()?;
    validate_title(&input.title)?;
    validate_budget(input.budget_cents)?;
    if input.deadline < now {
        return Err(CoreError::Validation(format!(
            "Deadline {} is in the past",
            input.deadline.to_rfc3339()
        )));
    }
    Ok(())
}

pub fn validate_project_update(input: &ProjectUpdate) -> Result<(), CoreError> {
    input.validate()?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(budget) = input.budget_cents {
        validate_budget(budget)?;
    }
    Ok(())
}

/// Apply a validated update to the project root.
pub fn apply_project_update(project: &mut Project, input: &ProjectUpdate) {
    if let Some(title) = &input.title {
        project.title = title.trim().to_string();
    }
    if let Some(description) = &input.description {
        project.description = Some(description.clone());
    }
    if let Some(deadline) = input.deadline {
        project.deadline = deadline;
    }
    if let Some(budget) = input.budget_cents {
        project.budget_cents = budget;
    }
}

pub fn validate_milestone_update(input: &MilestoneUpdate) -> Result<(), CoreError> {
    input.validate()?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    Ok(())
}

pub fn apply_milestone_update(milestone: &mut Milestone, input: &MilestoneUpdate) {
    if let Some(title) = &input.title {
        milestone.title = title.trim().to_string();
    }
    if let Some(description) = &input.description {
        milestone.description = Some(description.clone());
    }
    if let Some(deadline) = input.deadline {
        milestone.deadline = Some(deadline);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    pub(crate) fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
    }

    pub(crate) fn project(status: ProjectStatus) -> Project {
        Project {
            id: 1,
            title: "Apollo".to_string(),
            description: None,
            deadline: fixed_now() + Duration::days(30),
            budget_cents: 100_000,
            status,
            is_closed: status.is_terminal(),
            created_by: 10,
            created_at: fixed_now(),
            version: 1,
        }
    }

    pub(crate) fn task(id: DbId, completed: bool, assignee_id: Option<DbId>) -> Task {
        Task {
            id,
            project_id: 1,
            title: format!("Task {id}"),
            description: None,
            completed,
            assignee_id,
            created_at: fixed_now(),
            completed_at: completed.then(fixed_now),
        }
    }

    pub(crate) fn milestone(id: DbId, completed: bool) -> Milestone {
        Milestone {
            id,
            project_id: 1,
            title: format!("Milestone {id}"),
            description: None,
            deadline: None,
            completed,
            created_at: fixed_now(),
            completed_at: completed.then(fixed_now),
        }
    }

    pub(crate) fn aggregate(
        status: ProjectStatus,
        tasks: Vec<Task>,
        milestones: Vec<Milestone>,
    ) -> ProjectAggregate {
        ProjectAggregate::from_parts(project(status), tasks, milestones).unwrap()
    }

    fn new_project(title: &str, budget_cents: Cents, deadline: Timestamp) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: None,
            deadline,
            budget_cents,
        }
    }

    // -- ProjectStatus ----------------------------------------------------

    #[test]
    fn status_round_trips_through_db_strings() {
        for s in VALID_STATUSES {
            assert_eq!(ProjectStatus::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_matches!(
            ProjectStatus::from_str_value("done"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn only_closed_and_cancelled_are_terminal() {
        assert!(ProjectStatus::Closed.is_terminal());
        assert!(ProjectStatus::Cancelled.is_terminal());
        assert!(!ProjectStatus::New.is_terminal());
        assert!(!ProjectStatus::InProgress.is_terminal());
        assert!(!ProjectStatus::Completed.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    // -- Project ----------------------------------------------------------

    #[test]
    fn set_status_keeps_closed_flag_in_sync() {
        let mut p = project(ProjectStatus::Completed);
        p.set_status(ProjectStatus::Closed);
        assert!(p.is_closed);
        assert!(p.check_invariants().is_ok());
    }

    #[test]
    fn inconsistent_closed_flag_fails_invariants() {
        let mut p = project(ProjectStatus::InProgress);
        p.is_closed = true;
        assert_matches!(p.check_invariants(), Err(CoreError::Internal(_)));
    }

    #[test]
    fn negative_budget_fails_invariants() {
        let mut p = project(ProjectStatus::New);
        p.budget_cents = -1;
        assert_matches!(p.check_invariants(), Err(CoreError::Validation(_)));
    }

    // -- Aggregate --------------------------------------------------------

    #[test]
    fn from_parts_rejects_foreign_children() {
        let mut t = task(1, false, None);
        t.project_id = 2;
        let result = ProjectAggregate::from_parts(project(ProjectStatus::New), vec![t], vec![]);
        assert_matches!(result, Err(CoreError::Internal(_)));
    }

    #[test]
    fn missing_task_is_not_found() {
        let agg = aggregate(ProjectStatus::New, vec![task(1, false, None)], vec![]);
        assert_matches!(
            agg.task(9),
            Err(CoreError::NotFound { entity: "Task", id: 9 })
        );
        assert_matches!(
            agg.milestone(3),
            Err(CoreError::NotFound { entity: "Milestone", id: 3 })
        );
    }

    #[test]
    fn next_ids_follow_the_highest_existing_id() {
        let agg = aggregate(
            ProjectStatus::New,
            vec![task(1, false, None), task(7, false, None)],
            vec![],
        );
        assert_eq!(agg.next_task_id(), 8);
        assert_eq!(agg.next_milestone_id(), 1);
    }

    // -- Creation validation ----------------------------------------------

    #[test]
    fn valid_new_project_passes() {
        let input = new_project("Apollo", 0, fixed_now() + Duration::days(1));
        assert!(validate_new_project(&input, fixed_now()).is_ok());
    }

    #[test]
    fn negative_budget_is_rejected_on_creation() {
        let input = new_project("Apollo", -500, fixed_now() + Duration::days(1));
        assert_matches!(
            validate_new_project(&input, fixed_now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn past_deadline_is_rejected_on_creation() {
        let input = new_project("Apollo", 10, fixed_now() - Duration::hours(1));
        let err = validate_new_project(&input, fixed_now()).unwrap_err();
        assert!(err.to_string().contains("in the past"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let input = new_project("   ", 10, fixed_now() + Duration::days(1));
        assert_matches!(
            validate_new_project(&input, fixed_now()),
            Err(CoreError::Validation(_))
        );
        let input = new_project("", 10, fixed_now() + Duration::days(1));
        assert!(validate_new_project(&input, fixed_now()).is_err());
    }

    // -- Updates ----------------------------------------------------------

    #[test]
    fn update_with_negative_budget_is_rejected() {
        let update = ProjectUpdate {
            budget_cents: Some(-1),
            ..Default::default()
        };
        assert_matches!(validate_project_update(&update), Err(CoreError::Validation(_)));
    }

    #[test]
    fn apply_update_only_touches_given_fields() {
        let mut p = project(ProjectStatus::New);
        let update = ProjectUpdate {
            title: Some("  Artemis ".to_string()),
            budget_cents: Some(5),
            ..Default::default()
        };
        validate_project_update(&update).unwrap();
        apply_project_update(&mut p, &update);
        assert_eq!(p.title, "Artemis");
        assert_eq!(p.budget_cents, 5);
        assert_eq!(p.deadline, fixed_now() + Duration::days(30));
        assert_eq!(p.description, None);
    }

    #[test]
    fn milestone_update_keeps_completion_state() {
        let mut m = milestone(2, true);
        let update = MilestoneUpdate {
            title: Some("Beta freeze".to_string()),
            deadline: Some(fixed_now() + Duration::days(7)),
            ..Default::default()
        };
        validate_milestone_update(&update).unwrap();
        apply_milestone_update(&mut m, &update);
        assert_eq!(m.title, "Beta freeze");
        assert_eq!(m.deadline, Some(fixed_now() + Duration::days(7)));
        assert!(m.completed);
    }

    #[test]
    fn blank_milestone_title_is_rejected() {
        let update = MilestoneUpdate {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert_matches!(
            validate_milestone_update(&update),
            Err(CoreError::Validation(_))
        );
    }
}
