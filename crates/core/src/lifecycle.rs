//! Project lifecycle state machine.
//!
//! ```text
//! new ──> in_progress ──> completed ──> closed
//!  │           │
//!  └───────────┴──> cancelled
//! ```
//!
//! `closed` and `cancelled` are terminal. Same-state requests are rejected
//! rather than treated as no-ops.

use crate::dashboard::progress_of;
use crate::error::CoreError;
use crate::project::{ProjectAggregate, ProjectStatus};

/// Why a lifecycle change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("project is already '{0}'")]
    SameState(ProjectStatus),

    #[error("'{from}' is terminal; no transitions leave it")]
    FromTerminal { from: ProjectStatus },

    #[error("cannot move from '{from}' to '{to}'")]
    NotAllowed {
        from: ProjectStatus,
        to: ProjectStatus,
    },

    #[error("project progress is {progress}%, completion requires 100%")]
    IncompleteProgress { progress: u8 },

    #[error("project is completed; its work items can no longer change")]
    ProjectCompleted,
}

impl TransitionError {
    /// Stable machine-readable kind for transport responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SameState(_) => "same_state",
            Self::FromTerminal { .. } => "from_terminal",
            Self::NotAllowed { .. } => "not_allowed",
            Self::IncompleteProgress { .. } => "incomplete_progress",
            Self::ProjectCompleted => "project_completed",
        }
    }
}

impl From<TransitionError> for CoreError {
    fn from(err: TransitionError) -> Self {
        CoreError::InvalidTransition(err)
    }
}

/// Returns the statuses reachable from `from` in one step.
pub fn valid_transitions(from: ProjectStatus) -> &'static [ProjectStatus] {
    use ProjectStatus::*;
    match from {
        New => &[InProgress, Cancelled],
        InProgress => &[Completed, Cancelled],
        Completed => &[Closed],
        Closed | Cancelled => &[],
    }
}

/// Check whether `from -> to` is a legal edge, ignoring preconditions.
pub fn can_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a transition given the project's current progress.
pub fn validate_transition(
    from: ProjectStatus,
    to: ProjectStatus,
    progress: u8,
) -> Result<(), TransitionError> {
    if from.is_terminal() {
        return Err(TransitionError::FromTerminal { from });
    }
    if from == to {
        return Err(TransitionError::SameState(from));
    }
    if !can_transition(from, to) {
        return Err(TransitionError::NotAllowed { from, to });
    }
    if to == ProjectStatus::Completed && progress < 100 {
        return Err(TransitionError::IncompleteProgress { progress });
    }
    Ok(())
}

/// Move the aggregate to `to`, recomputing progress for the completion guard.
///
/// On error the aggregate is left untouched.
pub fn apply_transition(
    aggregate: &mut ProjectAggregate,
    to: ProjectStatus,
) -> Result<ProjectStatus, CoreError> {
    let from = aggregate.project.status;
    validate_transition(from, to, progress_of(aggregate))?;

    let mut next = aggregate.project.clone();
    next.set_status(to);
    next.check_invariants()?;
    aggregate.project = next;
    Ok(from)
}

/// Work items can only be added, edited, deleted or reopened while the
/// project is still open and not yet completed.
pub fn ensure_work_items_mutable(status: ProjectStatus) -> Result<(), TransitionError> {
    match status {
        ProjectStatus::Completed => Err(TransitionError::ProjectCompleted),
        s if s.is_terminal() => Err(TransitionError::FromTerminal { from: s }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
