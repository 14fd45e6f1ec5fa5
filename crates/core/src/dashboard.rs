//! Project dashboard aggregation.
//!
//! Everything here is derived from a loaded [`ProjectAggregate`] and is
//! never persisted. Callers regenerate a dashboard whenever they need one;
//! there are no counters to patch incrementally.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::project::ProjectAggregate;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Read-only progress snapshot for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDashboard {
    pub project_id: DbId,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub pending_tasks: u32,
    pub total_milestones: u32,
    pub completed_milestones: u32,
    /// Integer percentage in `[0, 100]`.
    pub progress_percentage: u8,
}

/// Task completion summary for one assignee within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneePerformance {
    pub assignee_id: DbId,
    pub tasks_assigned: u32,
    pub tasks_completed: u32,
    /// Integer percentage in `[0, 100]`.
    pub completion_rate: u8,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Integer percentage of `done` over `total`, rounded half up.
///
/// The divisor is floored at 1, so zero items yields 0. `done` is clamped to
/// `total`, so the result is always in `[0, 100]`. 100 is reserved for
/// `done == total > 0`: anything short of that caps at 99, so the lifecycle
/// completion guard can never pass with work still pending.
pub fn compute_progress_pct(total: u32, done: u32) -> u8 {
    let divisor = u64::from(total.max(1));
    let done = u64::from(done.min(total));
    // round(100 * done / divisor) with halves rounded up.
    let pct = ((200 * done + divisor) / (2 * divisor)) as u8;
    if done < u64::from(total) {
        pct.min(99)
    } else {
        pct
    }
}

/// Compute the dashboard for a project from its current tasks and milestones.
pub fn compute_dashboard(aggregate: &ProjectAggregate) -> ProjectDashboard {
    let total_tasks = aggregate.tasks.len() as u32;
    let completed_tasks = aggregate.tasks.values().filter(|t| t.completed).count() as u32;
    let total_milestones = aggregate.milestones.len() as u32;
    let completed_milestones = aggregate
        .milestones
        .values()
        .filter(|m| m.completed)
        .count() as u32;

    ProjectDashboard {
        project_id: aggregate.id(),
        total_tasks,
        completed_tasks,
        pending_tasks: total_tasks - completed_tasks,
        total_milestones,
        completed_milestones,
        progress_percentage: compute_progress_pct(
            total_tasks + total_milestones,
            completed_tasks + completed_milestones,
        ),
    }
}

/// Progress of a project in percent; shorthand used by the lifecycle guard.
pub fn progress_of(aggregate: &ProjectAggregate) -> u8 {
    compute_dashboard(aggregate).progress_percentage
}

/// Per-assignee task completion, ordered by assignee id.
///
/// Unassigned tasks are not attributed to anyone and are skipped.
pub fn compute_assignee_performance(aggregate: &ProjectAggregate) -> Vec<AssigneePerformance> {
    let mut by_assignee: BTreeMap<DbId, (u32, u32)> = BTreeMap::new();
    for task in aggregate.tasks.values() {
        let Some(assignee_id) = task.assignee_id else {
            continue;
        };
        let entry = by_assignee.entry(assignee_id).or_default();
        entry.0 += 1;
        if task.completed {
            entry.1 += 1;
        }
    }

    by_assignee
        .into_iter()
        .map(|(assignee_id, (assigned, completed))| AssigneePerformance {
            assignee_id,
            tasks_assigned: assigned,
            tasks_completed: completed,
            completion_rate: compute_progress_pct(assigned, completed),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::tests::{aggregate, milestone, task};
    use crate::project::ProjectStatus;

    // -- compute_progress_pct ---------------------------------------------

    #[test]
    fn zero_items_is_zero_percent() {
        assert_eq!(compute_progress_pct(0, 0), 0);
    }

    #[test]
    fn all_done_is_one_hundred() {
        assert_eq!(compute_progress_pct(7, 7), 100);
    }

    #[test]
    fn halves_round_up() {
        // 1/8 = 12.5%
        assert_eq!(compute_progress_pct(8, 1), 13);
        // 3/8 = 37.5%
        assert_eq!(compute_progress_pct(8, 3), 38);
    }

    #[test]
    fn non_halves_round_to_nearest() {
        assert_eq!(compute_progress_pct(3, 1), 33);
        assert_eq!(compute_progress_pct(3, 2), 67);
        assert_eq!(compute_progress_pct(200, 1), 1);
        assert_eq!(compute_progress_pct(201, 1), 0);
    }

    #[test]
    fn nearly_done_never_reports_one_hundred() {
        // 199/200 = 99.5%, which would round up to 100.
        assert_eq!(compute_progress_pct(200, 199), 99);
        assert_eq!(compute_progress_pct(1000, 999), 99);
        assert_eq!(compute_progress_pct(200, 200), 100);
    }

    #[test]
    fn percentage_never_leaves_range() {
        for total in 0..60u32 {
            for done in 0..=total + 2 {
                assert!(compute_progress_pct(total, done) <= 100);
            }
        }
    }

    // -- compute_dashboard ------------------------------------------------

    #[test]
    fn empty_project_has_zero_progress() {
        let agg = aggregate(ProjectStatus::New, vec![], vec![]);
        let dash = compute_dashboard(&agg);
        assert_eq!(dash.total_tasks, 0);
        assert_eq!(dash.total_milestones, 0);
        assert_eq!(dash.progress_percentage, 0);
    }

    #[test]
    fn three_tasks_one_milestone_example() {
        let agg = aggregate(
            ProjectStatus::InProgress,
            vec![task(1, true, None), task(2, true, None), task(3, false, None)],
            vec![milestone(1, false)],
        );
        let dash = compute_dashboard(&agg);
        assert_eq!(
            dash,
            ProjectDashboard {
                project_id: 1,
                total_tasks: 3,
                completed_tasks: 2,
                pending_tasks: 1,
                total_milestones: 1,
                completed_milestones: 0,
                progress_percentage: 50,
            }
        );
    }

    #[test]
    fn pending_plus_completed_equals_total() {
        for n in 0..6 {
            let tasks = (1..=6).map(|id| task(id, id <= n, None)).collect();
            let dash = compute_dashboard(&aggregate(ProjectStatus::InProgress, tasks, vec![]));
            assert_eq!(dash.pending_tasks + dash.completed_tasks, dash.total_tasks);
        }
    }

    #[test]
    fn milestones_only_project_counts_milestones() {
        let agg = aggregate(
            ProjectStatus::InProgress,
            vec![],
            vec![milestone(1, true), milestone(2, false)],
        );
        assert_eq!(compute_dashboard(&agg).progress_percentage, 50);
    }

    #[test]
    fn dashboard_is_idempotent() {
        let agg = aggregate(
            ProjectStatus::InProgress,
            vec![task(1, true, None), task(2, false, None)],
            vec![milestone(1, true)],
        );
        assert_eq!(compute_dashboard(&agg), compute_dashboard(&agg));
    }

    #[test]
    fn dashboard_serializes_camel_case_fields() {
        let agg = aggregate(ProjectStatus::New, vec![task(1, false, None)], vec![]);
        let json = serde_json::to_value(compute_dashboard(&agg)).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "completedMilestones",
                "completedTasks",
                "pendingTasks",
                "progressPercentage",
                "projectId",
                "totalMilestones",
                "totalTasks",
            ]
        );
    }

    // -- compute_assignee_performance -------------------------------------

    #[test]
    fn performance_groups_by_assignee() {
        let agg = aggregate(
            ProjectStatus::InProgress,
            vec![
                task(1, true, Some(20)),
                task(2, false, Some(20)),
                task(3, true, Some(10)),
                task(4, false, None),
            ],
            vec![],
        );
        let perf = compute_assignee_performance(&agg);
        assert_eq!(perf.len(), 2);
        assert_eq!(perf[0].assignee_id, 10);
        assert_eq!(perf[0].completion_rate, 100);
        assert_eq!(perf[1].assignee_id, 20);
        assert_eq!(perf[1].tasks_assigned, 2);
        assert_eq!(perf[1].tasks_completed, 1);
        assert_eq!(perf[1].completion_rate, 50);
    }

    #[test]
    fn performance_is_empty_without_assigned_tasks() {
        let agg = aggregate(ProjectStatus::New, vec![task(1, true, None)], vec![]);
        assert!(compute_assignee_performance(&agg).is_empty());
    }
}
