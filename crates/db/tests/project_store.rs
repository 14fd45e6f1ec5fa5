//! Integration tests for the Postgres project store.
//!
//! These need a running database (`DATABASE_URL`) and are ignored by
//! default. Run with `cargo test -p managix-db -- --ignored`.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use managix_core::error::CoreError;
use managix_core::project::{Milestone, NewProject, ProjectAggregate, ProjectStatus, Task};
use managix_core::store::ProjectStore;
use managix_db::PgProjectStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: None,
        deadline: Utc::now() + Duration::days(14),
        budget_cents: 50_000,
    }
}

fn pending_task(aggregate: &ProjectAggregate, assignee_id: Option<i64>) -> Task {
    let id = aggregate.next_task_id();
    Task {
        id,
        project_id: aggregate.id(),
        title: format!("Task {id}"),
        description: None,
        completed: false,
        assignee_id,
        created_at: Utc::now(),
        completed_at: None,
    }
}

async fn seeded(pool: PgPool) -> (PgProjectStore, i64) {
    let store = PgProjectStore::new(pool);
    let project = store
        .insert_project(&new_project("Apollo"), 1, Utc::now())
        .await
        .unwrap();
    (store, project.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_health_check(pool: PgPool) {
    managix_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_insert_and_load_empty_project(pool: PgPool) {
    let (store, id) = seeded(pool).await;
    let agg = store.load_project_aggregate(id).await.unwrap();
    assert_eq!(agg.project.title, "Apollo");
    assert_eq!(agg.project.status, ProjectStatus::New);
    assert!(!agg.project.is_closed);
    assert_eq!(agg.project.version, 1);
    assert!(agg.tasks.is_empty());
    assert!(agg.milestones.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_save_persists_children_and_bumps_version(pool: PgPool) {
    let (store, id) = seeded(pool).await;
    let mut agg = store.load_project_aggregate(id).await.unwrap();
    let task = pending_task(&agg, Some(7));
    agg.tasks.insert(task.id, task);
    agg.project.set_status(ProjectStatus::InProgress);

    let saved = store.save_project_aggregate(&agg).await.unwrap();
    assert_eq!(saved.project.version, 2);

    let reloaded = store.load_project_aggregate(id).await.unwrap();
    assert_eq!(reloaded.project.status, ProjectStatus::InProgress);
    assert_eq!(reloaded.project.version, 2);
    assert_eq!(reloaded.tasks.len(), 1);
    assert_eq!(reloaded.tasks[&1].assignee_id, Some(7));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_save_deletes_children_missing_from_aggregate(pool: PgPool) {
    let (store, id) = seeded(pool).await;
    let mut agg = store.load_project_aggregate(id).await.unwrap();
    for _ in 0..2 {
        let task = pending_task(&agg, None);
        agg.tasks.insert(task.id, task);
    }
    agg.milestones.insert(
        1,
        Milestone {
            id: 1,
            project_id: id,
            title: "Beta".to_string(),
            description: None,
            deadline: None,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        },
    );
    let mut saved = store.save_project_aggregate(&agg).await.unwrap();

    saved.milestones.remove(&1);
    saved.tasks.remove(&2);
    store.save_project_aggregate(&saved).await.unwrap();

    let reloaded = store.load_project_aggregate(id).await.unwrap();
    assert!(reloaded.milestones.is_empty());
    assert_eq!(reloaded.tasks.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(reloaded.project.version, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_stale_save_is_conflict_and_rolled_back(pool: PgPool) {
    let (store, id) = seeded(pool).await;
    let first = store.load_project_aggregate(id).await.unwrap();
    let mut second = first.clone();

    store.save_project_aggregate(&first).await.unwrap();

    let task = pending_task(&second, None);
    second.tasks.insert(task.id, task);
    assert_matches!(
        store.save_project_aggregate(&second).await,
        Err(CoreError::ConcurrencyConflict { expected_version: 1, .. })
    );

    let current = store.load_project_aggregate(id).await.unwrap();
    assert!(current.tasks.is_empty());
    assert_eq!(current.project.version, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_missing_project_is_not_found(pool: PgPool) {
    let store = PgProjectStore::new(pool);
    assert_matches!(
        store.load_project_aggregate(999).await,
        Err(CoreError::NotFound { entity: "Project", id: 999 })
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_negative_budget_violates_check_constraint(pool: PgPool) {
    let (store, id) = seeded(pool).await;
    let mut agg = store.load_project_aggregate(id).await.unwrap();
    agg.project.budget_cents = -1;
    assert_matches!(
        store.save_project_aggregate(&agg).await,
        Err(CoreError::Internal(_))
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_list_is_newest_first(pool: PgPool) {
    let store = PgProjectStore::new(pool);
    let now = Utc::now();
    store
        .insert_project(&new_project("Older"), 1, now - Duration::hours(1))
        .await
        .unwrap();
    store.insert_project(&new_project("Newer"), 1, now).await.unwrap();

    let titles: Vec<String> = store
        .list_projects()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}
