//! Route definitions for the `/projects` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                          -> list
/// POST   /                                          -> create
/// GET    /{id}                                      -> get_by_id
/// PUT    /{id}                                      -> update
/// POST   /{id}/transition                           -> transition
/// GET    /{id}/dashboard                            -> dashboard
/// GET    /{id}/performance                          -> performance
///
/// POST   /{id}/tasks                                -> add_task
/// POST   /{id}/tasks/{task_id}/complete             -> complete_task
/// POST   /{id}/tasks/{task_id}/reopen               -> reopen_task
///
/// POST   /{id}/milestones                           -> add_milestone
/// PUT    /{id}/milestones/{milestone_id}            -> update_milestone
/// DELETE /{id}/milestones/{milestone_id}            -> delete_milestone
/// POST   /{id}/milestones/{milestone_id}/complete   -> complete_milestone
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route("/{id}/transition", post(project::transition))
        .route("/{id}/dashboard", get(project::dashboard))
        .route("/{id}/performance", get(project::performance))
        .route("/{id}/tasks", post(project::add_task))
        .route("/{id}/tasks/{task_id}/complete", post(project::complete_task))
        .route("/{id}/tasks/{task_id}/reopen", post(project::reopen_task))
        .route("/{id}/milestones", post(project::add_milestone))
        .route(
            "/{id}/milestones/{milestone_id}",
            put(project::update_milestone).delete(project::delete_milestone),
        )
        .route(
            "/{id}/milestones/{milestone_id}/complete",
            post(project::complete_milestone),
        )
}
