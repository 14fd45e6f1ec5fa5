//! Handlers for the `/projects` resource and the work items nested under it.
//!
//! Every handler requires an authenticated caller. Authorization decisions
//! are the engine's; handlers only translate between HTTP and use cases.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use managix_core::dashboard::{compute_dashboard, AssigneePerformance, ProjectDashboard};
use managix_core::project::{
    Milestone, MilestoneUpdate, NewMilestone, NewProject, NewTask, Project, ProjectAggregate,
    ProjectStatus, ProjectUpdate, Task,
};
use managix_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A project with its work items and current dashboard.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub milestones: Vec<Milestone>,
    pub dashboard: ProjectDashboard,
}

impl From<ProjectAggregate> for ProjectDetail {
    fn from(aggregate: ProjectAggregate) -> Self {
        let dashboard = compute_dashboard(&aggregate);
        Self {
            project: aggregate.project,
            tasks: aggregate.tasks.into_values().collect(),
            milestones: aggregate.milestones.into_values().collect(),
            dashboard,
        }
    }
}

type DetailResponse = Json<DataResponse<ProjectDetail>>;

fn detail(aggregate: ProjectAggregate) -> DetailResponse {
    Json(DataResponse {
        data: aggregate.into(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target status, e.g. `"in_progress"`.
    pub status: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.engine.list_projects().await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<NewProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = state.engine.create_project(&auth.user, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<DetailResponse> {
    let aggregate = state.engine.get_project(id).await?;
    Ok(detail(aggregate))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<ProjectUpdate>,
) -> AppResult<DetailResponse> {
    let aggregate = state.engine.update_project(&auth.user, id, input).await?;
    Ok(detail(aggregate))
}

/// POST /api/v1/projects/{id}/transition
pub async fn transition(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<TransitionRequest>,
) -> AppResult<DetailResponse> {
    let target = ProjectStatus::from_str_value(&input.status)?;
    let aggregate = state
        .engine
        .transition_project(&auth.user, id, target)
        .await?;
    Ok(detail(aggregate))
}

/// GET /api/v1/projects/{id}/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<ProjectDashboard>>> {
    let dashboard = state.engine.get_dashboard(id).await?;
    Ok(Json(DataResponse { data: dashboard }))
}

/// GET /api/v1/projects/{id}/performance
pub async fn performance(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssigneePerformance>>>> {
    let performance = state.engine.get_assignee_performance(id).await?;
    Ok(Json(DataResponse { data: performance }))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/tasks
pub async fn add_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<NewTask>,
) -> AppResult<(StatusCode, DetailResponse)> {
    let aggregate = state.engine.add_task(&auth.user, id, input).await?;
    Ok((StatusCode::CREATED, detail(aggregate)))
}

/// POST /api/v1/projects/{id}/tasks/{task_id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, task_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<DetailResponse> {
    let aggregate = state.engine.complete_task(&auth.user, id, task_id).await?;
    Ok(detail(aggregate))
}

/// POST /api/v1/projects/{id}/tasks/{task_id}/reopen
pub async fn reopen_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, task_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<DetailResponse> {
    let aggregate = state.engine.reopen_task(&auth.user, id, task_id).await?;
    Ok(detail(aggregate))
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/milestones
pub async fn add_milestone(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<NewMilestone>,
) -> AppResult<(StatusCode, DetailResponse)> {
    let aggregate = state.engine.add_milestone(&auth.user, id, input).await?;
    Ok((StatusCode::CREATED, detail(aggregate)))
}

/// POST /api/v1/projects/{id}/milestones/{milestone_id}/complete
pub async fn complete_milestone(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, milestone_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<DetailResponse> {
    let aggregate = state
        .engine
        .complete_milestone(&auth.user, id, milestone_id)
        .await?;
    Ok(detail(aggregate))
}

/// PUT /api/v1/projects/{id}/milestones/{milestone_id}
pub async fn update_milestone(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, milestone_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<MilestoneUpdate>,
) -> AppResult<DetailResponse> {
    let aggregate = state
        .engine
        .update_milestone(&auth.user, id, milestone_id, input)
        .await?;
    Ok(detail(aggregate))
}

/// DELETE /api/v1/projects/{id}/milestones/{milestone_id}
pub async fn delete_milestone(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, milestone_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<DetailResponse> {
    let aggregate = state
        .engine
        .delete_milestone(&auth.user, id, milestone_id)
        .await?;
    Ok(detail(aggregate))
}
