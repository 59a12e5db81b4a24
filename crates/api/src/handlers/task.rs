//! Handlers for the `/tasks` resource.
//!
//! Writes go through `TaskRepo`, which keeps task cost, project
//! `total_cost` and worker `total_earned` consistent in one transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use gigledger_db::models::task::{
    CreateTask, Task, TaskFilter, TaskStats, TaskWithNames, UpdateTask,
};
use gigledger_db::repositories::TaskRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::today;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    input.validate()?;
    let row = input.into_row(Utc::now());
    let task = TaskRepo::create(&state.pool, auth.user_id, &row).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(task))))
}

/// GET /api/v1/tasks?status=&priority=&project_id=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<TaskFilter>,
) -> AppResult<Json<DataResponse<Vec<TaskWithNames>>>> {
    let tasks = TaskRepo::list(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(DataResponse::new(tasks)))
}

/// GET /api/v1/tasks/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<TaskStats>>> {
    let stats = TaskRepo::stats(&state.pool, auth.user_id, today()).await?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskWithNames>>> {
    let task = TaskRepo::find_with_names(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(task)))
}

/// PATCH /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    input.validate()?;
    let task = TaskRepo::update(&state.pool, auth.user_id, id, input, Utc::now())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(task)))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    if !TaskRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    Ok(Json(MessageResponse::deleted("Task")))
}
