//! Handlers for the `/workers` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use gigledger_db::models::worker::{
    CreateWorker, UpdateWorker, Worker, WorkerDetail, WorkerStats, WorkerWithCounts,
};
use gigledger_db::repositories::{PaymentRepo, TaskRepo, WorkerRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Worker",
        id,
    })
}

/// POST /api/v1/workers
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateWorker>,
) -> AppResult<(StatusCode, Json<DataResponse<Worker>>)> {
    let input = input.normalized();
    input.validate()?;
    let worker = WorkerRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, worker_id = worker.id, "Worker created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(worker))))
}

/// GET /api/v1/workers
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<WorkerWithCounts>>>> {
    let workers = WorkerRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(workers)))
}

/// GET /api/v1/workers/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<WorkerStats>>> {
    let stats = WorkerRepo::stats(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/v1/workers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkerDetail>>> {
    let worker = WorkerRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let (tasks, payments) = tokio::try_join!(
        TaskRepo::list_for_worker(&state.pool, id),
        PaymentRepo::list_for_worker(&state.pool, id),
    )?;

    Ok(Json(DataResponse::new(WorkerDetail {
        worker,
        tasks,
        payments,
    })))
}

/// PUT /api/v1/workers/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorker>,
) -> AppResult<Json<DataResponse<Worker>>> {
    let current = WorkerRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let merged = input.merge(current);
    merged.validate()?;

    let worker = WorkerRepo::update(&state.pool, auth.user_id, id, &merged)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(worker)))
}

/// DELETE /api/v1/workers/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    if !WorkerRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user_id, worker_id = id, "Worker deleted");
    Ok(Json(MessageResponse::deleted("Worker")))
}
