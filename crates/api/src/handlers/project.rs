//! Handlers for the `/projects` resource.
//!
//! Project reads present `total_cost` with the budget fallback applied;
//! the stored raw task sum is returned alongside as `stored_total_cost`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use gigledger_core::validation::validate_date_range;
use gigledger_db::models::project::{
    ClientSummary, CreateProject, ProjectDetail, ProjectListItem, ProjectWithFinancials,
    UpdateProject,
};
use gigledger_db::repositories::{AggregateRepo, ClientRepo, PaymentRepo, ProjectRepo, TaskRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::today;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

fn client_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Client",
        id,
    })
}

fn check(input: &CreateProject) -> AppResult<()> {
    input.validate()?;
    validate_date_range(input.start_date, input.end_date)?;
    Ok(())
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectWithFinancials>>)> {
    let input = input.normalized();
    check(&input)?;

    let project = ProjectRepo::create(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| client_not_found(input.client_id))?;
    tracing::info!(
        user_id = auth.user_id,
        project_id = project.id,
        client_id = project.client_id,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(project.into()))))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ProjectListItem>>>> {
    let rows = ProjectRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(
        rows.into_iter().map(ProjectListItem::from).collect(),
    )))
}

/// GET /api/v1/projects/{id}
///
/// Stored aggregates are verified against the children and repaired if
/// they drifted before the detail is assembled.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let mut tx = state.pool.begin().await?;
    let project = AggregateRepo::load_project_repaired(&mut tx, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    let ids = [id];
    let (client, tasks, payments) = tokio::try_join!(
        ClientRepo::find_by_id(&state.pool, auth.user_id, project.client_id),
        TaskRepo::list_for_projects(&state.pool, &ids),
        PaymentRepo::list_for_project(&state.pool, id),
    )?;
    let client = client.ok_or_else(|| client_not_found(project.client_id))?;

    Ok(Json(DataResponse::new(ProjectDetail {
        project: project.into(),
        client: ClientSummary {
            id: client.id,
            name: client.name,
            company: client.company,
        },
        tasks,
        payments,
    })))
}

/// PATCH /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<ProjectWithFinancials>>> {
    let current = ProjectRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let previous_client = current.client_id;

    let merged = input.merge(current, today());
    check(&merged)?;

    if merged.client_id != previous_client
        && ClientRepo::find_by_id(&state.pool, auth.user_id, merged.client_id)
            .await?
            .is_none()
    {
        return Err(client_not_found(merged.client_id));
    }

    let project = ProjectRepo::update(&state.pool, auth.user_id, id, &merged)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(project.into())))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    if !ProjectRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user_id, project_id = id, "Project deleted");
    Ok(Json(MessageResponse::deleted("Project")))
}
