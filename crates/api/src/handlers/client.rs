//! Handlers for the `/clients` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use gigledger_db::models::client::{
    Client, ClientDetail, ClientWithCounts, CreateClient, UpdateClient,
};
use gigledger_db::repositories::{ClientRepo, ProjectRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Client",
        id,
    })
}

/// POST /api/v1/clients
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<DataResponse<Client>>)> {
    let input = input.normalized();
    input.validate()?;
    let client = ClientRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, client_id = client.id, "Client created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(client))))
}

/// GET /api/v1/clients
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ClientWithCounts>>>> {
    let clients = ClientRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(clients)))
}

/// GET /api/v1/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClientDetail>>> {
    let (client, projects) = tokio::try_join!(
        ClientRepo::find_by_id(&state.pool, auth.user_id, id),
        ProjectRepo::list_for_client(&state.pool, auth.user_id, id),
    )?;
    let client = client.ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse::new(ClientDetail {
        client,
        projects: projects.into_iter().map(Into::into).collect(),
    })))
}

/// PUT /api/v1/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    let current = ClientRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let merged = input.merge(current);
    merged.validate()?;

    let client = ClientRepo::update(&state.pool, auth.user_id, id, &merged)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(client)))
}

/// DELETE /api/v1/clients/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    if !ClientRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user_id, client_id = id, "Client deleted");
    Ok(Json(MessageResponse::deleted("Client")))
}
