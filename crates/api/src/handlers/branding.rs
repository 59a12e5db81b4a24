//! Handlers for the `/branding` resource (invoice branding of the account).

use axum::extract::State;
use axum::Json;
use gigledger_core::error::CoreError;
use gigledger_db::models::branding::{BrandingSettings, BrandingView, UpsertBranding};
use gigledger_db::repositories::{BrandingRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/branding
///
/// Accounts that never saved branding get defaults seeded from their own
/// name and email.
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<BrandingView>>> {
    if let Some(settings) = BrandingRepo::find_by_user(&state.pool, auth.user_id).await? {
        return Ok(Json(DataResponse::new(BrandingView::Stored(settings))));
    }

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;
    Ok(Json(DataResponse::new(BrandingView::Defaults(
        UpsertBranding::defaults_for(&user.name, &user.email),
    ))))
}

/// PUT /api/v1/branding
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpsertBranding>,
) -> AppResult<Json<DataResponse<BrandingSettings>>> {
    let input = input.normalized();
    input.validate()?;
    let settings = BrandingRepo::upsert(&state.pool, auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, "Branding settings saved");
    Ok(Json(DataResponse::new(settings)))
}
