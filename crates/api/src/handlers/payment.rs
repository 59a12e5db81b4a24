//! Handlers for the `/payments` resource.
//!
//! Writes go through `PaymentRepo`, which recomputes project
//! `paid_amount` and worker `total_paid` in the same transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use gigledger_db::models::payment::{
    CreatePayment, Payment, PaymentFilter, PaymentStats, PaymentWithNames, UpdatePayment,
};
use gigledger_db::repositories::PaymentRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::today;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Payment",
        id,
    })
}

/// Result of `POST /payments/mark-overdue`.
#[derive(Debug, Serialize)]
pub struct MarkOverdueResponse {
    pub updated: u64,
}

/// POST /api/v1/payments
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<DataResponse<Payment>>)> {
    let row = input.into_row(today())?;
    let payment = PaymentRepo::create(&state.pool, auth.user_id, &row).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(payment))))
}

/// GET /api/v1/payments?type=&status=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<PaymentFilter>,
) -> AppResult<Json<DataResponse<Vec<PaymentWithNames>>>> {
    let as_of = today();
    let payments: Vec<_> = PaymentRepo::list(&state.pool, auth.user_id, &filter)
        .await?
        .into_iter()
        .map(|p| p.flag_overdue(as_of))
        .collect();
    Ok(Json(DataResponse::new(payments)))
}

/// GET /api/v1/payments/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<PaymentStats>>> {
    let stats = PaymentRepo::stats(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(stats)))
}

/// POST /api/v1/payments/mark-overdue
///
/// Only PENDING rows change, so paid totals stay as they are.
pub async fn mark_overdue(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MarkOverdueResponse>>> {
    let updated = PaymentRepo::mark_overdue(&state.pool, auth.user_id, today()).await?;
    tracing::info!(user_id = auth.user_id, updated, "Marked overdue payments");
    Ok(Json(DataResponse::new(MarkOverdueResponse { updated })))
}

/// GET /api/v1/payments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentWithNames>>> {
    let payment = PaymentRepo::find_with_names(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(payment.flag_overdue(today()))))
}

/// PATCH /api/v1/payments/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePayment>,
) -> AppResult<Json<DataResponse<Payment>>> {
    let payment = PaymentRepo::update(&state.pool, auth.user_id, id, input, today())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(payment)))
}

/// DELETE /api/v1/payments/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    if !PaymentRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    Ok(Json(MessageResponse::deleted("Payment")))
}
