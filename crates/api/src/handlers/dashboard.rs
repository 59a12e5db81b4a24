//! Handlers for the `/dashboard` resource.
//!
//! Each endpoint fans its independent reads out concurrently; the figures
//! may be marginally stale relative to each other.

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use gigledger_core::dashboard::{
    month_bounds, trailing_months, ACTIVITY_PER_ENTITY, CHART_MONTHS,
};
use gigledger_core::types::Timestamp;
use gigledger_db::models::dashboard::{
    merge_activity, ActivityItem, ChartPoint, DashboardStats, MonthTotals,
};
use gigledger_db::repositories::{DashboardRepo, PaymentRepo};

use crate::error::AppResult;
use crate::handlers::today;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// GET /api/v1/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let (month_start, month_end) = month_bounds(today());

    let (counts, revenue) = tokio::try_join!(
        DashboardRepo::entity_counts(
            &state.pool,
            auth.user_id,
            start_of_day(month_start),
            start_of_day(month_end),
        ),
        DashboardRepo::revenue_totals(&state.pool, auth.user_id, month_start, month_end),
    )?;

    Ok(Json(DataResponse::new(DashboardStats {
        active_clients: counts.active_clients,
        active_projects: counts.active_projects,
        pending_tasks: counts.pending_tasks,
        total_workers: counts.total_workers,
        total_revenue: revenue.total_revenue,
        pending_payments: revenue.pending_payments,
        monthly_revenue: revenue.monthly_revenue,
        tasks_completed_this_month: counts.tasks_completed_this_month,
    })))
}

/// GET /api/v1/dashboard/chart
///
/// One point per month for the trailing window, oldest first. Months
/// without paid payments report zeros.
pub async fn chart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ChartPoint>>>> {
    let months = trailing_months(today(), CHART_MONTHS);
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Ok(Json(DataResponse::new(Vec::new())));
    };

    let rows = DashboardRepo::monthly_totals(&state.pool, auth.user_id, first.start, last.end)
        .await?;

    let points = months
        .iter()
        .map(|month| {
            let totals = rows
                .iter()
                .find(|row| row.month_start == month.start)
                .map(|row| row.totals.clone())
                .unwrap_or_else(MonthTotals::default);
            ChartPoint::new(month.label.clone(), totals)
        })
        .collect();

    Ok(Json(DataResponse::new(points)))
}

/// GET /api/v1/dashboard/activity
pub async fn activity(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ActivityItem>>>> {
    let (clients, projects, tasks, payments) = tokio::try_join!(
        DashboardRepo::recent_clients(&state.pool, auth.user_id, ACTIVITY_PER_ENTITY),
        DashboardRepo::recent_projects(&state.pool, auth.user_id, ACTIVITY_PER_ENTITY),
        DashboardRepo::recent_tasks(&state.pool, auth.user_id, ACTIVITY_PER_ENTITY),
        PaymentRepo::recent(&state.pool, auth.user_id, ACTIVITY_PER_ENTITY),
    )?;

    let feed = merge_activity(
        clients
            .into_iter()
            .map(ActivityItem::client)
            .chain(projects.into_iter().map(ActivityItem::project))
            .chain(tasks.into_iter().map(ActivityItem::task))
            .chain(payments.into_iter().map(ActivityItem::payment)),
    );

    Ok(Json(DataResponse::new(feed)))
}
