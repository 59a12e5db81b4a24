//! Read-only queries behind the dashboard endpoints.
//!
//! Each function is a single independent statement so handlers can run
//! them concurrently.

use chrono::NaiveDate;
use gigledger_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::dashboard::{MonthTotals, RecentEntry};

/// Entity counters for the headline stats.
#[derive(Debug, Clone, Default, FromRow)]
pub struct EntityCounts {
    pub active_clients: i64,
    pub active_projects: i64,
    pub pending_tasks: i64,
    pub total_workers: i64,
    pub tasks_completed_this_month: i64,
}

/// Incoming payment totals for the headline stats.
#[derive(Debug, Clone, Default, FromRow)]
pub struct RevenueTotals {
    pub total_revenue: f64,
    pub pending_payments: f64,
    pub monthly_revenue: f64,
}

/// Paid totals of one month, keyed by its first day.
#[derive(Debug, Clone, FromRow)]
pub struct MonthRow {
    pub month_start: NaiveDate,
    #[sqlx(flatten)]
    pub totals: MonthTotals,
}

pub struct DashboardRepo;

impl DashboardRepo {
    /// Counts of active clients/projects, open tasks, workers, and tasks
    /// completed in `[month_start, month_end)`.
    pub async fn entity_counts(
        pool: &PgPool,
        user_id: DbId,
        month_start: Timestamp,
        month_end: Timestamp,
    ) -> Result<EntityCounts, sqlx::Error> {
        sqlx::query_as::<_, EntityCounts>(
            "SELECT
                 (SELECT COUNT(*) FROM clients WHERE user_id = $1 AND status = 'ACTIVE')
                     AS active_clients,
                 (SELECT COUNT(*) FROM projects WHERE user_id = $1 AND status = 'ACTIVE')
                     AS active_projects,
                 (SELECT COUNT(*) FROM tasks WHERE user_id = $1
                     AND status IN ('TODO', 'IN_PROGRESS', 'REVIEW')) AS pending_tasks,
                 (SELECT COUNT(*) FROM workers WHERE user_id = $1) AS total_workers,
                 (SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status = 'COMPLETED'
                     AND completed_at >= $2 AND completed_at < $3)
                     AS tasks_completed_this_month",
        )
        .bind(user_id)
        .bind(month_start)
        .bind(month_end)
        .fetch_one(pool)
        .await
    }

    /// Paid and pending incoming totals; `monthly_revenue` covers payments
    /// paid in `[month_start, month_end)`.
    pub async fn revenue_totals(
        pool: &PgPool,
        user_id: DbId,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<RevenueTotals, sqlx::Error> {
        sqlx::query_as::<_, RevenueTotals>(
            "SELECT
                 COALESCE(SUM(amount) FILTER (WHERE status = 'PAID'), 0) AS total_revenue,
                 COALESCE(SUM(amount) FILTER (WHERE status = 'PENDING'), 0) AS pending_payments,
                 COALESCE(SUM(amount) FILTER (
                     WHERE status = 'PAID' AND paid_date >= $2 AND paid_date < $3
                 ), 0) AS monthly_revenue
             FROM payments
             WHERE user_id = $1 AND type = 'INCOMING'",
        )
        .bind(user_id)
        .bind(month_start)
        .bind(month_end)
        .fetch_one(pool)
        .await
    }

    /// PAID incoming and outgoing sums per month with `paid_date` in
    /// `[from, to)`. Months without payments are absent.
    pub async fn monthly_totals(
        pool: &PgPool,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthRow>, sqlx::Error> {
        sqlx::query_as::<_, MonthRow>(
            "SELECT
                 date_trunc('month', paid_date)::DATE AS month_start,
                 COALESCE(SUM(amount) FILTER (WHERE type = 'INCOMING'), 0) AS revenue,
                 COALESCE(SUM(amount) FILTER (WHERE type = 'OUTGOING'), 0) AS expenses
             FROM payments
             WHERE user_id = $1 AND status = 'PAID' AND paid_date >= $2 AND paid_date < $3
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn recent_clients(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<RecentEntry>, sqlx::Error> {
        sqlx::query_as::<_, RecentEntry>(
            "SELECT id, name, NULL::TEXT AS context, created_at
             FROM clients WHERE user_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn recent_projects(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<RecentEntry>, sqlx::Error> {
        sqlx::query_as::<_, RecentEntry>(
            "SELECT p.id, p.name, c.name AS context, p.created_at
             FROM projects p JOIN clients c ON c.id = p.client_id
             WHERE p.user_id = $1
             ORDER BY p.created_at DESC, p.id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn recent_tasks(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<RecentEntry>, sqlx::Error> {
        sqlx::query_as::<_, RecentEntry>(
            "SELECT t.id, t.title AS name, p.name AS context, t.created_at
             FROM tasks t JOIN projects p ON p.id = t.project_id
             WHERE t.user_id = $1
             ORDER BY t.created_at DESC, t.id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
