//! Repository for the `payments` table.
//!
//! Writes run in a transaction together with the recomputation of the
//! prior and resulting project `paid_amount` and worker `total_paid`.

use chrono::NaiveDate;
use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::payment::{
    Payment, PaymentFilter, PaymentRow, PaymentStats, PaymentWithNames, UpdatePayment,
};
use crate::repositories::AggregateRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, client_id, project_id, worker_id, amount, type, status, \
     description, due_date, paid_date, created_at, updated_at";

/// [`COLUMNS`] qualified with the `pm` alias, plus joined names.
const WITH_NAMES: &str = "pm.id, pm.user_id, pm.client_id, pm.project_id, pm.worker_id, \
     pm.amount, pm.type, pm.status, pm.description, pm.due_date, pm.paid_date, \
     pm.created_at, pm.updated_at, \
     c.name AS client_name, p.name AS project_name, w.name AS worker_name";

const JOINS: &str = "FROM payments pm
     LEFT JOIN clients c ON c.id = pm.client_id
     LEFT JOIN projects p ON p.id = pm.project_id
     LEFT JOIN workers w ON w.id = pm.worker_id";

/// Provides CRUD operations for payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Find an owned payment by id.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an owned payment with linked entity names.
    pub async fn find_with_names(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<PaymentWithNames>, sqlx::Error> {
        let query = format!("SELECT {WITH_NAMES} {JOINS} WHERE pm.id = $1 AND pm.user_id = $2");
        sqlx::query_as::<_, PaymentWithNames>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owned payments matching the optional filters, newest first.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        filter: &PaymentFilter,
    ) -> Result<Vec<PaymentWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_NAMES} {JOINS}
             WHERE pm.user_id = $1
               AND ($2::TEXT IS NULL OR pm.type = $2)
               AND ($3::TEXT IS NULL OR pm.status = $3)
             ORDER BY pm.created_at DESC, pm.id DESC"
        );
        sqlx::query_as::<_, PaymentWithNames>(&query)
            .bind(user_id)
            .bind(filter.payment_type.map(|t| t.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recently created payments.
    pub async fn recent(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<PaymentWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_NAMES} {JOINS}
             WHERE pm.user_id = $1
             ORDER BY pm.created_at DESC, pm.id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, PaymentWithNames>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Payments booked against a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Payments addressed to a worker, newest first.
    pub async fn list_for_worker(
        pool: &PgPool,
        worker_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE worker_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(worker_id)
            .fetch_all(pool)
            .await
    }

    /// PAID payments of the given projects.
    pub async fn paid_for_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments
             WHERE project_id = ANY($1) AND status = 'PAID'
             ORDER BY id"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert a payment and recompute its project and worker.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        row: &PaymentRow,
    ) -> Result<Payment, DbError> {
        let mut tx = pool.begin().await?;

        ensure_client(&mut tx, user_id, row.target.client_id()).await?;
        AggregateRepo::lock_parents(
            &mut tx,
            user_id,
            &[row.target.project_id()],
            &[row.target.worker_id()],
        )
        .await?;

        let query = format!(
            "INSERT INTO payments
                 (user_id, client_id, project_id, worker_id, amount, type, status,
                  description, due_date, paid_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let payment = bind_row(sqlx::query_as::<_, Payment>(&query).bind(user_id), row)
            .fetch_one(&mut *tx)
            .await?;

        AggregateRepo::recompute_project_paid_amount(&mut tx, payment.project_id).await?;
        AggregateRepo::recompute_worker_totals(&mut tx, payment.worker_id).await?;

        tx.commit().await?;
        tracing::info!(
            user_id,
            payment_id = payment.id,
            amount = payment.amount,
            status = %payment.status,
            "Payment recorded",
        );
        Ok(payment)
    }

    /// Apply a patch to an owned payment and recompute the prior and
    /// resulting parents.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        patch: UpdatePayment,
        today: NaiveDate,
    ) -> Result<Option<Payment>, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = lock(&mut tx, user_id, id).await? else {
            return Ok(None);
        };
        let (prior_project, prior_worker) = (current.project_id, current.worker_id);

        let row = patch.merge(current, today)?;
        ensure_client(&mut tx, user_id, row.target.client_id()).await?;
        AggregateRepo::lock_parents(
            &mut tx,
            user_id,
            &[prior_project, row.target.project_id()],
            &[prior_worker, row.target.worker_id()],
        )
        .await?;

        let query = format!(
            "UPDATE payments SET
                 client_id = $3,
                 project_id = $4,
                 worker_id = $5,
                 amount = $6,
                 type = $7,
                 status = $8,
                 description = $9,
                 due_date = $10,
                 paid_date = $11
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let payment = bind_row(sqlx::query_as::<_, Payment>(&query).bind(id).bind(user_id), &row)
            .fetch_one(&mut *tx)
            .await?;

        for project_id in [prior_project, payment.project_id] {
            AggregateRepo::recompute_project_paid_amount(&mut tx, project_id).await?;
        }
        AggregateRepo::recompute_workers(&mut tx, &[prior_worker, payment.worker_id]).await?;

        tx.commit().await?;
        tracing::info!(user_id, payment_id = id, status = %payment.status, "Payment updated");
        Ok(Some(payment))
    }

    /// Delete an owned payment and recompute its parents.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = lock(&mut tx, user_id, id).await? else {
            return Ok(false);
        };
        AggregateRepo::lock_parents(
            &mut tx,
            user_id,
            &[current.project_id],
            &[current.worker_id],
        )
        .await?;

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        AggregateRepo::recompute_project_paid_amount(&mut tx, current.project_id).await?;
        AggregateRepo::recompute_worker_totals(&mut tx, current.worker_id).await?;

        tx.commit().await?;
        tracing::info!(user_id, payment_id = id, "Payment deleted");
        Ok(true)
    }

    /// Move the caller's PENDING payments due before `today` to OVERDUE.
    ///
    /// The set of PAID payments is unchanged, so no aggregate moves.
    pub async fn mark_overdue(
        pool: &PgPool,
        user_id: DbId,
        today: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'OVERDUE'
             WHERE user_id = $1 AND status = 'PENDING' AND due_date < $2",
        )
        .bind(user_id)
        .bind(today)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Paid and pending totals per direction.
    pub async fn stats(pool: &PgPool, user_id: DbId) -> Result<PaymentStats, sqlx::Error> {
        sqlx::query_as::<_, PaymentStats>(
            "SELECT
                 COALESCE(SUM(amount) FILTER (WHERE type = 'INCOMING' AND status = 'PAID'), 0)
                     AS total_incoming,
                 COALESCE(SUM(amount) FILTER (WHERE type = 'OUTGOING' AND status = 'PAID'), 0)
                     AS total_outgoing,
                 COALESCE(SUM(amount) FILTER (WHERE type = 'INCOMING' AND status = 'PENDING'), 0)
                     AS pending_incoming,
                 COALESCE(SUM(amount) FILTER (WHERE type = 'OUTGOING' AND status = 'PENDING'), 0)
                     AS pending_outgoing,
                 COUNT(*) FILTER (WHERE status = 'OVERDUE') AS overdue_count,
                 COALESCE(SUM(amount) FILTER (WHERE type = 'INCOMING' AND status = 'PAID'), 0)
                   - COALESCE(SUM(amount) FILTER (WHERE type = 'OUTGOING' AND status = 'PAID'), 0)
                     AS net_profit
             FROM payments
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}

async fn lock(
    conn: &mut PgConnection,
    user_id: DbId,
    id: DbId,
) -> Result<Option<Payment>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1 AND user_id = $2 FOR UPDATE");
    sqlx::query_as::<_, Payment>(&query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

/// Reject a client id that is missing or owned by another account.
async fn ensure_client(
    conn: &mut PgConnection,
    user_id: DbId,
    client_id: Option<DbId>,
) -> Result<(), DbError> {
    let Some(client_id) = client_id else {
        return Ok(());
    };
    let found: Option<DbId> =
        sqlx::query_scalar("SELECT id FROM clients WHERE id = $1 AND user_id = $2")
            .bind(client_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound {
            entity: "Client",
            id: client_id,
        }
        .into()),
    }
}

type PaymentQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, Payment, sqlx::postgres::PgArguments>;

/// Bind the payment columns in insert/update order.
fn bind_row<'q>(query: PaymentQuery<'q>, row: &'q PaymentRow) -> PaymentQuery<'q> {
    query
        .bind(row.target.client_id())
        .bind(row.target.project_id())
        .bind(row.target.worker_id())
        .bind(row.amount)
        .bind(row.payment_type.as_str())
        .bind(row.status.as_str())
        .bind(&row.description)
        .bind(row.due_date)
        .bind(row.paid_date)
}
