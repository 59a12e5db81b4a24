//! Repository for the `workers` table.

use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::worker::{CreateWorker, Worker, WorkerStats, WorkerWithCounts};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, name, email, phone, skills, hourly_rate, \
     total_earned, total_paid, status, joined_at, created_at, updated_at";

/// Provides CRUD operations for workers.
pub struct WorkerRepo;

impl WorkerRepo {
    /// Insert a new worker. Rollups start at zero.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateWorker,
    ) -> Result<Worker, sqlx::Error> {
        let query = format!(
            "INSERT INTO workers (user_id, name, email, phone, skills, hourly_rate, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Worker>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.skills)
            .bind(input.hourly_rate)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an owned worker by id.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Worker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workers WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Worker>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All owned workers with task and payment counts, newest first.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<WorkerWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                    (SELECT COUNT(*) FROM tasks t WHERE t.assigned_to_id = workers.id)
                        AS task_count,
                    (SELECT COUNT(*) FROM payments pm WHERE pm.worker_id = workers.id)
                        AS payment_count
             FROM workers
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, WorkerWithCounts>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite every editable column. Rollups are untouched.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &CreateWorker,
    ) -> Result<Option<Worker>, sqlx::Error> {
        let query = format!(
            "UPDATE workers SET
                name = $3,
                email = $4,
                phone = $5,
                skills = $6,
                hourly_rate = $7,
                status = $8
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Worker>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.skills)
            .bind(input.hourly_rate)
            .bind(input.status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete an owned worker with no tasks and no payments.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM workers WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let (tasks, payments): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM tasks WHERE assigned_to_id = $1),
                    (SELECT COUNT(*) FROM payments WHERE worker_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if tasks > 0 || payments > 0 {
            return Err(CoreError::InvalidState(format!(
                "Cannot delete worker with {tasks} assigned task(s) and {payments} payment(s). \
                 Reassign or remove them first."
            ))
            .into());
        }

        sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Headcount, rollup totals, pending outgoing payments and average rate.
    pub async fn stats(pool: &PgPool, user_id: DbId) -> Result<WorkerStats, sqlx::Error> {
        sqlx::query_as::<_, WorkerStats>(
            "SELECT
                 COUNT(*) AS total_workers,
                 COUNT(*) FILTER (WHERE status = 'ACTIVE') AS active_workers,
                 COALESCE(SUM(total_earned), 0) AS total_earned,
                 COALESCE(SUM(total_paid), 0) AS total_paid,
                 (SELECT COALESCE(SUM(amount), 0) FROM payments
                  WHERE user_id = $1 AND worker_id IS NOT NULL
                    AND status IN ('PENDING', 'OVERDUE')) AS pending_payments,
                 COALESCE(AVG(hourly_rate), 0) AS average_hourly_rate
             FROM workers
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
