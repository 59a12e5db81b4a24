//! Derived aggregate maintenance for projects and workers.
//!
//! Every function takes a `&mut PgConnection` so it runs inside the
//! caller's transaction: a child write and the recomputation of its
//! parents commit or roll back together.
//!
//! Stored values are raw sums:
//! - `projects.total_cost` = `SUM(tasks.cost)`
//! - `projects.paid_amount` = `SUM(payments.amount)` where PAID
//! - `workers.total_earned` = `SUM(tasks.cost)` over assigned tasks
//! - `workers.total_paid` = `SUM(payments.amount)` where PAID

use gigledger_core::error::CoreError;
use gigledger_core::finance::aggregate_drifted;
use gigledger_core::types::DbId;
use sqlx::{FromRow, PgConnection};

use crate::error::DbError;
use crate::models::project::Project;
use crate::models::worker::Worker;
use crate::repositories::project_repo::COLUMNS as PROJECT_COLUMNS;
use crate::repositories::worker_repo::COLUMNS as WORKER_COLUMNS;

/// Freshly summed project aggregates.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct ProjectSums {
    pub total_cost: f64,
    pub paid_amount: f64,
}

/// Recomputes and persists derived aggregates.
pub struct AggregateRepo;

impl AggregateRepo {
    /// Lock an owned project row for the rest of the transaction.
    pub async fn lock_project(
        conn: &mut PgConnection,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Lock an owned worker row for the rest of the transaction.
    pub async fn lock_worker(
        conn: &mut PgConnection,
        user_id: DbId,
        worker_id: DbId,
    ) -> Result<Option<Worker>, sqlx::Error> {
        let query = format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, Worker>(&query)
            .bind(worker_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Lock every parent a child mutation touches.
    ///
    /// Rows are locked projects first, then workers, each in ascending id
    /// order, so concurrent writers never wait on each other in a cycle.
    /// A parent that does not exist or belongs to another account yields
    /// `NotFound`.
    pub async fn lock_parents(
        conn: &mut PgConnection,
        user_id: DbId,
        project_ids: &[Option<DbId>],
        worker_ids: &[Option<DbId>],
    ) -> Result<(), DbError> {
        for project_id in sorted_ids(project_ids) {
            if Self::lock_project(conn, user_id, project_id).await?.is_none() {
                return Err(CoreError::NotFound {
                    entity: "Project",
                    id: project_id,
                }
                .into());
            }
        }
        for worker_id in sorted_ids(worker_ids) {
            if Self::lock_worker(conn, user_id, worker_id).await?.is_none() {
                return Err(CoreError::NotFound {
                    entity: "Worker",
                    id: worker_id,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Store `SUM(tasks.cost)` as the project's `total_cost`.
    ///
    /// `None` is a no-op. A project id with no row fails with
    /// `RowNotFound`. Returns the stored value.
    pub async fn recompute_project_total_cost(
        conn: &mut PgConnection,
        project_id: Option<DbId>,
    ) -> Result<Option<f64>, sqlx::Error> {
        let Some(project_id) = project_id else {
            return Ok(None);
        };
        let total: f64 = sqlx::query_scalar(
            "UPDATE projects SET total_cost = (
                 SELECT COALESCE(SUM(cost), 0) FROM tasks WHERE project_id = $1
             )
             WHERE id = $1
             RETURNING total_cost",
        )
        .bind(project_id)
        .fetch_one(conn)
        .await?;
        tracing::debug!(project_id, total_cost = total, "Recomputed project total cost");
        Ok(Some(total))
    }

    /// Store the sum of the project's PAID payments as `paid_amount`.
    pub async fn recompute_project_paid_amount(
        conn: &mut PgConnection,
        project_id: Option<DbId>,
    ) -> Result<Option<f64>, sqlx::Error> {
        let Some(project_id) = project_id else {
            return Ok(None);
        };
        let paid: f64 = sqlx::query_scalar(
            "UPDATE projects SET paid_amount = (
                 SELECT COALESCE(SUM(amount), 0) FROM payments
                 WHERE project_id = $1 AND status = 'PAID'
             )
             WHERE id = $1
             RETURNING paid_amount",
        )
        .bind(project_id)
        .fetch_one(conn)
        .await?;
        tracing::debug!(project_id, paid_amount = paid, "Recomputed project paid amount");
        Ok(Some(paid))
    }

    /// Store both worker rollups from the worker's tasks and payments.
    pub async fn recompute_worker_totals(
        conn: &mut PgConnection,
        worker_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        let Some(worker_id) = worker_id else {
            return Ok(());
        };
        let (earned, paid): (f64, f64) = sqlx::query_as(
            "UPDATE workers SET
                 total_earned = (
                     SELECT COALESCE(SUM(cost), 0) FROM tasks WHERE assigned_to_id = $1
                 ),
                 total_paid = (
                     SELECT COALESCE(SUM(amount), 0) FROM payments
                     WHERE worker_id = $1 AND status = 'PAID'
                 )
             WHERE id = $1
             RETURNING total_earned, total_paid",
        )
        .bind(worker_id)
        .fetch_one(conn)
        .await?;
        tracing::debug!(
            worker_id,
            total_earned = earned,
            total_paid = paid,
            "Recomputed worker totals"
        );
        Ok(())
    }

    /// Recompute both project aggregates for each distinct id.
    pub async fn recompute_projects(
        conn: &mut PgConnection,
        project_ids: &[Option<DbId>],
    ) -> Result<(), sqlx::Error> {
        for project_id in sorted_ids(project_ids) {
            Self::recompute_project_total_cost(conn, Some(project_id)).await?;
            Self::recompute_project_paid_amount(conn, Some(project_id)).await?;
        }
        Ok(())
    }

    /// Recompute worker rollups for each distinct id.
    pub async fn recompute_workers(
        conn: &mut PgConnection,
        worker_ids: &[Option<DbId>],
    ) -> Result<(), sqlx::Error> {
        for worker_id in sorted_ids(worker_ids) {
            Self::recompute_worker_totals(conn, Some(worker_id)).await?;
        }
        Ok(())
    }

    /// Sum a project's children without writing anything.
    pub async fn project_sums(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<ProjectSums, sqlx::Error> {
        sqlx::query_as::<_, ProjectSums>(
            "SELECT
                 (SELECT COALESCE(SUM(cost), 0) FROM tasks WHERE project_id = $1)
                     AS total_cost,
                 (SELECT COALESCE(SUM(amount), 0) FROM payments
                  WHERE project_id = $1 AND status = 'PAID')
                     AS paid_amount",
        )
        .bind(project_id)
        .fetch_one(conn)
        .await
    }

    /// Load an owned project, re-persisting its aggregates if the stored
    /// values no longer match its children.
    pub async fn load_project_repaired(
        conn: &mut PgConnection,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let Some(mut project) = Self::lock_project(conn, user_id, project_id).await? else {
            return Ok(None);
        };
        let fresh = Self::project_sums(conn, project_id).await?;
        if aggregate_drifted(project.total_cost, fresh.total_cost)
            || aggregate_drifted(project.paid_amount, fresh.paid_amount)
        {
            tracing::warn!(
                project_id,
                stored_total_cost = project.total_cost,
                fresh_total_cost = fresh.total_cost,
                stored_paid_amount = project.paid_amount,
                fresh_paid_amount = fresh.paid_amount,
                "Repairing drifted project aggregates",
            );
            project.total_cost = Self::recompute_project_total_cost(conn, Some(project_id))
                .await?
                .unwrap_or(fresh.total_cost);
            project.paid_amount = Self::recompute_project_paid_amount(conn, Some(project_id))
                .await?
                .unwrap_or(fresh.paid_amount);
        }
        Ok(Some(project))
    }
}

/// Distinct ids in ascending order.
fn sorted_ids(ids: &[Option<DbId>]) -> Vec<DbId> {
    let mut ids: Vec<DbId> = ids.iter().flatten().copied().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
