//! Repository for the `tasks` table.
//!
//! Writes run in a transaction together with the recomputation of every
//! affected parent: the task's prior and resulting project and worker.

use chrono::NaiveDate;
use gigledger_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::task::{Task, TaskFilter, TaskRow, TaskStats, TaskWithNames, UpdateTask};
use crate::repositories::AggregateRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, project_id, assigned_to_id, title, description, status, \
     priority, estimated_hours, actual_hours, hourly_rate, cost, due_date, completed_at, \
     created_at, updated_at";

/// [`COLUMNS`] qualified with the `t` alias, plus joined names.
const WITH_NAMES: &str = "t.id, t.user_id, t.project_id, t.assigned_to_id, t.title, \
     t.description, t.status, t.priority, t.estimated_hours, t.actual_hours, t.hourly_rate, \
     t.cost, t.due_date, t.completed_at, t.created_at, t.updated_at, \
     p.name AS project_name, w.name AS assigned_to_name";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Find an owned task by id.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an owned task with its project and assignee names.
    pub async fn find_with_names(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<TaskWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_NAMES}
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             LEFT JOIN workers w ON w.id = t.assigned_to_id
             WHERE t.id = $1 AND t.user_id = $2"
        );
        sqlx::query_as::<_, TaskWithNames>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owned tasks matching the optional filters, newest first.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        filter: &TaskFilter,
    ) -> Result<Vec<TaskWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_NAMES}
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             LEFT JOIN workers w ON w.id = t.assigned_to_id
             WHERE t.user_id = $1
               AND ($2::TEXT IS NULL OR t.status = $2)
               AND ($3::TEXT IS NULL OR t.priority = $3)
               AND ($4::BIGINT IS NULL OR t.project_id = $4)
             ORDER BY t.created_at DESC, t.id DESC"
        );
        sqlx::query_as::<_, TaskWithNames>(&query)
            .bind(user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.priority.map(|p| p.as_str()))
            .bind(filter.project_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks of the given projects, oldest first.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<TaskWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_NAMES}
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             LEFT JOIN workers w ON w.id = t.assigned_to_id
             WHERE t.project_id = ANY($1)
             ORDER BY t.created_at, t.id"
        );
        sqlx::query_as::<_, TaskWithNames>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Tasks assigned to a worker, newest first.
    pub async fn list_for_worker(
        pool: &PgPool,
        worker_id: DbId,
    ) -> Result<Vec<TaskWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_NAMES}
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             LEFT JOIN workers w ON w.id = t.assigned_to_id
             WHERE t.assigned_to_id = $1
             ORDER BY t.created_at DESC, t.id DESC"
        );
        sqlx::query_as::<_, TaskWithNames>(&query)
            .bind(worker_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a task and recompute its project and worker.
    ///
    /// The project (and worker, if assigned) must be owned by `user_id`.
    pub async fn create(pool: &PgPool, user_id: DbId, row: &TaskRow) -> Result<Task, DbError> {
        row.check()?;
        let mut tx = pool.begin().await?;

        AggregateRepo::lock_parents(
            &mut tx,
            user_id,
            &[Some(row.project_id)],
            &[row.assigned_to_id],
        )
        .await?;

        let query = format!(
            "INSERT INTO tasks
                 (user_id, project_id, assigned_to_id, title, description, status, priority,
                  estimated_hours, actual_hours, hourly_rate, cost, due_date, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        let task = bind_row(sqlx::query_as::<_, Task>(&query).bind(user_id), row)
            .fetch_one(&mut *tx)
            .await?;

        AggregateRepo::recompute_project_total_cost(&mut tx, Some(task.project_id)).await?;
        AggregateRepo::recompute_worker_totals(&mut tx, task.assigned_to_id).await?;

        tx.commit().await?;
        tracing::info!(user_id, task_id = task.id, project_id = task.project_id, "Task created");
        Ok(task)
    }

    /// Apply a patch to an owned task and recompute the prior and
    /// resulting parents.
    ///
    /// Returns `None` if no owned task with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        patch: UpdateTask,
        now: Timestamp,
    ) -> Result<Option<Task>, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock(&mut tx, user_id, id).await? else {
            return Ok(None);
        };
        let (prior_project, prior_worker) = (current.project_id, current.assigned_to_id);

        let row = patch.merge(current, now);
        row.check()?;

        AggregateRepo::lock_parents(
            &mut tx,
            user_id,
            &[Some(prior_project), Some(row.project_id)],
            &[prior_worker, row.assigned_to_id],
        )
        .await?;

        let query = format!(
            "UPDATE tasks SET
                 project_id = $3,
                 assigned_to_id = $4,
                 title = $5,
                 description = $6,
                 status = $7,
                 priority = $8,
                 estimated_hours = $9,
                 actual_hours = $10,
                 hourly_rate = $11,
                 cost = $12,
                 due_date = $13,
                 completed_at = $14
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let task = bind_row(sqlx::query_as::<_, Task>(&query).bind(id).bind(user_id), &row)
            .fetch_one(&mut *tx)
            .await?;

        AggregateRepo::recompute_projects(&mut tx, &[Some(prior_project), Some(task.project_id)])
            .await?;
        AggregateRepo::recompute_workers(&mut tx, &[prior_worker, task.assigned_to_id]).await?;

        tx.commit().await?;
        tracing::info!(user_id, task_id = id, "Task updated");
        Ok(Some(task))
    }

    /// Delete an owned task and recompute its parents.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock(&mut tx, user_id, id).await? else {
            return Ok(false);
        };
        AggregateRepo::lock_parents(
            &mut tx,
            user_id,
            &[Some(current.project_id)],
            &[current.assigned_to_id],
        )
        .await?;

        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        AggregateRepo::recompute_project_total_cost(&mut tx, Some(current.project_id)).await?;
        AggregateRepo::recompute_worker_totals(&mut tx, current.assigned_to_id).await?;

        tx.commit().await?;
        tracing::info!(user_id, task_id = id, project_id = current.project_id, "Task deleted");
        Ok(true)
    }

    /// Counters over the caller's tasks. Overdue means still open and
    /// due before `today`.
    pub async fn stats(
        pool: &PgPool,
        user_id: DbId,
        today: NaiveDate,
    ) -> Result<TaskStats, sqlx::Error> {
        sqlx::query_as::<_, TaskStats>(
            "SELECT
                 COUNT(*) AS total,
                 COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed,
                 COUNT(*) FILTER (WHERE status = 'IN_PROGRESS') AS in_progress,
                 COUNT(*) FILTER (WHERE status IN ('TODO', 'IN_PROGRESS', 'REVIEW')) AS pending,
                 COUNT(*) FILTER (
                     WHERE status IN ('TODO', 'IN_PROGRESS', 'REVIEW') AND due_date < $2
                 ) AS overdue,
                 COALESCE(SUM(cost), 0) AS total_value,
                 COALESCE(SUM(cost) FILTER (WHERE status = 'COMPLETED'), 0) AS completed_value
             FROM tasks
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(pool)
        .await
    }

    async fn lock(
        conn: &mut PgConnection,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }
}

type TaskQuery<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, Task, sqlx::postgres::PgArguments>;

/// Bind the task columns in insert/update order.
fn bind_row<'q>(query: TaskQuery<'q>, row: &'q TaskRow) -> TaskQuery<'q> {
    query
        .bind(row.project_id)
        .bind(row.assigned_to_id)
        .bind(&row.title)
        .bind(&row.description)
        .bind(row.status.as_str())
        .bind(row.priority.as_str())
        .bind(row.estimated_hours)
        .bind(row.actual_hours)
        .bind(row.hourly_rate)
        .bind(row.cost)
        .bind(row.due_date)
        .bind(row.completed_at)
}

