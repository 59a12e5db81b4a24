//! Repository for the `projects` table.

use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::project::{CreateProject, Project, ProjectListRow};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, client_id, name, description, status, \
     start_date, end_date, budget, hourly_rate, total_cost, paid_amount, created_at, updated_at";

/// [`COLUMNS`] qualified with the `p` alias for joins.
const P_COLUMNS: &str = "p.id, p.user_id, p.client_id, p.name, p.description, p.status, \
     p.start_date, p.end_date, p.budget, p.hourly_rate, p.total_cost, p.paid_amount, \
     p.created_at, p.updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project under an owned client.
    ///
    /// Returns `None` if the client does not exist or belongs to another
    /// account.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                 (user_id, client_id, name, description, status, start_date, end_date,
                  budget, hourly_rate)
             SELECT $1, c.id, $3, $4, $5, $6, $7, $8, $9
             FROM clients c WHERE c.id = $2 AND c.user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(input.client_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.hourly_rate)
            .fetch_optional(pool)
            .await
    }

    /// Find an owned project by id.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owned projects among `ids`, in id order.
    pub async fn find_many(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 AND id = ANY($2) ORDER BY id"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// All owned projects with client name and child counts, newest first.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<ProjectListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS},
                    c.name AS client_name,
                    c.company AS client_company,
                    (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count,
                    (SELECT COUNT(*) FROM payments pm WHERE pm.project_id = p.id) AS payment_count
             FROM projects p
             JOIN clients c ON c.id = p.client_id
             WHERE p.user_id = $1
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, ProjectListRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Projects belonging to one client, newest first.
    pub async fn list_for_client(
        pool: &PgPool,
        user_id: DbId,
        client_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE user_id = $1 AND client_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite every editable column. Derived aggregates are untouched.
    ///
    /// Returns `None` if no owned row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &CreateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                client_id = $3,
                name = $4,
                description = $5,
                status = $6,
                start_date = $7,
                end_date = $8,
                budget = $9,
                hourly_rate = $10
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.client_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.hourly_rate)
            .fetch_optional(pool)
            .await
    }

    /// Delete an owned project that has no tasks or payments.
    ///
    /// Returns `false` if no such project exists; a project with
    /// dependents is rejected with `InvalidState` and left in place.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM projects WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let (tasks, payments): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM tasks WHERE project_id = $1),
                    (SELECT COUNT(*) FROM payments WHERE project_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if tasks > 0 || payments > 0 {
            return Err(CoreError::InvalidState(format!(
                "Cannot delete project with {tasks} task(s) and {payments} payment(s). \
                 Remove them first."
            ))
            .into());
        }

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
