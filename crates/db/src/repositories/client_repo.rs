//! Repository for the `clients` table.

use gigledger_core::error::CoreError;
use gigledger_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::client::{Client, ClientWithCounts, CreateClient};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, email, phone, company, address, notes, status, \
     created_at, updated_at";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a new client, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateClient,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (user_id, name, email, phone, company, address, notes, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.address)
            .bind(&input.notes)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an owned client by id.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All owned clients with project and payment counts, newest first.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<ClientWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                    (SELECT COUNT(*) FROM projects p WHERE p.client_id = clients.id)
                        AS project_count,
                    (SELECT COUNT(*) FROM payments pm WHERE pm.client_id = clients.id)
                        AS payment_count
             FROM clients
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ClientWithCounts>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite every editable column.
    ///
    /// Returns `None` if no owned row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &CreateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = $3,
                email = $4,
                phone = $5,
                company = $6,
                address = $7,
                notes = $8,
                status = $9
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.address)
            .bind(&input.notes)
            .bind(input.status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete an owned client that has no projects or payments.
    ///
    /// Returns `false` if no such client exists; a client with dependents
    /// is rejected with `InvalidState` and left in place.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM clients WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let (projects, payments): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM projects WHERE client_id = $1),
                    (SELECT COUNT(*) FROM payments WHERE client_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if projects > 0 {
            return Err(CoreError::InvalidState(format!(
                "Cannot delete client with {projects} existing project(s). \
                 Delete or reassign the projects first."
            ))
            .into());
        }
        if payments > 0 {
            return Err(CoreError::InvalidState(format!(
                "Cannot delete client with {payments} recorded payment(s)."
            ))
            .into());
        }

        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
