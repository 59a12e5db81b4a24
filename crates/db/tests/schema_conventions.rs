//! Structural rules of the ledger schema, checked against the migrated
//! database rather than the SQL text.

mod common;

use sqlx::PgPool;

async fn column_type(pool: &PgPool, table: &str, column: &str) -> Option<String> {
    sqlx::query_scalar(
        "SELECT data_type FROM information_schema.columns
         WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
    )
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await
    .unwrap()
}

async fn ledger_tables(pool: &PgPool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT table_name FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn every_table_has_bigint_id_and_timestamptz_audit_columns(pool: PgPool) {
    let tables = ledger_tables(&pool).await;
    assert_eq!(
        tables,
        ["branding_settings", "clients", "payments", "projects", "tasks", "users", "workers"]
    );

    for table in &tables {
        assert_eq!(column_type(&pool, table, "id").await.as_deref(), Some("bigint"), "{table}.id");
        for column in ["created_at", "updated_at"] {
            assert_eq!(
                column_type(&pool, table, column).await.as_deref(),
                Some("timestamp with time zone"),
                "{table}.{column}"
            );
        }
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn money_and_hours_are_double_precision(pool: PgPool) {
    let columns = [
        ("projects", "budget"),
        ("projects", "total_cost"),
        ("projects", "paid_amount"),
        ("tasks", "hourly_rate"),
        ("tasks", "estimated_hours"),
        ("tasks", "actual_hours"),
        ("tasks", "cost"),
        ("workers", "hourly_rate"),
        ("workers", "total_earned"),
        ("workers", "total_paid"),
        ("payments", "amount"),
    ];
    for (table, column) in columns {
        assert_eq!(
            column_type(&pool, table, column).await.as_deref(),
            Some("double precision"),
            "{table}.{column}"
        );
    }
}

/// Account ownership cascades; links between ledger rows never do, so a
/// deletion guard can only be bypassed by deleting the whole account.
#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_keys_restrict_except_account_ownership(pool: PgPool) {
    let rules: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT kcu.table_name, kcu.column_name, rc.delete_rule
         FROM information_schema.referential_constraints rc
         JOIN information_schema.key_column_usage kcu
             ON kcu.constraint_name = rc.constraint_name
            AND kcu.constraint_schema = rc.constraint_schema
         WHERE rc.constraint_schema = 'public'
         ORDER BY 1, 2",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rules.is_empty());
    for (table, column, rule) in &rules {
        let expected = if column == "user_id" { "CASCADE" } else { "RESTRICT" };
        assert_eq!(rule, expected, "{table}.{column}");

        let indexed: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM pg_indexes
                 WHERE schemaname = 'public' AND tablename = $1 AND indexdef LIKE $2
             )",
        )
        .bind(table)
        .bind(format!("%({column})%"))
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(indexed, "{table}.{column} has no index");
    }
}

/// Insert a task row directly, bypassing the repository's stamping.
async fn raw_task(
    pool: &PgPool,
    user_id: i64,
    project_id: i64,
    status: &str,
    stamped: bool,
) -> Result<sqlx::postgres::PgQueryResult, sqlx::Error> {
    sqlx::query(
        "INSERT INTO tasks (user_id, project_id, title, status, completed_at)
         VALUES ($1, $2, 'raw', $3, CASE WHEN $4 THEN NOW() END)",
    )
    .bind(user_id)
    .bind(project_id)
    .bind(status)
    .bind(stamped)
    .execute(pool)
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completed_at_must_track_completed_status(pool: PgPool) {
    let user_id = common::user(&pool, "schema@example.com").await;
    let client_id = common::client(&pool, user_id).await;
    let project = common::project(&pool, user_id, client_id, None).await;

    assert!(raw_task(&pool, user_id, project.id, "COMPLETED", true).await.is_ok());
    assert!(raw_task(&pool, user_id, project.id, "TODO", false).await.is_ok());

    for (status, stamped) in [("COMPLETED", false), ("REVIEW", true)] {
        let err = raw_task(&pool, user_id, project.id, status, stamped)
            .await
            .unwrap_err();
        let db_err = err.as_database_error().unwrap();
        assert_eq!(db_err.constraint(), Some("ck_tasks_completed_at"));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn payment_cannot_name_client_and_worker(pool: PgPool) {
    let user_id = common::user(&pool, "schema@example.com").await;
    let client_id = common::client(&pool, user_id).await;
    let worker = common::worker(&pool, user_id, "Bob").await;

    let err = sqlx::query(
        "INSERT INTO payments (user_id, client_id, worker_id, amount, type)
         VALUES ($1, $2, $3, 10, 'INCOMING')",
    )
    .bind(user_id)
    .bind(client_id)
    .bind(worker.id)
    .execute(&pool)
    .await
    .unwrap_err();

    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("ck_payments_single_counterparty")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updates_refresh_updated_at(pool: PgPool) {
    let user_id = common::user(&pool, "schema@example.com").await;
    let client_id = common::client(&pool, user_id).await;

    sqlx::query("UPDATE clients SET updated_at = created_at - INTERVAL '1 day' WHERE id = $1")
        .bind(client_id)
        .execute(&pool)
        .await
        .unwrap();

    let (created, updated): (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) =
        sqlx::query_as("SELECT created_at, updated_at FROM clients WHERE id = $1")
            .bind(client_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(updated >= created, "trigger should overwrite updated_at");
}
