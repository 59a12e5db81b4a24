//! CRUD, ownership scoping and deletion guards.

mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use gigledger_core::error::CoreError;
use gigledger_core::status::{ClientStatus, PaymentStatus};
use gigledger_db::models::client::UpdateClient;
use gigledger_db::models::payment::CreatePayment;
use gigledger_db::models::task::TaskFilter;
use gigledger_db::repositories::{
    ClientRepo, PaymentRepo, ProjectRepo, TaskRepo, UserRepo, WorkerRepo,
};
use gigledger_db::DbError;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check(pool: PgPool) {
    gigledger_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    common::user(&pool, "dup@example.com").await;
    let err = UserRepo::create(
        &pool,
        &gigledger_db::models::user::CreateUser {
            email: "dup@example.com".into(),
            name: "Other".into(),
            password_hash: "x".into(),
            role: gigledger_core::status::UserRole::Freelancer,
        },
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_users_email"));

    assert!(UserRepo::find_by_email(&pool, "DUP@example.com")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_update_merges_fields(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let id = common::client(&pool, user).await;
    let current = ClientRepo::find_by_id(&pool, user, id).await.unwrap().unwrap();

    let patch: UpdateClient =
        serde_json::from_value(json!({"email": "ops@acme.test", "status": "INACTIVE"})).unwrap();
    let updated = ClientRepo::update(&pool, user, id, &patch.merge(current))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Acme");
    assert_eq!(updated.email.as_deref(), Some("ops@acme.test"));
    assert_eq!(updated.status, ClientStatus::Inactive);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_accounts_see_nothing(pool: PgPool) {
    let owner = common::user(&pool, "owner@example.com").await;
    let other = common::user(&pool, "other@example.com").await;
    let client = common::client(&pool, owner).await;
    let project = common::project(&pool, owner, client, None).await;
    let task = common::task(&pool, owner, json!({"project_id": project.id, "title": "T"})).await;

    assert!(ClientRepo::find_by_id(&pool, other, client).await.unwrap().is_none());
    assert!(ProjectRepo::find_by_id(&pool, other, project.id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, other, task.id).await.unwrap().is_none());
    assert!(ClientRepo::list(&pool, other).await.unwrap().is_empty());
    assert!(TaskRepo::list(&pool, other, &TaskFilter::default())
        .await
        .unwrap()
        .is_empty());

    assert!(!TaskRepo::delete(&pool, other, task.id).await.unwrap());
    assert!(!ClientRepo::delete(&pool, other, client).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_requires_owned_client(pool: PgPool) {
    let owner = common::user(&pool, "owner@example.com").await;
    let other = common::user(&pool, "other@example.com").await;
    let client = common::client(&pool, owner).await;

    let input = serde_json::from_value(json!({"client_id": client, "name": "P"})).unwrap();
    assert!(ProjectRepo::create(&pool, other, &input).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_with_projects_cannot_be_deleted(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let client = common::client(&pool, user).await;
    let project = common::project(&pool, user, client, None).await;

    assert_matches!(
        ClientRepo::delete(&pool, user, client).await,
        Err(DbError::Core(CoreError::InvalidState(_)))
    );
    assert!(ClientRepo::find_by_id(&pool, user, client).await.unwrap().is_some());

    assert!(ProjectRepo::delete(&pool, user, project.id).await.unwrap());
    assert!(ClientRepo::delete(&pool, user, client).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_with_tasks_or_payments_cannot_be_deleted(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let client = common::client(&pool, user).await;
    let with_task = common::project(&pool, user, client, None).await;
    let with_payment = common::project(&pool, user, client, None).await;

    common::task(&pool, user, json!({"project_id": with_task.id, "title": "T"})).await;
    let input: CreatePayment = serde_json::from_value(
        json!({"amount": 10, "type": "INCOMING", "project_id": with_payment.id}),
    )
    .unwrap();
    PaymentRepo::create(&pool, user, &input.into_row(Utc::now().date_naive()).unwrap())
        .await
        .unwrap();

    for id in [with_task.id, with_payment.id] {
        assert_matches!(
            ProjectRepo::delete(&pool, user, id).await,
            Err(DbError::Core(CoreError::InvalidState(_)))
        );
        assert!(ProjectRepo::find_by_id(&pool, user, id).await.unwrap().is_some());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn worker_with_tasks_cannot_be_deleted(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let client = common::client(&pool, user).await;
    let project = common::project(&pool, user, client, None).await;
    let worker = common::worker(&pool, user, "Eve").await;
    let task = common::task(
        &pool,
        user,
        json!({"project_id": project.id, "title": "T", "assigned_to_id": worker.id}),
    )
    .await;

    assert_matches!(
        WorkerRepo::delete(&pool, user, worker.id).await,
        Err(DbError::Core(CoreError::InvalidState(_)))
    );

    TaskRepo::delete(&pool, user, task.id).await.unwrap();
    assert!(WorkerRepo::delete(&pool, user, worker.id).await.unwrap());
}

async fn record_payment(pool: &PgPool, user: i64, body: serde_json::Value) -> i64 {
    let input: CreatePayment = serde_json::from_value(body).unwrap();
    PaymentRepo::create(pool, user, &input.into_row(Utc::now().date_naive()).unwrap())
        .await
        .unwrap()
        .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn worker_with_payments_cannot_be_deleted(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let worker = common::worker(&pool, user, "Gus").await;
    let payment = record_payment(
        &pool,
        user,
        json!({"amount": 25, "type": "OUTGOING", "status": "PAID", "worker_id": worker.id}),
    )
    .await;

    let result = WorkerRepo::delete(&pool, user, worker.id).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::InvalidState(msg))) if msg.contains("1 payment(s)")
    );
    assert!(WorkerRepo::find_by_id(&pool, user, worker.id).await.unwrap().is_some());

    assert!(PaymentRepo::delete(&pool, user, payment).await.unwrap());
    assert!(WorkerRepo::delete(&pool, user, worker.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_with_payments_cannot_be_deleted(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let client = common::client(&pool, user).await;
    let payment = record_payment(
        &pool,
        user,
        json!({"amount": 40, "type": "INCOMING", "client_id": client}),
    )
    .await;

    let result = ClientRepo::delete(&pool, user, client).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::InvalidState(msg))) if msg.contains("payment")
    );
    assert!(ClientRepo::find_by_id(&pool, user, client).await.unwrap().is_some());

    assert!(PaymentRepo::delete(&pool, user, payment).await.unwrap());
    assert!(ClientRepo::delete(&pool, user, client).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_overdue_only_touches_past_due_pending(pool: PgPool) {
    let user = common::user(&pool, "a@example.com").await;
    let today = Utc::now().date_naive();

    let mut ids = Vec::new();
    for body in [
        json!({"amount": 10, "type": "INCOMING", "due_date": "2020-01-01"}),
        json!({"amount": 20, "type": "INCOMING", "due_date": "2999-01-01"}),
        json!({"amount": 30, "type": "INCOMING", "status": "PAID", "due_date": "2020-01-01"}),
    ] {
        let input: CreatePayment = serde_json::from_value(body).unwrap();
        let payment = PaymentRepo::create(&pool, user, &input.into_row(today).unwrap())
            .await
            .unwrap();
        ids.push(payment.id);
    }

    assert_eq!(PaymentRepo::mark_overdue(&pool, user, today).await.unwrap(), 1);

    let statuses: Vec<PaymentStatus> = {
        let mut out = Vec::new();
        for id in &ids {
            out.push(PaymentRepo::find_by_id(&pool, user, *id).await.unwrap().unwrap().status);
        }
        out
    };
    assert_eq!(
        statuses,
        [PaymentStatus::Overdue, PaymentStatus::Pending, PaymentStatus::Paid]
    );

    let stats = PaymentRepo::stats(&pool, user).await.unwrap();
    assert_eq!(stats.overdue_count, 1);
    assert_eq!(stats.total_incoming, 30.0);
    assert_eq!(stats.pending_incoming, 20.0);
}
