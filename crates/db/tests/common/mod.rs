//! Fixtures shared by the repository tests.

#![allow(dead_code)]

use gigledger_core::status::UserRole;
use gigledger_core::types::DbId;
use gigledger_db::models::client::CreateClient;
use gigledger_db::models::project::{CreateProject, Project};
use gigledger_db::models::task::{CreateTask, Task};
use gigledger_db::models::user::CreateUser;
use gigledger_db::models::worker::{CreateWorker, Worker};
use gigledger_db::repositories::{ClientRepo, ProjectRepo, TaskRepo, UserRepo, WorkerRepo};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.into(),
            name: "Freelancer".into(),
            password_hash: "not-a-real-hash".into(),
            role: UserRole::Freelancer,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn client(pool: &PgPool, user_id: DbId) -> DbId {
    let input: CreateClient =
        serde_json::from_value(serde_json::json!({ "name": "Acme" })).unwrap();
    ClientRepo::create(pool, user_id, &input).await.unwrap().id
}

pub async fn project(
    pool: &PgPool,
    user_id: DbId,
    client_id: DbId,
    budget: Option<f64>,
) -> Project {
    let input: CreateProject = serde_json::from_value(serde_json::json!({
        "client_id": client_id,
        "name": "Website",
        "budget": budget,
    }))
    .unwrap();
    ProjectRepo::create(pool, user_id, &input)
        .await
        .unwrap()
        .expect("client should be owned")
}

pub async fn worker(pool: &PgPool, user_id: DbId, name: &str) -> Worker {
    let input: CreateWorker = serde_json::from_value(serde_json::json!({ "name": name })).unwrap();
    WorkerRepo::create(pool, user_id, &input).await.unwrap()
}

pub async fn task(pool: &PgPool, user_id: DbId, body: serde_json::Value) -> Task {
    let input: CreateTask = serde_json::from_value(body).unwrap();
    TaskRepo::create(pool, user_id, &input.into_row(chrono::Utc::now()))
        .await
        .unwrap()
}

pub async fn reload_project(pool: &PgPool, user_id: DbId, id: DbId) -> Project {
    ProjectRepo::find_by_id(pool, user_id, id).await.unwrap().unwrap()
}

pub async fn reload_worker(pool: &PgPool, user_id: DbId, id: DbId) -> Worker {
    WorkerRepo::find_by_id(pool, user_id, id).await.unwrap().unwrap()
}
