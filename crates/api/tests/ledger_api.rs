//! End-to-end checks that task and payment writes keep project and worker
//! aggregates consistent, observed through the HTTP API.

mod common;

use axum::http::StatusCode;
use common::{
    assert_money, body_json, create, delete_auth, fetch, get_auth, patch_json_auth,
    post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_financials_follow_tasks_and_payments(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, Some(5000.0)).await;
    let uri = format!("/api/v1/projects/{project_id}");

    // No tasks yet: the budget stands in for the total.
    let project = fetch(&app, &uri, &token).await;
    assert_money(&project["total_cost"], 5000.0);
    assert_money(&project["stored_total_cost"], 0.0);

    let task = create(
        &app,
        "/api/v1/tasks",
        json!({ "project_id": project_id, "title": "Design", "hourly_rate": 50.0, "estimated_hours": 10.0 }),
        &token,
    )
    .await;
    assert_money(&task["cost"], 500.0);
    let task_id = task["id"].as_i64().unwrap();

    let project = fetch(&app, &uri, &token).await;
    assert_money(&project["total_cost"], 500.0);
    assert_money(&project["stored_total_cost"], 500.0);
    assert_eq!(project["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(project["client"]["name"], "Acme");

    // Actual hours win over the estimate once recorded.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/tasks/{task_id}"),
        json!({ "actual_hours": 12.0 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_money(&body_json(response).await["data"]["cost"], 600.0);

    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 200.0, "type": "INCOMING", "status": "PAID", "client_id": client_id, "project_id": project_id }),
        &token,
    )
    .await;

    let project = fetch(&app, &uri, &token).await;
    assert_money(&project["total_cost"], 600.0);
    assert_money(&project["paid_amount"], 200.0);
    assert_money(&project["outstanding_amount"], 400.0);
    assert_eq!(project["payments"].as_array().unwrap().len(), 1);

    // Deleting the only task falls back to the budget again.
    let response = delete_auth(app.clone(), &format!("/api/v1/tasks/{task_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["message"],
        "Task deleted successfully"
    );

    let project = fetch(&app, &uri, &token).await;
    assert_money(&project["stored_total_cost"], 0.0);
    assert_money(&project["total_cost"], 5000.0);
    assert_money(&project["outstanding_amount"], 4800.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_a_task_stamps_and_clears_completed_at(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;

    let task = create(
        &app,
        "/api/v1/tasks",
        json!({ "project_id": project_id, "title": "Build" }),
        &token,
    )
    .await;
    assert!(task["completed_at"].is_null());
    let uri = format!("/api/v1/tasks/{}", task["id"]);

    let done = patch_json_auth(app.clone(), &uri, json!({ "status": "COMPLETED" }), &token).await;
    let done = body_json(done).await["data"].clone();
    assert_eq!(done["status"], "COMPLETED");
    assert!(done["completed_at"].is_string());

    // Editing a completed task keeps its original stamp.
    let edited = patch_json_auth(app.clone(), &uri, json!({ "title": "Build v2" }), &token).await;
    assert_eq!(
        body_json(edited).await["data"]["completed_at"],
        done["completed_at"]
    );

    let reopened = patch_json_auth(app, &uri, json!({ "status": "IN_PROGRESS" }), &token).await;
    assert!(body_json(reopened).await["data"]["completed_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reassigning_a_task_moves_worker_earnings(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;
    let alice = common::worker(&app, &token, "Alice").await;
    let bob = common::worker(&app, &token, "Bob").await;

    let task = create(
        &app,
        "/api/v1/tasks",
        json!({
            "project_id": project_id,
            "assigned_to_id": alice,
            "title": "Copy",
            "hourly_rate": 30.0,
            "actual_hours": 5.0
        }),
        &token,
    )
    .await;

    let alice_uri = format!("/api/v1/workers/{alice}");
    let bob_uri = format!("/api/v1/workers/{bob}");
    assert_money(&fetch(&app, &alice_uri, &token).await["total_earned"], 150.0);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/tasks/{}", task["id"]),
        json!({ "assigned_to_id": bob }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_money(&fetch(&app, &alice_uri, &token).await["total_earned"], 0.0);
    let bob_detail = fetch(&app, &bob_uri, &token).await;
    assert_money(&bob_detail["total_earned"], 150.0);
    assert_eq!(bob_detail["tasks"].as_array().unwrap().len(), 1);

    // Paying the worker shows up in total_paid.
    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 100.0, "type": "OUTGOING", "status": "PAID", "worker_id": bob }),
        &token,
    )
    .await;
    assert_money(&fetch(&app, &bob_uri, &token).await["total_paid"], 100.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_a_paid_payment_between_projects(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let first = common::project(&app, &token, client_id, None).await;
    let second = common::project(&app, &token, client_id, None).await;

    let payment = create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 300.0, "type": "INCOMING", "status": "PAID", "client_id": client_id, "project_id": first }),
        &token,
    )
    .await;
    assert!(payment["paid_date"].is_string(), "PAID without a date is stamped");

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/payments/{}", payment["id"]),
        json!({ "project_id": second }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let first = fetch(&app, &format!("/api/v1/projects/{first}"), &token).await;
    let second = fetch(&app, &format!("/api/v1/projects/{second}"), &token).await;
    assert_money(&first["paid_amount"], 0.0);
    assert_money(&second["paid_amount"], 300.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelling_a_paid_payment_lowers_paid_amount(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, Some(200.0)).await;
    let uri = format!("/api/v1/projects/{project_id}");

    let payment = create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 80.0, "type": "INCOMING", "status": "PAID", "project_id": project_id }),
        &token,
    )
    .await;
    assert_money(&fetch(&app, &uri, &token).await["paid_amount"], 80.0);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/payments/{}", payment["id"]),
        json!({ "status": "CANCELLED" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "CANCELLED");

    let project = fetch(&app, &uri, &token).await;
    assert_money(&project["paid_amount"], 0.0);
    assert_money(&project["outstanding_amount"], 200.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn payment_reads_flag_past_due_rows(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;

    let late = create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 10.0, "type": "INCOMING", "due_date": "2020-01-01" }),
        &token,
    )
    .await;
    let upcoming = create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 20.0, "type": "INCOMING", "due_date": "2999-01-01" }),
        &token,
    )
    .await;

    let listed = fetch(&app, "/api/v1/payments", &token).await;
    let flag = |id: &serde_json::Value| {
        listed
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == *id)
            .map(|p| p["is_overdue"].clone())
            .unwrap()
    };
    assert_eq!(flag(&late["id"]), true);
    assert_eq!(flag(&upcoming["id"]), false);
    assert_eq!(late["status"], "PENDING");

    let swept =
        post_json_auth(app.clone(), "/api/v1/payments/mark-overdue", json!({}), &token).await;
    assert_eq!(swept.status(), StatusCode::OK);
    assert_eq!(body_json(swept).await["data"]["updated"], 1);

    let late = fetch(&app, &format!("/api/v1/payments/{}", late["id"]), &token).await;
    assert_eq!(late["status"], "OVERDUE");
    assert_eq!(late["is_overdue"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn payment_direction_must_match_counterparty(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let worker_id = common::worker(&app, &token, "Alice").await;

    let outgoing_to_client = post_json_auth(
        app.clone(),
        "/api/v1/payments",
        json!({ "amount": 10.0, "type": "OUTGOING", "client_id": client_id }),
        &token,
    )
    .await;
    assert_eq!(outgoing_to_client.status(), StatusCode::BAD_REQUEST);

    let both = post_json_auth(
        app.clone(),
        "/api/v1/payments",
        json!({ "amount": 10.0, "type": "INCOMING", "client_id": client_id, "worker_id": worker_id }),
        &token,
    )
    .await;
    assert_eq!(both.status(), StatusCode::BAD_REQUEST);

    let zero = post_json_auth(
        app,
        "/api/v1/payments",
        json!({ "amount": 0.0, "type": "INCOMING" }),
        &token,
    )
    .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_accounts_see_nothing(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = common::register(&app, "owner@example.com").await;
    let intruder = common::register(&app, "intruder@example.com").await;
    let client_id = common::client(&app, &owner, "Acme").await;
    let project_id = common::project(&app, &owner, client_id, Some(100.0)).await;

    let read = get_auth(app.clone(), &format!("/api/v1/projects/{project_id}"), &intruder).await;
    assert_eq!(read.status(), StatusCode::NOT_FOUND);

    let task = post_json_auth(
        app.clone(),
        "/api/v1/tasks",
        json!({ "project_id": project_id, "title": "Sneaky" }),
        &intruder,
    )
    .await;
    assert_eq!(task.status(), StatusCode::NOT_FOUND);

    let project = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        json!({ "client_id": client_id, "name": "Sneaky" }),
        &intruder,
    )
    .await;
    assert_eq!(project.status(), StatusCode::NOT_FOUND);

    let update = put_json_auth(
        app.clone(),
        &format!("/api/v1/clients/{client_id}"),
        json!({ "name": "Renamed" }),
        &intruder,
    )
    .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let listed = fetch(&app, "/api/v1/clients", &intruder).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deletion_guards_keep_rows_with_dependents(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/clients/{client_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    // Still there.
    fetch(&app, &format!("/api/v1/clients/{client_id}"), &token).await;

    let response =
        delete_auth(app.clone(), &format!("/api/v1/projects/{project_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete_auth(app.clone(), &format!("/api/v1/clients/{client_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let gone = get_auth(app, &format!("/api/v1/clients/{client_id}"), &token).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn worker_with_only_a_payment_is_kept(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let worker_id = common::worker(&app, &token, "Alice").await;

    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 15.0, "type": "OUTGOING", "worker_id": worker_id }),
        &token,
    )
    .await;

    let response = delete_auth(app.clone(), &format!("/api/v1/workers/{worker_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");
    fetch(&app, &format!("/api/v1/workers/{worker_id}"), &token).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_patch_rejects_overlong_title(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;
    let task = create(
        &app,
        "/api/v1/tasks",
        json!({ "project_id": project_id, "title": "Short" }),
        &token,
    )
    .await;
    let uri = format!("/api/v1/tasks/{}", task["id"]);

    let response =
        patch_json_auth(app.clone(), &uri, json!({ "title": "x".repeat(301) }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["details"]["title"].is_array(), "{json}");

    assert_eq!(fetch(&app, &uri, &token).await["title"], "Short");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_bodies_report_field_details(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;

    let response = post_json_auth(
        app,
        "/api/v1/clients",
        json!({ "name": "   ", "email": "not-an-email" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["details"]["name"].is_array());
    assert!(json["details"]["email"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_patch_to_completed_stamps_end_date(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;

    let response = patch_json_auth(
        app,
        &format!("/api/v1/projects/{project_id}"),
        json!({ "status": "COMPLETED" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let project = body_json(response).await["data"].clone();
    assert_eq!(project["status"], "COMPLETED");
    assert!(project["end_date"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_list_filters_and_stats(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;

    for (title, status) in [("A", "TODO"), ("B", "COMPLETED"), ("C", "REVIEW")] {
        create(
            &app,
            "/api/v1/tasks",
            json!({ "project_id": project_id, "title": title, "status": status, "hourly_rate": 10.0, "actual_hours": 1.0 }),
            &token,
        )
        .await;
    }

    let completed = fetch(&app, "/api/v1/tasks?status=COMPLETED", &token).await;
    let completed = completed.as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["title"], "B");
    assert_eq!(completed[0]["project_name"], "Website");

    let by_project = fetch(&app, &format!("/api/v1/tasks?project_id={project_id}"), &token).await;
    assert_eq!(by_project.as_array().unwrap().len(), 3);

    let stats = fetch(&app, "/api/v1/tasks/stats", &token).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["pending"], 2);
    assert_money(&stats["total_value"], 30.0);
    assert_money(&stats["completed_value"], 10.0);
}
