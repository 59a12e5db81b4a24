//! HTTP-level tests for dashboard statistics, chart and activity feed.

mod common;

use common::{assert_money, create, fetch};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_count_the_callers_data_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let other = common::register(&app, "other@example.com").await;

    let client_id = common::client(&app, &token, "Acme").await;
    let project_id = common::project(&app, &token, client_id, None).await;
    common::worker(&app, &token, "Alice").await;
    create(
        &app,
        "/api/v1/tasks",
        json!({ "project_id": project_id, "title": "Open" }),
        &token,
    )
    .await;
    create(
        &app,
        "/api/v1/tasks",
        json!({ "project_id": project_id, "title": "Done", "status": "COMPLETED" }),
        &token,
    )
    .await;
    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 500.0, "type": "INCOMING", "status": "PAID", "client_id": client_id }),
        &token,
    )
    .await;
    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 80.0, "type": "INCOMING", "client_id": client_id }),
        &token,
    )
    .await;
    common::client(&app, &other, "Not mine").await;

    let stats = fetch(&app, "/api/v1/dashboard/stats", &token).await;
    assert_eq!(stats["active_clients"], 1);
    assert_eq!(stats["active_projects"], 1);
    assert_eq!(stats["pending_tasks"], 1);
    assert_eq!(stats["total_workers"], 1);
    assert_eq!(stats["tasks_completed_this_month"], 1);
    assert_money(&stats["total_revenue"], 500.0);
    assert_money(&stats["monthly_revenue"], 500.0);
    assert_money(&stats["pending_payments"], 80.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn chart_has_six_months_ending_with_the_current_one(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;
    let worker_id = common::worker(&app, &token, "Alice").await;

    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 1000.0, "type": "INCOMING", "status": "PAID" }),
        &token,
    )
    .await;
    create(
        &app,
        "/api/v1/payments",
        json!({ "amount": 300.0, "type": "OUTGOING", "status": "PAID", "worker_id": worker_id }),
        &token,
    )
    .await;

    let chart = fetch(&app, "/api/v1/dashboard/chart", &token).await;
    let points = chart.as_array().unwrap();
    assert_eq!(points.len(), 6);

    let current = &points[5];
    assert_eq!(
        current["month"],
        chrono::Utc::now().date_naive().format("%b %Y").to_string()
    );
    assert_money(&current["revenue"], 1000.0);
    assert_money(&current["expenses"], 300.0);
    assert_money(&current["profit"], 700.0);
    assert_money(&points[0]["revenue"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_feed_is_capped_and_newest_first(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::register(&app, "owner@example.com").await;

    let mut client_id = 0;
    for name in ["A", "B", "C", "D"] {
        client_id = common::client(&app, &token, name).await;
    }
    let project_id = common::project(&app, &token, client_id, None).await;
    for title in ["t1", "t2", "t3", "t4"] {
        create(
            &app,
            "/api/v1/tasks",
            json!({ "project_id": project_id, "title": title }),
            &token,
        )
        .await;
    }
    for amount in [10.0, 20.0, 30.0, 40.0] {
        create(
            &app,
            "/api/v1/payments",
            json!({ "amount": amount, "type": "INCOMING", "client_id": client_id }),
            &token,
        )
        .await;
    }

    let feed = fetch(&app, "/api/v1/dashboard/activity", &token).await;
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 10);
    assert_eq!(feed[0]["type"], "payment");

    let stamps: Vec<_> = feed
        .iter()
        .map(|item| {
            chrono::DateTime::parse_from_rfc3339(item["timestamp"].as_str().unwrap()).unwrap()
        })
        .collect();
    assert!(stamps.windows(2).all(|pair| pair[0] >= pair[1]));
}
