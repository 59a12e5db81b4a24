//! Worker (subcontractor) model and DTOs.

use gigledger_core::patch::{double_option, merge_nullable, non_blank};
use gigledger_core::status::WorkerStatus;
use gigledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `workers` table.
///
/// `total_earned` and `total_paid` are maintained by
/// [`AggregateRepo`](crate::repositories::AggregateRepo) and are never
/// accepted from request bodies.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Worker {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub hourly_rate: Option<f64>,
    pub total_earned: f64,
    pub total_paid: f64,
    #[sqlx(try_from = "String")]
    pub status: WorkerStatus,
    pub joined_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Worker list entry with dependent counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkerWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub worker: Worker,
    pub task_count: i64,
    pub payment_count: i64,
}

/// Worker detail with assigned tasks and payments.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerDetail {
    #[serde(flatten)]
    pub worker: Worker,
    pub tasks: Vec<crate::models::task::TaskWithNames>,
    pub payments: Vec<crate::models::payment::Payment>,
}

/// Every editable worker column.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorker {
    #[validate(
        length(max = 200),
        custom(function = "gigledger_core::validation::not_blank")
    )]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub status: WorkerStatus,
}

impl CreateWorker {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            skills: non_blank(self.skills),
            ..self
        }
    }
}

/// Update body. Absent fields are left unchanged; `null` clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorker {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub skills: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hourly_rate: Option<Option<f64>>,
    pub status: Option<WorkerStatus>,
}

impl UpdateWorker {
    pub fn merge(self, current: Worker) -> CreateWorker {
        CreateWorker {
            name: self.name.unwrap_or(current.name),
            email: merge_nullable(self.email, current.email),
            phone: merge_nullable(self.phone, current.phone),
            skills: merge_nullable(self.skills, current.skills),
            hourly_rate: merge_nullable(self.hourly_rate, current.hourly_rate),
            status: self.status.unwrap_or(current.status),
        }
        .normalized()
    }
}

/// Aggregated worker figures for `/workers/stats`.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct WorkerStats {
    pub total_workers: i64,
    pub active_workers: i64,
    pub total_earned: f64,
    pub total_paid: f64,
    pub pending_payments: f64,
    pub average_hourly_rate: f64,
}
