//! Task model and DTOs.

use chrono::NaiveDate;
use gigledger_core::finance::compute_task_cost;
use gigledger_core::patch::{double_option, merge_nullable, non_blank};
use gigledger_core::status::{TaskPriority, TaskStatus};
use gigledger_core::task_lifecycle::completed_at_for_transition;
use gigledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub assigned_to_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub hourly_rate: Option<f64>,
    pub cost: f64,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Task with the names of its project and assignee, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskWithNames {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub project_name: String,
    pub assigned_to_name: Option<String>,
}

/// Optional list filters (`?status&priority&project_id`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<DbId>,
}

/// Create body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    pub project_id: DbId,
    pub assigned_to_id: Option<DbId>,
    #[validate(
        length(max = 300),
        custom(function = "gigledger_core::validation::not_blank")
    )]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[validate(range(min = 0.0))]
    pub estimated_hours: Option<f64>,
    #[validate(range(min = 0.0))]
    pub actual_hours: Option<f64>,
    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,
    pub due_date: Option<NaiveDate>,
}

impl CreateTask {
    /// Resolve derived columns for a brand-new task.
    pub fn into_row(self, now: Timestamp) -> TaskRow {
        TaskRow {
            project_id: self.project_id,
            assigned_to_id: self.assigned_to_id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours.unwrap_or(0.0),
            hourly_rate: self.hourly_rate,
            due_date: self.due_date,
            cost: 0.0,
            completed_at: None,
        }
        .derive(None, None, now)
    }
}

/// Partial update body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to_id: Option<Option<DbId>>,
    #[validate(length(max = 300))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_hours: Option<Option<f64>>,
    #[validate(range(min = 0.0))]
    pub actual_hours: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub hourly_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateTask {
    /// Apply the patch on top of `current` and re-derive `cost` and
    /// `completed_at`.
    pub fn merge(self, current: Task, now: Timestamp) -> TaskRow {
        TaskRow {
            project_id: self.project_id.unwrap_or(current.project_id),
            assigned_to_id: merge_nullable(self.assigned_to_id, current.assigned_to_id),
            title: self.title.unwrap_or(current.title),
            description: merge_nullable(self.description, current.description),
            status: self.status.unwrap_or(current.status),
            priority: self.priority.unwrap_or(current.priority),
            estimated_hours: merge_nullable(self.estimated_hours, current.estimated_hours),
            actual_hours: self.actual_hours.unwrap_or(current.actual_hours),
            hourly_rate: merge_nullable(self.hourly_rate, current.hourly_rate),
            due_date: merge_nullable(self.due_date, current.due_date),
            cost: current.cost,
            completed_at: current.completed_at,
        }
        .derive(Some(current.status), current.completed_at, now)
    }
}

/// Every stored task column except identity and timestamps, with derived
/// values already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub project_id: DbId,
    pub assigned_to_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub hourly_rate: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub cost: f64,
    pub completed_at: Option<Timestamp>,
}

impl TaskRow {
    fn derive(
        self,
        previous_status: Option<TaskStatus>,
        previous_completed_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        let cost =
            compute_task_cost(self.hourly_rate, self.estimated_hours, Some(self.actual_hours));
        let completed_at =
            completed_at_for_transition(previous_status, self.status, previous_completed_at, now);
        Self {
            title: self.title.trim().to_string(),
            description: non_blank(self.description),
            cost,
            completed_at,
            ..self
        }
    }

    /// Field checks that apply after a patch has been merged.
    pub fn check(&self) -> Result<(), gigledger_core::error::CoreError> {
        use gigledger_core::error::CoreError;
        use gigledger_core::validation::MAX_TASK_TITLE_LENGTH;

        if self.title.is_empty() {
            return Err(CoreError::Validation("Title is required".into()));
        }
        if self.title.chars().count() > MAX_TASK_TITLE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Title must be at most {MAX_TASK_TITLE_LENGTH} characters"
            )));
        }
        let negative = |v: Option<f64>| v.is_some_and(|v| v < 0.0 || !v.is_finite());
        if negative(self.estimated_hours) || negative(Some(self.actual_hours)) {
            return Err(CoreError::Validation("Hours must not be negative".into()));
        }
        if negative(self.hourly_rate) {
            return Err(CoreError::Validation(
                "Hourly rate must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Aggregated task counters for `/tasks/stats`.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub overdue: i64,
    pub total_value: f64,
    pub completed_value: f64,
}
