//! Project model and DTOs.

use chrono::NaiveDate;
use gigledger_core::finance::ProjectFinancials;
use gigledger_core::patch::{double_option, merge_nullable, non_blank};
use gigledger_core::status::ProjectStatus;
use gigledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `projects` table.
///
/// `total_cost` is the raw task-cost sum as stored; it is serialized as
/// `stored_total_cost` so it is never mistaken for the display total.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub user_id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub hourly_rate: Option<f64>,
    #[serde(rename = "stored_total_cost")]
    pub total_cost: f64,
    pub paid_amount: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn financials(&self) -> ProjectFinancials {
        ProjectFinancials::from_stored(self.total_cost, self.paid_amount, self.budget)
    }
}

/// A project together with its display financials.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithFinancials {
    #[serde(flatten)]
    pub project: Project,
    /// Task-cost sum, or the budget when no task carries a cost.
    pub total_cost: f64,
    pub outstanding_amount: f64,
}

impl From<Project> for ProjectWithFinancials {
    fn from(project: Project) -> Self {
        let financials = project.financials();
        Self {
            project,
            total_cost: financials.total_cost,
            outstanding_amount: financials.outstanding_amount,
        }
    }
}

/// Project list row: the project plus its client and child counts.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectListRow {
    #[sqlx(flatten)]
    pub project: Project,
    pub client_name: String,
    pub client_company: Option<String>,
    pub task_count: i64,
    pub payment_count: i64,
}

/// Minimal client reference embedded in project responses.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: DbId,
    pub name: String,
    pub company: Option<String>,
}

/// Project list entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: ProjectWithFinancials,
    pub client: ClientSummary,
    pub task_count: i64,
    pub payment_count: i64,
}

impl From<ProjectListRow> for ProjectListItem {
    fn from(row: ProjectListRow) -> Self {
        let client = ClientSummary {
            id: row.project.client_id,
            name: row.client_name,
            company: row.client_company,
        };
        Self {
            project: row.project.into(),
            client,
            task_count: row.task_count,
            payment_count: row.payment_count,
        }
    }
}

/// Project detail: financials, client, tasks and payments.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectWithFinancials,
    pub client: ClientSummary,
    pub tasks: Vec<crate::models::task::TaskWithNames>,
    pub payments: Vec<crate::models::payment::Payment>,
}

/// Every editable project column.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    pub client_id: DbId,
    #[validate(
        length(max = 200),
        custom(function = "gigledger_core::validation::not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,
}

impl CreateProject {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            ..self
        }
    }
}

/// Partial update body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub client_id: Option<DbId>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hourly_rate: Option<Option<f64>>,
}

impl UpdateProject {
    /// Apply the patch on top of `current`.
    ///
    /// Moving into COMPLETED stamps `end_date` with `today` when the project
    /// has none and the patch does not set one.
    pub fn merge(self, current: Project, today: NaiveDate) -> CreateProject {
        let status = self.status.unwrap_or(current.status);
        let mut end_date = merge_nullable(self.end_date, current.end_date);
        if status == ProjectStatus::Completed
            && current.status != ProjectStatus::Completed
            && end_date.is_none()
        {
            end_date = Some(today);
        }
        CreateProject {
            client_id: self.client_id.unwrap_or(current.client_id),
            name: self.name.unwrap_or(current.name),
            description: merge_nullable(self.description, current.description),
            status,
            start_date: merge_nullable(self.start_date, current.start_date),
            end_date,
            budget: merge_nullable(self.budget, current.budget),
            hourly_rate: merge_nullable(self.hourly_rate, current.hourly_rate),
        }
        .normalized()
    }
}
