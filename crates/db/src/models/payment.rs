//! Payment model and DTOs.

use chrono::NaiveDate;
use gigledger_core::error::CoreError;
use gigledger_core::patch::{double_option, merge_nullable, non_blank};
use gigledger_core::payment::{is_overdue, resolve_paid_date, validate_amount, PaymentTarget};
use gigledger_core::status::{PaymentStatus, PaymentType};
use gigledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub user_id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub worker_id: Option<DbId>,
    pub amount: f64,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payment with the names of linked entities, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentWithNames {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub client_name: Option<String>,
    pub project_name: Option<String>,
    pub worker_name: Option<String>,
    /// Set by [`PaymentWithNames::flag_overdue`]; also true for PENDING rows
    /// the overdue sweep has not reached yet.
    #[sqlx(skip)]
    pub is_overdue: bool,
}

impl PaymentWithNames {
    pub fn flag_overdue(mut self, today: NaiveDate) -> Self {
        let payment = &self.payment;
        self.is_overdue = payment.status == PaymentStatus::Overdue
            || is_overdue(payment.status, payment.due_date, today);
        self
    }
}

/// Optional list filters (`?type&status`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
}

/// Create body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub amount: f64,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub worker_id: Option<DbId>,
}

impl CreatePayment {
    /// Validate the body and resolve it into a row to insert.
    pub fn into_row(self, today: NaiveDate) -> Result<PaymentRow, CoreError> {
        let target = PaymentTarget::from_links(
            self.payment_type,
            self.client_id,
            self.project_id,
            self.worker_id,
        )?;
        PaymentRow {
            target,
            amount: self.amount,
            payment_type: self.payment_type,
            status: self.status,
            description: non_blank(self.description),
            due_date: self.due_date,
            paid_date: resolve_paid_date(self.status, self.paid_date, today),
        }
        .checked()
    }
}

/// Partial update body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePayment {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub paid_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub client_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub worker_id: Option<Option<DbId>>,
}

impl UpdatePayment {
    /// Apply the patch on top of `current`, re-validating the links.
    pub fn merge(self, current: Payment, today: NaiveDate) -> Result<PaymentRow, CoreError> {
        let payment_type = self.payment_type.unwrap_or(current.payment_type);
        let status = self.status.unwrap_or(current.status);
        let target = PaymentTarget::from_links(
            payment_type,
            merge_nullable(self.client_id, current.client_id),
            merge_nullable(self.project_id, current.project_id),
            merge_nullable(self.worker_id, current.worker_id),
        )?;
        let paid_date = merge_nullable(self.paid_date, current.paid_date);
        PaymentRow {
            target,
            amount: self.amount.unwrap_or(current.amount),
            payment_type,
            status,
            description: non_blank(merge_nullable(self.description, current.description)),
            due_date: merge_nullable(self.due_date, current.due_date),
            paid_date: resolve_paid_date(status, paid_date, today),
        }
        .checked()
    }
}

/// A fully resolved payment ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub target: PaymentTarget,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
}

impl PaymentRow {
    fn checked(self) -> Result<Self, CoreError> {
        validate_amount(self.amount)?;
        Ok(self)
    }
}

/// Aggregated payment figures for `/payments/stats`.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct PaymentStats {
    pub total_incoming: f64,
    pub total_outgoing: f64,
    pub pending_incoming: f64,
    pub pending_outgoing: f64,
    pub overdue_count: i64,
    pub net_profit: f64,
}
