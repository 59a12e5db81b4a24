//! Payment linkage and settlement rules.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::status::{PaymentStatus, PaymentType};
use crate::types::DbId;

/// Who a payment is exchanged with.
///
/// Storage keeps three nullable foreign keys; this type is the only way
/// handlers build a combination of them, so a payment can never point at
/// both a client and a worker, nor flow in the wrong direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentTarget {
    /// A standalone entry with no linked entity.
    Unlinked,
    /// Money received from a client, optionally against one of its projects.
    Client {
        client_id: DbId,
        project_id: Option<DbId>,
    },
    /// Money paid to a worker, optionally for work on a project.
    Worker {
        worker_id: DbId,
        project_id: Option<DbId>,
    },
    /// Money booked against a project without naming a counterparty.
    Project { project_id: DbId },
}

impl PaymentTarget {
    /// Build a target from the raw link columns of a request or row.
    pub fn from_links(
        payment_type: PaymentType,
        client_id: Option<DbId>,
        project_id: Option<DbId>,
        worker_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        match (client_id, worker_id) {
            (Some(_), Some(_)) => Err(CoreError::Validation(
                "A payment cannot be linked to both a client and a worker".into(),
            )),
            (Some(client_id), None) => {
                if payment_type != PaymentType::Incoming {
                    return Err(CoreError::Validation(
                        "Payments linked to a client must be INCOMING".into(),
                    ));
                }
                Ok(Self::Client {
                    client_id,
                    project_id,
                })
            }
            (None, Some(worker_id)) => {
                if payment_type != PaymentType::Outgoing {
                    return Err(CoreError::Validation(
                        "Payments linked to a worker must be OUTGOING".into(),
                    ));
                }
                Ok(Self::Worker {
                    worker_id,
                    project_id,
                })
            }
            (None, None) => Ok(match project_id {
                Some(project_id) => Self::Project { project_id },
                None => Self::Unlinked,
            }),
        }
    }

    pub fn client_id(&self) -> Option<DbId> {
        match self {
            Self::Client { client_id, .. } => Some(*client_id),
            _ => None,
        }
    }

    pub fn worker_id(&self) -> Option<DbId> {
        match self {
            Self::Worker { worker_id, .. } => Some(*worker_id),
            _ => None,
        }
    }

    pub fn project_id(&self) -> Option<DbId> {
        match self {
            Self::Client { project_id, .. } | Self::Worker { project_id, .. } => *project_id,
            Self::Project { project_id } => Some(*project_id),
            Self::Unlinked => None,
        }
    }
}

/// Resolve `paid_date` after a status change.
///
/// A payment entering PAID without an explicit date is stamped with
/// `today`, so it shows up in monthly revenue. Other statuses keep
/// whatever date was supplied.
pub fn resolve_paid_date(
    status: PaymentStatus,
    paid_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match (status, paid_date) {
        (PaymentStatus::Paid, None) => Some(today),
        (_, date) => date,
    }
}

/// Whether a pending payment has passed its due date.
pub fn is_overdue(status: PaymentStatus, due_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    status == PaymentStatus::Pending && due_date.is_some_and(|due| due < today)
}

/// Reject non-positive or non-finite amounts.
pub fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation("Amount must be positive".into()));
    }
    Ok(())
}
