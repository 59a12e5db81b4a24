//! Invoice assembly from projects, their tasks and their payments.
//!
//! Invoices are computed on request and never stored. Amounts are taken
//! from fresh child sums rather than the cached project aggregates.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::finance::{display_total_cost, outstanding_amount};
use crate::status::{ProjectStatus, TaskStatus};
use crate::types::{DbId, Timestamp};

/// Payment terms used when the issuer has not configured their own.
pub const DEFAULT_PAYMENT_TERMS: &str = "Payment is due within 30 days of invoice date.";

/// A task as seen by invoice assembly.
#[derive(Debug, Clone)]
pub struct InvoiceTask {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub actual_hours: f64,
    pub hourly_rate: Option<f64>,
    pub cost: f64,
}

/// A project with the children needed to bill it.
#[derive(Debug, Clone)]
pub struct InvoiceProject {
    pub id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub budget: Option<f64>,
    pub tasks: Vec<InvoiceTask>,
    /// Amounts of the project's PAID payments.
    pub paid_amounts: Vec<f64>,
}

/// Contact block for either side of the invoice.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceParty {
    pub id: Option<DbId>,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Caller-supplied invoice metadata.
#[derive(Debug, Clone)]
pub struct InvoiceOptions {
    pub invoice_number: String,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Project,
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceProjectSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub total_cost: f64,
    pub paid_amount: f64,
    pub outstanding_amount: f64,
    pub completed_tasks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub issue_date: Timestamp,
    pub due_date: Option<NaiveDate>,
    pub issuer: InvoiceParty,
    pub client: InvoiceParty,
    pub projects: Vec<InvoiceProjectSummary>,
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub amount_paid: f64,
    pub balance_due: f64,
    pub notes: String,
    pub payment_terms: String,
    pub status: &'static str,
}

/// Deduplicate requested ids and confirm every one was found for the caller.
///
/// `found` holds ids of rows owned by the caller. Nothing found is a 404;
/// a partial match is a validation failure so ids of other accounts are
/// never distinguishable from missing ones.
pub fn check_requested_projects(requested: &[DbId], found: &[DbId]) -> Result<(), CoreError> {
    let requested: BTreeSet<DbId> = requested.iter().copied().collect();
    let Some(first) = requested.first().copied() else {
        return Err(CoreError::Validation(
            "At least one project must be selected".into(),
        ));
    };
    let found: BTreeSet<DbId> = found.iter().copied().collect();
    if found.is_empty() {
        return Err(CoreError::NotFound {
            entity: "Project",
            id: first,
        });
    }
    if !requested.is_subset(&found) {
        return Err(CoreError::Validation(
            "Some projects were not found or do not belong to you".into(),
        ));
    }
    Ok(())
}

/// All projects on one invoice must belong to the same client.
pub fn single_client(projects: &[InvoiceProject]) -> Result<DbId, CoreError> {
    let clients: BTreeSet<DbId> = projects.iter().map(|p| p.client_id).collect();
    match clients.len() {
        1 => Ok(clients.into_iter().next().unwrap_or_default()),
        0 => Err(CoreError::Validation("No projects to invoice".into())),
        _ => Err(CoreError::Validation(
            "All projects must belong to the same client for a single invoice".into(),
        )),
    }
}

fn describe(name: &str, description: Option<&str>) -> String {
    match description.filter(|d| !d.trim().is_empty()) {
        Some(d) => format!("{name} - {d}"),
        None => name.to_string(),
    }
}

fn task_line(task: &InvoiceTask) -> Option<LineItem> {
    let billable = task.cost > 0.0 && (task.status.is_completed() || task.actual_hours > 0.0);
    if !billable {
        return None;
    }
    let quantity = if task.actual_hours > 0.0 {
        task.actual_hours
    } else {
        1.0
    };
    Some(LineItem {
        kind: LineItemKind::Task,
        description: describe(&task.title, task.description.as_deref()),
        quantity,
        rate: task.hourly_rate.unwrap_or(task.cost / quantity),
        amount: task.cost,
    })
}

fn default_notes(projects: &[InvoiceProject]) -> String {
    match projects {
        [only] => format!("Invoice for project: {}", only.name),
        many => format!(
            "Invoice for {} projects: {}",
            many.len(),
            many.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Build an invoice for one client's projects.
///
/// Each project contributes one `project` line for its billable total
/// (task-cost sum, or budget when tasks carry no cost). Completed or
/// tracked tasks with a cost are listed as `task` detail lines; they are
/// already included in the project line and do not add to the subtotal.
pub fn assemble_invoice(
    options: InvoiceOptions,
    issuer: InvoiceParty,
    client: InvoiceParty,
    projects: &[InvoiceProject],
    issued_at: Timestamp,
) -> Result<Invoice, CoreError> {
    if options.invoice_number.trim().is_empty() {
        return Err(CoreError::Validation("Invoice number is required".into()));
    }
    single_client(projects)?;

    let mut line_items = Vec::new();
    let mut summaries = Vec::with_capacity(projects.len());
    let mut subtotal = 0.0;
    let mut amount_paid = 0.0;

    for project in projects {
        let task_sum: f64 = project.tasks.iter().map(|t| t.cost).sum();
        let paid: f64 = project.paid_amounts.iter().sum();
        let total = display_total_cost(task_sum, project.budget);

        if total > 0.0 {
            line_items.push(LineItem {
                kind: LineItemKind::Project,
                description: describe(&project.name, project.description.as_deref()),
                quantity: 1.0,
                rate: total,
                amount: total,
            });
            subtotal += total;
        }
        line_items.extend(project.tasks.iter().filter_map(task_line));

        amount_paid += paid;
        summaries.push(InvoiceProjectSummary {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            status: project.status,
            total_cost: total,
            paid_amount: paid,
            outstanding_amount: outstanding_amount(total, paid),
            completed_tasks: project
                .tasks
                .iter()
                .filter(|t| t.status.is_completed())
                .count(),
        });
    }

    let tax = 0.0;
    let total = subtotal + tax;

    Ok(Invoice {
        invoice_number: options.invoice_number.trim().to_string(),
        issue_date: issued_at,
        due_date: options.due_date,
        issuer,
        client,
        projects: summaries,
        line_items,
        subtotal,
        tax,
        total,
        amount_paid,
        balance_due: outstanding_amount(total, amount_paid),
        notes: options
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_notes(projects)),
        payment_terms: options
            .payment_terms
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_TERMS.to_string()),
        status: "PENDING",
    })
}
