//! Handlers for invoice templates and invoice generation.
//!
//! Invoices are assembled on request from fresh task and payment sums and
//! are not persisted.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use gigledger_core::error::CoreError;
use gigledger_core::invoice::{
    assemble_invoice, check_requested_projects, single_client, Invoice, InvoiceOptions,
    InvoiceParty, InvoiceProject, InvoiceTask,
};
use gigledger_core::types::DbId;
use gigledger_db::models::client::Client;
use gigledger_db::models::payment::Payment;
use gigledger_db::models::project::Project;
use gigledger_db::models::task::TaskWithNames;
use gigledger_db::repositories::{
    BrandingRepo, ClientRepo, PaymentRepo, ProjectRepo, TaskRepo, UserRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A selectable invoice layout.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceTemplate {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub is_default: bool,
    pub layout: &'static str,
    pub color_scheme: &'static str,
    pub header_style: &'static str,
}

pub const TEMPLATES: &[InvoiceTemplate] = &[
    InvoiceTemplate {
        id: "modern",
        display_name: "Modern",
        description: "Clean and contemporary design with bold typography",
        is_default: true,
        layout: "two-column",
        color_scheme: "blue",
        header_style: "logo-focused",
    },
    InvoiceTemplate {
        id: "classic",
        display_name: "Classic",
        description: "Traditional business invoice with professional formatting",
        is_default: false,
        layout: "single-column",
        color_scheme: "gray",
        header_style: "minimal",
    },
    InvoiceTemplate {
        id: "minimal",
        display_name: "Minimal",
        description: "Simple, clean design focusing on clarity",
        is_default: false,
        layout: "single-column",
        color_scheme: "gray",
        header_style: "minimal",
    },
    InvoiceTemplate {
        id: "corporate",
        display_name: "Corporate",
        description: "Professional corporate design with emphasis on branding",
        is_default: false,
        layout: "header-focused",
        color_scheme: "blue",
        header_style: "bold",
    },
    InvoiceTemplate {
        id: "creative",
        display_name: "Creative",
        description: "Unique design with creative elements and colors",
        is_default: false,
        layout: "two-column",
        color_scheme: "purple",
        header_style: "logo-focused",
    },
];

/// Request body for `POST /invoices/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateInvoiceRequest {
    pub project_ids: Vec<DbId>,
    pub invoice_number: String,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// GET /api/v1/invoices/templates
pub async fn templates() -> Json<DataResponse<&'static [InvoiceTemplate]>> {
    Json(DataResponse::new(TEMPLATES))
}

/// POST /api/v1/invoices/generate
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GenerateInvoiceRequest>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let projects = ProjectRepo::find_many(&state.pool, auth.user_id, &input.project_ids).await?;
    let found: Vec<DbId> = projects.iter().map(|p| p.id).collect();
    check_requested_projects(&input.project_ids, &found)?;

    let (tasks, payments, branding, user) = tokio::try_join!(
        TaskRepo::list_for_projects(&state.pool, &found),
        PaymentRepo::paid_for_projects(&state.pool, &found),
        BrandingRepo::find_by_user(&state.pool, auth.user_id),
        UserRepo::find_by_id(&state.pool, auth.user_id),
    )?;
    let user = user
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;

    let billed = invoice_projects(projects, tasks, payments);
    let client_id = single_client(&billed)?;
    let client = ClientRepo::find_by_id(&state.pool, auth.user_id, client_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id: client_id,
        }))?;

    let issuer = match &branding {
        Some(settings) => settings.issuer(&user.name, &user.email),
        None => InvoiceParty {
            name: user.name.clone(),
            email: Some(user.email.clone()),
            ..InvoiceParty::default()
        },
    };
    let options = InvoiceOptions {
        invoice_number: input.invoice_number,
        due_date: input.due_date,
        notes: input.notes,
        payment_terms: branding.as_ref().map(|b| b.payment_terms()),
    };

    let invoice = assemble_invoice(options, issuer, client_party(client), &billed, Utc::now())?;
    tracing::info!(
        user_id = auth.user_id,
        client_id,
        projects = billed.len(),
        total = invoice.total,
        "Invoice generated"
    );
    Ok(Json(DataResponse::new(invoice)))
}

fn client_party(client: Client) -> InvoiceParty {
    InvoiceParty {
        id: Some(client.id),
        name: client.name,
        email: client.email,
        company: client.company,
        address: client.address,
        phone: client.phone,
    }
}

/// Group tasks and paid amounts under their projects, keeping project order.
fn invoice_projects(
    projects: Vec<Project>,
    tasks: Vec<TaskWithNames>,
    payments: Vec<Payment>,
) -> Vec<InvoiceProject> {
    let mut tasks_by_project: HashMap<DbId, Vec<InvoiceTask>> = HashMap::new();
    for row in tasks {
        let task = row.task;
        tasks_by_project
            .entry(task.project_id)
            .or_default()
            .push(InvoiceTask {
                id: task.id,
                title: task.title,
                description: task.description,
                status: task.status,
                actual_hours: task.actual_hours,
                hourly_rate: task.hourly_rate,
                cost: task.cost,
            });
    }

    let mut paid_by_project: HashMap<DbId, Vec<f64>> = HashMap::new();
    for payment in payments {
        if let Some(project_id) = payment.project_id {
            paid_by_project.entry(project_id).or_default().push(payment.amount);
        }
    }

    projects
        .into_iter()
        .map(|p| InvoiceProject {
            tasks: tasks_by_project.remove(&p.id).unwrap_or_default(),
            paid_amounts: paid_by_project.remove(&p.id).unwrap_or_default(),
            id: p.id,
            client_id: p.client_id,
            name: p.name,
            description: p.description,
            status: p.status,
            budget: p.budget,
        })
        .collect()
}
