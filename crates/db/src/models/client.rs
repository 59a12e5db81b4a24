//! Client model and DTOs.

use gigledger_core::patch::{double_option, merge_nullable, non_blank};
use gigledger_core::status::ClientStatus;
use gigledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ClientStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client list entry with dependent counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub client: Client,
    pub project_count: i64,
    pub payment_count: i64,
}

/// Every editable client column. Used for inserts and full-row updates.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClient {
    #[validate(
        length(max = 200),
        custom(function = "gigledger_core::validation::not_blank")
    )]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
}

impl CreateClient {
    /// Trim the name and drop blank optional strings.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            company: non_blank(self.company),
            address: non_blank(self.address),
            notes: non_blank(self.notes),
            status: self.status,
        }
    }
}

/// Update body. Absent fields are left unchanged; `null` clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub status: Option<ClientStatus>,
}

impl UpdateClient {
    /// Apply the update on top of `current`, producing the row to write.
    pub fn merge(self, current: Client) -> CreateClient {
        CreateClient {
            name: self.name.unwrap_or(current.name),
            email: merge_nullable(self.email, current.email),
            phone: merge_nullable(self.phone, current.phone),
            company: merge_nullable(self.company, current.company),
            address: merge_nullable(self.address, current.address),
            notes: merge_nullable(self.notes, current.notes),
            status: self.status.unwrap_or(current.status),
        }
        .normalized()
    }
}

/// Client detail with its projects.
#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub projects: Vec<crate::models::project::ProjectWithFinancials>,
}
