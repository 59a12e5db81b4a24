//! Invoice branding settings (one row per user).

use gigledger_core::invoice::{InvoiceParty, DEFAULT_PAYMENT_TERMS};
use gigledger_core::patch::non_blank;
use gigledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const DEFAULT_PRIMARY_COLOR: &str = "#3B82F6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#1F2937";
pub const DEFAULT_ACCENT_COLOR: &str = "#10B981";
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_TEMPLATE: &str = "modern";
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// A row from the `branding_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BrandingSettings {
    pub id: DbId,
    pub user_id: DbId,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub website: Option<String>,
    pub tax_number: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub default_template: String,
    pub show_logo: bool,
    pub show_business_info: bool,
    pub invoice_prefix: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub routing_number: Option<String>,
    pub paypal_email: Option<String>,
    pub footer_text: Option<String>,
    pub terms_conditions: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BrandingSettings {
    /// Issuer block for invoices. Falls back to the account's own name and
    /// email when no business details are configured.
    pub fn issuer(&self, account_name: &str, account_email: &str) -> InvoiceParty {
        InvoiceParty {
            id: None,
            name: self
                .business_name
                .clone()
                .unwrap_or_else(|| account_name.to_string()),
            email: self
                .business_email
                .clone()
                .or_else(|| Some(account_email.to_string())),
            company: self.business_name.clone(),
            address: self.business_address.clone(),
            phone: self.business_phone.clone(),
        }
    }

    pub fn payment_terms(&self) -> String {
        self.terms_conditions
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_TERMS.to_string())
    }
}

/// Upsert body for `PUT /branding`. Omitted fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpsertBranding {
    #[validate(length(max = 200))]
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub business_phone: Option<String>,
    #[validate(email)]
    pub business_email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub tax_number: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(custom(function = "gigledger_core::validation::hex_color"))]
    pub primary_color: String,
    #[validate(custom(function = "gigledger_core::validation::hex_color"))]
    pub secondary_color: String,
    #[validate(custom(function = "gigledger_core::validation::hex_color"))]
    pub accent_color: String,
    #[validate(custom(function = "gigledger_core::validation::not_blank"))]
    pub font_family: String,
    #[validate(custom(function = "gigledger_core::validation::invoice_template"))]
    pub default_template: String,
    pub show_logo: bool,
    pub show_business_info: bool,
    #[validate(length(min = 1, max = 10))]
    pub invoice_prefix: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub routing_number: Option<String>,
    #[validate(email)]
    pub paypal_email: Option<String>,
    pub footer_text: Option<String>,
    pub terms_conditions: Option<String>,
}

impl Default for UpsertBranding {
    fn default() -> Self {
        Self {
            business_name: None,
            business_address: None,
            business_phone: None,
            business_email: None,
            website: None,
            tax_number: None,
            logo_url: None,
            primary_color: DEFAULT_PRIMARY_COLOR.into(),
            secondary_color: DEFAULT_SECONDARY_COLOR.into(),
            accent_color: DEFAULT_ACCENT_COLOR.into(),
            font_family: DEFAULT_FONT_FAMILY.into(),
            default_template: DEFAULT_TEMPLATE.into(),
            show_logo: true,
            show_business_info: true,
            invoice_prefix: DEFAULT_INVOICE_PREFIX.into(),
            bank_name: None,
            account_number: None,
            routing_number: None,
            paypal_email: None,
            footer_text: None,
            terms_conditions: None,
        }
    }
}

impl UpsertBranding {
    /// Settings shown to an account that never saved any.
    pub fn defaults_for(account_name: &str, account_email: &str) -> Self {
        Self {
            business_name: Some(account_name.to_string()),
            business_email: Some(account_email.to_string()),
            footer_text: Some("Thank you for your business!".into()),
            terms_conditions: Some(DEFAULT_PAYMENT_TERMS.into()),
            ..Self::default()
        }
    }

    /// Drop blank optional strings so empty form inputs are stored as NULL.
    pub fn normalized(self) -> Self {
        Self {
            business_name: non_blank(self.business_name),
            business_address: non_blank(self.business_address),
            business_phone: non_blank(self.business_phone),
            business_email: non_blank(self.business_email),
            website: non_blank(self.website),
            tax_number: non_blank(self.tax_number),
            logo_url: non_blank(self.logo_url),
            bank_name: non_blank(self.bank_name),
            account_number: non_blank(self.account_number),
            routing_number: non_blank(self.routing_number),
            paypal_email: non_blank(self.paypal_email),
            footer_text: non_blank(self.footer_text),
            terms_conditions: non_blank(self.terms_conditions),
            ..self
        }
    }
}

/// Branding as returned by `GET /branding`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BrandingView {
    Stored(BrandingSettings),
    Defaults(UpsertBranding),
}
