//! Repository for the `branding_settings` table.

use gigledger_core::types::DbId;
use sqlx::PgPool;

use crate::models::branding::{BrandingSettings, UpsertBranding};

const COLUMNS: &str = "id, user_id, business_name, business_address, business_phone, \
     business_email, website, tax_number, logo_url, primary_color, secondary_color, \
     accent_color, font_family, default_template, show_logo, show_business_info, \
     invoice_prefix, bank_name, account_number, routing_number, paypal_email, footer_text, \
     terms_conditions, created_at, updated_at";

/// Reads and writes per-account branding.
pub struct BrandingRepo;

impl BrandingRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<BrandingSettings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branding_settings WHERE user_id = $1");
        sqlx::query_as::<_, BrandingSettings>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the account's settings.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertBranding,
    ) -> Result<BrandingSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO branding_settings
                 (user_id, business_name, business_address, business_phone, business_email,
                  website, tax_number, logo_url, primary_color, secondary_color, accent_color,
                  font_family, default_template, show_logo, show_business_info, invoice_prefix,
                  bank_name, account_number, routing_number, paypal_email, footer_text,
                  terms_conditions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21, $22)
             ON CONFLICT ON CONSTRAINT uq_branding_settings_user_id DO UPDATE SET
                 business_name = EXCLUDED.business_name,
                 business_address = EXCLUDED.business_address,
                 business_phone = EXCLUDED.business_phone,
                 business_email = EXCLUDED.business_email,
                 website = EXCLUDED.website,
                 tax_number = EXCLUDED.tax_number,
                 logo_url = EXCLUDED.logo_url,
                 primary_color = EXCLUDED.primary_color,
                 secondary_color = EXCLUDED.secondary_color,
                 accent_color = EXCLUDED.accent_color,
                 font_family = EXCLUDED.font_family,
                 default_template = EXCLUDED.default_template,
                 show_logo = EXCLUDED.show_logo,
                 show_business_info = EXCLUDED.show_business_info,
                 invoice_prefix = EXCLUDED.invoice_prefix,
                 bank_name = EXCLUDED.bank_name,
                 account_number = EXCLUDED.account_number,
                 routing_number = EXCLUDED.routing_number,
                 paypal_email = EXCLUDED.paypal_email,
                 footer_text = EXCLUDED.footer_text,
                 terms_conditions = EXCLUDED.terms_conditions
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BrandingSettings>(&query)
            .bind(user_id)
            .bind(&input.business_name)
            .bind(&input.business_address)
            .bind(&input.business_phone)
            .bind(&input.business_email)
            .bind(&input.website)
            .bind(&input.tax_number)
            .bind(&input.logo_url)
            .bind(&input.primary_color)
            .bind(&input.secondary_color)
            .bind(&input.accent_color)
            .bind(&input.font_family)
            .bind(&input.default_template)
            .bind(input.show_logo)
            .bind(input.show_business_info)
            .bind(&input.invoice_prefix)
            .bind(&input.bank_name)
            .bind(&input.account_number)
            .bind(&input.routing_number)
            .bind(&input.paypal_email)
            .bind(&input.footer_text)
            .bind(&input.terms_conditions)
            .fetch_one(pool)
            .await
    }
}
