//! Custom field validators used by `#[validate(custom(...))]` attributes on
//! request DTOs, plus a few standalone checks.

use std::borrow::Cow;

use validator::ValidationError;

use crate::error::CoreError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest task title, in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 300;

/// Invoice templates a user may pick as their default.
pub const INVOICE_TEMPLATES: &[&str] = &["modern", "classic", "minimal", "corporate", "creative"];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// `#RGB` or `#RRGGBB`.
pub fn hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value
        .strip_prefix('#')
        .ok_or_else(|| error("hex_color", "Colour must start with '#'"))?;
    let valid_len = digits.len() == 3 || digits.len() == 6;
    if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(error("hex_color", "Colour must be #RGB or #RRGGBB"))
    }
}

pub fn invoice_template(value: &str) -> Result<(), ValidationError> {
    if INVOICE_TEMPLATES.contains(&value) {
        Ok(())
    } else {
        Err(error("invoice_template", "Unknown invoice template"))
    }
}

/// Non-blank after trimming.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("not_blank", "Must not be blank"))
    } else {
        Ok(())
    }
}

/// Reject a start date that falls after the end date.
pub fn validate_date_range(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> Result<(), CoreError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(CoreError::Validation(
            "start_date must not be after end_date".into(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert!(hex_color("#3B82F6").is_ok());
        assert!(hex_color("#fff").is_ok());
        assert!(hex_color("3B82F6").is_err());
        assert!(hex_color("#12345").is_err());
        assert!(hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn templates_are_known_names() {
        assert!(invoice_template("modern").is_ok());
        assert!(invoice_template("fancy").is_err());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(not_blank("  ").is_err());
        assert!(not_blank("x").is_ok());
    }

    #[test]
    fn date_range_order() {
        let a: chrono::NaiveDate = "2026-01-01".parse().unwrap();
        let b: chrono::NaiveDate = "2026-02-01".parse().unwrap();
        assert!(validate_date_range(Some(a), Some(b)).is_ok());
        assert!(validate_date_range(Some(b), Some(a)).is_err());
        assert!(validate_date_range(None, Some(a)).is_ok());
    }
}
