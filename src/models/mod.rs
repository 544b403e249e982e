//! Records owned by the backend and the drafts used to edit them.

mod employee;
mod fuel_type;
mod transaction;

pub use employee::{Employee, EmployeeDraft, EmployeeRef, EmployeeRole, Pin};
pub use fuel_type::{FuelKind, FuelType, FuelTypeDraft, FuelTypeRef};
pub use transaction::{PaymentMethod, Transaction, TransactionDraft, TransactionStatus};

use crate::error::ValidationError;

/// Visual tone of a badge, independent of any styling system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Default,
    Secondary,
    Outline,
    Destructive,
    Success,
    Warning,
    Muted,
}

/// Parse a checkbox/switch value.
pub(crate) fn parse_flag(field: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ValidationError::invalid(
            field,
            format!("expected true or false, got '{other}'"),
        )),
    }
}

/// Parse an optional positive decimal. Blank input clears the value.
pub(crate) fn parse_positive(
    field: &'static str,
    value: &str,
) -> Result<Option<f64>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::invalid(field, format!("'{trimmed}' is not a number")))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(ValidationError::invalid(field, "must be greater than zero"));
    }
    Ok(Some(parsed))
}

/// Blank strings become `None`.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("is_active", "Yes").unwrap());
        assert!(!parse_flag("is_active", "off").unwrap());
        assert!(parse_flag("is_active", "maybe").is_err());
    }

    #[test]
    fn positive_numbers_reject_zero_and_garbage() {
        assert_eq!(parse_positive("fuel_amount", " 12.5 ").unwrap(), Some(12.5));
        assert_eq!(parse_positive("fuel_amount", "").unwrap(), None);
        assert!(parse_positive("fuel_amount", "0").is_err());
        assert!(parse_positive("fuel_amount", "-3").is_err());
        assert!(parse_positive("fuel_amount", "ten").is_err());
        assert!(parse_positive("fuel_amount", "NaN").is_err());
    }
}
