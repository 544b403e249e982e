//! Fuel sales (`gas_transactions` table).
//!
//! Rows are listed with the fuel type and the processing employee embedded,
//! newest first, capped at the 50 most recent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{non_blank, parse_positive, EmployeeRef, FuelTypeRef, Tone};
use crate::error::ValidationError;
use crate::remote::{Draft, Entity, WriteKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    QrCode,
    CreditCard,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::QrCode,
        PaymentMethod::CreditCard,
        PaymentMethod::Cash,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::QrCode => "qr_code",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::QrCode => "QR Code",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::Cash => "Cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qr_code" | "qr" => Ok(PaymentMethod::QrCode),
            "credit_card" | "card" => Ok(PaymentMethod::CreditCard),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(ValidationError::invalid(
                "payment_method",
                format!("unknown payment method '{other}'"),
            )),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    #[default]
    Pending,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        TransactionStatus::Completed,
        TransactionStatus::Pending,
        TransactionStatus::Failed,
        TransactionStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Cancelled => "Cancelled",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            TransactionStatus::Completed => Tone::Success,
            TransactionStatus::Pending => Tone::Warning,
            TransactionStatus::Failed => Tone::Destructive,
            TransactionStatus::Cancelled => Tone::Muted,
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(TransactionStatus::Completed),
            "pending" => Ok(TransactionStatus::Pending),
            "failed" => Ok(TransactionStatus::Failed),
            "cancelled" | "canceled" => Ok(TransactionStatus::Cancelled),
            other => Err(ValidationError::invalid(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub fuel_amount: f64,
    pub fuel_price_per_liter: f64,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    #[serde(default)]
    pub receipt_number: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub fuel_type_id: Option<Uuid>,
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    #[serde(rename = "fuel_types", default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelTypeRef>,
    #[serde(rename = "employees", default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeRef>,
}

impl Transaction {
    pub fn receipt_display(&self) -> &str {
        self.receipt_number
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("N/A")
    }

    pub fn fuel_type_name(&self) -> Option<&str> {
        self.fuel_type.as_ref().map(|f| f.name.as_str())
    }

    pub fn employee_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|e| e.full_name.as_str())
    }

    /// Heading line, e.g. "Gasohol 95 - 30L".
    pub fn headline(&self) -> String {
        format!(
            "{} - {}L",
            self.fuel_type_name().unwrap_or("Unknown fuel"),
            self.fuel_amount
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub fuel_type_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub fuel_amount: Option<f64>,
    pub fuel_price_per_liter: Option<f64>,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    pub receipt_number: String,
}

fn parse_uuid(field: &'static str, value: &str) -> Result<Option<Uuid>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(trimmed)
        .map(Some)
        .map_err(|e| ValidationError::invalid(field, e.to_string()))
}

impl TransactionDraft {
    /// Amount × price; `None` until both are entered.
    pub fn total_amount(&self) -> Option<f64> {
        Some(self.fuel_amount? * self.fuel_price_per_liter?)
    }
}

impl Draft for TransactionDraft {
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        match name {
            "fuel_type_id" => self.fuel_type_id = parse_uuid("fuel_type_id", value)?,
            "employee_id" => self.employee_id = parse_uuid("employee_id", value)?,
            "fuel_amount" => self.fuel_amount = parse_positive("fuel_amount", value)?,
            "fuel_price_per_liter" => {
                self.fuel_price_per_liter = parse_positive("fuel_price_per_liter", value)?
            }
            "payment_method" => self.payment_method = value.parse()?,
            "status" => self.status = value.parse()?,
            "receipt_number" => self.receipt_number = value.to_string(),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn validate(&self, _kind: WriteKind) -> Result<(), ValidationError> {
        if self.fuel_type_id.is_none() {
            return Err(ValidationError::MissingField("fuel_type_id"));
        }
        if self.employee_id.is_none() {
            return Err(ValidationError::MissingField("employee_id"));
        }
        if self.fuel_amount.is_none() {
            return Err(ValidationError::MissingField("fuel_amount"));
        }
        if self.fuel_price_per_liter.is_none() {
            return Err(ValidationError::MissingField("fuel_price_per_liter"));
        }
        Ok(())
    }

    fn insert_payload(&self) -> Value {
        json!({
            "fuel_type_id": self.fuel_type_id,
            "employee_id": self.employee_id,
            "fuel_amount": self.fuel_amount,
            "fuel_price_per_liter": self.fuel_price_per_liter,
            "total_amount": self.total_amount(),
            "payment_method": self.payment_method.as_str(),
            "status": self.status.as_str(),
            "receipt_number": non_blank(&self.receipt_number),
        })
    }

    fn update_payload(&self) -> Value {
        self.insert_payload()
    }
}

impl Entity for Transaction {
    type Key = Uuid;
    type Draft = TransactionDraft;

    const TABLE: &'static str = "gas_transactions";
    const SELECT: &'static str = "*,fuel_types(name,type),employees(full_name)";
    const LIST_LIMIT: Option<usize> = Some(50);
    const FILTERS: &'static [&'static str] = &["status", "payment_method"];
    const NAME: &'static str = "Transaction";
    const PLURAL: &'static str = "transactions";

    fn key(&self) -> &Uuid {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            self.receipt_number.as_deref(),
            self.employee_name(),
            self.fuel_type_name(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn filter_value(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "payment_method" => Some(self.payment_method.as_str().to_string()),
            _ => None,
        }
    }

    fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            fuel_type_id: self.fuel_type_id,
            employee_id: self.employee_id,
            fuel_amount: Some(self.fuel_amount),
            fuel_price_per_liter: Some(self.fuel_price_per_liter),
            payment_method: self.payment_method,
            status: self.status,
            receipt_number: self.receipt_number.clone().unwrap_or_default(),
        }
    }
}
