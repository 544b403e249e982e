//! Station staff records (`employees` table).
//!
//! The PIN is write-only from the dashboard's point of view: it is sent on
//! create (and on edit when a new one is entered) but never shown again.
//! Editing an employee starts with an empty PIN; leaving it empty keeps the
//! stored one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{non_blank, parse_flag, Tone};
use crate::error::ValidationError;
use crate::remote::{Draft, Entity, WriteKind};

// ---------------------------------------------------------------------------
// PIN
// ---------------------------------------------------------------------------

/// Staff PIN. Wiped from memory on drop, redacted in `Debug` and never
/// serialized; only draft payloads carry it to the backend.
#[derive(Clone, Default)]
pub struct Pin(Zeroizing<String>);

impl Pin {
    pub fn new(value: &str) -> Self {
        Self(Zeroizing::new(value.trim().to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Pin {}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Pin(<empty>)")
        } else {
            f.write_str("Pin(****)")
        }
    }
}

impl<'de> Deserialize<'de> for Pin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Pin::new(&s)).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    Admin,
    Manager,
    #[default]
    Cashier,
}

impl EmployeeRole {
    pub const ALL: [EmployeeRole; 3] = [
        EmployeeRole::Cashier,
        EmployeeRole::Manager,
        EmployeeRole::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeRole::Admin => "admin",
            EmployeeRole::Manager => "manager",
            EmployeeRole::Cashier => "cashier",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmployeeRole::Admin => "Admin",
            EmployeeRole::Manager => "Manager",
            EmployeeRole::Cashier => "Cashier",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            EmployeeRole::Admin => Tone::Destructive,
            EmployeeRole::Manager => Tone::Secondary,
            EmployeeRole::Cashier => Tone::Outline,
        }
    }
}

impl FromStr for EmployeeRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(EmployeeRole::Admin),
            "manager" => Ok(EmployeeRole::Manager),
            "cashier" => Ok(EmployeeRole::Cashier),
            other => Err(ValidationError::invalid(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    /// Read from the backend, never written back out.
    #[serde(default, skip_serializing)]
    pin: Pin,
    #[serde(default)]
    pub rfid_code: Option<String>,
    pub role: EmployeeRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// RFID code for display, "Not set" when absent.
    pub fn rfid_display(&self) -> &str {
        self.rfid_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Not set")
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }

    pub fn has_pin(&self) -> bool {
        !self.pin.is_empty()
    }
}

/// Employee columns embedded in a transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub full_name: String,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDraft {
    pub full_name: String,
    pub pin: Pin,
    pub rfid_code: String,
    pub role: EmployeeRole,
    pub is_active: bool,
}

impl Default for EmployeeDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            pin: Pin::default(),
            rfid_code: String::new(),
            role: EmployeeRole::Cashier,
            is_active: true,
        }
    }
}

impl Draft for EmployeeDraft {
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        match name {
            "full_name" => self.full_name = value.to_string(),
            "pin" => self.pin = Pin::new(value),
            "rfid_code" => self.rfid_code = value.to_string(),
            "role" => self.role = value.parse()?,
            "is_active" => self.is_active = parse_flag("is_active", value)?,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn validate(&self, kind: WriteKind) -> Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::MissingField("full_name"));
        }
        if kind == WriteKind::Insert && self.pin.is_empty() {
            return Err(ValidationError::MissingField("pin"));
        }
        Ok(())
    }

    fn insert_payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("full_name".into(), json!(self.full_name.trim()));
        body.insert("pin".into(), json!(self.pin.expose()));
        if let Some(rfid) = non_blank(&self.rfid_code) {
            body.insert("rfid_code".into(), json!(rfid));
        }
        body.insert("role".into(), json!(self.role.as_str()));
        body.insert("is_active".into(), json!(self.is_active));
        Value::Object(body)
    }

    fn update_payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("full_name".into(), json!(self.full_name.trim()));
        if !self.pin.is_empty() {
            body.insert("pin".into(), json!(self.pin.expose()));
        }
        body.insert("rfid_code".into(), json!(non_blank(&self.rfid_code)));
        body.insert("role".into(), json!(self.role.as_str()));
        body.insert("is_active".into(), json!(self.is_active));
        Value::Object(body)
    }
}

impl Entity for Employee {
    type Key = Uuid;
    type Draft = EmployeeDraft;

    const TABLE: &'static str = "employees";
    const FILTERS: &'static [&'static str] = &["role", "is_active"];
    const NAME: &'static str = "Employee";
    const PLURAL: &'static str = "employees";

    fn key(&self) -> &Uuid {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.full_name.as_str(), self.role.as_str()]
    }

    fn filter_value(&self, name: &str) -> Option<String> {
        match name {
            "role" => Some(self.role.as_str().to_string()),
            "is_active" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn to_draft(&self) -> EmployeeDraft {
        EmployeeDraft {
            full_name: self.full_name.clone(),
            pin: Pin::default(),
            rfid_code: self.rfid_code.clone().unwrap_or_default(),
            role: self.role,
            is_active: self.is_active,
        }
    }
}
