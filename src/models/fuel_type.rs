//! Fuel catalog (`fuel_types` table): names, classification and price.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{parse_flag, parse_positive};
use crate::error::ValidationError;
use crate::remote::{Draft, Entity, WriteKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelKind {
    #[default]
    Gasoline,
    Diesel,
    Gasohol,
    Lpg,
    Ngv,
    Electric,
    #[serde(other)]
    Other,
}

impl FuelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FuelKind::Gasoline => "gasoline",
            FuelKind::Diesel => "diesel",
            FuelKind::Gasohol => "gasohol",
            FuelKind::Lpg => "lpg",
            FuelKind::Ngv => "ngv",
            FuelKind::Electric => "electric",
            FuelKind::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FuelKind::Gasoline => "Gasoline",
            FuelKind::Diesel => "Diesel",
            FuelKind::Gasohol => "Gasohol",
            FuelKind::Lpg => "LPG",
            FuelKind::Ngv => "NGV",
            FuelKind::Electric => "Electric",
            FuelKind::Other => "Other",
        }
    }
}

impl FromStr for FuelKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gasoline" | "petrol" | "benzine" => Ok(FuelKind::Gasoline),
            "diesel" => Ok(FuelKind::Diesel),
            "gasohol" => Ok(FuelKind::Gasohol),
            "lpg" => Ok(FuelKind::Lpg),
            "ngv" | "cng" => Ok(FuelKind::Ngv),
            "electric" | "ev" => Ok(FuelKind::Electric),
            "other" => Ok(FuelKind::Other),
            other => Err(ValidationError::invalid(
                "type",
                format!("unknown fuel type '{other}'"),
            )),
        }
    }
}

impl fmt::Display for FuelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelType {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FuelKind,
    #[serde(default)]
    pub price_per_liter: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Fuel type columns embedded in a transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelTypeRef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelTypeDraft {
    pub name: String,
    pub kind: FuelKind,
    pub price_per_liter: Option<f64>,
    pub is_active: bool,
}

impl Default for FuelTypeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: FuelKind::Gasoline,
            price_per_liter: None,
            is_active: true,
        }
    }
}

impl Draft for FuelTypeDraft {
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        match name {
            "name" => self.name = value.to_string(),
            "type" | "kind" => self.kind = value.parse()?,
            "price_per_liter" => self.price_per_liter = parse_positive("price_per_liter", value)?,
            "is_active" => self.is_active = parse_flag("is_active", value)?,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn validate(&self, _kind: WriteKind) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.price_per_liter.is_none() {
            return Err(ValidationError::MissingField("price_per_liter"));
        }
        Ok(())
    }

    fn insert_payload(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "type": self.kind.as_str(),
            "price_per_liter": self.price_per_liter,
            "is_active": self.is_active,
        })
    }

    fn update_payload(&self) -> Value {
        self.insert_payload()
    }
}

impl Entity for FuelType {
    type Key = Uuid;
    type Draft = FuelTypeDraft;

    const TABLE: &'static str = "fuel_types";
    const FILTERS: &'static [&'static str] = &["type", "is_active"];
    const NAME: &'static str = "Fuel type";
    const PLURAL: &'static str = "fuel types";

    fn key(&self) -> &Uuid {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.kind.as_str()]
    }

    fn filter_value(&self, name: &str) -> Option<String> {
        match name {
            "type" => Some(self.kind.as_str().to_string()),
            "is_active" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn to_draft(&self) -> FuelTypeDraft {
        FuelTypeDraft {
            name: self.name.clone(),
            kind: self.kind,
            price_per_liter: Some(self.price_per_liter).filter(|p| *p > 0.0),
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_classification_decodes_as_other() {
        let fuel: FuelType = serde_json::from_value(json!({
            "id": "3d0c8d16-4c7e-4f31-9e3b-7a0e3e9f0c21",
            "name": "Hydrogen H70",
            "type": "hydrogen",
            "price_per_liter": 120.0,
            "created_at": "2024-01-10T00:00:00Z",
        }))
        .expect("fuel row");
        assert_eq!(fuel.kind, FuelKind::Other);
        assert!(fuel.is_active);
    }

    #[test]
    fn draft_requires_name_and_price() {
        let mut draft = FuelTypeDraft::default();
        assert_eq!(
            draft.validate(WriteKind::Insert),
            Err(ValidationError::MissingField("name"))
        );
        draft.set_field("name", "Gasohol 95").unwrap();
        assert_eq!(
            draft.validate(WriteKind::Insert),
            Err(ValidationError::MissingField("price_per_liter"))
        );
        draft.set_field("price_per_liter", "35.84").unwrap();
        draft.set_field("type", "gasohol").unwrap();
        assert_eq!(draft.validate(WriteKind::Insert), Ok(()));
        assert_eq!(
            draft.insert_payload(),
            json!({
                "name": "Gasohol 95",
                "type": "gasohol",
                "price_per_liter": 35.84,
                "is_active": true,
            })
        );
    }

    #[test]
    fn kind_aliases_parse() {
        assert_eq!("Petrol".parse::<FuelKind>().unwrap(), FuelKind::Gasoline);
        assert_eq!("EV".parse::<FuelKind>().unwrap(), FuelKind::Electric);
        assert!("plutonium".parse::<FuelKind>().is_err());
        assert_eq!(FuelKind::Lpg.label(), "LPG");
    }
}
