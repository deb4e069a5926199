//! Partial updates: coerce an untyped field-map into a typed `DevicePatch`.
//!
//! Coercion is all-or-nothing. A map with one unknown key or one mistyped
//! value yields an error and no patch, so nothing reaches storage.

use super::{Device, parse_date, validate_price};
use crate::error::{InventoryError, InventoryResult};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Untyped update value as received from a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
        }
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = InventoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n
                    .as_f64()
                    .map(Self::Decimal)
                    .ok_or_else(|| InventoryError::validation(format!("unsupported number {n}"))),
            },
            Value::Null => Err(InventoryError::validation("null is not a valid field value")),
            Value::Bool(_) => Err(InventoryError::validation(
                "boolean is not a valid field value",
            )),
            Value::Array(_) | Value::Object(_) => Err(InventoryError::validation(
                "nested values are not valid field values",
            )),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Decimal(f)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// Field name to untyped value.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Converts a decoded JSON object into a `FieldMap`, failing on the first
/// value that has no `FieldValue` representation.
pub fn field_map_from_json(object: Map<String, Value>) -> InventoryResult<FieldMap> {
    object
        .into_iter()
        .map(|(key, value)| {
            FieldValue::try_from(value)
                .map(|v| (key.clone(), v))
                .map_err(|e| InventoryError::validation(format!("field `{key}`: {e}")))
        })
        .collect()
}

/// Every mutable column of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceField {
    DeviceName,
    DeviceType,
    Brand,
    Model,
    Os,
    OsVersion,
    PurchaseDate,
    WarrantyEnd,
    Status,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Date,
    Decimal,
}

impl DeviceField {
    /// Column order used by CSV imports.
    pub const ALL: [DeviceField; 10] = [
        Self::DeviceName,
        Self::DeviceType,
        Self::Brand,
        Self::Model,
        Self::Os,
        Self::OsVersion,
        Self::PurchaseDate,
        Self::WarrantyEnd,
        Self::Status,
        Self::Price,
    ];

    /// Column name; also the JSON key.
    pub fn column(self) -> &'static str {
        match self {
            Self::DeviceName => "device_name",
            Self::DeviceType => "device_type",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Os => "os",
            Self::OsVersion => "os_version",
            Self::PurchaseDate => "purchase_date",
            Self::WarrantyEnd => "warranty_end",
            Self::Status => "status",
            Self::Price => "price",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::PurchaseDate | Self::WarrantyEnd => FieldKind::Date,
            Self::Price => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }

    fn coerce(self, value: FieldValue) -> InventoryResult<PatchValue> {
        let column = self.column();
        match (self.kind(), value) {
            (FieldKind::Text, FieldValue::Text(s)) => Ok(PatchValue::Text(s)),
            (FieldKind::Date, FieldValue::Date(d)) => Ok(PatchValue::Text(d.to_string())),
            (FieldKind::Date, FieldValue::Text(s)) => {
                if s.is_empty() || parse_date(&s).is_some() {
                    Ok(PatchValue::Text(s))
                } else {
                    Err(InventoryError::validation(format!(
                        "{column} must be an ISO-8601 date, got `{s}`"
                    )))
                }
            }
            (FieldKind::Decimal, FieldValue::Integer(i)) => {
                let price = i as f64;
                validate_price(price)?;
                Ok(PatchValue::Decimal(price))
            }
            (FieldKind::Decimal, FieldValue::Decimal(f)) => {
                validate_price(f)?;
                Ok(PatchValue::Decimal(f))
            }
            (kind, other) => Err(InventoryError::validation(format!(
                "{column} expects a {}, got a {}",
                match kind {
                    FieldKind::Text => "string",
                    FieldKind::Date => "date string",
                    FieldKind::Decimal => "number",
                },
                other.type_name()
            ))),
        }
    }
}

impl FromStr for DeviceField {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "id" {
            return Err(InventoryError::validation("field `id` is immutable"));
        }
        Self::ALL
            .into_iter()
            .find(|f| f.column() == s)
            .ok_or_else(|| InventoryError::validation(format!("unknown field `{s}`")))
    }
}

impl fmt::Display for DeviceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A value already coerced to its column's storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    Decimal(f64),
}

/// Typed, validated set of assignments ready to be applied in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicePatch {
    assignments: Vec<(DeviceField, PatchValue)>,
}

impl DevicePatch {
    /// Resolves and coerces every entry; the first bad entry fails the whole map.
    pub fn from_field_map(fields: FieldMap) -> InventoryResult<Self> {
        let assignments = fields
            .into_iter()
            .map(|(name, value)| -> InventoryResult<(DeviceField, PatchValue)> {
                let field = name.parse::<DeviceField>()?;
                Ok((field, field.coerce(value)?))
            })
            .collect::<InventoryResult<Vec<_>>>()?;
        Ok(Self { assignments })
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn assignments(&self) -> &[(DeviceField, PatchValue)] {
        &self.assignments
    }

    /// Writes the assignments into `device`. `id` is never touched.
    pub fn apply(&self, device: &mut Device) {
        for (field, value) in &self.assignments {
            match (field, value) {
                (DeviceField::Price, PatchValue::Decimal(p)) => device.price = *p,
                (field, PatchValue::Text(s)) => {
                    if let Some(slot) = text_slot(device, *field) {
                        *slot = s.clone();
                    }
                }
                // coerce() only pairs Price with Decimal
                (_, PatchValue::Decimal(_)) => {}
            }
        }
    }
}

fn text_slot(device: &mut Device, field: DeviceField) -> Option<&mut String> {
    let slot = match field {
        DeviceField::DeviceName => &mut device.device_name,
        DeviceField::DeviceType => &mut device.device_type,
        DeviceField::Brand => &mut device.brand,
        DeviceField::Model => &mut device.model,
        DeviceField::Os => &mut device.os,
        DeviceField::OsVersion => &mut device.os_version,
        DeviceField::PurchaseDate => &mut device.purchase_date,
        DeviceField::WarrantyEnd => &mut device.warranty_end,
        DeviceField::Status => &mut device.status,
        DeviceField::Price => return None,
    };
    Some(slot)
}
