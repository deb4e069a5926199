//! Device entity: the record schema and its validation rules.
//!
//! Layout:
//! - `mod.rs`: `Device`, `NewDevice` and field-level validation
//! - `patch.rs`: field-map coercion for partial updates

pub mod patch;

use crate::error::{InventoryError, InventoryResult};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub use patch::{DeviceField, DevicePatch, FieldMap, FieldValue};

pub type DeviceId = i64;

/// A persisted inventory record. `id` is assigned by storage on creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Device {
    pub id: DeviceId,
    pub device_name: String,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
    pub purchase_date: String,
    pub warranty_end: String,
    pub status: String,
    pub price: f64,
}

/// Create payload: a device without its storage-assigned id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NewDevice {
    /// Accepted so a full `Device` body can be posted; never persisted.
    #[serde(skip_serializing)]
    pub id: Option<DeviceId>,
    pub device_name: String,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
    pub purchase_date: String,
    pub warranty_end: String,
    pub status: String,
    pub price: f64,
}

impl NewDevice {
    pub fn validate(&self) -> InventoryResult<()> {
        if self.device_name.trim().is_empty() {
            return Err(InventoryError::validation("device_name is required"));
        }
        validate_date("purchase_date", &self.purchase_date)?;
        validate_date("warranty_end", &self.warranty_end)?;
        validate_price(self.price)?;
        Ok(())
    }

    pub fn into_device(self, id: DeviceId) -> Device {
        Device {
            id,
            device_name: self.device_name,
            device_type: self.device_type,
            brand: self.brand,
            model: self.model,
            os: self.os,
            os_version: self.os_version,
            purchase_date: self.purchase_date,
            warranty_end: self.warranty_end,
            status: self.status,
            price: self.price,
        }
    }
}

impl From<Device> for NewDevice {
    fn from(d: Device) -> Self {
        Self {
            id: None,
            device_name: d.device_name,
            device_type: d.device_type,
            brand: d.brand,
            model: d.model,
            os: d.os,
            os_version: d.os_version,
            purchase_date: d.purchase_date,
            warranty_end: d.warranty_end,
            status: d.status,
            price: d.price,
        }
    }
}

/// Empty means "not set"; anything else must be an ISO-8601 date or RFC 3339 timestamp.
pub fn validate_date(field: &str, value: &str) -> InventoryResult<()> {
    if value.is_empty() || parse_date(value).is_some() {
        return Ok(());
    }
    Err(InventoryError::validation(format!(
        "{field} must be an ISO-8601 date, got `{value}`"
    )))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

pub fn validate_price(price: f64) -> InventoryResult<()> {
    if !price.is_finite() {
        return Err(InventoryError::validation("price must be a finite number"));
    }
    if price < 0.0 {
        return Err(InventoryError::validation(format!(
            "price must be non-negative, got {price}"
        )));
    }
    Ok(())
}
