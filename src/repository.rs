//! Storage-agnostic persistence contract for devices.
//!
//! Backends:
//! - `db::sqlite::SqliteDeviceRepository`: sqlx/SQLite, used by the server
//! - `db::memory::InMemoryDeviceRepository`: map-backed fake for tests

use crate::device::{Device, DeviceId, FieldMap, NewDevice};
use crate::error::InventoryResult;
use async_trait::async_trait;

/// Offset/limit window for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// Every operation is atomic with respect to a single record.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Validates and persists `device`, returning it with its assigned id.
    async fn create(&self, device: NewDevice) -> InventoryResult<Device>;

    async fn get_by_id(&self, id: DeviceId) -> InventoryResult<Device>;

    /// Devices ordered by id ascending. An empty page is not an error.
    async fn list(&self, page: Page) -> InventoryResult<Vec<Device>>;

    /// Applies a partial update; either every field in `fields` is written or none is.
    async fn update(&self, id: DeviceId, fields: FieldMap) -> InventoryResult<Device>;

    /// Hard delete.
    async fn delete(&self, id: DeviceId) -> InventoryResult<()>;
}
