use crate::device::{Device, DeviceId, DevicePatch, FieldMap, NewDevice};
use crate::error::{InventoryError, InventoryResult};
use crate::repository::{DeviceRepository, Page};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory implementation of DeviceRepository using a BTreeMap
pub struct InMemoryDeviceRepository {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    next_id: DeviceId,
    devices: BTreeMap<DeviceId, Device>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                devices: BTreeMap::new(),
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.devices.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryDeviceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn create(&self, device: NewDevice) -> InventoryResult<Device> {
        device.validate()?;
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        let created = device.into_device(id);
        state.devices.insert(id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: DeviceId) -> InventoryResult<Device> {
        let state = self.state.read().await;
        state
            .devices
            .get(&id)
            .cloned()
            .ok_or(InventoryError::NotFound(id))
    }

    async fn list(&self, page: Page) -> InventoryResult<Vec<Device>> {
        let state = self.state.read().await;
        Ok(state
            .devices
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: DeviceId, fields: FieldMap) -> InventoryResult<Device> {
        let patch = DevicePatch::from_field_map(fields)?;
        let mut state = self.state.write().await;
        let device = state
            .devices
            .get_mut(&id)
            .ok_or(InventoryError::NotFound(id))?;
        patch.apply(device);
        Ok(device.clone())
    }

    async fn delete(&self, id: DeviceId) -> InventoryResult<()> {
        let mut state = self.state.write().await;
        state
            .devices
            .remove(&id)
            .map(|_| ())
            .ok_or(InventoryError::NotFound(id))
    }
}
