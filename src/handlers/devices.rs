use crate::device::{Device, DeviceId, NewDevice, patch::field_map_from_json};
use crate::error::InventoryError;
use crate::repository::Page;
use crate::server::router::{InventoryState, PageLimits};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

/// `GET /device` query. `offset` wins over `page` when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl ListQuery {
    pub fn resolve(&self, limits: PageLimits) -> Page {
        let limit = self
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(limits.default_limit)
            .min(limits.max_limit);
        let offset = match (self.offset, self.page) {
            (Some(offset), _) => offset,
            (None, Some(page)) => page.max(1).saturating_sub(1).saturating_mul(limit),
            (None, None) => 0,
        };
        Page::new(limit, offset)
    }
}

/// Unwraps the `{id}` segment; unparsable or non-positive ids are validation errors.
fn device_id(path: Result<Path<DeviceId>, PathRejection>) -> Result<DeviceId, InventoryError> {
    let Path(id) = path.map_err(|e| InventoryError::Validation(e.body_text()))?;
    if id <= 0 {
        return Err(InventoryError::validation(format!(
            "device id must be a positive integer, got {id}"
        )));
    }
    Ok(id)
}

/// POST /device
pub async fn create_device(
    State(state): State<InventoryState>,
    payload: Result<Json<NewDevice>, JsonRejection>,
) -> Result<(StatusCode, Json<Device>), InventoryError> {
    let Json(new_device) = payload.map_err(|e| InventoryError::Validation(e.body_text()))?;
    let created = state.repo.create(new_device).await?;
    info!(id = created.id, name = %created.device_name, "device created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /device
pub async fn list_devices(
    State(state): State<InventoryState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Device>>, InventoryError> {
    let Query(query) = query.map_err(|e| InventoryError::Validation(e.body_text()))?;
    let page = query.resolve(state.paging);
    let devices = state.repo.list(page).await?;
    Ok(Json(devices))
}

/// GET /device/{id}
pub async fn get_device(
    State(state): State<InventoryState>,
    path: Result<Path<DeviceId>, PathRejection>,
) -> Result<Json<Device>, InventoryError> {
    let id = device_id(path)?;
    Ok(Json(state.repo.get_by_id(id).await?))
}

/// PUT /device/{id} with a JSON object of the fields to change.
///
/// An `id` key equal to the path id is dropped, so a body fetched with GET can
/// be sent back as-is. Any other `id` reaches the patch and is rejected there.
pub async fn update_device(
    State(state): State<InventoryState>,
    path: Result<Path<DeviceId>, PathRejection>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Device>, InventoryError> {
    let id = device_id(path)?;
    let Json(mut object) = payload.map_err(|e| InventoryError::Validation(e.body_text()))?;
    if object.get("id").and_then(Value::as_i64) == Some(id) {
        object.remove("id");
    }
    let fields = field_map_from_json(object)?;
    let keys = fields.keys().cloned().collect::<Vec<_>>().join(",");
    let updated = state.repo.update(id, fields).await?;
    info!(id, fields = %keys, "device updated");
    Ok(Json(updated))
}

/// DELETE /device/{id}
pub async fn delete_device(
    State(state): State<InventoryState>,
    path: Result<Path<DeviceId>, PathRejection>,
) -> Result<Json<Value>, InventoryError> {
    let id = device_id(path)?;
    state.repo.delete(id).await?;
    info!(id, "device deleted");
    Ok(Json(json!({ "message": "Device deleted", "id": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PageLimits = PageLimits {
        default_limit: 10,
        max_limit: 100,
    };

    #[test]
    fn absent_params_use_defaults() {
        assert_eq!(ListQuery::default().resolve(LIMITS), Page::new(10, 0));
    }

    #[test]
    fn page_maps_to_offset() {
        let q = ListQuery {
            limit: Some(10),
            page: Some(3),
            ..Default::default()
        };
        assert_eq!(q.resolve(LIMITS), Page::new(10, 20));

        let first = ListQuery {
            page: Some(1),
            ..Default::default()
        };
        assert_eq!(first.resolve(LIMITS), Page::new(10, 0));
    }

    #[test]
    fn explicit_offset_wins_and_limit_is_clamped() {
        let q = ListQuery {
            limit: Some(1_000),
            offset: Some(5),
            page: Some(4),
        };
        assert_eq!(q.resolve(LIMITS), Page::new(100, 5));
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let q = ListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(q.resolve(LIMITS).limit, 10);
    }
}
