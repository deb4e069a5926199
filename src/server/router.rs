use crate::config::Config;
use crate::handlers::{devices, upload};
use crate::repository::DeviceRepository;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

/// Shared handler state; the repository is injected once at startup.
#[derive(Clone)]
pub struct InventoryState {
    pub repo: Arc<dyn DeviceRepository>,
    pub paging: PageLimits,
    pub body_limit: usize,
}

impl InventoryState {
    pub fn new(repo: Arc<dyn DeviceRepository>, cfg: &Config) -> Self {
        let max_limit = cfg.max_page_size.max(1);
        Self {
            repo,
            paging: PageLimits {
                default_limit: cfg.default_page_size.clamp(1, max_limit),
                max_limit,
            },
            body_limit: cfg.max_upload_bytes,
        }
    }
}

pub fn inventory_router(state: InventoryState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route(
            "/device",
            post(devices::create_device).get(devices::list_devices),
        )
        .route(
            "/device/{id}",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/upload", post(upload::upload_devices))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
