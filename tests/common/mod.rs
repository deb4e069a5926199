#![allow(dead_code)]

use device_inventory::db::{self, InMemoryDeviceRepository, SqliteDeviceRepository};
use device_inventory::{DeviceRepository, NewDevice};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub async fn sqlite_repo() -> SqliteDeviceRepository {
    let pool = db::connect_in_memory()
        .await
        .expect("failed to open in-memory sqlite");
    let repo = SqliteDeviceRepository::new(pool, Duration::from_secs(5));
    repo.init_schema().await.expect("failed to init schema");
    repo
}

/// Both backends, so contract tests run against each.
pub async fn backends() -> Vec<(&'static str, Box<dyn DeviceRepository>)> {
    vec![
        ("memory", Box::new(InMemoryDeviceRepository::new()) as Box<dyn DeviceRepository>),
        ("sqlite", Box::new(sqlite_repo().await) as Box<dyn DeviceRepository>),
    ]
}

pub fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "device-inventory-{tag}-{}-{nanos}.sqlite",
        std::process::id()
    ));
    path
}

pub fn remove_db_files(path: &Path) {
    let _ = std::fs::remove_file(path);
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let _ = std::fs::remove_file(side);
    }
}

pub fn device(name: &str, price: f64) -> NewDevice {
    NewDevice {
        id: None,
        device_name: name.to_string(),
        device_type: "Mobile".to_string(),
        brand: "Brand1".to_string(),
        model: "Model1".to_string(),
        os: "Android".to_string(),
        os_version: "11".to_string(),
        purchase_date: "2023-01-01".to_string(),
        warranty_end: "2025-01-01".to_string(),
        status: "Active".to_string(),
        price,
    }
}
