pub mod config;
pub mod db;
pub mod device;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod server;
pub mod service;

pub use device::{Device, DeviceId, FieldMap, FieldValue, NewDevice};
pub use error::InventoryError;
pub use repository::{DeviceRepository, Page};
