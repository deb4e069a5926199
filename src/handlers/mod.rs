pub mod devices;
pub mod upload;
