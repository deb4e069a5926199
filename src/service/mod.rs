pub mod import;

pub use import::{ImportReport, ImportState, RowFailure, import_devices};
