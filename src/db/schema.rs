//! SQL DDL for initializing the device storage.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT, so ids are never reused after a delete
/// - every device column NOT NULL with a zero-value default
/// - `price` REAL with a non-negative CHECK
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS devices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_name TEXT NOT NULL DEFAULT '',
    device_type TEXT NOT NULL DEFAULT '',
    brand TEXT NOT NULL DEFAULT '',
    model TEXT NOT NULL DEFAULT '',
    os TEXT NOT NULL DEFAULT '',
    os_version TEXT NOT NULL DEFAULT '',
    purchase_date TEXT NOT NULL DEFAULT '', -- ISO-8601
    warranty_end TEXT NOT NULL DEFAULT '', -- ISO-8601
    status TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0 CHECK (price >= 0)
);
"#;

pub const DEVICE_COLUMNS: &str = "id, device_name, device_type, brand, model, os, os_version, \
     purchase_date, warranty_end, status, price";
