use crate::db::schema::{DEVICE_COLUMNS, SQLITE_INIT};
use crate::device::{Device, DeviceId, DevicePatch, FieldMap, NewDevice, patch::PatchValue};
use crate::error::{InventoryError, InventoryResult};
use crate::repository::{DeviceRepository, Page};
use async_trait::async_trait;
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Device repository over a shared sqlx pool. Every statement is bounded by `timeout`.
#[derive(Clone)]
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteDeviceRepository {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> InventoryResult<()> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            self.bounded(sqlx::query(s).execute(&self.pool)).await?;
        }
        Ok(())
    }

    /// Runs one statement under the `timeout` bound.
    ///
    /// Expiry only drops the caller's future. A statement already handed to the
    /// SQLite worker may still commit, so `StorageTimeout` means "outcome
    /// unknown", not "not written". Lock waits are cut off earlier by the
    /// pool's `busy_timeout` (see `db::busy_timeout_for`), and those fail
    /// inside SQLite without writing.
    async fn bounded<T, F>(&self, fut: F) -> InventoryResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(InventoryError::from),
            Err(_) => Err(InventoryError::StorageTimeout(self.timeout)),
        }
    }
}

#[async_trait]
impl DeviceRepository for SqliteDeviceRepository {
    async fn create(&self, device: NewDevice) -> InventoryResult<Device> {
        device.validate()?;
        let sql = format!(
            r#"INSERT INTO devices (
                device_name, device_type, brand, model, os, os_version,
                purchase_date, warranty_end, status, price
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {DEVICE_COLUMNS}"#
        );
        let created = self
            .bounded(
                sqlx::query_as::<_, Device>(&sql)
                    .bind(device.device_name)
                    .bind(device.device_type)
                    .bind(device.brand)
                    .bind(device.model)
                    .bind(device.os)
                    .bind(device.os_version)
                    .bind(device.purchase_date)
                    .bind(device.warranty_end)
                    .bind(device.status)
                    .bind(device.price)
                    .fetch_one(&self.pool),
            )
            .await?;
        debug!(id = created.id, "device inserted");
        Ok(created)
    }

    async fn get_by_id(&self, id: DeviceId) -> InventoryResult<Device> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE id = ?");
        self.bounded(
            sqlx::query_as::<_, Device>(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(InventoryError::NotFound(id))
    }

    async fn list(&self, page: Page) -> InventoryResult<Vec<Device>> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices ORDER BY id LIMIT ? OFFSET ?");
        let rows = self
            .bounded(
                sqlx::query_as::<_, Device>(&sql)
                    .bind(i64::from(page.limit))
                    .bind(i64::from(page.offset))
                    .fetch_all(&self.pool),
            )
            .await?;
        debug!(limit = page.limit, offset = page.offset, rows = rows.len(), "devices listed");
        Ok(rows)
    }

    async fn update(&self, id: DeviceId, fields: FieldMap) -> InventoryResult<Device> {
        let patch = DevicePatch::from_field_map(fields)?;
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        // A single UPDATE ... RETURNING keeps the write atomic and reports
        // a missing row as "no row returned".
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE devices SET ");
        {
            let mut set = qb.separated(", ");
            for (field, value) in patch.assignments() {
                set.push(field.column()).push_unseparated(" = ");
                match value {
                    PatchValue::Text(s) => set.push_bind_unseparated(s.clone()),
                    PatchValue::Decimal(p) => set.push_bind_unseparated(*p),
                };
            }
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(DEVICE_COLUMNS);

        let updated = self
            .bounded(qb.build_query_as::<Device>().fetch_optional(&self.pool))
            .await?
            .ok_or(InventoryError::NotFound(id))?;
        debug!(id, fields = patch.assignments().len(), "device updated");
        Ok(updated)
    }

    async fn delete(&self, id: DeviceId) -> InventoryResult<()> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM devices WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(InventoryError::NotFound(id));
        }
        debug!(id, "device deleted");
        Ok(())
    }
}
