//! Row-independent bulk import of devices from comma-separated text.
//!
//! Each record carries ten fields in `DeviceField::ALL` order. A bad row is
//! recorded in the report and never aborts the batch; rows already created
//! stay created.

use crate::device::{DeviceField, DeviceId, NewDevice};
use crate::error::InventoryError;
use crate::repository::DeviceRepository;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use serde::Serialize;
use tracing::{debug, error, info, warn};

pub const FIELDS_PER_ROW: usize = DeviceField::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportState {
    Reading,
    ParsingRow,
    Persisting,
    RowFailed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    /// 1-based index among data rows (a skipped header is not counted).
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub created: usize,
    pub created_ids: Vec<DeviceId>,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs one import to `Completed`. Rows are persisted strictly in input order.
pub async fn import_devices<R>(repo: &R, content: &[u8]) -> ImportReport
where
    R: DeviceRepository + ?Sized,
{
    let mut run = ImportRun::new(content);
    loop {
        let next = match run.state {
            ImportState::Reading => ImportState::ParsingRow,
            ImportState::ParsingRow => run.parse_next(),
            ImportState::Persisting => run.persist(repo).await,
            ImportState::RowFailed => run.record_failure(),
            ImportState::Completed => break,
        };
        debug!(from = ?run.state, to = ?next, row = run.row, "import transition");
        run.state = next;
    }

    let report = run.report;
    info!(
        rows = report.total_rows,
        created = report.created,
        failed = report.failed(),
        "bulk import completed"
    );
    report
}

struct ImportRun<'a> {
    state: ImportState,
    records: StringRecordsIntoIter<&'a [u8]>,
    header_checked: bool,
    row: usize,
    pending: Option<NewDevice>,
    last_error: Option<String>,
    report: ImportReport,
}

impl<'a> ImportRun<'a> {
    fn new(content: &'a [u8]) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content)
            .into_records();
        Self {
            state: ImportState::Reading,
            records,
            header_checked: false,
            row: 0,
            pending: None,
            last_error: None,
            report: ImportReport::default(),
        }
    }

    fn parse_next(&mut self) -> ImportState {
        let next = loop {
            match self.records.next() {
                None => return ImportState::Completed,
                Some(Ok(record)) if !self.header_checked && is_header(&record) => {
                    self.header_checked = true;
                    debug!("skipping header row");
                }
                Some(other) => {
                    self.header_checked = true;
                    break other;
                }
            }
        };

        self.row += 1;
        self.report.total_rows += 1;
        let parsed = next
            .map_err(|e| format!("unreadable row: {e}"))
            .and_then(|record| device_from_record(&record));
        match parsed {
            Ok(device) => {
                self.pending = Some(device);
                ImportState::Persisting
            }
            Err(reason) => {
                self.last_error = Some(reason);
                ImportState::RowFailed
            }
        }
    }

    async fn persist<R>(&mut self, repo: &R) -> ImportState
    where
        R: DeviceRepository + ?Sized,
    {
        let Some(device) = self.pending.take() else {
            return ImportState::ParsingRow;
        };
        match repo.create(device).await {
            Ok(created) => {
                self.report.created += 1;
                self.report.created_ids.push(created.id);
                ImportState::ParsingRow
            }
            Err(e) => {
                if e.is_storage() {
                    error!(row = self.row, error = %e, "storage failure while importing row");
                }
                self.last_error = Some(describe(&e));
                ImportState::RowFailed
            }
        }
    }

    fn record_failure(&mut self) -> ImportState {
        let reason = self
            .last_error
            .take()
            .unwrap_or_else(|| "unknown error".to_string());
        warn!(row = self.row, reason = %reason, "import row rejected");
        self.report.failures.push(RowFailure {
            row: self.row,
            reason,
        });
        ImportState::ParsingRow
    }
}

fn describe(err: &InventoryError) -> String {
    match err {
        InventoryError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn is_header(record: &StringRecord) -> bool {
    record.len() == FIELDS_PER_ROW
        && record
            .iter()
            .zip(DeviceField::ALL)
            .all(|(cell, field)| cell.eq_ignore_ascii_case(field.column()))
}

fn device_from_record(record: &StringRecord) -> Result<NewDevice, String> {
    if record.len() != FIELDS_PER_ROW {
        return Err(format!(
            "expected {FIELDS_PER_ROW} fields, found {}",
            record.len()
        ));
    }
    let field = |i: usize| record.get(i).unwrap_or_default().to_string();
    let raw_price = record.get(9).unwrap_or_default();
    let price = raw_price
        .parse::<f64>()
        .map_err(|_| format!("invalid price `{raw_price}`"))?;

    Ok(NewDevice {
        id: None,
        device_name: field(0),
        device_type: field(1),
        brand: field(2),
        model: field(3),
        os: field(4),
        os_version: field(5),
        purchase_date: field(6),
        warranty_end: field(7),
        status: field(8),
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> StringRecord {
        ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(line.as_bytes())
            .into_records()
            .next()
            .expect("one record")
            .expect("readable record")
    }

    #[test]
    fn well_formed_row_parses_price_as_decimal() {
        let dev = device_from_record(&record(
            "Device1,Mobile,Brand1,Model1,Android,11,2023-01-01,2025-01-01,Active,500",
        ))
        .expect("row should parse");
        assert_eq!(dev.device_name, "Device1");
        assert_eq!(dev.os_version, "11");
        assert_eq!(dev.price, 500.0);
    }

    #[test]
    fn short_row_reports_field_count() {
        let reason = device_from_record(&record("Device3,Mobile,Brand3")).expect_err("short row");
        assert_eq!(reason, "expected 10 fields, found 3");
    }

    #[test]
    fn bad_price_is_reported() {
        let reason = device_from_record(&record("D,T,B,M,O,1,,,Active,cheap"))
            .expect_err("price should fail");
        assert!(reason.contains("cheap"));
    }

    #[test]
    fn header_detection_is_case_insensitive() {
        assert!(is_header(&record(
            "Device_Name,device_type,brand,model,os,os_version,purchase_date,warranty_end,status,PRICE"
        )));
        assert!(!is_header(&record(
            "Device1,Mobile,Brand1,Model1,Android,11,2023-01-01,2025-01-01,Active,500"
        )));
    }
}
