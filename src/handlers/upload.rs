use crate::error::InventoryError;
use crate::server::router::InventoryState;
use crate::service::import::{ImportReport, import_devices};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use tracing::info;

/// Multipart form field carrying the CSV file.
pub const UPLOAD_FIELD: &str = "file";

/// POST /upload
///
/// Responds 200 with the import report whenever the pipeline completes, even
/// if some rows failed. Only request-level problems produce an error status:
/// a non-multipart request or a missing `file` field is 400, a body over the
/// size cap is 413.
pub async fn upload_devices(
    State(state): State<InventoryState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportReport>, InventoryError> {
    let mut multipart = multipart.map_err(|e| InventoryError::Validation(e.body_text()))?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("<unnamed>").to_string();
        let content = field.bytes().await?;
        info!(file = %file_name, bytes = content.len(), "bulk import started");
        let report = import_devices(state.repo.as_ref(), &content).await;
        return Ok(Json(report));
    }
    Err(InventoryError::validation(format!(
        "multipart upload is missing the `{UPLOAD_FIELD}` field"
    )))
}
