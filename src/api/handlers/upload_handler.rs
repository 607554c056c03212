//! CSV 上传处理程序
//!
//! 接收 multipart 表单中名为 `file` 的 CSV 文件。

use axum::{
    Json,
    extract::{Extension, Multipart, State},
    response::IntoResponse,
};
use tracing::{debug, info};

use crate::{
    api::{app_state::AppState, dto::upload_dto::UploadResponse},
    error::AppError,
    security::middleware::AuthenticatedUser,
    services::ingestion::parse_csv,
};

const FILE_FIELD: &str = "file";

/// Upload a CSV file and store its valid rows
///
/// POST /upload-csv
pub async fn upload_csv(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    debug!("User {} uploading {} ({} bytes)", user.0, filename, bytes.len());

    if !filename.to_lowercase().ends_with(".csv") {
        return Err(AppError::Validation(
            "Invalid file type. Please upload a CSV file.".to_string(),
        ));
    }

    let content = String::from_utf8(bytes).map_err(|_| {
        AppError::Validation("Could not decode CSV file. Ensure it's UTF-8 encoded.".to_string())
    })?;
    let rows = parse_csv(content.trim_start_matches('\u{feff}'))?;

    let summary = state.upload_service.ingest(Some(&filename), &rows).await?;
    state.metrics.record_upload(
        summary.inserted_count,
        summary.rejected.len() + summary.failed.len(),
    );
    info!(
        "Upload {} by {}: {} stored, {} rejected",
        filename,
        user.0,
        summary.inserted_count,
        summary.rejected.len()
    );

    Ok(Json(UploadResponse::from(summary)))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {}", e)))?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(AppError::Validation(
        "No file uploaded. Send the CSV in a multipart field named 'file'.".to_string(),
    ))
}
