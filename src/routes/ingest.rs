use axum::{
    extract::{Multipart, State},
    response::Json,
};
use data_model::{generate_share_code, ShareRecordBuilder, UploadedFile};
use tracing::{error, info};
use utoipa::ToSchema;

use super::RouteState;
use crate::{
    archive::{archive_display_name, build_zip_archive, ZIP_CONTENT_TYPE},
    http_objects::{ApiError, UploadResponse},
    utils::get_epoch_time_in_ms,
};

const FILES_FIELD: &str = "files";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload files and receive a share code
#[utoipa::path(
    post,
    path = "/uploads",
    request_body(content_type = "multipart/form-data", content = inline(UploadForm)),
    tag = "ingestion",
    responses(
        (status = 200, description = "upload successful", body = UploadResponse),
        (status = 400, description = "no files uploaded"),
        (status = INTERNAL_SERVER_ERROR, description = "storage failure")
    ),
)]
pub async fn upload_files(
    State(state): State<RouteState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut files: Vec<UploadedFile> = vec![];
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&e.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| ApiError::bad_request("file name is required"))?;
        let content_type = field.content_type().map(|c| c.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(&e.to_string()))?;
        files.push(UploadedFile::new(name, content_type, data));
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files uploaded."));
    }

    let now = get_epoch_time_in_ms();

    // Exactly one file at or below the threshold goes up verbatim;
    // everything else becomes one zip archive.
    let single_verbatim =
        files.len() == 1 && files[0].size_bytes() <= state.config.max_single_file_size_bytes;

    let (s3_key, archive_name, payload, content_type) = if single_verbatim {
        let file = &files[0];
        info!(
            file_name = %file.name,
            size_bytes = file.size_bytes(),
            "storing single file without compression"
        );
        (
            format!("{}-{}", now, file.name),
            file.name.clone(),
            file.data.clone(),
            file.content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        )
    } else {
        let archive = build_zip_archive(&files).map_err(|e| {
            error!("failed to build archive: {:?}", e);
            ApiError::internal_error_str(&format!("Failed to create archive: {}", e))
        })?;
        (
            format!("{}-archive.zip", now),
            archive_display_name(&files),
            archive,
            ZIP_CONTENT_TYPE.to_string(),
        )
    };

    state
        .blob_storage
        .put(&s3_key, payload.clone(), &content_type)
        .await
        .map_err(|e| {
            error!("failed to write to blob store: {:?}", e);
            ApiError::internal_error_str(&format!("Failed to upload to storage: {}", e))
        })?;

    let record = ShareRecordBuilder::default()
        .share_code(generate_share_code())
        .s3_key(s3_key.clone())
        .original_archive_name(archive_name.clone())
        .uploaded_at(now)
        .file_names(files.iter().map(|f| f.name.clone()).collect::<Vec<_>>())
        .total_size_bytes(payload.len() as u64)
        .is_compressed(!single_verbatim)
        .build()
        .map_err(ApiError::internal_error)?;

    state.share_store.put(&record).await.map_err(|e| {
        error!("failed to store share record: {:?}", e);
        ApiError::internal_error_str(&format!("Failed to save share record: {}", e))
    })?;

    info!(
        share_code = %record.share_code,
        s3_key = %s3_key,
        files_count = record.files_count,
        is_compressed = record.is_compressed,
        "created share"
    );

    let message = if record.is_compressed {
        "Files compressed and uploaded successfully!"
    } else {
        "File uploaded successfully!"
    };
    Ok(Json(UploadResponse {
        message: message.to_string(),
        archive_name,
        share_code: record.share_code,
        files_count: record.files_count,
        file_names: record.file_names,
        is_compressed: record.is_compressed,
    }))
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(format = "binary")]
    /// File to upload; repeat the field for multiple files
    files: Option<String>,
}
