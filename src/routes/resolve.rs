use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::Json,
};
use blob_store::DownloadOptions;
use data_model::ShareRecord;
use tracing::{error, info};

use super::RouteState;
use crate::{
    http_objects::{ApiError, ResolveQuery, ResolveRequest, ResolveResponse},
    utils::get_epoch_time_in_ms,
};

/// Issued download URLs stay valid this long, independent of the record's
/// own expiry.
const DOWNLOAD_URL_VALIDITY: Duration = Duration::from_secs(3600);

/// Exchange a share code for a download URL
#[utoipa::path(
    post,
    path = "/resolve",
    request_body = ResolveRequest,
    tag = "retrieve",
    responses(
        (status = 200, description = "share code resolved", body = ResolveResponse),
        (status = 400, description = "no share code provided"),
        (status = 404, description = "share code not found"),
        (status = 410, description = "share expired"),
        (status = INTERNAL_SERVER_ERROR, description = "storage failure")
    ),
)]
pub async fn resolve_share_code(
    State(state): State<RouteState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    resolve(state, request.share_code.as_deref().unwrap_or_default()).await
}

/// Resolve a share code passed as a query parameter
#[utoipa::path(
    get,
    path = "/resolve",
    params(ResolveQuery),
    tag = "retrieve",
    responses(
        (status = 200, description = "share code resolved", body = ResolveResponse),
        (status = 400, description = "no share code provided"),
        (status = 404, description = "share code not found"),
        (status = 410, description = "share expired"),
        (status = INTERNAL_SERVER_ERROR, description = "storage failure")
    ),
)]
pub async fn resolve_share_code_query(
    State(state): State<RouteState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    resolve(state, query.code.as_deref().unwrap_or_default()).await
}

async fn resolve(
    state: RouteState,
    share_code: &str,
) -> Result<Json<ResolveResponse>, ApiError> {
    if share_code.is_empty() {
        return Err(ApiError::bad_request("No share code provided."));
    }

    let record = state
        .share_store
        .get(share_code)
        .await
        .map_err(|e| {
            error!("failed to look up share code: {:?}", e);
            ApiError::internal_error_str(&format!("Error resolving share code: {}", e))
        })?
        .ok_or_else(|| ApiError::not_found("Share code not found or expired."))?;

    if record.is_expired_at(get_epoch_time_in_ms()) {
        return Err(ApiError::gone("This share has expired."));
    }

    let options = DownloadOptions::new(
        record.original_archive_name.clone(),
        response_content_type(&record),
    );
    let download_url = state
        .blob_storage
        .presign_download(&record.s3_key, &options, DOWNLOAD_URL_VALIDITY)
        .await
        .map_err(|e| {
            error!("failed to presign download url: {:?}", e);
            ApiError::internal_error_str(&format!("Error resolving share code: {}", e))
        })?;

    info!(share_code = %record.share_code, s3_key = %record.s3_key, "resolved share code");

    Ok(Json(ResolveResponse {
        message: "Share code resolved successfully.".to_string(),
        download_url,
        file_name: record.original_archive_name,
        files_count: record.files_count,
        file_names: record.file_names,
        total_size: record.total_size_bytes,
        uploaded_at: record.uploaded_at,
        expires_at: record.expiration_time,
    }))
}

/// Content type forced onto the download response. Archives are always
/// zips; verbatim files get an explicit type for a handful of extensions
/// so browsers render download prompts sensibly, and everything else
/// keeps whatever the blob store recorded at put time.
fn response_content_type(record: &ShareRecord) -> Option<String> {
    if record.is_compressed {
        return Some("application/zip".to_string());
    }
    let ext = record
        .s3_key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())?;
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" => Some(format!("image/{}", ext)),
        "pdf" => Some("application/pdf".to_string()),
        _ => None,
    }
}
