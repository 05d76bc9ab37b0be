use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use blob_store::BlobStore;
use share_store::ShareStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::ServerConfig,
    http_objects::{ApiError, ResolveRequest, ResolveResponse, UploadResponse},
};

mod ingest;
mod resolve;
use ingest::upload_files;
use resolve::{resolve_share_code, resolve_share_code_query};

/// Upper bound on one upload request; the archive path buffers the whole
/// payload in memory.
const MAX_UPLOAD_BODY_BYTES: usize = 256 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
        paths(
            ingest::upload_files,
            resolve::resolve_share_code,
            resolve::resolve_share_code_query,
        ),
        components(
            schemas(
                ApiError,
                UploadResponse,
                ResolveRequest,
                ResolveResponse,
            )
        ),
        tags(
            (name = "retroshare", description = "File share API")
        )
    )]
struct ApiDoc;

#[derive(Clone)]
pub struct RouteState {
    pub config: Arc<ServerConfig>,
    pub blob_storage: Arc<dyn BlobStore>,
    pub share_store: Arc<dyn ShareStore>,
}

pub fn create_routes(route_state: RouteState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs/swagger").url("/docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/uploads",
            post(upload_files).with_state(route_state.clone()),
        )
        .route(
            "/resolve",
            post(resolve_share_code).with_state(route_state.clone()),
        )
        .route(
            "/resolve",
            get(resolve_share_code_query).with_state(route_state.clone()),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
