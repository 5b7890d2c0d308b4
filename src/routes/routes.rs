//! Routes for the storage gateway.
//!
//! ## Structure
//! - **Storage endpoints** (nested under `/api/storage`)
//!   - `POST   /upload`: multipart upload of one or more files
//!   - `GET    /download`: raw object bytes as an attachment
//!   - `GET    /data`: object content served as JSON
//!   - `GET    /list`: file summaries under a folder, optionally sorted
//!   - `DELETE /delete`: hard or partial delete, then a delete event
//!
//! - **Health**
//!   - `GET /healthz`
//!
//! Objects are addressed by `bucketName` and `key` query params, so keys
//! with `/` need no wildcard segment.

use crate::{
    handlers::{
        health_handlers::healthz,
        storage_handlers::{delete_file, download_file, get_data, list_files, upload_files},
    },
    services::storage_service::StorageService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Upper bound on a multipart upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the router. State (`StorageService`) is supplied by the caller.
pub fn routes() -> Router<StorageService> {
    let storage = Router::new()
        .route(
            "/upload",
            post(upload_files).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/download", get(download_file))
        .route("/data", get(get_data))
        .route("/list", get(list_files))
        .route("/delete", delete(delete_file));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/storage", storage)
}
