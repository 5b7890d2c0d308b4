//! HTTP handlers for the `/api/storage` endpoints.
//! Parse and validate the request, build a `StorageRequest`, and delegate to
//! `StorageService`. Every `StorageError` becomes a 400 via `AppError`.

use crate::{
    errors::AppError,
    models::{
        file_summary::FileSummary,
        storage_request::{StorageRequest, UploadFile, UploadResult},
    },
    services::storage_service::StorageService,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, info};

/// Query params addressing one object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectQuery {
    pub bucket_name: String,
    pub key: String,
}

/// Query params accepted by the folder listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub bucket_name: String,
    pub folder_path: String,
    #[serde(default)]
    pub include_metadata: bool,
    pub sort: Option<String>,
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::new(err.status(), err.body_text())
    }
}

fn require(name: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{} cannot be empty", name)));
    }
    Ok(())
}

impl ObjectQuery {
    fn into_request(self) -> Result<StorageRequest, AppError> {
        require("bucketName", &self.bucket_name)?;
        require("key", &self.key)?;
        Ok(StorageRequest::for_object(self.bucket_name, self.key))
    }
}

/// `POST /api/storage/upload`: multipart form with `bucketName`,
/// `folderPath`, one or more `files` parts and optional
/// `customMetadata[<name>]` fields.
pub async fn upload_files(
    State(service): State<StorageService>,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadResult>>, AppError> {
    let mut request = StorageRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "bucketName" => request.bucket_name = field.text().await?,
            "folderPath" => request.folder_path = field.text().await?,
            "files" | "file" => {
                let file_name = field
                    .file_name()
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::bad_request("uploaded file has no file name"))?;
                let content = field.bytes().await?;
                request.files.push(UploadFile { file_name, content });
            }
            other => match custom_metadata_key(other) {
                Some(meta_key) => {
                    let value = field.text().await?;
                    request.custom_metadata.insert(meta_key.to_string(), value);
                }
                None => debug!("ignoring multipart field `{}`", other),
            },
        }
    }

    require("bucketName", &request.bucket_name)?;
    require("folderPath", &request.folder_path)?;
    if request.files.is_empty() {
        return Err(AppError::bad_request("File should not be empty"));
    }

    info!(
        "Request received to upload {} file(s) to {}/{}",
        request.files.len(),
        request.bucket_name,
        request.folder_path
    );
    let results = service.upload(&request).await?;
    Ok(Json(results))
}

/// `customMetadata[answer]` -> `answer`
fn custom_metadata_key(field_name: &str) -> Option<&str> {
    field_name
        .strip_prefix("customMetadata[")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|key| !key.is_empty())
}

/// `GET /api/storage/download?bucketName=&key=`: raw object bytes.
pub async fn download_file(
    State(service): State<StorageService>,
    Query(query): Query<ObjectQuery>,
) -> Result<Response, AppError> {
    let request = query.into_request()?;
    let content = service.download(&request).await?;

    let file_name = request.key.rsplit('/').next().unwrap_or(&request.key);
    let disposition = attachment_disposition(file_name);

    let mut response = Response::new(Body::from(content));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// `attachment; filename="<name>"`, with quotes, backslashes and control
/// characters dropped from the name so the quoted string stays well formed.
fn attachment_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// `GET /api/storage/data?bucketName=&key=`: object content as JSON text.
pub async fn get_data(
    State(service): State<StorageService>,
    Query(query): Query<ObjectQuery>,
) -> Result<impl IntoResponse, AppError> {
    let request = query.into_request()?;
    let data = service.get_data(&request).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], data))
}

/// `GET /api/storage/list?bucketName=&folderPath=&includeMetadata=&sort=`
pub async fn list_files(
    State(service): State<StorageService>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FileSummary>>, AppError> {
    require("bucketName", &query.bucket_name)?;
    require("folderPath", &query.folder_path)?;

    let request = StorageRequest::for_folder(query.bucket_name, query.folder_path);
    let summaries = service
        .list_files(&request, query.include_metadata, query.sort.as_deref())
        .await?;
    Ok(Json(summaries))
}

/// `DELETE /api/storage/delete?bucketName=&key=`
pub async fn delete_file(
    State(service): State<StorageService>,
    Query(query): Query<ObjectQuery>,
) -> Result<String, AppError> {
    let request = query.into_request()?;
    service.delete(&request).await?;
    Ok(format!("[{}] deleted successfully.", request.key))
}
