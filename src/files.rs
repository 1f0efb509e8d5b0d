//! 请求分发：路径解析、目录列表与文件下载。

use axum::body::Body as AxumBody;
use axum::extract::Extension;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use httpdate::fmt_http_date;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use crate::assets::serve_favicon;
use crate::error::ApiError;
use crate::listing::{ExtensionFilter, build_page};
use crate::path::RequestPath;
use crate::render::render_listing;
use crate::storage::{Storage, StorageError};

/// 统一入口：目录返回列表页，文件以附件形式下载。
pub async fn serve_path(
    method: Method,
    uri: Uri,
    Extension(storage): Extension<Arc<Storage>>,
    Extension(filter): Extension<Arc<ExtensionFilter>>,
) -> Result<Response, ApiError> {
    let request_path = RequestPath::from_uri_path(uri.path())?;
    if request_path.is_favicon() {
        return serve_favicon();
    }

    let target = storage
        .resolve(&request_path)
        .await
        .map_err(|err| log_failure(&request_path, err))?;
    let metadata = fs::metadata(&target)
        .await
        .map_err(|err| log_failure(&request_path, err.into()))?;

    if metadata.is_dir() {
        let page = build_page(&target, &request_path, &filter)
            .await
            .map_err(|err| log_failure(&request_path, err))?;
        info!(path = %request_path, count = page.entries.len(), "list directory");
        return Ok(Html(render_listing(&page).into_string()).into_response());
    }

    if !metadata.is_file() {
        warn!(path = %request_path, "refusing to serve special file");
        return Err(ApiError::Forbidden("not a regular file".into()));
    }

    download_file(&target, &request_path, method == Method::HEAD).await
}

/// 以附件形式返回文件内容；HEAD 请求只返回头部。
async fn download_file(
    target: &Path,
    request_path: &RequestPath,
    head_only: bool,
) -> Result<Response, ApiError> {
    if head_only {
        let metadata = fs::metadata(target)
            .await
            .map_err(|err| log_failure(request_path, err.into()))?;
        let headers = download_headers(&metadata)?;
        return Ok((StatusCode::OK, headers).into_response());
    }

    let file = File::open(target)
        .await
        .map_err(|err| log_failure(request_path, err.into()))?;
    let metadata = file
        .metadata()
        .await
        .map_err(|err| log_failure(request_path, err.into()))?;
    let headers = download_headers(&metadata)?;
    let size = metadata.len();

    info!(path = %request_path, size, "download file");
    let stream = ReaderStream::new(file.take(size));
    Ok((
        StatusCode::OK,
        headers,
        AxumBody::from_stream(stream),
    )
        .into_response())
}

fn download_headers(metadata: &Metadata) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    if let Ok(modified) = metadata.modified() {
        headers.insert(
            header::LAST_MODIFIED,
            HeaderValue::from_str(&fmt_http_date(modified))
                .map_err(|_| ApiError::Internal("响应头构建失败".into()))?,
        );
    }
    Ok(headers)
}

fn log_failure(path: &RequestPath, err: StorageError) -> ApiError {
    match &err {
        StorageError::OutsideRoot => warn!(path = %path, "path escapes base directory"),
        StorageError::Io(io) if io.kind() == ErrorKind::NotFound => {
            debug!(path = %path, "not found")
        }
        StorageError::Io(io) => error!(path = %path, error = %io, "filesystem error"),
    }
    err.into()
}
