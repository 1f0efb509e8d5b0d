//! 嵌入式静态资源（站点图标）。

use axum::body::Body as AxumBody;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

use crate::error::ApiError;

const FAVICON_ASSET: &str = "favicon.png";

#[derive(RustEmbed)]
#[folder = "assets/"]
/// 编译进二进制的静态资源。
pub struct EmbeddedAssets;

/// 返回内置图标的原始字节。
pub fn serve_favicon() -> Result<Response, ApiError> {
    load_embedded_asset(FAVICON_ASSET)?
        .ok_or_else(|| ApiError::Internal("favicon asset missing".into()))
}

fn load_embedded_asset(path: &str) -> Result<Option<Response>, ApiError> {
    let Some(asset) = EmbeddedAssets::get(path) else {
        return Ok(None);
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| ApiError::Internal("无效的 MIME 类型".into()))?,
    );
    Ok(Some(
        (headers, AxumBody::from(asset.data.into_owned())).into_response(),
    ))
}
