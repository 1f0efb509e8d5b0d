//! HTTP 辅助工具：方法过滤、客户端 IP、代理协议识别与安全头。

use axum::body::Body as AxumBody;
use axum::extract::connect_info::ConnectInfo;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::{middleware, response::Response};
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

use crate::error::ApiError;

/// 仅允许 GET/HEAD，其余方法在认证与文件访问之前被拒绝。
pub async fn reject_unsupported_methods(
    request: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, ApiError> {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        debug!(method = %request.method(), "rejected unsupported method");
        return Err(ApiError::MethodNotAllowed);
    }
    Ok(next.run(request).await)
}

/// 从 `x-forwarded-for` 解析客户端 IP。
pub fn extract_forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<IpAddr>().ok())
}

/// 计算客户端 IP：默认取连接地址，仅在 `trust_proxy` 时采用 `x-forwarded-for`。
pub fn resolve_client_ip(request: &Request<AxumBody>, trust_proxy: bool) -> Option<IpAddr> {
    let connect_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    if !trust_proxy {
        return connect_ip;
    }
    extract_forwarded_ip(request.headers()).or(connect_ip)
}

/// 判断请求是否经由 HTTPS 反向代理到达；不信任代理时总是 false。
pub fn is_https_request(headers: &HeaderMap, trust_proxy: bool) -> bool {
    trust_proxy
        && headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("https"))
}

/// 添加基础安全响应头。
pub async fn add_security_headers(
    request: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, StatusCode> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        axum::http::header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        axum::http::header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    Ok(response)
}
