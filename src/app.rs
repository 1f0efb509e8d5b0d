//! 路由装配：单一兜底处理器加上中间件栈。

use axum::extract::{Extension, connect_info::ConnectInfo};
use axum::http::Request;
use axum::routing::any;
use axum::{Router, middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info_span};

use crate::auth::{self, AuthConfig};
use crate::files;
use crate::http;
use crate::listing::ExtensionFilter;
use crate::storage::Storage;

/// 构建应用路由。中间件自外向内依次为：追踪、安全头、方法过滤、认证。
pub fn build_router(storage: Arc<Storage>, auth_config: Arc<AuthConfig>) -> Router {
    Router::new()
        .route("/", any(files::serve_path))
        .route("/{*path}", any(files::serve_path))
        .layer(middleware::from_fn(auth::auth_middleware))
        .layer(middleware::from_fn(http::reject_unsupported_methods))
        .layer(middleware::from_fn(http::add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let forwarded_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.split(',').next().unwrap_or("").trim().to_string());
                    let connect_ip = request
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| addr.to_string());
                    let client_ip = forwarded_ip
                        .or(connect_ip)
                        .unwrap_or_else(|| "unknown".to_string());

                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        client_ip,
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(storage))
        .layer(Extension(auth_config))
        .layer(Extension(Arc::new(ExtensionFilter::default())))
}
