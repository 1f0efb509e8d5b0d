//! 日志：`RUST_LOG` 优先，未设置或无法解析时回退到服务自身的默认过滤规则。

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 默认只放出本服务与请求追踪的 info 日志，依赖库只保留警告。
pub const DEFAULT_LOG_FILTER: &str = "warn,axo_shelf=info,tower_http=info";

fn build_filter(from_env: Option<&str>) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

pub fn init_logging() {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(from_env.as_deref().filter(|value| !value.trim().is_empty()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
