//! 会话与登录限流记录的后台清理任务。

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::auth::{AuthConfig, prune_expired_sessions};
use crate::config::SESSION_PRUNE_INTERVAL_SECS;

/// 启动后台清理任务；未启用认证时不启动。
pub fn spawn_background_tasks(auth: Arc<AuthConfig>) {
    if !auth.is_enabled() {
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PRUNE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = prune_expired_sessions(&auth);
            if removed > 0 {
                debug!(removed, "pruned expired sessions");
            }
            auth.limiter.prune(Instant::now()).await;
        }
    });
}
