//! 认证：会话 Cookie 校验、查询参数登录与登录限流。

use axum::extract::{Extension, Query};
use axum::http::Request;
use axum::{body::Body as AxumBody, middleware, response::IntoResponse, response::Response};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DEFAULT_SESSION_TTL_SECS, SESSION_COOKIE_NAME};
use crate::error::ApiError;
use crate::http::{is_https_request, resolve_client_ip};
use crate::session::{SessionEntry, SessionStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// 用户名或密码为空时返回 `None`，即关闭认证。
    pub fn from_config(username: &str, password: &str) -> Option<Self> {
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Cookie 中会话令牌的生成方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// 直接使用配置的用户名。
    Username,
    /// 每次登录生成新的 UUIDv4。
    Random,
}

#[derive(Debug)]
pub struct AuthConfig {
    pub credentials: Option<Credentials>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_ttl: Duration,
    pub token_kind: TokenKind,
    pub limiter: LoginLimiter,
    /// 是否信任反向代理提供的 `x-forwarded-*` 头。
    pub trust_proxy: bool,
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// 校验会话是否存在且未过期；过期会话会被删除。
    pub fn is_session_valid(&self, token: &str) -> bool {
        let now = Instant::now();
        match self.sessions.get(token) {
            Some(entry) if entry.is_live(self.session_ttl, now) => true,
            Some(_) => {
                self.sessions.delete(token);
                false
            }
            None => false,
        }
    }

    fn issue_token(&self, credentials: &Credentials) -> String {
        match self.token_kind {
            TokenKind::Username => credentials.username.clone(),
            TokenKind::Random => Uuid::new_v4().to_string(),
        }
    }

    fn cookie_lifetime(&self) -> Duration {
        if self.session_ttl.is_zero() {
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS)
        } else {
            self.session_ttl
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoginQuery {
    username: Option<String>,
    password: Option<String>,
}

/// 认证中间件：未配置凭据时直接放行，否则校验 Cookie 或尝试查询参数登录。
pub async fn auth_middleware(
    Extension(auth): Extension<Arc<AuthConfig>>,
    jar: CookieJar,
    req: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, ApiError> {
    let Some(credentials) = auth.credentials.as_ref() else {
        return Ok(next.run(req).await);
    };

    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME)
        && auth.is_session_valid(cookie.value())
    {
        return Ok(next.run(req).await);
    }

    let login = Query::<LoginQuery>::try_from_uri(req.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();
    let (Some(username), Some(password)) = (login.username, login.password) else {
        debug!(path = req.uri().path(), "no session and no credentials");
        return Err(ApiError::Unauthorized);
    };

    let client_ip = resolve_client_ip(&req, auth.trust_proxy);
    if let Some(ip) = client_ip
        && let Some(retry_after) = auth.limiter.check(ip, Instant::now()).await
    {
        return Err(ApiError::TooManyRequests(retry_after));
    }

    if !credentials.matches(&username, &password) {
        if let Some(ip) = client_ip {
            auth.limiter.register_failure(ip, Instant::now()).await;
        }
        warn!(username, "login failed");
        return Err(ApiError::Unauthorized);
    }

    if let Some(ip) = client_ip {
        auth.limiter.clear(ip).await;
    }

    let token = auth.issue_token(credentials);
    auth.sessions
        .set(token.clone(), SessionEntry::new(Instant::now()));

    let expires = OffsetDateTime::now_utc()
        + CookieDuration::seconds(auth.cookie_lifetime().as_secs() as i64);
    let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(is_https_request(req.headers(), auth.trust_proxy))
        .same_site(SameSite::Lax)
        .expires(expires)
        .build();
    info!(username, "login succeeded");

    let jar = jar.add(cookie);
    Ok((jar, next.run(req).await).into_response())
}

#[derive(Debug)]
pub struct LoginAttempt {
    pub window_start: Instant,
    pub failures: u32,
    pub locked_until: Option<Instant>,
}

impl LoginAttempt {
    fn fresh(now: Instant) -> Self {
        Self {
            window_start: now,
            failures: 0,
            locked_until: None,
        }
    }
}

/// 按客户端 IP 统计失败登录，超过阈值后锁定一段时间。`max_attempts` 为 0 时关闭。
#[derive(Debug)]
pub struct LoginLimiter {
    attempts: Mutex<HashMap<IpAddr, LoginAttempt>>,
    window: Duration,
    max_attempts: u32,
    lockout: Duration,
}

impl LoginLimiter {
    pub fn new(max_attempts: u32, window: Duration, lockout: Duration) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            window,
            max_attempts,
            lockout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// 若 `ip` 处于锁定期，返回剩余秒数。
    pub async fn check(&self, ip: IpAddr, now: Instant) -> Option<u64> {
        if self.max_attempts == 0 {
            return None;
        }

        let mut attempts = self.attempts.lock().await;
        let entry = attempts.get_mut(&ip)?;

        if let Some(locked_until) = entry.locked_until {
            if now < locked_until {
                return Some(locked_until.saturating_duration_since(now).as_secs().max(1));
            }
            *entry = LoginAttempt::fresh(now);
        }

        if now.saturating_duration_since(entry.window_start) > self.window {
            *entry = LoginAttempt::fresh(now);
        }

        None
    }

    pub async fn register_failure(&self, ip: IpAddr, now: Instant) {
        if self.max_attempts == 0 {
            return;
        }

        let mut attempts = self.attempts.lock().await;
        let entry = attempts.entry(ip).or_insert_with(|| LoginAttempt::fresh(now));

        if now.saturating_duration_since(entry.window_start) > self.window {
            *entry = LoginAttempt::fresh(now);
        }

        entry.failures = entry.failures.saturating_add(1);
        if entry.failures >= self.max_attempts {
            entry.locked_until = Some(now + self.lockout);
            warn!(client_ip = %ip, "login locked out");
        }
    }

    pub async fn clear(&self, ip: IpAddr) {
        self.attempts.lock().await.remove(&ip);
    }

    /// 清理已过窗口且未锁定的记录。
    pub async fn prune(&self, now: Instant) {
        let mut attempts = self.attempts.lock().await;
        attempts.retain(|_, entry| match entry.locked_until {
            Some(locked_until) => locked_until > now,
            None => now.saturating_duration_since(entry.window_start) <= self.window,
        });
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.attempts.lock().await.len()
    }
}

/// 清理过期会话。
pub fn prune_expired_sessions(auth: &AuthConfig) -> usize {
    auth.sessions.prune(auth.session_ttl, Instant::now())
}
