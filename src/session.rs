//! 会话存储：令牌到登录时间的并发安全映射。

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionEntry {
    pub created_at: Instant,
}

impl SessionEntry {
    pub fn new(created_at: Instant) -> Self {
        Self { created_at }
    }

    /// `ttl` 为零表示永不过期。
    pub fn is_live(&self, ttl: Duration, now: Instant) -> bool {
        ttl.is_zero() || now.saturating_duration_since(self.created_at) < ttl
    }
}

/// 会话存储接口，便于替换实现或在测试中注入。
pub trait SessionStore: Send + Sync + Debug {
    fn get(&self, token: &str) -> Option<SessionEntry>;
    fn set(&self, token: String, entry: SessionEntry);
    fn delete(&self, token: &str);
    /// 删除所有已过期的会话，返回删除数量。
    fn prune(&self, ttl: Duration, now: Instant) -> usize;
}

/// 进程内会话表，重启后清空。
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, token: &str) -> Option<SessionEntry> {
        self.lock().get(token).copied()
    }

    fn set(&self, token: String, entry: SessionEntry) {
        self.lock().insert(token, entry);
    }

    fn delete(&self, token: &str) {
        self.lock().remove(token);
    }

    fn prune(&self, ttl: Duration, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(ttl, now));
        before - sessions.len()
    }
}
