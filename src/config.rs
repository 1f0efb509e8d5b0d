//! 命令行参数与服务器默认配置。

use clap::Parser;
use shadow_rs::formatcp;

use crate::build;

const VERSION_INFO: &str = formatcp!(
    r#"{}\ncommit_hash: {}\nbuild_time: {}\nbuild_env: {},{}"#,
    build::PKG_VERSION,
    build::SHORT_COMMIT,
    build::BUILD_TIME,
    build::RUST_VERSION,
    build::RUST_CHANNEL
);

pub const SESSION_COOKIE_NAME: &str = "AXO_SHELF_SESSION";
pub const DEFAULT_PORT: u16 = 9081;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOGIN_WINDOW_SECS: u64 = 5 * 60;
pub const DEFAULT_LOGIN_LOCKOUT_SECS: u64 = 10 * 60;
pub const SESSION_PRUNE_INTERVAL_SECS: u64 = 300;

/// 列表中可见的文件扩展名（区分大小写，包含前导点）。
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".gif", ".png", ".jpg", ".tif", ".tiff", ".zip", ".rar", ".cbz", ".cbr", ".bmp", ".pdf",
    ".cgt",
];

/// CLI arguments and environment configuration for the server.
#[derive(Parser, Debug)]
#[command(name = "axo-shelf", version = VERSION_INFO, about = "AxoShelf directory server")]
pub struct Args {
    #[arg(
        long,
        env = "AXO_SHELF_PATH",
        default_value = "./",
        help = "Base directory to serve"
    )]
    pub path: String,
    #[arg(
        short = 'b',
        long,
        env = "AXO_SHELF_BIND",
        default_value = "0.0.0.0",
        help = "Bind address"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "AXO_SHELF_PORT",
        default_value_t = DEFAULT_PORT,
        help = "Listen port"
    )]
    pub port: u16,
    #[arg(
        short = 'u',
        long,
        env = "AXO_SHELF_USER",
        default_value = "",
        help = "Username (auth is disabled unless both user and password are set)"
    )]
    pub user: String,
    #[arg(
        long,
        env = "AXO_SHELF_PASSWORD",
        default_value = "",
        help = "Password (auth is disabled unless both user and password are set)"
    )]
    pub password: String,
    #[arg(
        long,
        env = "AXO_SHELF_SESSION_TTL_SECS",
        default_value_t = DEFAULT_SESSION_TTL_SECS,
        help = "Session expiration in seconds (0 disables server-side expiry)"
    )]
    pub session_ttl_secs: u64,
    #[arg(
        long,
        env = "AXO_SHELF_OPAQUE_SESSION_TOKEN",
        help = "Issue random session tokens instead of the username"
    )]
    pub opaque_session_token: bool,
    #[arg(
        long,
        env = "AXO_SHELF_LOGIN_MAX_ATTEMPTS",
        default_value_t = DEFAULT_LOGIN_MAX_ATTEMPTS,
        help = "Max login attempts before lockout (0 to disable)"
    )]
    pub login_max_attempts: u32,
    #[arg(
        long,
        env = "AXO_SHELF_LOGIN_WINDOW_SECS",
        default_value_t = DEFAULT_LOGIN_WINDOW_SECS,
        help = "Login attempt window in seconds"
    )]
    pub login_window_secs: u64,
    #[arg(
        long,
        env = "AXO_SHELF_LOGIN_LOCKOUT_SECS",
        default_value_t = DEFAULT_LOGIN_LOCKOUT_SECS,
        help = "Login lockout time after max attempts"
    )]
    pub login_lockout_secs: u64,
    #[arg(
        long,
        env = "AXO_SHELF_TRUST_PROXY",
        help = "Trust x-forwarded-for/x-forwarded-proto from a reverse proxy"
    )]
    pub trust_proxy: bool,
}
