//! AxoShelf server binary.
//!
//! Serves a single base directory as a browsable listing of folders and
//! allowed document/image files, with attachment downloads and an optional
//! single-user cookie session. The main entry point wires configuration,
//! logging and the Axum router, then runs the HTTP listener until shutdown.

mod app;
mod assets;
mod auth;
mod background;
mod config;
mod error;
mod files;
mod http;
mod listing;
mod logging;
mod path;
mod render;
mod session;
mod storage;

use axum_server::Handle;
use clap::Parser;
use shadow_rs::shadow;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

use crate::auth::{AuthConfig, Credentials, LoginLimiter, TokenKind};
use crate::background::spawn_background_tasks;
use crate::config::Args;
use crate::session::MemorySessionStore;
use crate::storage::Storage;

shadow!(build);

/// Starts the AxoShelf server and blocks until shutdown.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    logging::init_logging();

    let args = Args::parse();
    let storage = Arc::new(Storage::open(&args.path).await?);
    let credentials = Credentials::from_config(&args.user, &args.password);
    if credentials.is_none() && (!args.user.is_empty() || !args.password.is_empty()) {
        warn!("both --user and --password are required to enable auth; auth is disabled");
    }
    let auth_config = Arc::new(AuthConfig {
        credentials,
        sessions: Arc::new(MemorySessionStore::new()),
        session_ttl: Duration::from_secs(args.session_ttl_secs),
        token_kind: if args.opaque_session_token {
            TokenKind::Random
        } else {
            TokenKind::Username
        },
        limiter: LoginLimiter::new(
            args.login_max_attempts,
            Duration::from_secs(args.login_window_secs),
            Duration::from_secs(args.login_lockout_secs),
        ),
        trust_proxy: args.trust_proxy,
    });
    let auth_for_tasks = auth_config.clone();

    let app = app::build_router(storage.clone(), auth_config.clone());

    let host = args
        .host
        .parse::<IpAddr>()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let addr = SocketAddr::new(host, args.port);
    let handle = Handle::new();

    info!(
        root = %storage.root_path().display(),
        auth = auth_config.is_enabled(),
        "serving directory"
    );
    info!("🚀 Starting HTTP server at {}", addr);

    let server = axum_server::bind(addr)
        .handle(handle.clone())
        .serve(app.into_make_service_with_connect_info::<SocketAddr>());

    spawn_background_tasks(auth_for_tasks);
    tokio::select! {
        result = server => result?,
        _ = shutdown_signal(handle) => {}
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received termination signal shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
