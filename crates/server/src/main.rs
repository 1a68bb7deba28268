// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod http;
mod seed;
mod session;

#[cfg(test)]
mod tests;

use clap::Parser;
use marquee_persistence::Persistence;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Marquee Server - HTTP server for event ticket reservations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "MARQUEE_DATABASE", conflicts_with = "mysql_url")]
    database: Option<PathBuf>,

    /// `MariaDB`/`MySQL` connection URL, used instead of `SQLite` when set.
    #[arg(long, env = "MARQUEE_MYSQL_URL", hide_env_values = true)]
    mysql_url: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, env = "MARQUEE_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "MARQUEE_PORT", default_value_t = 3000)]
    port: u16,

    /// Load the demo event catalog if no upcoming events exist
    #[arg(long, env = "MARQUEE_SEED")]
    seed: bool,

    /// Email of the administrator account to create at start-up
    #[arg(long, env = "MARQUEE_ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    /// Password of the administrator account to create at start-up
    #[arg(long, env = "MARQUEE_ADMIN_PASSWORD", hide_env_values = true, requires = "admin_email")]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// The store holds a single connection; the mutex serialises its use.
/// Inventory correctness comes from the guarded updates inside the store.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<Mutex<Persistence>>,
}

impl AppState {
    fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
        }
    }
}

fn open_store(args: &Args) -> Result<Persistence, marquee_persistence::PersistenceError> {
    if let Some(url) = &args.mysql_url {
        info!("Using MariaDB/MySQL database");
        Persistence::new_with_mysql(url)
    } else if let Some(path) = &args.database {
        info!(path = %path.display(), "Using file-based database");
        Persistence::new_with_file(path)
    } else {
        warn!("Using in-memory database; data is lost on shutdown");
        Persistence::new_in_memory()
    }
}

/// Runs start-up chores against a freshly opened store.
fn prepare_store(
    persistence: &mut Persistence,
    args: &Args,
    now: OffsetDateTime,
) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        marquee_api::ensure_admin_account(persistence, email, password, now)?;
    } else {
        warn!("No administrator configured; event management is unavailable until one exists");
    }

    marquee_api::purge_expired_sessions(persistence, now)?;

    if args.seed {
        let created: usize = seed::seed_demo_events(persistence, now)?;
        info!(created, "Demo catalog loaded");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Initializing Marquee server"
    );

    let mut persistence: Persistence = open_store(&args)?;
    prepare_store(&mut persistence, &args, OffsetDateTime::now_utc())?;

    let app = http::build_router(AppState::new(persistence));

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
