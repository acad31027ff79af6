//! SSH session host.
//!
//! Accepts SSH connections and gives every session channel its own
//! [`SessionController`](crate::session::SessionController) rendered
//! through ratatui into that channel.

mod handler;
mod host_key;
mod terminal;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use derive_getters::Getters;
use russh::server::Server as _;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

pub use handler::{ConnectionHandler, GameServer};
pub use host_key::load_or_create_host_key;

/// How long open sessions may keep playing after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Resolved configuration for the SSH server.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ServeConfig {
    /// Address the listener binds to.
    listen_addr: SocketAddr,
    /// Host key file, created if missing.
    host_key_path: PathBuf,
}

impl ServeConfig {
    /// Creates a server configuration.
    pub fn new(listen_addr: SocketAddr, host_key_path: PathBuf) -> Self {
        Self {
            listen_addr,
            host_key_path,
        }
    }
}

/// Runs the SSH server until Ctrl-C or SIGTERM, then gives open sessions
/// up to [`SHUTDOWN_GRACE`] to finish.
#[instrument(skip_all, fields(addr = %config.listen_addr()))]
pub async fn run_server(config: ServeConfig) -> anyhow::Result<()> {
    let key = load_or_create_host_key(config.host_key_path())?;

    let ssh_config = russh::server::Config {
        inactivity_timeout: Some(Duration::from_secs(3600)),
        auth_rejection_time: Duration::from_secs(3),
        auth_rejection_time_initial: Some(Duration::from_secs(0)),
        keys: vec![key],
        nodelay: true,
        ..Default::default()
    };

    info!(
        host = %config.listen_addr().ip(),
        port = config.listen_addr().port(),
        "Starting SSH server"
    );

    let mut server = GameServer::new();
    let open = server.watch_open_connections();
    tokio::select! {
        result = server.run_on_address(Arc::new(ssh_config), *config.listen_addr()) => {
            result?;
        }
        () = shutdown_signal() => {
            info!("Stopping SSH server");
        }
    }

    drain(open, SHUTDOWN_GRACE).await;
    Ok(())
}

/// Waits until no connection is open, or until `grace` runs out.
///
/// Returns `true` if every connection finished in time.
async fn drain(mut open: watch::Receiver<usize>, grace: Duration) -> bool {
    let remaining = *open.borrow();
    if remaining == 0 {
        return true;
    }

    info!(remaining, grace = ?grace, "Waiting for sessions to finish");
    let waited = tokio::time::timeout(grace, open.wait_for(|count| *count == 0))
        .await
        .map(|_| ());
    match waited {
        Ok(()) => {
            info!("All sessions finished");
            true
        }
        Err(_) => {
            warn!(remaining = *open.borrow(), "Grace period elapsed, dropping sessions");
            false
        }
    }
}

/// Completes on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh::server::Server;

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let server = GameServer::new();
        assert!(drain(server.watch_open_connections(), Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let mut server = GameServer::new();
        let _connection = server.new_client(None);
        assert!(!drain(server.watch_open_connections(), Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn test_drain_completes_when_last_connection_drops() {
        let mut server = GameServer::new();
        let connection = server.new_client(None);
        let open = server.watch_open_connections();

        let waiter = tokio::spawn(drain(open, Duration::from_secs(5)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(connection);

        assert!(waiter.await.unwrap());
    }
}
