//! TCP Listener and Dispatcher
//!
//! Binds the listening socket, accepts clients and spawns one task per
//! connection. The dispatcher owns only the socket, the shared table handle
//! and the bookkeeping needed for shutdown; it never waits on any single
//! connection.
//!
//! ## Shutdown
//!
//! ```text
//! shutdown future resolves
//!        │
//!        ▼
//! 1. stop accepting, drop the listening socket
//! 2. broadcast `true` on the watch channel
//!        │   idle connections close at once,
//!        │   busy ones finish their current response first
//!        ▼
//! 3. wait up to the grace period for connection tasks
//! 4. abort whatever is still running
//! ```

use crate::commands::CommandExecutor;
use crate::config::{Config, ConnectionConfig};
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::Table;
use anyhow::Context;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// The linekv server: a bound listener plus the shared table.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    table: Arc<Table>,
    stats: Arc<ConnectionStats>,
    limits: ConnectionConfig,
    grace_period: Duration,
}

impl Server {
    /// Binds to the configured address with a fresh, empty table.
    pub async fn bind(config: &Config) -> anyhow::Result<Self> {
        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {}", address))?;

        Ok(Self::from_listener(listener, Arc::new(Table::new()), config))
    }

    /// Builds a server over an already-bound listener and an existing table.
    pub fn from_listener(listener: TcpListener, table: Arc<Table>, config: &Config) -> Self {
        Self {
            listener,
            table,
            stats: Arc::new(ConnectionStats::new()),
            limits: config.connection_config(),
            grace_period: config.grace_period(),
        }
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The table shared by every connection.
    pub fn table(&self) -> Arc<Table> {
        Arc::clone(&self.table)
    }

    /// Statistics shared by every connection.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections until `shutdown` resolves, then drains.
    ///
    /// Accept failures are logged and never stop the loop.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            table,
            stats,
            limits,
            grace_period,
        } = self;

        let (notify_tx, notify_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let executor = CommandExecutor::new(Arc::clone(&table));
                        connections.spawn(handle_connection(
                            stream,
                            addr,
                            executor,
                            limits,
                            notify_rx.clone(),
                            Arc::clone(&stats),
                        ));
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    reap(finished);
                }
            }
        }

        drop(listener);
        let _ = notify_tx.send(true);

        let in_flight = connections.len();
        if in_flight > 0 {
            info!(connections = in_flight, grace = ?grace_period, "Waiting for connections to finish");
        }

        let drained = tokio::time::timeout(grace_period, async {
            while let Some(finished) = connections.join_next().await {
                reap(finished);
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                connections = connections.len(),
                "Grace period elapsed, aborting remaining connections"
            );
            connections.shutdown().await;
        }
    }
}

fn reap(finished: Result<(), tokio::task::JoinError>) {
    match finished {
        Ok(()) => {}
        Err(e) if e.is_panic() => error!("Connection task panicked: {}", e),
        Err(e) => debug!("Connection task cancelled: {}", e),
    }
}
