//! Graceful shutdown.
//!
//! The server runs until its transport ends or the shutdown signal fires.
//! Either way the database connection, if one was ever opened, is closed
//! before control returns to the caller. Tool calls still in flight at that
//! point are not awaited.
//!
//! Returning is not the same as exiting: the binary must not wait on
//! anything the transport left behind once this returns.

use crate::connection::ConnectionManager;
use crate::error::McpError;
use crate::server::McpServer;
use std::future::Future;
use std::sync::Arc;

/// Run `server` until it finishes or `shutdown` resolves, then release the connection.
pub async fn run_until_shutdown<S>(server: Arc<McpServer>, shutdown: S) -> Result<(), McpError>
where
    S: Future<Output = ()>,
{
    let connections = Arc::clone(server.context().connections());
    supervise(connections, server.run(), shutdown).await
}

async fn supervise<F, S>(
    connections: Arc<ConnectionManager>,
    serving: F,
    shutdown: S,
) -> Result<(), McpError>
where
    F: Future<Output = Result<(), McpError>>,
    S: Future<Output = ()>,
{
    let result = tokio::select! {
        biased;
        () = shutdown => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
        result = serving => result,
    };

    if connections.close().await {
        tracing::info!("MongoDB connection closed");
    } else {
        tracing::debug!("No MongoDB connection to close");
    }

    result
}

/// Resolves on the first interrupt (Ctrl-C).
///
/// If the signal handler cannot be installed this never resolves and the
/// server keeps running until its transport ends.
pub async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for interrupt signal");
        std::future::pending::<()>().await;
    }
}
