//! Lazily established, shared database connection.
//!
//! The first tool that needs the database starts a connect attempt. Callers
//! that arrive while it is in flight await that same attempt and receive its
//! outcome, success or failure. Only a caller arriving after a failed attempt
//! has settled starts a new one.

use crate::backend::{BackendError, Connector, DatabaseHandle};
use crate::error::McpError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Externally visible connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

type ConnectAttempt = Shared<BoxFuture<'static, Result<Arc<dyn DatabaseHandle>, BackendError>>>;

enum Slot {
    Idle,
    Connecting(ConnectAttempt),
    Connected(Arc<dyn DatabaseHandle>),
}

/// Owns the single database handle for the process.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    slot: Mutex<Slot>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slot: Mutex::new(Slot::Idle),
        }
    }

    /// Return the live handle, connecting first if needed.
    pub async fn ensure_connected(&self) -> Result<Arc<dyn DatabaseHandle>, McpError> {
        let attempt = {
            let mut slot = self.slot();
            let in_flight = match &*slot {
                Slot::Connected(handle) => return Ok(Arc::clone(handle)),
                Slot::Connecting(attempt) => Some(attempt.clone()),
                Slot::Idle => None,
            };
            in_flight.unwrap_or_else(|| {
                let attempt = self.start_attempt();
                *slot = Slot::Connecting(attempt.clone());
                attempt
            })
        };

        let result = attempt.clone().await;

        // Whichever waiter gets here first settles the slot for this attempt.
        {
            let mut slot = self.slot();
            let current = matches!(&*slot, Slot::Connecting(current) if current.ptr_eq(&attempt));
            if current {
                *slot = match &result {
                    Ok(handle) => Slot::Connected(Arc::clone(handle)),
                    Err(_) => Slot::Idle,
                };
            }
        }

        result.map_err(McpError::ConnectionFailed)
    }

    fn start_attempt(&self) -> ConnectAttempt {
        let connector = Arc::clone(&self.connector);
        async move {
            tracing::info!("Connecting to MongoDB");
            match connector.connect().await {
                Ok(handle) => {
                    tracing::info!("Connected to MongoDB");
                    Ok(handle)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "MongoDB connection attempt failed");
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }

    pub fn state(&self) -> ConnectionState {
        match &*self.slot() {
            Slot::Idle => ConnectionState::Disconnected,
            Slot::Connecting(_) => ConnectionState::Connecting,
            Slot::Connected(_) => ConnectionState::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Close the connection if one was established.
    ///
    /// Returns `false` when there was nothing to close. Only shutdown calls
    /// this; an attempt still in flight is abandoned, not waited for.
    pub async fn close(&self) -> bool {
        let previous = std::mem::replace(&mut *self.slot(), Slot::Idle);
        match previous {
            Slot::Connected(handle) => {
                handle.close().await;
                true
            }
            Slot::Idle | Slot::Connecting(_) => false,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // The lock is never held across an await or a panic-prone call.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
