//! Shared state handed to every tool call.

use crate::backend::Connector;
use crate::connection::ConnectionManager;
use mongo_ro_policy::ReadOnlyPolicy;
use std::sync::Arc;

/// Explicitly constructed server state. Tools borrow it for one call.
#[derive(Clone)]
pub struct ServerContext {
    connections: Arc<ConnectionManager>,
    policy: ReadOnlyPolicy,
}

impl ServerContext {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connections: Arc::new(ConnectionManager::new(connector)),
            policy: ReadOnlyPolicy::new(),
        }
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    pub fn policy(&self) -> &ReadOnlyPolicy {
        &self.policy
    }
}
