//! Message execution context.
//!
//! One context per connection, owned by its protocol processor and passed by
//! mutable reference into every handler invocation. No two workers ever share
//! a context.

use crate::connection::state::ConnectionStateProcessor;
use crate::grid::Cache;
use crate::security::{Principal, SecurityService};
use crate::stats::ClientStatistics;
use std::sync::Arc;

/// Connection-scoped bundle of collaborators and authentication state.
pub struct MessageExecutionContext {
    cache: Arc<dyn Cache>,
    security: Arc<dyn SecurityService>,
    statistics: Arc<dyn ClientStatistics>,
    state: ConnectionStateProcessor,
    pending_principal: Option<Principal>,
}

impl MessageExecutionContext {
    /// Create a context in the unauthenticated handshake state.
    pub fn new(
        cache: Arc<dyn Cache>,
        security: Arc<dyn SecurityService>,
        statistics: Arc<dyn ClientStatistics>,
    ) -> Self {
        let state = ConnectionStateProcessor::handshake(Arc::clone(&security));
        Self {
            cache,
            security,
            statistics,
            state,
            pending_principal: None,
        }
    }

    /// Cache collaborator.
    pub fn cache(&self) -> &dyn Cache {
        self.cache.as_ref()
    }

    /// Security collaborator.
    pub fn security(&self) -> &dyn SecurityService {
        self.security.as_ref()
    }

    /// Statistics sink.
    pub fn statistics(&self) -> &dyn ClientStatistics {
        self.statistics.as_ref()
    }

    /// Current connection state processor.
    pub fn state(&self) -> &ConnectionStateProcessor {
        &self.state
    }

    /// Whether the connection has completed its handshake.
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Record a successful handshake.
    ///
    /// Called by the handshake handler; the protocol processor later swaps in
    /// the authenticated state processor. The transition itself never happens
    /// mid-dispatch.
    pub fn mark_handshake_succeeded(&mut self, principal: Principal) {
        self.pending_principal = Some(principal);
    }

    pub(crate) fn take_pending_principal(&mut self) -> Option<Principal> {
        self.pending_principal.take()
    }

    pub(crate) fn install_state(&mut self, state: ConnectionStateProcessor) {
        self.state = state;
    }
}
