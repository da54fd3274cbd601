//! Per-client protocol statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics sink for connection lifecycle events.
///
/// The protocol processor fires each event exactly once per connection, in
/// connected-then-disconnected order. Implementations must be safe for
/// concurrent increments across connections.
pub trait ClientStatistics: Send + Sync {
    /// A client connection was accepted.
    fn client_connected(&self);

    /// A client connection ended, however it ended.
    fn client_disconnected(&self);
}

/// Atomic counter implementation of [`ClientStatistics`].
#[derive(Debug, Default)]
pub struct ProtocolClientStats {
    connected: AtomicU64,
    disconnected: AtomicU64,
}

impl ProtocolClientStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total connections accepted.
    pub fn connected_count(&self) -> u64 {
        self.connected.load(Ordering::Relaxed)
    }

    /// Total connections ended.
    pub fn disconnected_count(&self) -> u64 {
        self.disconnected.load(Ordering::Relaxed)
    }

    /// Connections currently open.
    pub fn active_clients(&self) -> u64 {
        self.connected_count()
            .saturating_sub(self.disconnected_count())
    }
}

impl ClientStatistics for ProtocolClientStats {
    fn client_connected(&self) {
        self.connected.fetch_add(1, Ordering::Relaxed);
    }

    fn client_disconnected(&self) {
        self.disconnected.fetch_add(1, Ordering::Relaxed);
    }
}
