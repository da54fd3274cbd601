//! Operation handlers.
//!
//! One handler per operation type, each implementing the
//! [`OperationHandler`] contract: take the decoded, typed request and the
//! connection's execution context, return a typed response or a reportable
//! error. Expected domain conditions (missing key, missing region) are
//! `Err(ErrorResponse)` values, never faults, and handlers leave the cache
//! untouched on every failure path.

pub mod get;
pub mod handshake;
pub mod put;
pub mod remove;

pub use get::GetHandler;
pub use handshake::HandshakeHandler;
pub use put::PutHandler;
pub use remove::RemoveHandler;

use crate::connection::context::MessageExecutionContext;
use crate::core::error::ProtocolError;
use crate::protocol::message::ErrorResponse;
use crate::protocol::value::Value;
use std::future::Future;
use std::pin::Pin;

/// Outcome of one handler invocation.
pub type OperationResult<T> = Result<T, ErrorResponse>;

/// Future type alias for dyn-compatible handlers.
pub type HandlerFuture<'a, T> = Pin<Box<dyn Future<Output = OperationResult<T>> + Send + 'a>>;

/// Per-operation-type business logic.
pub trait OperationHandler: Send + Sync + 'static {
    /// Decoded request type for this operation.
    type Request: Send + 'static;

    /// Typed response on success.
    type Response: Send + 'static;

    /// Execute the operation.
    fn process<'a>(
        &'a self,
        request: Self::Request,
        context: &'a mut MessageExecutionContext,
    ) -> HandlerFuture<'a, Self::Response>;
}

/// Reject empty region names before the cache is consulted.
pub(crate) fn require_region(region: &str) -> Result<(), ErrorResponse> {
    if region.is_empty() {
        return Err(ProtocolError::invalid("region name must not be empty").into());
    }
    Ok(())
}

/// Reject empty keys before the cache is consulted.
pub(crate) fn require_key(key: &Value) -> Result<(), ErrorResponse> {
    if key.is_empty_key() {
        return Err(ProtocolError::invalid("key must not be empty").into());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::grid::InMemoryCache;
    use crate::security::{InMemorySecurity, ResourcePermission};
    use crate::stats::ProtocolClientStats;
    use std::sync::Arc;

    /// Context over an in-memory cache with an `inventory` region holding
    /// `"widget" -> Int(42)`, and an `admin`/`secret` user.
    pub async fn context() -> MessageExecutionContext {
        use crate::grid::Cache;

        let cache = Arc::new(InMemoryCache::new());
        cache.create_region("inventory");
        cache
            .put(
                "inventory",
                Value::String("widget".to_string()),
                Value::Int(42),
            )
            .await;

        let security = InMemorySecurity::new();
        security.add_user(
            "admin",
            "secret",
            vec![
                ResourcePermission::data_read(),
                ResourcePermission::data_write(),
                ResourcePermission::cluster_read(),
            ],
        );

        MessageExecutionContext::new(
            cache,
            Arc::new(security),
            Arc::new(ProtocolClientStats::new()),
        )
    }
}
