//! Operation registry.
//!
//! The registry maps each wire operation discriminant to an immutable
//! descriptor bundling the request decoder, the handler, the response
//! encoder, and the minimum permission the operation requires. Descriptors
//! are type-erased behind one dispatch closure so heterogeneous handler
//! types share a single table; full static typing is recovered inside each
//! handler's own module.
//!
//! The table is populated eagerly by [`build_registry`] before any
//! connection is accepted and is read-only afterwards, so it can be shared
//! across connection workers without locking.

use crate::connection::context::MessageExecutionContext;
use crate::core::error::ProtocolResult;
use crate::operations::{
    GetHandler, HandshakeHandler, OperationHandler, PutHandler, RemoveHandler,
};
use crate::protocol::message::{ErrorResponse, OperationKind, Request, Response};
use crate::security::ResourcePermission;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Registry construction failures, detected at build time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two descriptors were registered for one discriminant.
    #[error("duplicate operation registered for {kind:?}")]
    Duplicate { kind: OperationKind },
}

type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<Response, ErrorResponse>> + Send + 'a>>;

type DispatchFn =
    Box<dyn for<'a> Fn(Request, &'a mut MessageExecutionContext) -> DispatchFuture<'a> + Send + Sync>;

/// Immutable per-operation record: decoder, handler, encoder, permission.
pub struct OperationDescriptor {
    kind: OperationKind,
    permission: ResourcePermission,
    dispatch: DispatchFn,
}

impl OperationDescriptor {
    /// Build a descriptor from a typed handler and its envelope adapters.
    pub fn new<H>(
        kind: OperationKind,
        permission: ResourcePermission,
        decode: fn(Request) -> ProtocolResult<H::Request>,
        handler: H,
        encode: fn(H::Response) -> Response,
    ) -> Self
    where
        H: OperationHandler,
    {
        let handler = Arc::new(handler);
        let dispatch: DispatchFn = Box::new(move |request, context| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let typed = decode(request).map_err(ErrorResponse::from)?;
                let response = handler.process(typed, context).await?;
                Ok(encode(response))
            })
        });
        Self {
            kind,
            permission,
            dispatch,
        }
    }

    /// Wire discriminant this descriptor serves.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Minimum permission required to execute the operation.
    pub fn permission(&self) -> &ResourcePermission {
        &self.permission
    }

    /// Decode, handle, and encode one request.
    pub async fn invoke(
        &self,
        request: Request,
        context: &mut MessageExecutionContext,
    ) -> Result<Response, ErrorResponse> {
        (self.dispatch)(request, context).await
    }
}

impl std::fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("kind", &self.kind)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

/// Read-only table from operation discriminant to descriptor.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: HashMap<OperationKind, OperationDescriptor>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor, failing fast on a duplicate discriminant.
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<(), RegistryError> {
        let kind = descriptor.kind();
        if self.operations.contains_key(&kind) {
            return Err(RegistryError::Duplicate { kind });
        }
        self.operations.insert(kind, descriptor);
        Ok(())
    }

    /// Look up the descriptor for a discriminant.
    pub fn lookup(&self, kind: OperationKind) -> Option<&OperationDescriptor> {
        self.operations.get(&kind)
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Build the full operation table.
///
/// Called once at process start; a `RegistryError` here is a configuration
/// bug and aborts startup rather than surfacing at request time.
pub fn build_registry() -> Result<OperationRegistry, RegistryError> {
    let mut registry = OperationRegistry::new();

    registry.register(OperationDescriptor::new(
        OperationKind::Handshake,
        ResourcePermission::cluster_read(),
        Request::into_handshake,
        HandshakeHandler,
        Response::Handshake,
    ))?;

    registry.register(OperationDescriptor::new(
        OperationKind::Get,
        ResourcePermission::data_read(),
        Request::into_get,
        GetHandler,
        Response::Get,
    ))?;

    registry.register(OperationDescriptor::new(
        OperationKind::Put,
        ResourcePermission::data_write(),
        Request::into_put,
        PutHandler,
        Response::Put,
    ))?;

    registry.register(OperationDescriptor::new(
        OperationKind::Remove,
        ResourcePermission::data_write(),
        Request::into_remove,
        RemoveHandler,
        Response::Remove,
    ))?;

    Ok(registry)
}
