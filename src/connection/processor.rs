//! Per-connection protocol processor.
//!
//! One processor per accepted connection. It pulls framed messages off the
//! reader, runs them through the registry under the connection's current
//! authentication state, and writes one response frame per request. Fatal
//! errors tear the connection down; everything else is reported to the peer
//! as an error response and the loop continues.

use crate::connection::context::MessageExecutionContext;
use crate::core::error::{ProtocolError, ProtocolResult};
use crate::grid::Cache;
use crate::protocol::frame::{read_message, write_message};
use crate::protocol::message::{ErrorResponse, Message, Response};
use crate::registry::OperationRegistry;
use crate::security::SecurityService;
use crate::stats::ClientStatistics;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Fires the disconnect counter exactly once, however the processor ends.
struct DisconnectGuard {
    statistics: Arc<dyn ClientStatistics>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.statistics.client_disconnected();
    }
}

/// Drives the request/response loop for a single connection.
pub struct ProtocolProcessor {
    registry: Arc<OperationRegistry>,
    context: MessageExecutionContext,
    _disconnect: DisconnectGuard,
}

impl ProtocolProcessor {
    /// Create a processor for a freshly accepted connection.
    ///
    /// Counts the connection immediately; the matching disconnect is counted
    /// when the processor is dropped, whether the connection closed cleanly
    /// or died mid-request.
    pub fn new(
        registry: Arc<OperationRegistry>,
        cache: Arc<dyn Cache>,
        security: Arc<dyn SecurityService>,
        statistics: Arc<dyn ClientStatistics>,
    ) -> Self {
        statistics.client_connected();
        info!("client connected");
        let guard = DisconnectGuard {
            statistics: Arc::clone(&statistics),
        };
        Self {
            registry,
            context: MessageExecutionContext::new(cache, security, statistics),
            _disconnect: guard,
        }
    }

    /// Execution context, exposed for inspection.
    pub fn context(&self) -> &MessageExecutionContext {
        &self.context
    }

    /// Read and serve one message.
    ///
    /// Returns `Ok(false)` when the peer closed the connection cleanly and
    /// `Ok(true)` when the loop should continue. Fatal errors propagate;
    /// recoverable decode errors are written back as error responses.
    pub async fn process_message<R, W>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> ProtocolResult<bool>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let message = match read_message(reader).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("client closed connection");
                return Ok(false);
            }
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                warn!(%error, "rejecting undecodable message");
                self.write_error(writer, error.into()).await?;
                return Ok(true);
            }
        };

        let response = self.dispatch(message).await;
        match response {
            Ok(response) => {
                write_message(writer, &Message::Response(response)).await?;
            }
            Err(error) => {
                self.write_error(writer, error).await?;
            }
        }
        Ok(true)
    }

    /// Serve messages until the peer disconnects or a fatal error occurs.
    pub async fn run<R, W>(&mut self, reader: &mut R, writer: &mut W) -> ProtocolResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while self.process_message(reader, writer).await? {}
        Ok(())
    }

    async fn dispatch(&mut self, message: Message) -> Result<Response, ErrorResponse> {
        let request = match message {
            Message::Request(request) => request,
            Message::Response(_) => {
                warn!("peer sent a response frame");
                return Err(ErrorResponse::from(ProtocolError::invalid(
                    "expected a request message",
                )));
            }
        };

        let kind = request.kind();
        let registry = Arc::clone(&self.registry);
        let descriptor = match registry.lookup(kind) {
            Some(descriptor) => descriptor,
            None => {
                warn!(?kind, "no handler registered");
                return Err(ErrorResponse::from(ProtocolError::UnknownOperation {
                    discriminant: kind.discriminant(),
                }));
            }
        };

        if let Err(error) = self.context.state().validate_operation(descriptor) {
            warn!(operation = descriptor.name(), %error, "operation refused");
            return Err(ErrorResponse::from(error));
        }

        debug!(operation = descriptor.name(), "dispatching");
        let result = descriptor.invoke(request, &mut self.context).await;

        // The handshake handler only records the principal; the state swap
        // happens here, outside any handler borrow.
        if let Some(principal) = self.context.take_pending_principal() {
            let next = self.context.state().handshake_succeeded(principal);
            self.context.install_state(next);
        }

        result
    }

    async fn write_error<W>(&self, writer: &mut W, error: ErrorResponse) -> ProtocolResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        write_message(writer, &Message::Response(Response::Error(error))).await
    }
}
