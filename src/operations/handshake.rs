//! Handshake operation: authenticate the connection.
//!
//! Credentials go to the external security service. On success the handler
//! marks the pending principal on the context; the protocol processor
//! performs the actual state transition after the dispatch cycle completes.

use super::{HandlerFuture, OperationHandler};
use crate::connection::context::MessageExecutionContext;
use crate::protocol::message::{HandshakeRequest, HandshakeResponse};
use crate::security::Credentials;
use tracing::{debug, warn};

/// Handler for [`HandshakeRequest`].
pub struct HandshakeHandler;

impl OperationHandler for HandshakeHandler {
    type Request = HandshakeRequest;
    type Response = HandshakeResponse;

    fn process<'a>(
        &'a self,
        request: Self::Request,
        context: &'a mut MessageExecutionContext,
    ) -> HandlerFuture<'a, Self::Response> {
        Box::pin(async move {
            let credentials = Credentials {
                username: request.username,
                password: request.password,
            };
            match context.security().authenticate(&credentials) {
                Ok(principal) => {
                    debug!(principal = %principal.name, "handshake accepted");
                    context.mark_handshake_succeeded(principal);
                    Ok(HandshakeResponse {
                        authenticated: true,
                    })
                }
                Err(error) => {
                    warn!(username = %credentials.username, "handshake rejected");
                    Err(error.into())
                }
            }
        })
    }
}
