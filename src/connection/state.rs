//! Connection authentication state machine.
//!
//! Every connection starts in the handshake state, where only the handshake
//! operation is reachable. A successful handshake yields the authenticated
//! state by owned-value replacement; the transition is one-directional and
//! happens at most once per connection.

use crate::core::error::{ProtocolError, ProtocolResult};
use crate::protocol::message::OperationKind;
use crate::registry::OperationDescriptor;
use crate::security::{Principal, SecurityService};
use std::sync::Arc;

/// Gate deciding which operations the connection may execute.
pub enum ConnectionStateProcessor {
    /// Unauthenticated; admits only the handshake operation.
    Handshake(HandshakeStateProcessor),
    /// Authenticated; operations are checked against the principal's
    /// permissions.
    Authenticated(AuthenticatedStateProcessor),
}

/// Pre-handshake state.
pub struct HandshakeStateProcessor {
    security: Arc<dyn SecurityService>,
}

/// Post-handshake state carrying the authenticated principal.
pub struct AuthenticatedStateProcessor {
    security: Arc<dyn SecurityService>,
    principal: Principal,
}

impl ConnectionStateProcessor {
    /// Initial state for a freshly accepted connection.
    pub fn handshake(security: Arc<dyn SecurityService>) -> Self {
        Self::Handshake(HandshakeStateProcessor { security })
    }

    /// Check whether the described operation may run in this state.
    ///
    /// Unauthenticated connections are refused everything but the handshake,
    /// regardless of the operation's registered permission. Authenticated
    /// connections delegate the permission check to the security service.
    pub fn validate_operation(&self, descriptor: &OperationDescriptor) -> ProtocolResult<()> {
        match self {
            Self::Handshake(_) => {
                if descriptor.kind() == OperationKind::Handshake {
                    Ok(())
                } else {
                    Err(ProtocolError::AuthenticationRequired)
                }
            }
            Self::Authenticated(state) => {
                if descriptor.kind() == OperationKind::Handshake {
                    return Err(ProtocolError::invalid("connection already authenticated"));
                }
                if state
                    .security
                    .authorize(&state.principal, descriptor.permission())
                {
                    Ok(())
                } else {
                    Err(ProtocolError::AccessDenied {
                        message: format!(
                            "{} requires {}",
                            descriptor.name(),
                            descriptor.permission()
                        ),
                    })
                }
            }
        }
    }

    /// Next state after a successful handshake.
    ///
    /// Already-authenticated connections keep their principal; the
    /// transition is monotonic.
    pub fn handshake_succeeded(&self, principal: Principal) -> Self {
        match self {
            Self::Handshake(state) => Self::Authenticated(AuthenticatedStateProcessor {
                security: Arc::clone(&state.security),
                principal,
            }),
            Self::Authenticated(state) => Self::Authenticated(AuthenticatedStateProcessor {
                security: Arc::clone(&state.security),
                principal: state.principal.clone(),
            }),
        }
    }

    /// Whether this is the authenticated state.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Authenticated principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Handshake(_) => None,
            Self::Authenticated(state) => Some(&state.principal),
        }
    }
}
