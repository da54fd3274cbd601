//! Security collaborator: principals, permissions, and the service seam.
//!
//! The protocol core delegates every authentication and authorization
//! decision to an external [`SecurityService`]. [`InMemorySecurity`] is a
//! self-contained implementation used by tests.

use crate::core::error::{ProtocolError, ProtocolResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Credentials presented during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Authenticated identity attached to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
}

impl Principal {
    /// Create a principal with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Resource class a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Region data operations.
    Data,
    /// Cluster-level operations, including the handshake.
    Cluster,
}

/// Access mode a permission grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
}

/// Minimum permission an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourcePermission {
    pub resource: Resource,
    pub action: Action,
}

impl ResourcePermission {
    /// DATA:READ permission.
    pub const fn data_read() -> Self {
        Self {
            resource: Resource::Data,
            action: Action::Read,
        }
    }

    /// DATA:WRITE permission.
    pub const fn data_write() -> Self {
        Self {
            resource: Resource::Data,
            action: Action::Write,
        }
    }

    /// CLUSTER:READ permission.
    pub const fn cluster_read() -> Self {
        Self {
            resource: Resource::Cluster,
            action: Action::Read,
        }
    }
}

impl fmt::Display for ResourcePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = match self.resource {
            Resource::Data => "DATA",
            Resource::Cluster => "CLUSTER",
        };
        let action = match self.action {
            Action::Read => "READ",
            Action::Write => "WRITE",
        };
        write!(f, "{resource}:{action}")
    }
}

/// External security backend.
///
/// Implementations must be safe for concurrent use across connections.
pub trait SecurityService: Send + Sync {
    /// Validate handshake credentials, yielding the authenticated principal.
    fn authenticate(&self, credentials: &Credentials) -> ProtocolResult<Principal>;

    /// Whether the principal holds the given permission.
    fn authorize(&self, principal: &Principal, permission: &ResourcePermission) -> bool;
}

struct UserEntry {
    password: String,
    permissions: Vec<ResourcePermission>,
}

/// In-memory user store for tests.
#[derive(Default)]
pub struct InMemorySecurity {
    users: RwLock<HashMap<String, UserEntry>>,
}

impl InMemorySecurity {
    /// Create an empty user store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with the given password and granted permissions.
    pub fn add_user(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
        permissions: Vec<ResourcePermission>,
    ) {
        self.users.write().insert(
            username.into(),
            UserEntry {
                password: password.into(),
                permissions,
            },
        );
    }
}

impl SecurityService for InMemorySecurity {
    fn authenticate(&self, credentials: &Credentials) -> ProtocolResult<Principal> {
        let users = self.users.read();
        match users.get(&credentials.username) {
            // One message for both unknown user and bad password.
            Some(entry) if entry.password == credentials.password => {
                Ok(Principal::new(credentials.username.clone()))
            }
            _ => Err(ProtocolError::AuthenticationFailed {
                message: "invalid credentials".to_string(),
            }),
        }
    }

    fn authorize(&self, principal: &Principal, permission: &ResourcePermission) -> bool {
        self.users
            .read()
            .get(&principal.name)
            .is_some_and(|entry| entry.permissions.contains(permission))
    }
}
