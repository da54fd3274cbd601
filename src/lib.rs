//! Trellis - Wire-protocol dispatch core for a distributed data grid.
//!
//! Trellis is the server-side protocol engine that sits between raw client
//! connections and a data grid's cache: it frames and parses the binary
//! client protocol, authenticates connections, authorizes each operation
//! against the caller's permissions, and dispatches decoded requests to
//! typed operation handlers. Storage, membership, and replication stay
//! behind narrow collaborator traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Client Connection                        │
//! │              length-framed binary envelope stream               │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Protocol Processor                         │
//! │        framing │ envelope decode │ per-connection state         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Operation Registry                          │
//! │      discriminant → decode │ handler │ encode │ permission      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Grid Collaborators                           │
//! │            Cache │ SecurityService │ ClientStatistics           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::error`] - Error taxonomy and wire error-code mapping
//!
//! ## Protocol
//! - [`protocol::frame`] - Length-framed message IO
//! - [`protocol::message`] - Envelope tagged unions
//! - [`protocol::value`] - Polymorphic encoded-value union
//!
//! ## Dispatch
//! - [`registry`] - Operation descriptors and the dispatch table
//! - [`operations`] - Typed handlers for each operation
//! - [`connection`] - Execution context, authentication state machine,
//!   and the protocol processor
//!
//! ## Collaborators
//! - [`grid`] - Cache trait and the in-memory implementation
//! - [`security`] - Authentication and permission checks
//! - [`stats`] - Connection lifecycle counters
//!
//! # Key Invariants
//!
//! - Exactly one response frame per request frame, in request order
//! - Unauthenticated connections can execute nothing but the handshake
//! - The handshake transition is monotonic and happens at most once
//! - Fatal errors close the connection; everything else is an error
//!   response and the connection stays open
//! - Connect/disconnect statistics fire exactly once per connection

pub mod connection;
pub mod core;
pub mod grid;
pub mod operations;
pub mod protocol;
pub mod registry;
pub mod security;
pub mod stats;
