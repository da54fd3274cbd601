//! Per-connection state: execution context, authentication state machine,
//! and the protocol processor that drives request/response cycles.

pub mod context;
pub mod processor;
pub mod state;

pub use context::MessageExecutionContext;
pub use processor::ProtocolProcessor;
pub use state::ConnectionStateProcessor;
