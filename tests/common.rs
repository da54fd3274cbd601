//! Common test utilities.
//!
//! Shared fixture for integration tests: an in-memory grid with a seeded
//! region and a few users, plus helpers to run a protocol processor over an
//! in-process duplex stream. Import with `mod common;` in test files.

use std::sync::Arc;
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use trellis::connection::ProtocolProcessor;
use trellis::core::error::ProtocolResult;
use trellis::grid::{Cache, InMemoryCache};
use trellis::protocol::frame::{read_message, write_message};
use trellis::protocol::message::{Message, Request};
use trellis::protocol::value::Value;
use trellis::registry::{build_registry, OperationRegistry};
use trellis::security::{InMemorySecurity, ResourcePermission, SecurityService};
use trellis::stats::{ClientStatistics, ProtocolClientStats};

/// In-memory grid shared by every connection in a test.
///
/// Seeds an `inventory` region holding `"widget" -> Int(42)` and two users:
/// `admin`/`secret` with full permissions and `reader`/`book` with
/// cluster and data read only.
pub struct TestGrid {
    pub registry: Arc<OperationRegistry>,
    pub cache: Arc<InMemoryCache>,
    pub security: Arc<InMemorySecurity>,
    pub statistics: Arc<ProtocolClientStats>,
}

impl TestGrid {
    pub async fn new() -> Self {
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
                ResourcePermission::cluster_read(),
                ResourcePermission::data_read(),
                ResourcePermission::data_write(),
            ],
        );
        security.add_user(
            "reader",
            "book",
            vec![
                ResourcePermission::cluster_read(),
                ResourcePermission::data_read(),
            ],
        );

        Self {
            registry: Arc::new(build_registry().expect("registry must build")),
            cache,
            security: Arc::new(security),
            statistics: Arc::new(ProtocolClientStats::new()),
        }
    }

    pub fn processor(&self) -> ProtocolProcessor {
        ProtocolProcessor::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.cache) as Arc<dyn Cache>,
            Arc::clone(&self.security) as Arc<dyn SecurityService>,
            Arc::clone(&self.statistics) as Arc<dyn ClientStatistics>,
        )
    }

    /// Spawn a processor serving one in-process connection.
    ///
    /// Returns the client end of the stream and the server task handle. The
    /// server runs until the client end is dropped or a fatal error occurs.
    pub fn spawn_connection(&self) -> (DuplexStream, JoinHandle<ProtocolResult<()>>) {
        let (client, server) = tokio::io::duplex(4096);
        let mut processor = self.processor();
        let handle = tokio::spawn(async move {
            let (mut reader, mut writer) = tokio::io::split(server);
            processor.run(&mut reader, &mut writer).await
        });
        (client, handle)
    }
}

/// Send one request and wait for its response message.
pub async fn call(stream: &mut DuplexStream, request: Request) -> Message {
    write_message(stream, &Message::Request(request))
        .await
        .expect("client write failed");
    read_message(stream)
        .await
        .expect("client read failed")
        .expect("server closed before responding")
}
