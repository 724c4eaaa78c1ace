//! `HeptagoServer` builder and accept loop.
//!
//! This is the entry point for running a Heptago room server. It ties the
//! layers together: transport → protocol → rooms.

use std::sync::Arc;

use heptago_protocol::{Codec, JsonCodec};
use heptago_room::{RoomConfig, RoomRegistry};
use heptago_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::HeptagoError;

/// Address the server binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8765";

/// Shared server state passed to each connection task.
///
/// The registry lock is only ever held for lookup, insert and delete;
/// room work happens under each room's own lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Heptago server.
///
/// # Example
///
/// ```rust,no_run
/// use heptago::prelude::*;
///
/// # async fn start() -> Result<(), HeptagoError> {
/// let server = HeptagoServer::builder()
///     .bind("0.0.0.0:8765")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HeptagoServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl HeptagoServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Clients speak JSON over WebSocket.
    pub async fn build(self) -> Result<HeptagoServer<JsonCodec>, HeptagoError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomRegistry::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(HeptagoServer { transport, state })
    }
}

impl Default for HeptagoServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Heptago room server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HeptagoServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl HeptagoServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> HeptagoServerBuilder {
        HeptagoServerBuilder::new()
    }
}

impl<C: Codec> HeptagoServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Every accepted connection gets its own task. A failing connection
    /// only ends that task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), HeptagoError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Heptago server running"),
            Err(_) => tracing::info!("Heptago server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
