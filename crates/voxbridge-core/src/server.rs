//! TCP front door: one message in, one token out, per connection.
//!
//! Connections are served strictly one after another; a turn runs to completion before
//! the next connection is accepted.

use crate::config::BridgeConfig;
use crate::error::{ConfigError, ProtocolError};
use crate::orchestrator::TurnOrchestrator;
use crate::protocol::InboundMessage;
use crate::session::SessionRegistry;
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

/// Accept loop plus the state every connection shares.
pub struct BridgeServer {
    orchestrator: TurnOrchestrator,
    sessions: SessionRegistry,
    max_message_bytes: usize,
}

impl BridgeServer {
    pub fn new(orchestrator: TurnOrchestrator, sessions: SessionRegistry, max_message_bytes: usize) -> Self {
        Self {
            orchestrator,
            sessions,
            max_message_bytes: max_message_bytes.max(1),
        }
    }

    /// Build the orchestrator and session registry from configuration.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        let orchestrator = TurnOrchestrator::from_config(config)?;
        let sessions = SessionRegistry::new(
            config.session_scope,
            config.system_instruction(),
            config.context_limit,
        );
        Ok(Self::new(orchestrator, sessions, config.max_message_bytes))
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Serve until `shutdown` resolves. A bad connection is logged and skipped.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let local = listener.local_addr()?;
        info!(addr = %local, "Server listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "Connection established");
                        if let Err(e) = self.handle_connection(stream, peer).await {
                            warn!(%peer, error = %e, "Connection dropped");
                        }
                    }
                    Err(e) => warn!(error = %e, "Accept failed"),
                },
                _ = &mut shutdown => {
                    info!("Shutdown requested; listener closing");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Read one message, run the turn, write the reply token.
    pub async fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) -> Result<(), ProtocolError> {
        let mut buf = vec![0u8; self.max_message_bytes];
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(ProtocolError::EmptyMessage);
        }
        let inbound = InboundMessage::parse(&buf[..n]);

        let session = self.sessions.session_for(peer);
        let mut session = session.lock().await;
        let result = self.orchestrator.handle(&mut session, inbound).await;
        drop(session);

        let reply = result.encode(self.orchestrator.speech_enabled());
        info!(%peer, reply = %reply, "Replying");
        stream.write_all(reply.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }
}
