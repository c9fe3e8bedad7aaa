//! Conversation sessions: who owns which context window.
//!
//! The registry hands out one `Session` per caller key. With `SessionScope::Shared` every
//! caller maps to the same key, which reproduces a single process-wide conversation.

use crate::config::SessionScope;
use crate::context::{ContextWindow, Turn};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const SHARED_SESSION_KEY: &str = "shared";

/// One caller's conversation.
#[derive(Debug)]
pub struct Session {
    key: String,
    window: ContextWindow,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    committed: u64,
}

impl Session {
    pub fn new(key: impl Into<String>, system: Turn, context_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            window: ContextWindow::new(system, context_limit),
            created_at: now,
            last_active: now,
            committed: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn window(&self) -> &ContextWindow {
        &self.window
    }

    /// Record an accepted exchange. The assistant turn keeps the model's tagged text.
    pub fn commit(&mut self, user: Turn, assistant: Turn) {
        self.window.append(user, assistant);
        self.committed += 1;
        self.last_active = Utc::now();
    }

    /// Exchanges committed over the session's lifetime, evicted ones included.
    pub fn committed(&self) -> u64 {
        self.committed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }
}

/// Owns every live session. Sessions are never persisted.
pub struct SessionRegistry {
    scope: SessionScope,
    system_instruction: String,
    context_limit: usize,
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionRegistry {
    pub fn new(scope: SessionScope, system_instruction: impl Into<String>, context_limit: usize) -> Self {
        Self {
            scope,
            system_instruction: system_instruction.into(),
            context_limit,
            sessions: DashMap::new(),
        }
    }

    pub fn scope(&self) -> SessionScope {
        self.scope
    }

    /// Key a peer maps to under the configured scope.
    pub fn key_for(&self, peer: SocketAddr) -> String {
        match self.scope {
            SessionScope::Shared => SHARED_SESSION_KEY.to_string(),
            SessionScope::PerPeer => peer.ip().to_string(),
        }
    }

    /// Session for a peer, created with a fresh window on first contact.
    ///
    /// Sessions are never evicted; under `PerPeer` the map grows with the number of
    /// distinct peer IPs that have connected.
    pub fn session_for(&self, peer: SocketAddr) -> Arc<Mutex<Session>> {
        let key = self.key_for(peer);
        let entry = self.sessions.entry(key.clone()).or_insert_with(|| {
            info!(session = %key, "Opening conversation session");
            Arc::new(Mutex::new(Session::new(
                key.clone(),
                Turn::system(self.system_instruction.clone()),
                self.context_limit,
            )))
        });
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
