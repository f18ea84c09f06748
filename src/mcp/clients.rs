//! Registry of connected SSE clients.
//!
//! Each subscriber gets an unbounded channel. Results of stdio-initiated
//! tool calls are broadcast to every live subscriber; senders whose
//! receiver has gone away are pruned on the next broadcast.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::mcp::protocol::OutgoingMessage;

type Senders = HashMap<Uuid, UnboundedSender<String>>;

/// Shared set of connected SSE clients.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    senders: Arc<Mutex<Senders>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Senders> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new client.
    ///
    /// The returned stream yields `connection_success` first, then every
    /// broadcast message. Dropping it unregisters the client.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        if let Ok(greeting) = serde_json::to_string(&OutgoingMessage::ConnectionSuccess) {
            // Receiver is alive here, so this cannot fail.
            let _ = tx.send(greeting);
        }

        self.lock().insert(id, tx);
        tracing::info!(client_id = %id, "SSE client connected");

        Subscription {
            id,
            rx,
            registry: self.clone(),
        }
    }

    /// Sends `message` to every connected client.
    ///
    /// Returns the number of clients that received it.
    pub fn broadcast(&self, message: &OutgoingMessage) -> usize {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialise broadcast message");
                return 0;
            }
        };

        let mut senders = self.lock();
        senders.retain(|id, tx| {
            let alive = tx.send(json.clone()).is_ok();
            if !alive {
                tracing::debug!(client_id = %id, "Pruning disconnected SSE client");
            }
            alive
        });
        senders.len()
    }

    /// Number of connected clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no clients are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn remove(&self, id: Uuid) {
        if self.lock().remove(&id).is_some() {
            tracing::info!(client_id = %id, "SSE client disconnected");
        }
    }
}

/// A connected client's message stream.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    rx: UnboundedReceiver<String>,
    registry: ClientRegistry,
}

impl Subscription {
    /// The client's identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }
}

impl Stream for Subscription {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
