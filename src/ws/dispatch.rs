//! Per-socket handler registry and dispatch loop.
//!
//! The registry is owned by one socket instance; there is no process-wide
//! handler table. Registration order is invocation order, duplicate
//! handlers for one kind are permitted, and a failing handler never
//! prevents later handlers from seeing the same frame.

use super::frame::{MessageKind, ServerFrame};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked for each inbound frame of a registered kind.
pub type Handler = Arc<dyn Fn(&ServerFrame) -> anyhow::Result<()> + Send + Sync>;

/// Token returned by [`HandlerRegistry::on`], used to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

#[derive(Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: DashMap<MessageKind, Vec<(HandlerId, Handler)>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `kind`. Handlers persist across reconnects;
    /// they are tied to the socket, not to one physical connection.
    pub fn on(&self, kind: MessageKind, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.entry(kind).or_default().push((id, handler));
        id
    }

    /// Remove a previously registered handler. Returns false if the id is
    /// not registered under `kind`.
    pub fn off(&self, kind: MessageKind, id: HandlerId) -> bool {
        match self.handlers.get_mut(&kind) {
            Some(mut entry) => {
                let before = entry.len();
                entry.retain(|(hid, _)| *hid != id);
                before != entry.len()
            }
            None => false,
        }
    }

    /// Invoke every handler registered for the frame's kind, in
    /// registration order. Returns the number of handlers invoked.
    pub fn dispatch(&self, frame: &ServerFrame) -> usize {
        // Clone the handler list out so callbacks can call on/off without
        // deadlocking against the map entry.
        let handlers: Vec<(HandlerId, Handler)> = match self.handlers.get(&frame.kind()) {
            Some(entry) => entry.clone(),
            None => return 0,
        };

        for (id, handler) in &handlers {
            if let Err(e) = handler(frame) {
                tracing::warn!(
                    kind = ?frame.kind(),
                    handler_id = id.0,
                    error = %e,
                    "Frame handler failed; continuing with remaining handlers"
                );
            }
        }

        handlers.len()
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: MessageKind) -> usize {
        self.handlers.get(&kind).map(|e| e.len()).unwrap_or(0)
    }
}
