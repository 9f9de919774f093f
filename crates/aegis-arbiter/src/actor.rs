//! Actor identity and session records.
//!
//! Sessions are owned by the host's session registry; this layer only ever
//! receives `Arc<ActorSession>` handles inside event payloads and holds at
//! most `Weak` references of its own (see [`crate::debounce`]).

use serde::{Deserialize, Serialize};

/// Stable identifier for a connected actor, unique for the session's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// A connected actor's session record.
///
/// The host keeps the owning `Arc`; when the actor disconnects the host
/// drops it, which is how per-actor state in this layer becomes reclaimable
/// without an explicit removal call.
#[derive(Debug, PartialEq, Eq)]
pub struct ActorSession {
    /// Actor identifier (matches login).
    pub id: ActorId,
    /// Human-readable actor name, used for log lines and message delivery.
    pub name: String,
}

impl ActorSession {
    /// Creates a session record for the given actor.
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
