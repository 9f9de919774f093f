//! Tick-granular deduplication of overlapping raw events.
//!
//! The host frequently emits more than one raw event for one physical
//! gesture (a drop click also fires a generic use notification). The
//! debouncer remembers, per actor, the last tick at which a drop-type and a
//! click-type action were recorded; a generic interaction observed at the
//! same tick is a duplicate and must not be arbitrated again.
//!
//! Entries are associated with an actor's session but never own it: each
//! entry keeps a `Weak<ActorSession>`, and entries whose session is gone
//! are evicted lazily. No session-end hook is required of the host.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::actor::{ActorId, ActorSession};

/// The two action families tracked per actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Drop-type action (item thrown out of the inventory).
    Drop,
    /// Click-type action (entity-targeted interaction).
    Click,
}

/// Per-actor record of the last recorded drop and click ticks.
///
/// Tick fields only ever advance within a session: writes carry the current
/// tick of a monotone [`crate::service::TickSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionWindow {
    /// Tick of the most recent drop-type action, if any.
    pub last_drop_tick: Option<u64>,
    /// Tick of the most recent click-type action, if any.
    pub last_click_tick: Option<u64>,
}

struct WindowEntry {
    session: Weak<ActorSession>,
    window: ActionWindow,
}

/// Per-actor memory deciding whether a raw event re-describes a physical
/// action that already produced a decision this tick.
#[derive(Default)]
pub struct ActionDebouncer {
    windows: HashMap<ActorId, WindowEntry>,
}

impl ActionDebouncer {
    /// An empty debouncer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if an action of `kind` was already recorded for the
    /// actor at exactly `current_tick`. Actions on different ticks are
    /// always independently evaluated, even one tick apart.
    pub fn should_suppress(&self, actor: ActorId, kind: ActionKind, current_tick: u64) -> bool {
        let Some(entry) = self.windows.get(&actor) else {
            return false;
        };
        let last = match kind {
            ActionKind::Drop => entry.window.last_drop_tick,
            ActionKind::Click => entry.window.last_click_tick,
        };
        last == Some(current_tick)
    }

    /// Records an action of `kind` for the actor at `current_tick`.
    ///
    /// Inserting a window for a previously unseen actor first evicts
    /// entries whose session has been dropped, so the map never outgrows
    /// the set of live sessions by more than the since-departed ones.
    pub fn record(&mut self, actor: &Arc<ActorSession>, kind: ActionKind, current_tick: u64) {
        if !self.windows.contains_key(&actor.id) {
            self.evict_stale();
        }
        let entry = self
            .windows
            .entry(actor.id)
            .or_insert_with(|| WindowEntry {
                session: Arc::downgrade(actor),
                window: ActionWindow::default(),
            });
        match kind {
            ActionKind::Drop => entry.window.last_drop_tick = Some(current_tick),
            ActionKind::Click => entry.window.last_click_tick = Some(current_tick),
        }
    }

    /// Drops every entry whose session is gone. Also safe to call from a
    /// host housekeeping pass.
    pub fn evict_stale(&mut self) {
        let before = self.windows.len();
        self.windows.retain(|_, entry| entry.session.strong_count() > 0);
        let evicted = before - self.windows.len();
        if evicted > 0 {
            trace!(evicted, "evicted action windows of departed sessions");
        }
    }

    /// Number of actors currently tracked (live or not-yet-evicted).
    pub fn tracked_actors(&self) -> usize {
        self.windows.len()
    }

    /// The actor's current window, if one is tracked.
    pub fn window(&self, actor: ActorId) -> Option<ActionWindow> {
        self.windows.get(&actor).map(|entry| entry.window)
    }
}
