//! Event arbitration for a tick-driven world server: per-tick
//! deduplication of overlapping raw events, authoritative application of
//! usage decisions (cancellation, command dispatch, feedback), and the
//! inventory swap guard that keeps restricted items out of foreign
//! containers.
//!
//! The layer is single-threaded and synchronous: the host delivers raw
//! events serially, [`DispatchRouter::dispatch`] runs each to completion,
//! and every collaborator behind the [`service`] traits is consumed
//! through a narrow, synchronous interface.

pub mod actor;
pub mod debounce;
pub mod decision;
pub mod events;
pub mod item;
pub mod router;
pub mod service;
pub mod swap_guard;

pub use actor::{ActorId, ActorSession};
pub use debounce::{ActionDebouncer, ActionKind, ActionWindow};
pub use decision::{
    CommandError, CommandExecutor, CommandInvocation, CommandPrincipal, MessageSink, ResultApplier,
    UsageDecision,
};
pub use events::{
    BlockPos, CancellationHandle, ClickContext, ClickKind, DragPlacement, EntityId, EventFlag,
    InventoryView, PersonalStorage, RawInteractionEvent, UseAction,
};
pub use item::{ItemKind, ItemStack};
pub use router::DispatchRouter;
pub use service::{InteractionKind, NoticeError, NoticeSource, TickSource, UsageService};
pub use swap_guard::InventorySwapGuard;
