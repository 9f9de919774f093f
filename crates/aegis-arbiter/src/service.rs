//! Collaborator contracts consumed by the arbitration layer.
//!
//! These are narrow interfaces over subsystems that live elsewhere: the
//! tick counter, the item model's decision and restriction logic, and the
//! join-time notice source. All of them are synchronous and pure from this
//! layer's perspective; none of their arguments are mutated.

use crate::actor::ActorSession;
use crate::decision::UsageDecision;
use crate::events::{BlockPos, EntityId, UseAction};
use crate::item::ItemStack;

// ---------------------------------------------------------------------------
// TickSource
// ---------------------------------------------------------------------------

/// Source of the simulation's monotonically non-decreasing tick counter.
pub trait TickSource {
    /// The current tick.
    fn current_tick(&self) -> u64;
}

// ---------------------------------------------------------------------------
// UsageService
// ---------------------------------------------------------------------------

/// The physical action being arbitrated, as presented to the usage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    /// Generic item use (click on a block or into the air).
    UseItem {
        /// The physical gesture.
        action: UseAction,
        /// Targeted block, if any.
        target_block: Option<BlockPos>,
    },
    /// Entity-targeted use. `passive` distinguishes interact-at from a
    /// damage-based interaction.
    UseAtEntity {
        /// `true` for interact-at, `false` for damage.
        passive: bool,
        /// The targeted entity.
        target: EntityId,
    },
    /// Dropping the held item out of the inventory.
    DropItem,
}

/// Decides what a physical action means for the item involved and answers
/// the restriction predicates the swap guard and craft preview depend on.
pub trait UsageService {
    /// Produces the authoritative [`UsageDecision`] for one physical
    /// action. Called at most once per raw event (the debouncer suppresses
    /// same-tick duplicates before this point).
    fn decide(
        &self,
        actor: &ActorSession,
        kind: &InteractionKind,
        held: Option<&ItemStack>,
    ) -> UsageDecision;

    /// `true` if the item may be stored in an ordinary inventory. `None`
    /// (no item) must be answered, not rejected.
    fn can_be_put_in_inventory(&self, item: Option<&ItemStack>) -> bool;

    /// `true` if the item may be consumed as a crafting ingredient.
    fn can_be_used_in_craft(&self, item: &ItemStack) -> bool;
}

// ---------------------------------------------------------------------------
// NoticeSource
// ---------------------------------------------------------------------------

/// Failure while fetching the best-effort update notice. Contained in the
/// join handler; never propagates.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct NoticeError {
    /// Human-readable failure description, for the operator log.
    pub reason: String,
}

impl NoticeError {
    /// A notice error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Join-time message source: a greeting for every join and a best-effort
/// update notice that may fail without consequence.
pub trait NoticeSource {
    /// Greeting to deliver on join, if the collaborator has one.
    fn greeting(&self, actor: &ActorSession) -> Option<String>;

    /// Optional update notice. Failures are logged and swallowed by the
    /// join handler; they must never take the dispatch path down.
    fn update_notice(&self, actor: &ActorSession) -> Result<Option<String>, NoticeError>;
}
