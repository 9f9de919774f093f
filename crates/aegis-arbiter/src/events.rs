//! Raw event shapes delivered by the host simulation.
//!
//! The host's five-plus event kinds share no common supertype beyond "has a
//! cancellation flag", so they are modelled as one tagged union,
//! [`RawInteractionEvent`], with per-kind payloads; the router dispatches by
//! pattern matching. Cancellation is an explicit [`CancellationHandle`]
//! borrowed into the payload rather than an ambient mutable global.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actor::ActorSession;
use crate::item::ItemStack;

// ---------------------------------------------------------------------------
// Host vocabulary
// ---------------------------------------------------------------------------

/// Identifier of a non-actor entity in the world (container stand, mob, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Grid position of a block targeted by an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// X grid coordinate.
    pub x: i32,
    /// Y grid coordinate.
    pub y: i32,
    /// Z grid coordinate.
    pub z: i32,
}

/// The physical gesture behind a generic item-use interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UseAction {
    /// Left click aimed at a block.
    LeftClickBlock,
    /// Right click aimed at a block.
    RightClickBlock,
    /// Left click into the air.
    LeftClickAir,
    /// Right click into the air.
    RightClickAir,
    /// Stepped on / physically triggered.
    Physical,
}

// ---------------------------------------------------------------------------
// CancellationHandle
// ---------------------------------------------------------------------------

/// Mutable cancellation flag of a host event.
///
/// The host's cancellable-event abstraction is a mutable out-parameter;
/// handlers set the flag, the host reads it back after dispatch.
pub trait CancellationHandle {
    /// Returns the current cancellation state.
    fn is_cancelled(&self) -> bool;
    /// Overwrites the cancellation state.
    fn set_cancelled(&mut self, cancelled: bool);
}

/// Plain in-memory cancellation flag, for tests, demos, and hosts whose
/// event objects do not carry a flag of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFlag {
    cancelled: bool,
}

impl EventFlag {
    /// A flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag already in the cancelled state.
    pub fn cancelled() -> Self {
        Self { cancelled: true }
    }
}

impl CancellationHandle for EventFlag {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

// ---------------------------------------------------------------------------
// Inventory operation context
// ---------------------------------------------------------------------------

/// Shape of an open inventory view: the top container's slot range and
/// whether that top container is the acting player's own storage.
///
/// Raw slot indices cover the combined view: `0..top_size` addresses the
/// top container, everything from `top_size` upward addresses the player's
/// personal section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryView {
    /// Number of slots in the top container.
    pub top_size: usize,
    /// `true` when the top inventory is the player's own storage.
    pub top_is_personal: bool,
}

impl InventoryView {
    /// A view over a foreign container (chest, furnace, …) of `top_size`
    /// slots.
    pub fn foreign(top_size: usize) -> Self {
        Self {
            top_size,
            top_is_personal: false,
        }
    }

    /// A view whose top inventory is the player's own storage.
    pub fn personal(top_size: usize) -> Self {
        Self {
            top_size,
            top_is_personal: true,
        }
    }

    /// Returns `true` if the raw slot index addresses the top container.
    pub fn is_top_slot(&self, slot: usize) -> bool {
        slot < self.top_size
    }
}

/// Click-type classification of an inventory click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Plain left/right click.
    Plain,
    /// Shift click (moves the clicked stack across sections).
    Shift,
    /// Number-key / off-hand swap. A non-negative `hotbar_slot` designates
    /// the hotbar slot being swapped in; a negative value designates the
    /// off-hand slot.
    Swap {
        /// Designated hotbar slot index, or negative for the off-hand.
        hotbar_slot: i32,
    },
}

/// Per-click context: the cursor item, the clicked item, the clicked raw
/// slot, and the click-type classification. Derived solely from the
/// triggering event and never reused across events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickContext {
    /// Item currently carried on the cursor, if any.
    pub carried: Option<ItemStack>,
    /// Item in the clicked slot, if any.
    pub clicked: Option<ItemStack>,
    /// Raw slot index within the combined view; `None` when the click fell
    /// outside the view entirely.
    pub slot: Option<usize>,
    /// Click-type classification.
    pub kind: ClickKind,
}

/// One new item placement proposed by an inventory drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPlacement {
    /// Raw slot index the drag would fill.
    pub slot: usize,
    /// Item that would land in the slot.
    pub item: ItemStack,
}

/// Snapshot of the acting player's personal storage, used only to resolve
/// the swap-source item of a hotbar/off-hand swap click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalStorage {
    slots: Vec<Option<ItemStack>>,
    offhand: Option<ItemStack>,
}

impl PersonalStorage {
    /// Builds a snapshot from the hotbar/main slots and the off-hand slot.
    pub fn new(slots: Vec<Option<ItemStack>>, offhand: Option<ItemStack>) -> Self {
        Self { slots, offhand }
    }

    /// Item in the given storage slot. An out-of-range index resolves to
    /// "no item" rather than failing the handler.
    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Item in the off-hand slot, if any.
    pub fn offhand(&self) -> Option<&ItemStack> {
        self.offhand.as_ref()
    }
}

// ---------------------------------------------------------------------------
// RawInteractionEvent
// ---------------------------------------------------------------------------

/// A raw event as delivered by the host simulation, one variant per host
/// event kind. Cancellable kinds borrow the host event's
/// [`CancellationHandle`]; the craft preview instead exposes its mutable
/// result slot.
pub enum RawInteractionEvent<'a> {
    /// An actor's session joined the world.
    Join {
        /// The joining actor.
        actor: Arc<ActorSession>,
    },

    /// Generic item-use interaction (click on a block or into the air).
    UseItem {
        /// The acting actor.
        actor: Arc<ActorSession>,
        /// The physical gesture.
        action: UseAction,
        /// Item held in the acting hand, if any.
        held: Option<ItemStack>,
        /// Block the gesture targeted, if any.
        target_block: Option<BlockPos>,
        /// `true` when another subsystem already denied use of the held
        /// item; the arbitration layer then leaves the event alone.
        use_item_denied: bool,
        /// The host event's cancellation flag.
        handle: &'a mut dyn CancellationHandle,
    },

    /// Container-crafting result preview about to be shown.
    CraftPreview {
        /// Crafting matrix contents; empty grid cells are `None`.
        matrix: Vec<Option<ItemStack>>,
        /// Preview result slot; cleared to deny the craft.
        result: &'a mut Option<ItemStack>,
    },

    /// Actor dropped an item out of their inventory.
    DropItem {
        /// The acting actor.
        actor: Arc<ActorSession>,
        /// The dropped stack.
        dropped: ItemStack,
        /// The host event's cancellation flag.
        handle: &'a mut dyn CancellationHandle,
    },

    /// Passive entity-targeted interaction (interact-at).
    InteractAt {
        /// The acting actor.
        actor: Arc<ActorSession>,
        /// The targeted entity.
        target: EntityId,
        /// Item held in the acting hand, if any.
        held: Option<ItemStack>,
        /// The host event's cancellation flag.
        handle: &'a mut dyn CancellationHandle,
    },

    /// Damage-based entity-targeted interaction.
    AttackEntity {
        /// The attacking actor.
        attacker: Arc<ActorSession>,
        /// The damaged entity.
        target: EntityId,
        /// Item held in the acting hand, if any.
        held: Option<ItemStack>,
        /// The host event's cancellation flag.
        handle: &'a mut dyn CancellationHandle,
    },

    /// Inventory drag distributing the cursor stack over several slots.
    InventoryDrag {
        /// The acting actor.
        actor: Arc<ActorSession>,
        /// Shape of the open view.
        view: InventoryView,
        /// New item placements the drag would create.
        placements: Vec<DragPlacement>,
        /// The host event's cancellation flag.
        handle: &'a mut dyn CancellationHandle,
    },

    /// Single inventory click.
    InventoryClick {
        /// The acting actor.
        actor: Arc<ActorSession>,
        /// Shape of the open view.
        view: InventoryView,
        /// Cursor/clicked/click-type context.
        click: ClickContext,
        /// Snapshot of the actor's personal storage for swap resolution.
        storage: PersonalStorage,
        /// The host event's cancellation flag.
        handle: &'a mut dyn CancellationHandle,
    },
}
