//! Event dispatch: wiring raw host events to the debouncer, the usage
//! service, the result applier, and the swap guard.
//!
//! The router is the only entry point the host registers. It is stateless
//! coordination apart from the debouncer it owns: every handler runs to
//! completion on the single event-processing thread, and debounce
//! recording always happens before decision evaluation for the same event,
//! so a gesture's second raw event observes the updated window.
//!
//! The host is expected to register [`DispatchRouter::dispatch`] at an
//! elevated priority, after unrelated subsystems have had their say; the
//! drop, interact-at, drag, and click paths honor a cancellation those
//! subsystems already set by leaving the event alone.

use std::sync::Arc;

use tracing::{debug, error};

use crate::actor::ActorSession;
use crate::debounce::{ActionDebouncer, ActionKind};
use crate::decision::{CommandExecutor, MessageSink, ResultApplier, UsageDecision};
use crate::events::{
    BlockPos, CancellationHandle, ClickContext, DragPlacement, EntityId, InventoryView,
    PersonalStorage, RawInteractionEvent, UseAction,
};
use crate::item::ItemStack;
use crate::service::{InteractionKind, NoticeSource, TickSource, UsageService};
use crate::swap_guard::InventorySwapGuard;

/// Receives raw events, suppresses same-tick duplicates, obtains usage
/// decisions, and applies them; inventory-shape events bypass the usage
/// decision entirely and go straight through the swap guard.
pub struct DispatchRouter {
    ticks: Box<dyn TickSource>,
    usage: Box<dyn UsageService>,
    notices: Box<dyn NoticeSource>,
    commands: Box<dyn CommandExecutor>,
    messages: Box<dyn MessageSink>,
    debouncer: ActionDebouncer,
}

impl DispatchRouter {
    /// Wires a router to its collaborators.
    pub fn new(
        ticks: Box<dyn TickSource>,
        usage: Box<dyn UsageService>,
        notices: Box<dyn NoticeSource>,
        commands: Box<dyn CommandExecutor>,
        messages: Box<dyn MessageSink>,
    ) -> Self {
        Self {
            ticks,
            usage,
            notices,
            commands,
            messages,
            debouncer: ActionDebouncer::new(),
        }
    }

    /// Dispatches one raw event. Never fails; collaborator errors are
    /// contained and logged where they occur.
    pub fn dispatch(&mut self, event: RawInteractionEvent<'_>) {
        match event {
            RawInteractionEvent::Join { actor } => self.on_join(&actor),
            RawInteractionEvent::UseItem {
                actor,
                action,
                held,
                target_block,
                use_item_denied,
                handle,
            } => self.on_use_item(&actor, action, held, target_block, use_item_denied, handle),
            RawInteractionEvent::CraftPreview { matrix, result } => {
                self.on_craft_preview(&matrix, result)
            }
            RawInteractionEvent::DropItem {
                actor,
                dropped,
                handle,
            } => self.on_drop(&actor, dropped, handle),
            RawInteractionEvent::InteractAt {
                actor,
                target,
                held,
                handle,
            } => self.on_interact_at(&actor, target, held, handle),
            RawInteractionEvent::AttackEntity {
                attacker,
                target,
                held,
                handle,
            } => self.on_attack(&attacker, target, held, handle),
            RawInteractionEvent::InventoryDrag {
                actor,
                view,
                placements,
                handle,
            } => self.on_inventory_drag(&actor, view, &placements, handle),
            RawInteractionEvent::InventoryClick {
                actor,
                view,
                click,
                storage,
                handle,
            } => self.on_inventory_click(&actor, view, &click, &storage, handle),
        }
    }

    /// Evicts debounce state of departed sessions; safe to call from a
    /// host housekeeping pass at any time.
    pub fn evict_stale_sessions(&mut self) {
        self.debouncer.evict_stale();
    }

    fn apply(
        &mut self,
        decision: UsageDecision,
        actor: &ActorSession,
        handle: &mut dyn CancellationHandle,
    ) {
        ResultApplier {
            commands: &mut *self.commands,
            messages: &mut *self.messages,
        }
        .apply(decision, actor, handle);
    }

    /// Join: greeting, then the best-effort update notice. A notice
    /// failure is logged and swallowed; it must never crash the dispatch
    /// path.
    fn on_join(&mut self, actor: &ActorSession) {
        if let Some(text) = self.notices.greeting(actor) {
            self.messages.deliver(actor, &text);
        }
        match self.notices.update_notice(actor) {
            Ok(Some(text)) => self.messages.deliver(actor, &text),
            Ok(None) => {}
            Err(err) => error!(actor = %actor.name, error = %err, "update notice fetch failed"),
        }
    }

    /// Generic item use. Skipped when the host already denied use of the
    /// held item, and when either action window matches the current tick —
    /// the physical gesture then already produced a decision via a
    /// different raw event type.
    fn on_use_item(
        &mut self,
        actor: &Arc<ActorSession>,
        action: UseAction,
        held: Option<ItemStack>,
        target_block: Option<BlockPos>,
        use_item_denied: bool,
        handle: &mut dyn CancellationHandle,
    ) {
        if use_item_denied {
            return;
        }
        let tick = self.ticks.current_tick();
        if self.debouncer.should_suppress(actor.id, ActionKind::Drop, tick)
            || self
                .debouncer
                .should_suppress(actor.id, ActionKind::Click, tick)
        {
            debug!(actor = %actor.name, tick, "suppressed duplicate interaction");
            return;
        }
        let kind = InteractionKind::UseItem {
            action,
            target_block,
        };
        let decision = self.usage.decide(actor, &kind, held.as_ref());
        self.apply(decision, actor, handle);
    }

    /// Craft preview: clear the result when any matrix item may not be
    /// used as an ingredient.
    fn on_craft_preview(&mut self, matrix: &[Option<ItemStack>], result: &mut Option<ItemStack>) {
        let blocked = matrix
            .iter()
            .flatten()
            .any(|item| !self.usage.can_be_used_in_craft(item));
        if blocked {
            *result = None;
        }
    }

    /// Item drop: records the drop window before decision evaluation so a
    /// later same-tick generic interaction from the same gesture is
    /// suppressed. Skipped when already cancelled by another subsystem.
    fn on_drop(
        &mut self,
        actor: &Arc<ActorSession>,
        dropped: ItemStack,
        handle: &mut dyn CancellationHandle,
    ) {
        if handle.is_cancelled() {
            return;
        }
        let tick = self.ticks.current_tick();
        self.debouncer.record(actor, ActionKind::Drop, tick);
        let decision = self
            .usage
            .decide(actor, &InteractionKind::DropItem, Some(&dropped));
        self.apply(decision, actor, handle);
    }

    /// Passive entity interaction: debounced on the click window, which it
    /// records first. Skipped when already cancelled.
    fn on_interact_at(
        &mut self,
        actor: &Arc<ActorSession>,
        target: EntityId,
        held: Option<ItemStack>,
        handle: &mut dyn CancellationHandle,
    ) {
        if handle.is_cancelled() {
            return;
        }
        let tick = self.ticks.current_tick();
        if self
            .debouncer
            .should_suppress(actor.id, ActionKind::Click, tick)
        {
            debug!(actor = %actor.name, tick, "suppressed duplicate entity interaction");
            return;
        }
        self.debouncer.record(actor, ActionKind::Click, tick);
        let kind = InteractionKind::UseAtEntity {
            passive: true,
            target,
        };
        let decision = self.usage.decide(actor, &kind, held.as_ref());
        self.apply(decision, actor, handle);
    }

    /// Damage-based entity interaction: runs even when already cancelled,
    /// and a pre-existing cancellation stands afterwards — another
    /// subsystem's denial of the damage is not overturned by an allowing
    /// decision.
    fn on_attack(
        &mut self,
        attacker: &Arc<ActorSession>,
        target: EntityId,
        held: Option<ItemStack>,
        handle: &mut dyn CancellationHandle,
    ) {
        let was_cancelled = handle.is_cancelled();
        let kind = InteractionKind::UseAtEntity {
            passive: false,
            target,
        };
        let decision = self.usage.decide(attacker, &kind, held.as_ref());
        self.apply(decision, attacker, handle);
        if was_cancelled {
            handle.set_cancelled(true);
        }
    }

    /// Inventory drag: straight through the swap guard, skipped when
    /// already cancelled.
    fn on_inventory_drag(
        &mut self,
        actor: &Arc<ActorSession>,
        view: InventoryView,
        placements: &[DragPlacement],
        handle: &mut dyn CancellationHandle,
    ) {
        if handle.is_cancelled() {
            return;
        }
        debug!(actor = %actor.name, placements = placements.len(), "reviewing inventory drag");
        InventorySwapGuard::guard_drag(&*self.usage, view, placements, handle);
    }

    /// Inventory click: straight through the swap guard, skipped when
    /// already cancelled.
    fn on_inventory_click(
        &mut self,
        actor: &Arc<ActorSession>,
        view: InventoryView,
        click: &ClickContext,
        storage: &PersonalStorage,
        handle: &mut dyn CancellationHandle,
    ) {
        if handle.is_cancelled() {
            return;
        }
        debug!(actor = %actor.name, slot = ?click.slot, "reviewing inventory click");
        InventorySwapGuard::guard_click(&*self.usage, view, click, storage, handle);
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
