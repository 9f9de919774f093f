//! Inventory swap/drag guard.
//!
//! Restricted items must never enter a foreign container, but must remain
//! freely movable within a player's own storage. Every click/drag shape the
//! host exposes (plain click, shift click, hotbar/off-hand swap, cursor
//! carry, drag) has its own slot-resolution and cancellation semantic, so
//! each is enumerated here. Evaluated independently of the usage service's
//! decision logic; the guard only ever cancels, never un-cancels.

use tracing::debug;

use crate::events::{
    CancellationHandle, ClickContext, ClickKind, DragPlacement, InventoryView, PersonalStorage,
};
use crate::item::ItemStack;
use crate::service::UsageService;

/// Rule engine over cursor/clicked/hotbar item triples and drag placements.
pub struct InventorySwapGuard;

impl InventorySwapGuard {
    /// Evaluates an inventory drag and cancels it if it would place a
    /// restricted item into the foreign container.
    pub fn guard_drag(
        service: &dyn UsageService,
        view: InventoryView,
        placements: &[DragPlacement],
        handle: &mut dyn CancellationHandle,
    ) {
        if Self::drag_should_cancel(service, view, placements) {
            debug!("cancelled drag into foreign container slots");
            handle.set_cancelled(true);
        }
    }

    /// Evaluates an inventory click and cancels it if it would let a
    /// restricted item cross between the foreign container and the
    /// player's personal storage.
    pub fn guard_click(
        service: &dyn UsageService,
        view: InventoryView,
        click: &ClickContext,
        storage: &PersonalStorage,
        handle: &mut dyn CancellationHandle,
    ) {
        if Self::click_should_cancel(service, view, click, storage) {
            debug!(slot = ?click.slot, kind = ?click.kind, "cancelled restricted inventory click");
            handle.set_cancelled(true);
        }
    }

    /// Drag rule: a drag whose proposed placements are all individually
    /// storable is allowed unconditionally. Otherwise it is cancelled when
    /// any affected slot falls within the foreign container's range — a
    /// drag may redistribute restricted items purely within the player's
    /// own storage, but not into a foreign container.
    fn drag_should_cancel(
        service: &dyn UsageService,
        view: InventoryView,
        placements: &[DragPlacement],
    ) -> bool {
        let all_storable = placements
            .iter()
            .all(|placement| service.can_be_put_in_inventory(Some(&placement.item)));
        if all_storable {
            return false;
        }
        // With the player's own storage on top there is no foreign range.
        if view.top_is_personal {
            return false;
        }
        placements
            .iter()
            .any(|placement| view.is_top_slot(placement.slot))
    }

    /// Click rule, evaluated over the three candidate items:
    /// the cursor item (`carried`), the clicked-slot item (`clicked`), and
    /// — for swap-classified clicks only — the hotbar/off-hand item being
    /// swapped in (`clicked_with`).
    fn click_should_cancel(
        service: &dyn UsageService,
        view: InventoryView,
        click: &ClickContext,
        storage: &PersonalStorage,
    ) -> bool {
        let clicked_with = Self::resolve_swap_source(click, storage);
        let carried = click.carried.as_ref();
        let clicked = click.clicked.as_ref();

        // Forbidden subset of {clicked_with, carried, clicked}. Absent
        // items go through the predicate like any other value.
        let clicked_with_forbidden = !service.can_be_put_in_inventory(clicked_with);
        let carried_forbidden = !service.can_be_put_in_inventory(carried);
        let clicked_forbidden = !service.can_be_put_in_inventory(clicked);

        // Personal-storage-only interactions are never restricted here.
        if view.top_is_personal {
            return false;
        }

        if !clicked_with_forbidden && !carried_forbidden && !clicked_forbidden {
            return false;
        }

        // Clicks outside the view have no slot and no personal section.
        let clicked_in_personal = click
            .slot
            .is_some_and(|slot| !view.is_top_slot(slot));

        // A shift click would move the clicked stack out of the personal
        // section into the foreign container.
        if clicked_forbidden && click.kind == ClickKind::Shift && clicked_in_personal {
            return true;
        }

        // A swap or cursor placement would introduce a restricted item
        // into the foreign container.
        if (clicked_with_forbidden || carried_forbidden) && !clicked_in_personal {
            return true;
        }

        false
    }

    /// Resolves the item a swap-classified click would move in: the
    /// designated hotbar slot, or the off-hand slot for a negative index.
    /// Non-swap clicks and unresolvable indices yield no item.
    fn resolve_swap_source<'a>(
        click: &ClickContext,
        storage: &'a PersonalStorage,
    ) -> Option<&'a ItemStack> {
        match click.kind {
            ClickKind::Swap { hotbar_slot } if hotbar_slot >= 0 => {
                storage.slot(hotbar_slot as usize)
            }
            ClickKind::Swap { .. } => storage.offhand(),
            _ => None,
        }
    }
}
