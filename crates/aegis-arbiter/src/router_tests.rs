//! Scenario tests for event dispatch.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::actor::ActorId;
use crate::decision::{CommandError, CommandInvocation, CommandPrincipal};
use crate::events::{ClickKind, EventFlag};
use crate::item::ItemKind;
use crate::service::NoticeError;

const RESTRICTED: ItemKind = ItemKind(900);

// ---------------------------------------------------------------------------
// Test collaborators
// ---------------------------------------------------------------------------

/// Tick source the test can advance.
#[derive(Clone, Default)]
struct SharedTick(Rc<Cell<u64>>);

impl SharedTick {
    fn set(&self, tick: u64) {
        self.0.set(tick);
    }
}

impl TickSource for SharedTick {
    fn current_tick(&self) -> u64 {
        self.0.get()
    }
}

/// Usage service returning a fixed decision and recording every `decide`
/// and `can_be_put_in_inventory` call.
#[derive(Clone)]
struct ScriptedUsage {
    decisions: Rc<RefCell<Vec<InteractionKind>>>,
    put_checks: Rc<Cell<usize>>,
    decision: UsageDecision,
    restricted: HashSet<ItemKind>,
}

impl ScriptedUsage {
    fn allowing() -> Self {
        Self::returning(UsageDecision::allow())
    }

    fn returning(decision: UsageDecision) -> Self {
        Self {
            decisions: Rc::default(),
            put_checks: Rc::default(),
            decision,
            restricted: HashSet::new(),
        }
    }

    fn with_restricted(mut self, kinds: &[ItemKind]) -> Self {
        self.restricted = kinds.iter().copied().collect();
        self
    }

    fn decide_calls(&self) -> Vec<InteractionKind> {
        self.decisions.borrow().clone()
    }
}

impl UsageService for ScriptedUsage {
    fn decide(
        &self,
        _actor: &ActorSession,
        kind: &InteractionKind,
        _held: Option<&ItemStack>,
    ) -> UsageDecision {
        self.decisions.borrow_mut().push(kind.clone());
        self.decision.clone()
    }

    fn can_be_put_in_inventory(&self, item: Option<&ItemStack>) -> bool {
        self.put_checks.set(self.put_checks.get() + 1);
        item.is_none_or(|stack| !self.restricted.contains(&stack.kind))
    }

    fn can_be_used_in_craft(&self, item: &ItemStack) -> bool {
        !self.restricted.contains(&item.kind)
    }
}

#[derive(Clone, Default)]
struct SharedExecutor {
    calls: Rc<RefCell<Vec<(CommandPrincipal, String)>>>,
}

impl CommandExecutor for SharedExecutor {
    fn run(&mut self, principal: CommandPrincipal, command: &str) -> Result<(), CommandError> {
        self.calls.borrow_mut().push((principal, command.to_string()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedSink {
    delivered: Rc<RefCell<Vec<(ActorId, String)>>>,
}

impl MessageSink for SharedSink {
    fn deliver(&mut self, actor: &ActorSession, text: &str) {
        self.delivered.borrow_mut().push((actor.id, text.to_string()));
    }
}

struct StaticNotices {
    greeting: Option<String>,
    notice: Result<Option<String>, NoticeError>,
}

impl StaticNotices {
    fn silent() -> Self {
        Self {
            greeting: None,
            notice: Ok(None),
        }
    }
}

impl NoticeSource for StaticNotices {
    fn greeting(&self, _actor: &ActorSession) -> Option<String> {
        self.greeting.clone()
    }

    fn update_notice(&self, _actor: &ActorSession) -> Result<Option<String>, NoticeError> {
        self.notice.clone()
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    tick: SharedTick,
    usage: ScriptedUsage,
    executor: SharedExecutor,
    sink: SharedSink,
    router: DispatchRouter,
}

fn harness_with(usage: ScriptedUsage, notices: StaticNotices) -> Harness {
    let tick = SharedTick::default();
    let executor = SharedExecutor::default();
    let sink = SharedSink::default();
    let router = DispatchRouter::new(
        Box::new(tick.clone()),
        Box::new(usage.clone()),
        Box::new(notices),
        Box::new(executor.clone()),
        Box::new(sink.clone()),
    );
    Harness {
        tick,
        usage,
        executor,
        sink,
        router,
    }
}

fn harness(usage: ScriptedUsage) -> Harness {
    harness_with(usage, StaticNotices::silent())
}

fn actor(id: u64) -> Arc<ActorSession> {
    Arc::new(ActorSession::new(ActorId(id), format!("actor-{id}")))
}

// ---------------------------------------------------------------------------
// Debounce across event kinds
// ---------------------------------------------------------------------------

// An actor drops an item at tick 100; the host also fires a generic
// interaction for the same gesture at tick 100. Only the drop may be
// arbitrated; at tick 101 an identical interaction is evaluated normally.
#[test]
fn test_drop_then_same_tick_interaction_is_suppressed() {
    let mut h = harness(ScriptedUsage::allowing());
    let alice = actor(1);

    h.tick.set(100);
    let mut drop_flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::DropItem {
        actor: alice.clone(),
        dropped: ItemStack::of(ItemKind::STONE),
        handle: &mut drop_flag,
    });
    assert_eq!(h.usage.decide_calls(), vec![InteractionKind::DropItem]);

    let mut use_flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::UseItem {
        actor: alice.clone(),
        action: UseAction::RightClickAir,
        held: Some(ItemStack::of(ItemKind::STONE)),
        target_block: None,
        use_item_denied: false,
        handle: &mut use_flag,
    });
    assert_eq!(
        h.usage.decide_calls().len(),
        1,
        "same-tick generic interaction must not request a second decision"
    );

    h.tick.set(101);
    let mut use_flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::UseItem {
        actor: alice,
        action: UseAction::RightClickAir,
        held: Some(ItemStack::of(ItemKind::STONE)),
        target_block: None,
        use_item_denied: false,
        handle: &mut use_flag,
    });
    assert_eq!(
        h.usage.decide_calls().len(),
        2,
        "next tick the gesture is independent again"
    );
}

#[test]
fn test_interact_at_debounces_its_own_duplicates() {
    let mut h = harness(ScriptedUsage::allowing());
    let alice = actor(1);
    h.tick.set(7);

    for _ in 0..2 {
        let mut flag = EventFlag::new();
        h.router.dispatch(RawInteractionEvent::InteractAt {
            actor: alice.clone(),
            target: EntityId(55),
            held: None,
            handle: &mut flag,
        });
    }
    assert_eq!(h.usage.decide_calls().len(), 1);

    // The click window also shields the generic interaction this tick.
    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::UseItem {
        actor: alice,
        action: UseAction::RightClickAir,
        held: None,
        target_block: None,
        use_item_denied: false,
        handle: &mut flag,
    });
    assert_eq!(h.usage.decide_calls().len(), 1);
}

// ---------------------------------------------------------------------------
// Decision application through the router
// ---------------------------------------------------------------------------

// A bound item pays out through the console and the actor hears about it.
#[test]
fn test_use_item_applies_decision() {
    let decision = UsageDecision {
        should_cancel: true,
        commands: vec![CommandInvocation::console("give diamond")],
        message: Some("You got a diamond!".to_string()),
    };
    let mut h = harness(ScriptedUsage::returning(decision));
    let alice = actor(1);
    h.tick.set(5);

    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::UseItem {
        actor: alice,
        action: UseAction::RightClickBlock,
        held: Some(ItemStack::tagged(RESTRICTED, "generator:ruby_wand")),
        target_block: Some(BlockPos { x: 1, y: 64, z: -3 }),
        use_item_denied: false,
        handle: &mut flag,
    });

    assert!(flag.is_cancelled());
    assert_eq!(
        h.executor.calls.borrow().as_slice(),
        &[(CommandPrincipal::Console, "give diamond".to_string())]
    );
    assert_eq!(
        h.sink.delivered.borrow().as_slice(),
        &[(ActorId(1), "You got a diamond!".to_string())]
    );
}

#[test]
fn test_use_item_skipped_when_host_denied_item_use() {
    let mut h = harness(ScriptedUsage::returning(UsageDecision::deny()));
    let alice = actor(1);

    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::UseItem {
        actor: alice,
        action: UseAction::RightClickAir,
        held: None,
        target_block: None,
        use_item_denied: true,
        handle: &mut flag,
    });

    assert!(h.usage.decide_calls().is_empty());
    assert!(!flag.is_cancelled(), "a skipped event is left untouched");
}

#[test]
fn test_drop_skipped_when_already_cancelled() {
    let mut h = harness(ScriptedUsage::allowing());
    let alice = actor(1);

    let mut flag = EventFlag::cancelled();
    h.router.dispatch(RawInteractionEvent::DropItem {
        actor: alice,
        dropped: ItemStack::of(ItemKind::STONE),
        handle: &mut flag,
    });

    assert!(h.usage.decide_calls().is_empty());
    assert!(flag.is_cancelled());
}

#[test]
fn test_attack_runs_even_when_already_cancelled() {
    let mut h = harness(ScriptedUsage::allowing());
    let alice = actor(1);

    let mut flag = EventFlag::cancelled();
    h.router.dispatch(RawInteractionEvent::AttackEntity {
        attacker: alice,
        target: EntityId(9),
        held: None,
        handle: &mut flag,
    });

    assert_eq!(
        h.usage.decide_calls(),
        vec![InteractionKind::UseAtEntity {
            passive: false,
            target: EntityId(9),
        }]
    );
    assert!(
        flag.is_cancelled(),
        "another subsystem's cancellation stands even though the decision allowed"
    );
}

#[test]
fn test_attack_cancellation_follows_decision_when_not_precancelled() {
    let mut h = harness(ScriptedUsage::returning(UsageDecision::deny()));
    let alice = actor(1);

    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::AttackEntity {
        attacker: alice,
        target: EntityId(9),
        held: None,
        handle: &mut flag,
    });
    assert!(flag.is_cancelled());
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[test]
fn test_join_delivers_greeting_then_update_notice() {
    let notices = StaticNotices {
        greeting: Some("Welcome back".to_string()),
        notice: Ok(Some("An update is available".to_string())),
    };
    let mut h = harness_with(ScriptedUsage::allowing(), notices);

    h.router.dispatch(RawInteractionEvent::Join { actor: actor(3) });

    assert_eq!(
        h.sink.delivered.borrow().as_slice(),
        &[
            (ActorId(3), "Welcome back".to_string()),
            (ActorId(3), "An update is available".to_string()),
        ]
    );
}

#[test]
fn test_join_contains_update_notice_failure() {
    let notices = StaticNotices {
        greeting: Some("Welcome".to_string()),
        notice: Err(NoticeError::new("update endpoint unreachable")),
    };
    let mut h = harness_with(ScriptedUsage::allowing(), notices);

    h.router.dispatch(RawInteractionEvent::Join { actor: actor(3) });

    assert_eq!(
        h.sink.delivered.borrow().as_slice(),
        &[(ActorId(3), "Welcome".to_string())],
        "the failure is swallowed and the greeting still went out"
    );
}

// ---------------------------------------------------------------------------
// Craft preview
// ---------------------------------------------------------------------------

#[test]
fn test_craft_preview_cleared_when_ingredient_banned() {
    let mut h = harness(ScriptedUsage::allowing().with_restricted(&[RESTRICTED]));

    let matrix = vec![
        Some(ItemStack::of(ItemKind::STONE)),
        None,
        Some(ItemStack::of(RESTRICTED)),
    ];
    let mut result = Some(ItemStack::of(ItemKind::TORCH));
    h.router.dispatch(RawInteractionEvent::CraftPreview {
        matrix,
        result: &mut result,
    });

    assert!(result.is_none(), "preview result must be cleared");
}

#[test]
fn test_craft_preview_untouched_for_ordinary_ingredients() {
    let mut h = harness(ScriptedUsage::allowing().with_restricted(&[RESTRICTED]));

    let matrix = vec![Some(ItemStack::of(ItemKind::STONE)), None];
    let mut result = Some(ItemStack::of(ItemKind::TORCH));
    h.router.dispatch(RawInteractionEvent::CraftPreview {
        matrix,
        result: &mut result,
    });

    assert_eq!(result, Some(ItemStack::of(ItemKind::TORCH)));
}

// ---------------------------------------------------------------------------
// Inventory shapes
// ---------------------------------------------------------------------------

#[test]
fn test_inventory_click_routed_to_guard() {
    let mut h = harness(ScriptedUsage::allowing().with_restricted(&[RESTRICTED]));
    let alice = actor(1);

    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::InventoryClick {
        actor: alice,
        view: InventoryView::foreign(27),
        click: ClickContext {
            carried: Some(ItemStack::of(RESTRICTED)),
            clicked: None,
            slot: Some(4),
            kind: ClickKind::Plain,
        },
        storage: PersonalStorage::default(),
        handle: &mut flag,
    });

    assert!(flag.is_cancelled());
    assert!(
        h.usage.decide_calls().is_empty(),
        "inventory shapes bypass the usage decision entirely"
    );
}

#[test]
fn test_inventory_click_skipped_when_already_cancelled() {
    let mut h = harness(ScriptedUsage::allowing().with_restricted(&[RESTRICTED]));
    let alice = actor(1);

    let mut flag = EventFlag::cancelled();
    h.router.dispatch(RawInteractionEvent::InventoryClick {
        actor: alice,
        view: InventoryView::foreign(27),
        click: ClickContext {
            carried: Some(ItemStack::of(RESTRICTED)),
            clicked: None,
            slot: Some(4),
            kind: ClickKind::Plain,
        },
        storage: PersonalStorage::default(),
        handle: &mut flag,
    });

    assert_eq!(
        h.usage.put_checks.get(),
        0,
        "an already-cancelled click is not re-reviewed"
    );
}

#[test]
fn test_inventory_drag_routed_to_guard() {
    let mut h = harness(ScriptedUsage::allowing().with_restricted(&[RESTRICTED]));
    let alice = actor(1);

    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::InventoryDrag {
        actor: alice,
        view: InventoryView::foreign(27),
        placements: vec![DragPlacement {
            slot: 3,
            item: ItemStack::of(RESTRICTED),
        }],
        handle: &mut flag,
    });

    assert!(flag.is_cancelled());
}

#[test]
fn test_evict_stale_sessions_clears_departed_actors() {
    let mut h = harness(ScriptedUsage::allowing());
    let alice = actor(1);

    h.tick.set(1);
    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::DropItem {
        actor: alice.clone(),
        dropped: ItemStack::of(ItemKind::STONE),
        handle: &mut flag,
    });
    drop(alice);

    h.router.evict_stale_sessions();
    // A fresh actor with the same id is an independent session.
    let alice_again = actor(1);
    h.tick.set(1);
    let mut flag = EventFlag::new();
    h.router.dispatch(RawInteractionEvent::UseItem {
        actor: alice_again,
        action: UseAction::RightClickAir,
        held: None,
        target_block: None,
        use_item_denied: false,
        handle: &mut flag,
    });
    assert_eq!(
        h.usage.decide_calls().len(),
        2,
        "the departed session's drop window must not suppress the new session"
    );
}
