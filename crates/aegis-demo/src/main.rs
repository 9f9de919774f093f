//! Demo binary that drives the arbitration layer through a scripted
//! sequence of raw events: a drop gesture whose duplicate raw event is
//! suppressed, a bound item paying out through the console, and the swap
//! guard blocking restricted items at a chest.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p aegis-demo`; add `--log-level debug` to
//! watch suppression decisions.

mod collaborators;

use std::sync::Arc;

use aegis_arbiter::{
    ActorId, ActorSession, CancellationHandle, ClickContext, ClickKind, DispatchRouter,
    DragPlacement, EventFlag, InventoryView, ItemKind, ItemStack, PersonalStorage,
    RawInteractionEvent, UseAction,
};
use aegis_config::{CliArgs, Config, default_config_dir};
use clap::Parser;
use tracing::{info, warn};

use crate::collaborators::{
    ConfigUsageService, GreetingNotices, LoggingExecutor, LoggingSink, WorldClock,
};

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("falling back to default config: {err}");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    aegis_log::init_logging(None, cfg!(debug_assertions), Some(&config));
    info!(
        tick_rate = config.simulation.tick_rate,
        restricted_kinds = config.items.restricted_kinds.len(),
        "aegis demo starting"
    );

    let clock = WorldClock::default();
    let mut router = DispatchRouter::new(
        Box::new(clock.clone()),
        Box::new(ConfigUsageService::from_rules(&config.items)),
        Box::new(GreetingNotices),
        Box::new(LoggingExecutor),
        Box::new(LoggingSink),
    );

    let alice = Arc::new(ActorSession::new(ActorId(1), "Alice"));
    let bob = Arc::new(ActorSession::new(ActorId(2), "Bob"));

    router.dispatch(RawInteractionEvent::Join {
        actor: alice.clone(),
    });
    router.dispatch(RawInteractionEvent::Join { actor: bob.clone() });

    let bound_kind = config
        .items
        .bindings
        .first()
        .map(|binding| ItemKind(binding.kind))
        .unwrap_or(ItemKind(900));
    let restricted_kind = config
        .items
        .restricted_kinds
        .first()
        .copied()
        .map(ItemKind)
        .unwrap_or(ItemKind(900));

    // One physical drop gesture at tick 100 fires two raw events; only the
    // first may be arbitrated.
    clock.set(100);
    let mut drop_flag = EventFlag::new();
    router.dispatch(RawInteractionEvent::DropItem {
        actor: alice.clone(),
        dropped: ItemStack::of(bound_kind),
        handle: &mut drop_flag,
    });
    info!(cancelled = drop_flag.is_cancelled(), "drop arbitrated");

    let mut use_flag = EventFlag::new();
    router.dispatch(RawInteractionEvent::UseItem {
        actor: alice.clone(),
        action: UseAction::RightClickAir,
        held: Some(ItemStack::of(bound_kind)),
        target_block: None,
        use_item_denied: false,
        handle: &mut use_flag,
    });
    info!(
        cancelled = use_flag.is_cancelled(),
        "same-tick duplicate went through untouched"
    );

    // Next tick the same gesture is an independent action again.
    clock.advance();
    let mut use_flag = EventFlag::new();
    router.dispatch(RawInteractionEvent::UseItem {
        actor: alice.clone(),
        action: UseAction::RightClickAir,
        held: Some(ItemStack::of(bound_kind)),
        target_block: None,
        use_item_denied: false,
        handle: &mut use_flag,
    });
    info!(cancelled = use_flag.is_cancelled(), "fresh use arbitrated");

    // Bob tries to smuggle a restricted item into a chest three ways.
    let chest = InventoryView::foreign(27);

    let mut click_flag = EventFlag::new();
    router.dispatch(RawInteractionEvent::InventoryClick {
        actor: bob.clone(),
        view: chest,
        click: ClickContext {
            carried: Some(ItemStack::of(restricted_kind)),
            clicked: None,
            slot: Some(4),
            kind: ClickKind::Plain,
        },
        storage: PersonalStorage::default(),
        handle: &mut click_flag,
    });
    report_guard("cursor placement into chest", click_flag.is_cancelled(), true);

    let mut swap_flag = EventFlag::new();
    router.dispatch(RawInteractionEvent::InventoryClick {
        actor: bob.clone(),
        view: chest,
        click: ClickContext {
            carried: None,
            clicked: None,
            slot: Some(10),
            kind: ClickKind::Swap { hotbar_slot: 0 },
        },
        storage: PersonalStorage::new(vec![Some(ItemStack::of(restricted_kind))], None),
        handle: &mut swap_flag,
    });
    report_guard("hotbar swap into chest", swap_flag.is_cancelled(), true);

    let mut drag_flag = EventFlag::new();
    router.dispatch(RawInteractionEvent::InventoryDrag {
        actor: bob.clone(),
        view: chest,
        placements: vec![
            DragPlacement {
                slot: 30,
                item: ItemStack::of(restricted_kind),
            },
            DragPlacement {
                slot: 31,
                item: ItemStack::of(restricted_kind),
            },
        ],
        handle: &mut drag_flag,
    });
    report_guard(
        "drag within personal storage",
        drag_flag.is_cancelled(),
        false,
    );

    // A craft preview with a banned ingredient loses its result.
    let mut preview = Some(ItemStack::of(ItemKind::TORCH));
    router.dispatch(RawInteractionEvent::CraftPreview {
        matrix: vec![
            Some(ItemStack::of(ItemKind::STONE)),
            config
                .items
                .craft_banned_kinds
                .first()
                .copied()
                .map(|kind| ItemStack::of(ItemKind(kind))),
        ],
        result: &mut preview,
    });
    info!(cleared = preview.is_none(), "craft preview reviewed");

    info!("aegis demo finished");
}

fn report_guard(what: &str, cancelled: bool, expected: bool) {
    if cancelled == expected {
        info!(what, cancelled, "guard verdict");
    } else {
        warn!(what, cancelled, expected, "guard verdict diverged");
    }
}
