//! In-memory demo implementations of the arbitration collaborators.
//!
//! A real host would back these with its command dispatcher, chat stack,
//! and item model; the demo backs them with the loaded config and the
//! operator log.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use aegis_arbiter::{
    ActorSession, CommandError, CommandExecutor, CommandInvocation, CommandPrincipal,
    InteractionKind, ItemKind, ItemStack, MessageSink, NoticeError, NoticeSource, TickSource,
    UsageDecision, UsageService,
};
use aegis_config::ItemRulesConfig;
use tracing::info;

// ---------------------------------------------------------------------------
// WorldClock
// ---------------------------------------------------------------------------

/// Shared tick counter the demo loop advances by hand.
#[derive(Clone, Default)]
pub struct WorldClock(Rc<Cell<u64>>);

impl WorldClock {
    /// Jumps the clock to the given tick.
    pub fn set(&self, tick: u64) {
        self.0.set(tick);
    }

    /// Advances the clock by one tick.
    pub fn advance(&self) {
        self.0.set(self.0.get() + 1);
    }
}

impl TickSource for WorldClock {
    fn current_tick(&self) -> u64 {
        self.0.get()
    }
}

// ---------------------------------------------------------------------------
// ConfigUsageService
// ---------------------------------------------------------------------------

struct Binding {
    cancel_use: bool,
    commands: Vec<CommandInvocation>,
    message: Option<String>,
}

/// Usage service driven by the `items` section of the loaded config:
/// restriction sets plus per-kind usage bindings.
pub struct ConfigUsageService {
    restricted: HashSet<ItemKind>,
    craft_banned: HashSet<ItemKind>,
    bindings: HashMap<ItemKind, Binding>,
}

impl ConfigUsageService {
    /// Builds the service from configured item rules.
    pub fn from_rules(rules: &ItemRulesConfig) -> Self {
        let bindings = rules
            .bindings
            .iter()
            .map(|binding| {
                let commands = binding
                    .commands
                    .iter()
                    .map(|spec| CommandInvocation {
                        command: spec.command.clone(),
                        as_console: spec.as_console,
                    })
                    .collect();
                (
                    ItemKind(binding.kind),
                    Binding {
                        cancel_use: binding.cancel_use,
                        commands,
                        message: binding.message.clone(),
                    },
                )
            })
            .collect();
        Self {
            restricted: rules.restricted_kinds.iter().map(|k| ItemKind(*k)).collect(),
            craft_banned: rules
                .craft_banned_kinds
                .iter()
                .map(|k| ItemKind(*k))
                .collect(),
            bindings,
        }
    }
}

impl UsageService for ConfigUsageService {
    fn decide(
        &self,
        _actor: &ActorSession,
        _kind: &InteractionKind,
        held: Option<&ItemStack>,
    ) -> UsageDecision {
        let Some(stack) = held else {
            return UsageDecision::allow();
        };
        let Some(binding) = self.bindings.get(&stack.kind) else {
            return UsageDecision::allow();
        };
        UsageDecision {
            should_cancel: binding.cancel_use,
            commands: binding.commands.clone(),
            message: binding.message.clone(),
        }
    }

    fn can_be_put_in_inventory(&self, item: Option<&ItemStack>) -> bool {
        item.is_none_or(|stack| !self.restricted.contains(&stack.kind))
    }

    fn can_be_used_in_craft(&self, item: &ItemStack) -> bool {
        !self.craft_banned.contains(&item.kind)
    }
}

// ---------------------------------------------------------------------------
// Log-backed executor and sink
// ---------------------------------------------------------------------------

/// Command executor that narrates dispatches to the operator log.
#[derive(Default)]
pub struct LoggingExecutor;

impl CommandExecutor for LoggingExecutor {
    fn run(&mut self, principal: CommandPrincipal, command: &str) -> Result<(), CommandError> {
        match principal {
            CommandPrincipal::Console => info!(command, "console dispatch"),
            CommandPrincipal::Actor(id) => info!(actor = id.0, command, "actor dispatch"),
        }
        Ok(())
    }
}

/// Message sink that narrates deliveries to the operator log.
#[derive(Default)]
pub struct LoggingSink;

impl MessageSink for LoggingSink {
    fn deliver(&mut self, actor: &ActorSession, text: &str) {
        info!(actor = %actor.name, text, "message delivered");
    }
}

/// Greets every joining actor; the demo has no update channel.
#[derive(Default)]
pub struct GreetingNotices;

impl NoticeSource for GreetingNotices {
    fn greeting(&self, actor: &ActorSession) -> Option<String> {
        Some(format!("Welcome, {}!", actor.name))
    }

    fn update_notice(&self, _actor: &ActorSession) -> Result<Option<String>, NoticeError> {
        Ok(None)
    }
}
