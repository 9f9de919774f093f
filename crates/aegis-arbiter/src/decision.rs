//! Usage decisions and their application protocol.
//!
//! A [`UsageDecision`] is the authoritative outcome of evaluating one
//! physical action. [`ResultApplier`] translates it into side effects in a
//! fixed order: cancellation flag first, then command dispatch, then
//! feedback delivery. Nothing rolls back; a failing command is logged and
//! the rest of the sequence still runs.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::actor::{ActorId, ActorSession};
use crate::events::CancellationHandle;

// ---------------------------------------------------------------------------
// Decision values
// ---------------------------------------------------------------------------

/// One command to dispatch as a side effect of a usage decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Full command text.
    pub command: String,
    /// `true` to execute under the privileged console principal, `false`
    /// to execute as the acting actor.
    pub as_console: bool,
}

impl CommandInvocation {
    /// A command executed under the console principal.
    pub fn console(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            as_console: true,
        }
    }

    /// A command executed as the acting actor.
    pub fn actor(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            as_console: false,
        }
    }
}

/// The authoritative outcome of one physical action: whether the host event
/// must be cancelled, which commands to run, and what feedback to deliver.
///
/// Applied at most once per originating raw event; [`ResultApplier::apply`]
/// consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDecision {
    /// Desired cancellation state of the host event. Authoritative in both
    /// directions — a previously cancelled event is un-cancelled by `false`.
    pub should_cancel: bool,
    /// Commands to dispatch, in order.
    pub commands: Vec<CommandInvocation>,
    /// Feedback message for the acting actor, if any.
    pub message: Option<String>,
}

impl UsageDecision {
    /// Allow the action with no side effects.
    pub fn allow() -> Self {
        Self::default()
    }

    /// Cancel the action with no side effects.
    pub fn deny() -> Self {
        Self {
            should_cancel: true,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Execution collaborators
// ---------------------------------------------------------------------------

/// Principal a command executes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPrincipal {
    /// The privileged console identity.
    Console,
    /// The acting actor.
    Actor(ActorId),
}

/// Failure reported by the command-execution collaborator. Surfaced to the
/// operator log, not to the actor; the remaining sequence still runs.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct CommandError {
    /// Human-readable failure description.
    pub reason: String,
}

impl CommandError {
    /// A command error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The command-execution subsystem.
pub trait CommandExecutor {
    /// Runs a command under the given principal.
    fn run(&mut self, principal: CommandPrincipal, command: &str) -> Result<(), CommandError>;
}

/// Delivery of feedback text to a connected actor.
pub trait MessageSink {
    /// Delivers `text` to the actor.
    fn deliver(&mut self, actor: &ActorSession, text: &str);
}

// ---------------------------------------------------------------------------
// ResultApplier
// ---------------------------------------------------------------------------

/// Applies a [`UsageDecision`] to a host event: cancellation, command
/// dispatch, message delivery.
pub struct ResultApplier<'a> {
    /// Command-execution collaborator.
    pub commands: &'a mut dyn CommandExecutor,
    /// Feedback-delivery collaborator.
    pub messages: &'a mut dyn MessageSink,
}

impl ResultApplier<'_> {
    /// Applies the decision for `actor` to the event behind `handle`.
    ///
    /// The cancellation flag is overwritten unconditionally — the decision
    /// is authoritative even when it resets a previously-set flag. Commands
    /// run strictly in sequence order; a failure is logged and the
    /// remaining invocations still run.
    pub fn apply(
        &mut self,
        decision: UsageDecision,
        actor: &ActorSession,
        handle: &mut dyn CancellationHandle,
    ) {
        let UsageDecision {
            should_cancel,
            commands,
            message,
        } = decision;

        handle.set_cancelled(should_cancel);

        for invocation in commands {
            let principal = if invocation.as_console {
                CommandPrincipal::Console
            } else {
                CommandPrincipal::Actor(actor.id)
            };
            if let Err(err) = self.commands.run(principal, &invocation.command) {
                warn!(
                    actor = %actor.name,
                    command = %invocation.command,
                    error = %err,
                    "command dispatch failed; continuing with remaining commands"
                );
            }
        }

        if let Some(text) = message {
            self.messages.deliver(actor, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::events::EventFlag;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Vec<(CommandPrincipal, String)>,
        fail_on: Option<usize>,
    }

    impl CommandExecutor for RecordingExecutor {
        fn run(&mut self, principal: CommandPrincipal, command: &str) -> Result<(), CommandError> {
            let index = self.calls.len();
            self.calls.push((principal, command.to_string()));
            if self.fail_on == Some(index) {
                return Err(CommandError::new("dispatch refused"));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Vec<(ActorId, String)>,
    }

    impl MessageSink for RecordingSink {
        fn deliver(&mut self, actor: &ActorSession, text: &str) {
            self.delivered.push((actor.id, text.to_string()));
        }
    }

    fn actor() -> ActorSession {
        ActorSession::new(ActorId(1), "Alice")
    }

    #[test]
    fn test_decision_is_authoritative_in_both_directions() {
        let mut executor = RecordingExecutor::default();
        let mut sink = RecordingSink::default();
        let actor = actor();

        // Cancels an uncancelled event.
        let mut flag = EventFlag::new();
        ResultApplier {
            commands: &mut executor,
            messages: &mut sink,
        }
        .apply(UsageDecision::deny(), &actor, &mut flag);
        assert!(flag.is_cancelled());

        // Resets a previously-cancelled event.
        let mut flag = EventFlag::cancelled();
        ResultApplier {
            commands: &mut executor,
            messages: &mut sink,
        }
        .apply(UsageDecision::allow(), &actor, &mut flag);
        assert!(!flag.is_cancelled());
    }

    #[test]
    fn test_commands_dispatch_in_sequence_order() {
        let mut executor = RecordingExecutor::default();
        let mut sink = RecordingSink::default();
        let actor = actor();
        let mut flag = EventFlag::new();

        let decision = UsageDecision {
            should_cancel: false,
            commands: vec![
                CommandInvocation::console("broadcast first"),
                CommandInvocation::actor("warp home"),
            ],
            message: None,
        };
        ResultApplier {
            commands: &mut executor,
            messages: &mut sink,
        }
        .apply(decision, &actor, &mut flag);

        assert_eq!(executor.calls.len(), 2);
        assert_eq!(
            executor.calls[0],
            (CommandPrincipal::Console, "broadcast first".to_string())
        );
        assert_eq!(
            executor.calls[1],
            (CommandPrincipal::Actor(ActorId(1)), "warp home".to_string())
        );
    }

    #[test]
    fn test_failing_command_does_not_abort_sequence() {
        let mut executor = RecordingExecutor {
            fail_on: Some(0),
            ..Default::default()
        };
        let mut sink = RecordingSink::default();
        let actor = actor();
        let mut flag = EventFlag::new();

        let decision = UsageDecision {
            should_cancel: false,
            commands: vec![
                CommandInvocation::console("this one fails"),
                CommandInvocation::console("this one still runs"),
            ],
            message: Some("done".to_string()),
        };
        ResultApplier {
            commands: &mut executor,
            messages: &mut sink,
        }
        .apply(decision, &actor, &mut flag);

        assert_eq!(executor.calls.len(), 2, "second command must still run");
        assert_eq!(
            sink.delivered,
            vec![(ActorId(1), "done".to_string())],
            "message must still be delivered after a command failure"
        );
    }

    #[test]
    fn test_absent_message_delivers_nothing() {
        let mut executor = RecordingExecutor::default();
        let mut sink = RecordingSink::default();
        let actor = actor();
        let mut flag = EventFlag::new();

        ResultApplier {
            commands: &mut executor,
            messages: &mut sink,
        }
        .apply(UsageDecision::allow(), &actor, &mut flag);

        assert!(sink.delivered.is_empty());
    }

    // Scenario: a cancelled use that pays out a diamond via the console and
    // tells the actor about it.
    #[test]
    fn test_cancel_command_and_message_together() {
        let mut executor = RecordingExecutor::default();
        let mut sink = RecordingSink::default();
        let actor = actor();
        let mut flag = EventFlag::new();

        let decision = UsageDecision {
            should_cancel: true,
            commands: vec![CommandInvocation::console("give diamond")],
            message: Some("You got a diamond!".to_string()),
        };
        ResultApplier {
            commands: &mut executor,
            messages: &mut sink,
        }
        .apply(decision, &actor, &mut flag);

        assert!(flag.is_cancelled());
        assert_eq!(
            executor.calls,
            vec![(CommandPrincipal::Console, "give diamond".to_string())]
        );
        assert_eq!(sink.delivered, vec![(ActorId(1), "You got a diamond!".to_string())]);
    }
}
