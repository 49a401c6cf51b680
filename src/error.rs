//! Status codes returned by the engine.

use thiserror::Error;

use crate::event::EventId;
use crate::state::StateId;

/// Errors reported by machine initialization and event dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The event is not handled by the current state or any reachable
    /// sub-machine. The machine is unchanged.
    #[error("event not handled by the active state or any sub-machine")]
    UnknownEvent,

    /// An exit or transition action reported a recoverable error. The
    /// transition was cancelled and the machine is unchanged.
    #[error("exit or transition action reported a recoverable error")]
    ActionFailed,

    /// Unrecoverable failure. The machine hierarchy has been torn down
    /// and must be re-initialized before further use.
    #[error("fatal error, machine hierarchy destroyed")]
    Fatal,

    /// A machine was declared with an empty state array.
    #[error("machine declares no states")]
    NoStateFound,

    /// A machine was declared with an empty transition array.
    #[error("machine declares no transitions")]
    NoTransitionFound,

    /// A state id is at or above the allowed bound, or a transition
    /// references a state that is not declared.
    #[error("state id {0:#06x} out of range")]
    StateIdOverflow(StateId),

    /// A transition event id is at or above the allowed bound.
    #[error("event id {0:#06x} out of range")]
    EventIdOverflow(EventId),

    /// Two transitions share the same source state and trigger event.
    #[error("duplicate transition for state {state:#06x} on event {event:#06x}")]
    DuplicateTransition { state: StateId, event: EventId },

    /// The machine was driven before `init`, or after termination.
    #[error("machine not initialized")]
    NotInitialized,

    /// A dispatch invariant was violated. This indicates a bug in the
    /// engine or in concurrent misuse of a machine.
    #[error("internal dispatch invariant violated")]
    InternalError,
}
