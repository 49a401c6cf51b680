//! Transition declarations and the callback contracts.

use crate::event::{Event, EventId};
use crate::state::{HistoryType, State, StateId};

/// Error reported by a state or transition callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// The callback failed but the machine can continue. An exit or
    /// transition callback reporting this cancels the transition and
    /// leaves the active state untouched; an enter callback reporting
    /// this is escalated to a fatal error.
    Recoverable,
    /// The machine must shut down immediately.
    Fatal,
}

/// Result of a state or transition callback.
pub type ActionResult = Result<(), ActionError>;

/// Guard predicate evaluated before a transition fires.
///
/// Returning `false` silently cancels the transition; the dispatch call
/// still reports success.
pub type GuardFn<C> = fn(&Event, &mut C) -> bool;

/// Enter/exit callback attached to a state.
pub type ActionFn<C> = fn(&Event, &mut C) -> ActionResult;

/// Transition action. Runs after the guard but before the source state is
/// exited, so a failure here keeps the machine where it was. The target
/// state is passed in for inspection.
pub type TransitionFn<C> = fn(&Event, &mut C, &State<C>) -> ActionResult;

/// Teardown hook invoked when a machine is terminated.
pub type DestructorFn<C> = fn(&mut C);

/// A transition declaration: an event moves the machine from one state to
/// another, optionally guarded, optionally running an action, optionally
/// restoring sub-machine history on arrival.
///
/// States are referenced by id. At most one transition may exist per
/// `(from, event)` pair; duplicates are rejected at initialization.
pub struct Transition<C> {
    /// Id of the event that triggers this transition.
    pub event: EventId,
    /// Source state id.
    pub from: StateId,
    /// Target state id. [`crate::STATE_ID_FINAL`] completes the machine.
    pub to: StateId,
    /// Optional guard; `false` cancels the transition.
    pub guard: Option<GuardFn<C>>,
    /// Optional action, run before the source state is exited.
    pub action: Option<TransitionFn<C>>,
    /// History handling when the target is a composite state.
    pub history: HistoryType,
}

impl<C> Transition<C> {
    /// A plain transition without guard, action or history restore.
    pub fn new(event: EventId, from: StateId, to: StateId) -> Self {
        Self {
            event,
            from,
            to,
            guard: None,
            action: None,
            history: HistoryType::None,
        }
    }

    /// Attach a guard predicate.
    pub fn when(mut self, guard: GuardFn<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach a transition action.
    pub fn with_action(mut self, action: TransitionFn<C>) -> Self {
        self.action = Some(action);
        self
    }

    /// Set the history handling for composite targets.
    pub fn with_history(mut self, history: HistoryType) -> Self {
        self.history = history;
        self
    }
}
