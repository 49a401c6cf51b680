//! State declarations and the reserved state identifier space.

use alloc::boxed::Box;

use crate::machine::StateMachine;
use crate::transition::ActionFn;

/// Identifies a state within a single machine.
///
/// Application state ids must be contiguous integers starting at zero
/// within their machine; different machines in one hierarchy reuse the
/// same id range independently.
pub type StateId = u16;

/// Reserved id for the final pseudo-state.
///
/// A transition targeting this id completes the machine: in a sub-machine
/// it raises the completion event on the enclosing state, in the root it
/// simply ends dispatch for that event.
pub const STATE_ID_FINAL: StateId = 0xFFFE;

/// Application state ids must be strictly below this bound; anything at or
/// above it fails machine initialization.
pub const STATE_ID_UPPER_BOUND: StateId = 0xF000;

/// Controls whether entering a composite state resumes its sub-machine at
/// the last active sub-state or restarts it at the entry state.
///
/// The setting lives on the transition, not the state: two transitions
/// into the same composite state may differ in how they treat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryType {
    /// Do not restore history; the sub-machine restarts at its entry state.
    #[default]
    None,
    /// Restore the last active sub-state one level deep. Sub-machines
    /// nested below the restored state restart at their entry states.
    Shallow,
    /// Restore the last active sub-state on every level below the target.
    Deep,
}

/// A state declaration.
///
/// The first state in a machine's state array is the machine's entry
/// state, activated automatically on initialization. A state owning a
/// sub-machine is a composite state: events the machine does not handle
/// itself are delegated to the sub-machine while the state is active.
pub struct State<C> {
    /// State id, unique within the owning machine.
    pub id: StateId,
    /// Optional name, useful when debugging the machine.
    pub name: Option<&'static str>,
    /// Optional nested sub-machine, making this a composite state.
    pub sub_machine: Option<Box<StateMachine<C>>>,
    /// Called when the state is entered. A failure here is fatal.
    pub on_enter: Option<ActionFn<C>>,
    /// Called when the state is exited. A recoverable failure cancels the
    /// transition and keeps the state active.
    pub on_exit: Option<ActionFn<C>>,
}

impl<C> State<C> {
    /// An anonymous state without callbacks.
    pub fn new(id: StateId) -> Self {
        Self {
            id,
            name: None,
            sub_machine: None,
            on_enter: None,
            on_exit: None,
        }
    }

    /// A named state without callbacks.
    pub fn named(id: StateId, name: &'static str) -> Self {
        Self {
            name: Some(name),
            ..Self::new(id)
        }
    }

    /// Attach an enter callback.
    pub fn enter(mut self, on_enter: ActionFn<C>) -> Self {
        self.on_enter = Some(on_enter);
        self
    }

    /// Attach an exit callback.
    pub fn exit(mut self, on_exit: ActionFn<C>) -> Self {
        self.on_exit = Some(on_exit);
        self
    }

    /// Nest a sub-machine under this state.
    pub fn with_sub_machine(mut self, sub_machine: StateMachine<C>) -> Self {
        self.sub_machine = Some(Box::new(sub_machine));
        self
    }

    /// The final pseudo-state handed to transition actions whose target
    /// completes the machine.
    pub(crate) fn final_pseudo() -> Self {
        Self::named(STATE_ID_FINAL, "final")
    }
}
