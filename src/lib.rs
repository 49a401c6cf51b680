//! # nested-fsm: Hierarchical Event-Driven State Machine Runtime
//!
//! A lightweight runtime engine for hierarchical finite state machines,
//! designed for embedded systems (no-std compatible) and event-driven
//! applications.
//!
//! ## Design Philosophy
//!
//! - **Declarative:** A machine is plain data — an array of states and an
//!   array of transitions. The engine builds its own dispatch structures
//!   at initialization and owns nothing else.
//! - **Hierarchical:** Any state may carry a nested sub-machine. Events
//!   cascade top-down; completion of a sub-machine cascades bottom-up as a
//!   synthetic event.
//! - **Static Dispatch:** All callbacks are plain `fn` pointers. No `Box`,
//!   no `dyn`, no hidden allocation in the hot path.
//! - **Tunable Lookup:** Transition dispatch can be optimized for time
//!   (dense table), space (per-state lists), or left to the engine to
//!   decide per state.
//!
//! ## Quick Start
//!
//! ```rust
//! use nested_fsm::{ActionResult, Event, State, StateMachine, Transition};
//!
//! // Shared state mutated by the machine's callbacks
//! struct Light {
//!     on: bool,
//! }
//!
//! const ST_OFF: u16 = 0;
//! const ST_ON: u16 = 1;
//!
//! const TURN_ON: u16 = 0;
//! const TURN_OFF: u16 = 1;
//!
//! fn light_on(_event: &Event, light: &mut Light) -> ActionResult {
//!     light.on = true;
//!     Ok(())
//! }
//!
//! fn light_off(_event: &Event, light: &mut Light) -> ActionResult {
//!     light.on = false;
//!     Ok(())
//! }
//!
//! let mut machine = StateMachine::new(
//!     vec![
//!         State::new(ST_OFF).enter(light_off),
//!         State::new(ST_ON).enter(light_on),
//!     ],
//!     vec![
//!         Transition::new(TURN_ON, ST_OFF, ST_ON),
//!         Transition::new(TURN_OFF, ST_ON, ST_OFF),
//!     ],
//! );
//!
//! let mut light = Light { on: true };
//!
//! // Initialization activates the first declared state
//! machine.init(&mut light).unwrap();
//! assert!(!light.on);
//!
//! machine.simple_run(TURN_ON, &mut light).unwrap();
//! assert!(light.on);
//!
//! machine.simple_run(TURN_OFF, &mut light).unwrap();
//! assert!(!light.on);
//! ```
//!
//! ## Features
//!
//! - **Nested Sub-Machines:** Composite states delegate unhandled events
//!   to their sub-machine; a sub-machine reaching its final state fires a
//!   completion event on the enclosing state.
//! - **History Restore:** Transitions may re-enter a composite state at
//!   its last active sub-state, one level deep (shallow) or through the
//!   whole chain (deep).
//! - **Guards and Actions:** Transitions carry an optional guard predicate
//!   and an action that runs before the source state is exited.
//! - **Lifecycle Hooks:** Per-state `on_enter` / `on_exit` callbacks with
//!   recoverable and fatal error reporting.
//! - **Snapshots:** The active root→leaf state chain can be captured into
//!   a caller-supplied buffer at any time.
//!
//! ## Examples
//!
//! See the `demos/` directory for complete examples:
//! - `light_switch.rs` - minimal two-state toggle
//! - `media_player.rs` - nested machine with history restore and logging

#![no_std]

extern crate alloc;

// Logging support (optional). Expands to nothing when the feature is off.
#[cfg(feature = "logging")]
macro_rules! fsm_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! fsm_log {
    ($($arg:tt)*) => {};
}

mod error;
mod event;
mod lookup;
mod machine;
mod state;
mod transition;

pub use error::MachineError;
pub use event::{
    Event, EventId, EVENT_ID_COMPLETE, EVENT_ID_INIT, EVENT_ID_TERMINATE, EVENT_ID_UPPER_BOUND,
};
pub use lookup::OptimizeHint;
pub use machine::{Config, StateMachine};
pub use state::{HistoryType, State, StateId, STATE_ID_FINAL, STATE_ID_UPPER_BOUND};
pub use transition::{
    ActionError, ActionFn, ActionResult, DestructorFn, GuardFn, Transition, TransitionFn,
};
