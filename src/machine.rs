//! The machine runtime: initialization, event dispatch, hierarchical
//! completion and teardown.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::MachineError;
use crate::event::{
    Event, EventId, EVENT_ID_COMPLETE, EVENT_ID_TERMINATE, EVENT_ID_UPPER_BOUND,
};
use crate::lookup::{CompleteEntry, Lookup, OptimizeHint, TransitionIdx};
use crate::state::{HistoryType, State, StateId, STATE_ID_FINAL, STATE_ID_UPPER_BOUND};
use crate::transition::{ActionError, ActionResult, DestructorFn, Transition};

/// Per-machine engine configuration.
///
/// Settings are not inherited: a sub-machine without an explicit config
/// runs with the defaults regardless of its parent.
pub struct Config<C> {
    /// Layout hint for the transition index.
    pub optimize_hint: OptimizeHint,
    /// Optional teardown hook, invoked when this machine is terminated.
    pub destructor: Option<DestructorFn<C>>,
}

impl<C> Default for Config<C> {
    fn default() -> Self {
        Self {
            optimize_hint: OptimizeHint::default(),
            destructor: None,
        }
    }
}

/// Runtime block owned by the engine, built during `init` and released on
/// termination.
struct MachineData {
    /// Highest user event id used by this machine's transitions. `None`
    /// when the machine declares only completion transitions, in which
    /// case every user event is delegated downward.
    max_event_id: Option<EventId>,
    lookup: Lookup,
    /// Completion transitions, indexed apart from the user event range.
    complete_transitions: Vec<CompleteEntry>,
    /// Maps a state id to its position in the declaration array.
    positions: Vec<Option<usize>>,
    /// Position of the active state. `None` until first activation.
    active: Option<usize>,
    /// Position of the last exited state, for history restore.
    history: Option<usize>,
}

impl MachineData {
    /// Map `(active state, event)` to a transition, if one is declared.
    fn find_transition(&self, active: StateId, event: EventId) -> Option<TransitionIdx> {
        if event == EVENT_ID_COMPLETE {
            return self
                .complete_transitions
                .iter()
                .find(|&&(from, _)| from == active)
                .map(|&(_, idx)| idx);
        }
        match self.max_event_id {
            Some(max) if event <= max => self.lookup.find(active, event),
            _ => None,
        }
    }
}

/// What a dispatch step did, as seen by the enclosing level.
enum Flow {
    /// The event was consumed at or below this machine.
    Done,
    /// This machine reached its final state; the enclosing state, if
    /// any, must receive the completion event.
    Completed,
}

/// A hierarchical state machine.
///
/// Declared as plain data: an array of states (the first one is the entry
/// state) and an array of transitions referencing states by id. After
/// [`init`](Self::init) the machine is driven by feeding events to
/// [`run`](Self::run) or [`simple_run`](Self::simple_run); the engine
/// keeps its dispatch structures in a private runtime block and releases
/// them when the machine terminates.
pub struct StateMachine<C> {
    /// The machine's states. The first entry is the entry state.
    pub states: Vec<State<C>>,
    /// The machine's transitions.
    pub transitions: Vec<Transition<C>>,
    /// Engine configuration for this machine.
    pub config: Config<C>,
    data: Option<MachineData>,
}

impl<C> StateMachine<C> {
    /// Declare a machine with default configuration.
    pub fn new(states: Vec<State<C>>, transitions: Vec<Transition<C>>) -> Self {
        Self {
            states,
            transitions,
            config: Config::default(),
            data: None,
        }
    }

    /// Replace the machine's configuration.
    pub fn with_config(mut self, config: Config<C>) -> Self {
        self.config = config;
        self
    }

    /// Validate the declaration, build the transition index and activate
    /// the entry state, recursively for every nested sub-machine.
    ///
    /// The entry state of each machine receives `on_enter` with the
    /// synthetic init event exactly once. Fails with a declaration error
    /// if the machine (or any sub-machine) has no states, no transitions,
    /// ids beyond the reserved bounds, transitions referencing undeclared
    /// states, or duplicate `(from, event)` pairs.
    pub fn init(&mut self, context: &mut C) -> Result<(), MachineError> {
        match self.init_machine(context) {
            Ok(()) => Ok(()),
            Err(MachineError::Fatal) => {
                self.terminate(context);
                Err(MachineError::Fatal)
            }
            Err(error) => Err(error),
        }
    }

    /// Feed an event into the machine hierarchy.
    ///
    /// The terminate event tears the hierarchy down and returns `Ok`.
    /// A completion event injected from outside is dropped as unknown:
    /// completion is generated by the engine only. Any fatal error
    /// destroys the hierarchy before it is reported.
    pub fn run(&mut self, event: &Event, context: &mut C) -> Result<(), MachineError> {
        if self.data.is_none() {
            return Err(MachineError::NotInitialized);
        }
        match event.id {
            EVENT_ID_TERMINATE => {
                fsm_log!("terminate requested");
                self.terminate(context);
                return Ok(());
            }
            EVENT_ID_COMPLETE => return Err(MachineError::UnknownEvent),
            _ => {}
        }
        match self.handle_event(event, context) {
            Ok(_) => Ok(()),
            Err(MachineError::Fatal) => {
                self.terminate(context);
                Err(MachineError::Fatal)
            }
            Err(error) => Err(error),
        }
    }

    /// Feed a bare event id into the machine hierarchy.
    pub fn simple_run(&mut self, event: EventId, context: &mut C) -> Result<(), MachineError> {
        self.run(&Event::new(event), context)
    }

    /// Write the active state chain, root to leaf, into the buffer.
    ///
    /// One id is written per hierarchy level; slots beyond the chain are
    /// left untouched, so callers can pre-fill the buffer with
    /// [`crate::STATE_ID_UPPER_BOUND`] as an end marker.
    pub fn take_snapshot(&self, snapshot: &mut [StateId]) {
        let mut machine = self;
        for slot in snapshot.iter_mut() {
            let Some(active) = machine.data.as_ref().and_then(|data| data.active) else {
                break;
            };
            let state = &machine.states[active];
            *slot = state.id;
            match state.sub_machine.as_deref() {
                Some(sub) => machine = sub,
                None => break,
            }
        }
    }

    /// Tear the machine hierarchy down: release every engine-owned
    /// buffer (children first) and invoke each machine's configured
    /// destructor. Driving the machine afterwards reports
    /// [`MachineError::NotInitialized`] until it is re-initialized.
    pub fn terminate(&mut self, context: &mut C) {
        for state in self.states.iter_mut() {
            if let Some(sub) = state.sub_machine.as_deref_mut() {
                sub.terminate(context);
            }
        }
        if self.data.take().is_some() {
            fsm_log!("machine terminated");
            if let Some(destructor) = self.config.destructor {
                destructor(context);
            }
        }
    }

    fn init_machine(&mut self, context: &mut C) -> Result<(), MachineError> {
        if self.states.is_empty() {
            return Err(MachineError::NoStateFound);
        }
        if self.transitions.is_empty() {
            return Err(MachineError::NoTransitionFound);
        }

        // Scan states, initializing nested machines depth-first.
        let mut max_state_id: StateId = 0;
        for state in self.states.iter_mut() {
            if state.id >= STATE_ID_UPPER_BOUND {
                return Err(MachineError::StateIdOverflow(state.id));
            }
            if let Some(sub) = state.sub_machine.as_deref_mut() {
                sub.init_machine(context)?;
            }
            max_state_id = max_state_id.max(state.id);
        }

        let mut positions = vec![None; max_state_id as usize + 1];
        for (position, state) in self.states.iter().enumerate() {
            positions[state.id as usize] = Some(position);
        }

        // Scan transitions and compute the user event bound.
        let mut max_event_id: Option<EventId> = None;
        for transition in self.transitions.iter() {
            if transition.from > max_state_id || positions[transition.from as usize].is_none() {
                return Err(MachineError::StateIdOverflow(transition.from));
            }
            let target_known = transition.to == STATE_ID_FINAL
                || (transition.to <= max_state_id && positions[transition.to as usize].is_some());
            if !target_known {
                return Err(MachineError::StateIdOverflow(transition.to));
            }
            if transition.event < EVENT_ID_UPPER_BOUND {
                max_event_id = Some(match max_event_id {
                    Some(max) => max.max(transition.event),
                    None => transition.event,
                });
            } else if transition.event != EVENT_ID_COMPLETE {
                return Err(MachineError::EventIdOverflow(transition.event));
            }
        }

        let mut complete_transitions = Vec::new();
        let lookup = Lookup::build(
            &self.transitions,
            self.config.optimize_hint,
            max_state_id,
            max_event_id,
            &mut complete_transitions,
        )?;

        self.data = Some(MachineData {
            max_event_id,
            lookup,
            complete_transitions,
            positions,
            active: None,
            history: None,
        });
        fsm_log!(
            "machine initialized: {} states, {} transitions",
            self.states.len(),
            self.transitions.len()
        );

        self.activate_entry(context)
    }

    /// Activate the entry state with the synthetic init event.
    fn activate_entry(&mut self, context: &mut C) -> Result<(), MachineError> {
        if let Some(on_enter) = self.states[0].on_enter {
            on_enter(&Event::INIT, context).map_err(|_| MachineError::Fatal)?;
        }
        fsm_log!("entry state {:#06x} activated", self.states[0].id);
        self.data_mut()?.active = Some(0);
        Ok(())
    }

    /// Restart at the entry state, recursively for composite entries.
    fn restart(&mut self, context: &mut C) -> Result<(), MachineError> {
        self.activate_entry(context)?;
        if let Some(sub) = self.states[0].sub_machine.as_deref_mut() {
            sub.restart(context)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, context: &mut C) -> Result<Flow, MachineError> {
        if self.data()?.active.is_none() {
            // Normally done by init; kept as a safety net.
            self.activate_entry(context)?;
        }
        let active = self.active_position()?;
        let active_id = self.states[active].id;

        let beyond_bound = match self.data()?.max_event_id {
            Some(max) => event.id > max,
            None => true,
        };
        if beyond_bound {
            // Not an event of this level; delegate to the active state's
            // sub-machine.
            let flow = match self.states[active].sub_machine.as_deref_mut() {
                Some(sub) => {
                    fsm_log!("delegating {:?} to sub-machine of state {:#06x}", event, active_id);
                    sub.handle_event(event, context)?
                }
                None => return Err(MachineError::UnknownEvent),
            };
            return match flow {
                Flow::Done => Ok(Flow::Done),
                Flow::Completed => self.trigger_complete(context),
            };
        }

        match self.data()?.find_transition(active_id, event.id) {
            Some(idx) => self.process_transition(idx, event, context),
            None => Err(MachineError::UnknownEvent),
        }
    }

    /// A sub-machine below the active state completed; fire the matching
    /// completion transition if one is declared, otherwise do nothing.
    fn trigger_complete(&mut self, context: &mut C) -> Result<Flow, MachineError> {
        let active = self.active_position()?;
        let active_id = self.states[active].id;
        match self.data()?.find_transition(active_id, EVENT_ID_COMPLETE) {
            Some(idx) => {
                fsm_log!("completion event on state {:#06x}", active_id);
                self.process_transition(idx, &Event::COMPLETE, context)
            }
            None => Ok(Flow::Done),
        }
    }

    fn process_transition(
        &mut self,
        idx: TransitionIdx,
        event: &Event,
        context: &mut C,
    ) -> Result<Flow, MachineError> {
        let (from, to, guard, action, history) = {
            let transition = &self.transitions[idx];
            (
                transition.from,
                transition.to,
                transition.guard,
                transition.action,
                transition.history,
            )
        };
        let active = self.active_position()?;
        if self.states[active].id != from {
            return Err(MachineError::InternalError);
        }

        if let Some(guard) = guard {
            if !guard(event, context) {
                fsm_log!("guard rejected {:?} in state {:#06x}", event, from);
                return Ok(Flow::Done);
            }
        }

        // The action runs before the source state is exited, so a failing
        // action keeps the machine where it was.
        if let Some(action) = action {
            let status = if to == STATE_ID_FINAL {
                action(event, context, &State::final_pseudo())
            } else {
                let target = self.position(to)?;
                action(event, context, &self.states[target])
            };
            recoverable(status)?;
        }

        if from == to {
            // Internal transition: neither exit nor enter fires.
            fsm_log!("internal transition on state {:#06x}", from);
            return Ok(Flow::Done);
        }

        if let Some(on_exit) = self.states[active].on_exit {
            recoverable(on_exit(event, context))?;
        }
        fsm_log!("state {:#06x} exited", from);
        self.data_mut()?.history = Some(active);
        // Leaving a composite state implicitly exits the active chain
        // below it: no callbacks fire, but every level records where it
        // was so a later re-entry with history can resume there.
        if let Some(sub) = self.states[active].sub_machine.as_deref_mut() {
            sub.record_history();
        }

        self.enter_state(to, history != HistoryType::None, history, event, context)
    }

    fn enter_state(
        &mut self,
        target: StateId,
        restore_history: bool,
        history: HistoryType,
        event: &Event,
        context: &mut C,
    ) -> Result<Flow, MachineError> {
        if target == STATE_ID_FINAL {
            // The enclosing level decides what completion means.
            fsm_log!("final state reached");
            return Ok(Flow::Completed);
        }

        let position = self.position(target)?;
        if let Some(on_enter) = self.states[position].on_enter {
            on_enter(event, context).map_err(|_| MachineError::Fatal)?;
        }
        self.data_mut()?.active = Some(position);
        fsm_log!("state {:#06x} entered", target);

        let Some(sub) = self.states[position].sub_machine.as_deref_mut() else {
            return Ok(Flow::Done);
        };
        match sub.data()?.history {
            Some(recorded) if restore_history => {
                // Shallow restore covers exactly one level; deep keeps
                // restoring below.
                let (deeper_restore, deeper_history) = match history {
                    HistoryType::Deep => (true, HistoryType::Deep),
                    _ => (false, HistoryType::None),
                };
                let recorded_id = sub.states[recorded].id;
                fsm_log!("restoring history state {:#06x}", recorded_id);
                sub.enter_state(recorded_id, deeper_restore, deeper_history, event, context)?;
            }
            _ => sub.restart(context)?,
        }
        Ok(Flow::Done)
    }

    /// Snapshot the active state as the history state, down the whole
    /// active chain.
    fn record_history(&mut self) {
        let active = match self.data.as_mut() {
            Some(data) => {
                data.history = data.active;
                data.active
            }
            None => None,
        };
        if let Some(active) = active {
            if let Some(sub) = self.states[active].sub_machine.as_deref_mut() {
                sub.record_history();
            }
        }
    }

    fn data(&self) -> Result<&MachineData, MachineError> {
        self.data.as_ref().ok_or(MachineError::NotInitialized)
    }

    fn data_mut(&mut self) -> Result<&mut MachineData, MachineError> {
        self.data.as_mut().ok_or(MachineError::NotInitialized)
    }

    fn active_position(&self) -> Result<usize, MachineError> {
        self.data()?.active.ok_or(MachineError::InternalError)
    }

    fn position(&self, state: StateId) -> Result<usize, MachineError> {
        self.data()?
            .positions
            .get(state as usize)
            .copied()
            .flatten()
            .ok_or(MachineError::InternalError)
    }
}

fn recoverable(status: ActionResult) -> Result<(), MachineError> {
    status.map_err(|error| match error {
        ActionError::Recoverable => MachineError::ActionFailed,
        ActionError::Fatal => MachineError::Fatal,
    })
}
