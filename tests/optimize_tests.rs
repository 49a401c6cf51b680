//! Tests for the lookup layout hints
//!
//! This test suite validates that the optimization hint changes only the
//! index layout, never the observable behavior:
//! - The same machine behaves identically under auto, time and space
//! - Slot promotion under auto keeps every accumulated transition
//! - Hierarchical dispatch is unaffected by per-machine hints

use nested_fsm::{
    Config, EventId, HistoryType, MachineError, OptimizeHint, State, StateId, StateMachine,
    Transition, STATE_ID_UPPER_BOUND,
};

const HINTS: [OptimizeHint; 3] = [OptimizeHint::Auto, OptimizeHint::Time, OptimizeHint::Space];

fn snapshot<C>(machine: &StateMachine<C>, depth: usize) -> Vec<StateId> {
    let mut buffer = vec![STATE_ID_UPPER_BOUND; depth];
    machine.take_snapshot(&mut buffer);
    let len = buffer
        .iter()
        .position(|&id| id == STATE_ID_UPPER_BOUND)
        .unwrap_or(depth);
    buffer.truncate(len);
    buffer
}

// ============================================================================
// Test 1: Fan-Out State (Promotion Boundary)
// ============================================================================

const ST_HUB: StateId = 0;
const EV_RESET: EventId = 6;

/// One source state with six outbound events: under the auto hint this
/// crosses the promotion threshold.
fn fanout_machine(hint: OptimizeHint) -> StateMachine<()> {
    let mut states = vec![State::named(ST_HUB, "hub")];
    let mut transitions = Vec::new();
    for k in 0..6u16 {
        states.push(State::new(k + 1));
        transitions.push(Transition::new(k, ST_HUB, k + 1));
        transitions.push(Transition::new(EV_RESET, k + 1, ST_HUB));
    }
    StateMachine::new(states, transitions).with_config(Config {
        optimize_hint: hint,
        ..Config::default()
    })
}

#[test]
fn every_layout_dispatches_identically() {
    for hint in HINTS {
        let mut machine = fanout_machine(hint);
        machine.init(&mut ()).unwrap();
        assert_eq!(snapshot(&machine, 2), vec![ST_HUB], "{hint:?}");

        for k in 0..6u16 {
            machine.simple_run(k, &mut ()).unwrap();
            assert_eq!(snapshot(&machine, 2), vec![k + 1], "{hint:?}");

            machine.simple_run(EV_RESET, &mut ()).unwrap();
            assert_eq!(snapshot(&machine, 2), vec![ST_HUB], "{hint:?}");
        }

        let status = machine.simple_run(99, &mut ());
        assert_eq!(status, Err(MachineError::UnknownEvent), "{hint:?}");
    }
}

#[test]
fn unhandled_event_is_unknown_under_every_layout() {
    for hint in HINTS {
        let mut machine = fanout_machine(hint);
        machine.init(&mut ()).unwrap();

        // EV_RESET is declared on the targets, not on the hub.
        let status = machine.simple_run(EV_RESET, &mut ());
        assert_eq!(status, Err(MachineError::UnknownEvent), "{hint:?}");
        assert_eq!(snapshot(&machine, 2), vec![ST_HUB], "{hint:?}");
    }
}

// ============================================================================
// Test 2: Hierarchy and History Under Every Layout
// ============================================================================

const ST_P: StateId = 0;
const ST_R: StateId = 1;
const ST_X: StateId = 0;
const ST_Y: StateId = 1;

const EV_OUT: EventId = 0;
const EV_BACK: EventId = 1;
const EV_STEP: EventId = 2;

fn layered_machine(hint: OptimizeHint) -> StateMachine<()> {
    let inner = StateMachine::new(
        vec![State::new(ST_X), State::new(ST_Y)],
        vec![Transition::new(EV_STEP, ST_X, ST_Y)],
    )
    .with_config(Config {
        optimize_hint: hint,
        ..Config::default()
    });
    StateMachine::new(
        vec![
            State::new(ST_P).with_sub_machine(inner),
            State::new(ST_R),
        ],
        vec![
            Transition::new(EV_OUT, ST_P, ST_R),
            Transition::new(EV_BACK, ST_R, ST_P).with_history(HistoryType::Shallow),
        ],
    )
    .with_config(Config {
        optimize_hint: hint,
        ..Config::default()
    })
}

#[test]
fn history_restore_is_layout_independent() {
    for hint in HINTS {
        let mut machine = layered_machine(hint);
        machine.init(&mut ()).unwrap();

        machine.simple_run(EV_STEP, &mut ()).unwrap();
        machine.simple_run(EV_OUT, &mut ()).unwrap();
        machine.simple_run(EV_BACK, &mut ()).unwrap();

        assert_eq!(snapshot(&machine, 3), vec![ST_P, ST_Y], "{hint:?}");
    }
}
