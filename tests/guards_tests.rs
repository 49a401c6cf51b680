//! Tests for guard predicates
//!
//! This test suite validates that guard conditions work correctly:
//! - A rejecting guard silently cancels the transition
//! - A permitting guard lets the transition fire
//! - Guards can inspect the event payload

use nested_fsm::{
    ActionResult, Event, EventId, State, StateId, StateMachine, Transition, STATE_ID_UPPER_BOUND,
};

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
// Test 1: Context-Driven Guard
// ============================================================================

const ST_IDLE: StateId = 0;
const ST_BUSY: StateId = 1;

const EV_START: EventId = 0;

#[derive(Default)]
struct GateContext {
    allow: bool,
    exits: u32,
    enters: u32,
}

fn gate(_event: &Event, ctx: &mut GateContext) -> bool {
    ctx.allow
}

fn exit_idle(_event: &Event, ctx: &mut GateContext) -> ActionResult {
    ctx.exits += 1;
    Ok(())
}

fn enter_busy(_event: &Event, ctx: &mut GateContext) -> ActionResult {
    ctx.enters += 1;
    Ok(())
}

fn gated_machine() -> StateMachine<GateContext> {
    StateMachine::new(
        vec![
            State::new(ST_IDLE).exit(exit_idle),
            State::new(ST_BUSY).enter(enter_busy),
        ],
        vec![Transition::new(EV_START, ST_IDLE, ST_BUSY).when(gate)],
    )
}

#[test]
fn rejecting_guard_is_a_silent_no_op() {
    let mut ctx = GateContext::default();
    let mut machine = gated_machine();
    machine.init(&mut ctx).unwrap();

    // The guard rejects, the call still succeeds.
    let status = machine.simple_run(EV_START, &mut ctx);
    assert_eq!(status, Ok(()));

    assert_eq!(snapshot(&machine, 2), vec![ST_IDLE]);
    assert_eq!(ctx.exits, 0);
    assert_eq!(ctx.enters, 0);
}

#[test]
fn permitting_guard_lets_the_transition_fire() {
    let mut ctx = GateContext {
        allow: true,
        ..GateContext::default()
    };
    let mut machine = gated_machine();
    machine.init(&mut ctx).unwrap();

    machine.simple_run(EV_START, &mut ctx).unwrap();

    assert_eq!(snapshot(&machine, 2), vec![ST_BUSY]);
    assert_eq!(ctx.exits, 1);
    assert_eq!(ctx.enters, 1);
}

#[test]
fn rejected_then_permitted() {
    let mut ctx = GateContext::default();
    let mut machine = gated_machine();
    machine.init(&mut ctx).unwrap();

    machine.simple_run(EV_START, &mut ctx).unwrap();
    assert_eq!(snapshot(&machine, 2), vec![ST_IDLE]);

    ctx.allow = true;
    machine.simple_run(EV_START, &mut ctx).unwrap();
    assert_eq!(snapshot(&machine, 2), vec![ST_BUSY]);
}

// ============================================================================
// Test 2: Payload-Driven Guard
// ============================================================================

const ST_LOW: StateId = 0;
const ST_HIGH: StateId = 1;

const EV_LEVEL: EventId = 0;

fn above_limit(event: &Event, _ctx: &mut ()) -> bool {
    event
        .payload
        .and_then(|payload| payload.downcast_ref::<u32>())
        .is_some_and(|&level| level > 10)
}

fn level_machine() -> StateMachine<()> {
    StateMachine::new(
        vec![State::new(ST_LOW), State::new(ST_HIGH)],
        vec![Transition::new(EV_LEVEL, ST_LOW, ST_HIGH).when(above_limit)],
    )
}

#[test]
fn guard_reads_the_event_payload() {
    let mut machine = level_machine();
    machine.init(&mut ()).unwrap();

    machine
        .run(&Event::with_payload(EV_LEVEL, &5u32), &mut ())
        .unwrap();
    assert_eq!(snapshot(&machine, 2), vec![ST_LOW]);

    machine
        .run(&Event::with_payload(EV_LEVEL, &42u32), &mut ())
        .unwrap();
    assert_eq!(snapshot(&machine, 2), vec![ST_HIGH]);
}

#[test]
fn guard_rejects_a_missing_payload() {
    let mut machine = level_machine();
    machine.init(&mut ()).unwrap();

    machine.simple_run(EV_LEVEL, &mut ()).unwrap();
    assert_eq!(snapshot(&machine, 2), vec![ST_LOW]);
}
