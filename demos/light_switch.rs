//! Light Switch Example
//!
//! The smallest useful machine: two states toggled by two events.
//! It showcases:
//! - Declaring a machine as plain data
//! - Entry actions mutating the shared context
//! - Driving the machine with bare event ids

use nested_fsm::{ActionResult, Event, State, StateMachine, Transition};

// ============================================================================
// 1. Context (Shared State)
// ============================================================================

/// In a real system this would drive an actual output pin.
struct Light {
    on: bool,
}

// ============================================================================
// 2. Ids
// ============================================================================

const ST_OFF: u16 = 0;
const ST_ON: u16 = 1;

const TURN_ON: u16 = 0;
const TURN_OFF: u16 = 1;

// ============================================================================
// 3. Actions
// ============================================================================

fn switch_on(_event: &Event, light: &mut Light) -> ActionResult {
    light.on = true;
    Ok(())
}

fn switch_off(_event: &Event, light: &mut Light) -> ActionResult {
    light.on = false;
    Ok(())
}

// ============================================================================
// 4. Main Loop
// ============================================================================

fn main() {
    let mut machine = StateMachine::new(
        vec![
            State::named(ST_OFF, "off").enter(switch_off),
            State::named(ST_ON, "on").enter(switch_on),
        ],
        vec![
            Transition::new(TURN_ON, ST_OFF, ST_ON),
            Transition::new(TURN_OFF, ST_ON, ST_OFF),
        ],
    );

    let mut light = Light { on: false };
    machine.init(&mut light).expect("machine declaration is valid");
    println!("light: {}", if light.on { "on" } else { "off" });

    for (name, event) in [("turn on", TURN_ON), ("turn on", TURN_ON), ("turn off", TURN_OFF)] {
        match machine.simple_run(event, &mut light) {
            Ok(()) => println!("{name}: light is {}", if light.on { "on" } else { "off" }),
            Err(error) => println!("{name}: ignored ({error})"),
        }
    }
}
