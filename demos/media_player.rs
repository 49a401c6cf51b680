//! Media Player Example
//!
//! A two-level machine demonstrating the hierarchical features:
//! - A composite state with a nested sub-machine
//! - Event delegation from the root to the active sub-machine
//! - Completion: ejecting finishes playback and powers down
//! - Shallow history: powering back on resumes where playback stopped
//!
//! Run with `cargo run --example media_player --features logging` and set
//! `RUST_LOG=debug` to watch the engine's dispatch decisions.

use nested_fsm::{
    ActionResult, Event, HistoryType, State, StateMachine, Transition, EVENT_ID_COMPLETE,
    STATE_ID_FINAL, STATE_ID_UPPER_BOUND,
};

// ============================================================================
// 1. Context (Shared State)
// ============================================================================

#[derive(Default)]
struct Player {
    position_secs: u32,
}

// ============================================================================
// 2. Ids
// ============================================================================

// Root states
const ST_IDLE: u16 = 0;
const ST_ACTIVE: u16 = 1;

// Playback states
const ST_PLAYING: u16 = 0;
const ST_PAUSED: u16 = 1;

// Root events
const EV_POWER_ON: u16 = 0;
const EV_POWER_OFF: u16 = 1;

// Playback events
const EV_PAUSE: u16 = 2;
const EV_PLAY: u16 = 3;
const EV_EJECT: u16 = 4;

// ============================================================================
// 3. Actions
// ============================================================================

fn enter_idle(_event: &Event, _player: &mut Player) -> ActionResult {
    println!("⏻  powered down");
    Ok(())
}

fn enter_playing(_event: &Event, player: &mut Player) -> ActionResult {
    println!("▶  playing at {}s", player.position_secs);
    Ok(())
}

fn exit_playing(_event: &Event, player: &mut Player) -> ActionResult {
    player.position_secs += 30;
    Ok(())
}

fn enter_paused(_event: &Event, player: &mut Player) -> ActionResult {
    println!("⏸  paused at {}s", player.position_secs);
    Ok(())
}

// ============================================================================
// 4. Machine Definition
// ============================================================================

fn player_machine() -> StateMachine<Player> {
    let playback = StateMachine::new(
        vec![
            State::named(ST_PLAYING, "playing")
                .enter(enter_playing)
                .exit(exit_playing),
            State::named(ST_PAUSED, "paused").enter(enter_paused),
        ],
        vec![
            Transition::new(EV_PAUSE, ST_PLAYING, ST_PAUSED),
            Transition::new(EV_PLAY, ST_PAUSED, ST_PLAYING),
            Transition::new(EV_EJECT, ST_PLAYING, STATE_ID_FINAL),
            Transition::new(EV_EJECT, ST_PAUSED, STATE_ID_FINAL),
        ],
    );

    StateMachine::new(
        vec![
            State::named(ST_IDLE, "idle").enter(enter_idle),
            State::named(ST_ACTIVE, "active").with_sub_machine(playback),
        ],
        vec![
            // Powering on resumes playback where it stopped.
            Transition::new(EV_POWER_ON, ST_IDLE, ST_ACTIVE).with_history(HistoryType::Shallow),
            Transition::new(EV_POWER_OFF, ST_ACTIVE, ST_IDLE),
            // Ejecting completes playback and powers the player down.
            Transition::new(EVENT_ID_COMPLETE, ST_ACTIVE, ST_IDLE),
        ],
    )
}

fn print_chain(machine: &StateMachine<Player>) {
    let mut chain = [STATE_ID_UPPER_BOUND; 4];
    machine.take_snapshot(&mut chain);
    let ids: Vec<String> = chain
        .iter()
        .take_while(|&&id| id != STATE_ID_UPPER_BOUND)
        .map(|id| format!("{id}"))
        .collect();
    println!("   active chain: [{}]", ids.join(" -> "));
}

// ============================================================================
// 5. Main Loop
// ============================================================================

fn main() {
    env_logger::init();

    let mut player = Player::default();
    let mut machine = player_machine();
    machine.init(&mut player).expect("machine declaration is valid");
    print_chain(&machine);

    let script = [
        ("power on", EV_POWER_ON),
        ("pause", EV_PAUSE),
        ("power off", EV_POWER_OFF),
        ("power on (resumes paused)", EV_POWER_ON),
        ("play", EV_PLAY),
        ("eject", EV_EJECT),
    ];

    for (name, event) in script {
        println!("-- {name}");
        match machine.simple_run(event, &mut player) {
            Ok(()) => print_chain(&machine),
            Err(error) => println!("   ignored: {error}"),
        }
    }
}
