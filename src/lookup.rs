//! Per-machine transition index structures.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::MachineError;
use crate::event::{EventId, EVENT_ID_COMPLETE};
use crate::state::StateId;
use crate::transition::Transition;

/// Hints the engine how to lay out a machine's transition index.
///
/// The hint applies per machine and is not inherited by sub-machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizeHint {
    /// Start every state with a transition list and promote it to a
    /// densely indexed row once the state accumulates more than four
    /// outbound transitions. The recommended setting for most machines.
    #[default]
    Auto,
    /// Optimize lookup by time: one dense `(event × state)` table,
    /// O(1) lookup. Allocates `(max_event_id + 1) * (max_state_id + 1)`
    /// cells per machine — event ids are global to the hierarchy, so
    /// avoid this under memory constraints.
    Time,
    /// Optimize lookup by space: per-state transition lists, O(k)
    /// lookup over a state's outbound transitions, never promoted.
    Space,
}

pub(crate) type TransitionIdx = usize;

/// Index entry for the completion pseudo-event. Kept outside the regular
/// index because its id sits above the user event range.
pub(crate) type CompleteEntry = (StateId, TransitionIdx);

/// Outbound transitions per source state before a slot is promoted to a
/// dense row under [`OptimizeHint::Auto`].
const PROMOTE_THRESHOLD: usize = 4;

/// Lookup slot of a single source state under `Auto`/`Space` layout.
pub(crate) enum Slot {
    /// Linearly scanned `(event, transition)` pairs.
    List(Vec<(EventId, TransitionIdx)>),
    /// Row indexed by event id.
    Dense(Vec<Option<TransitionIdx>>),
}

impl Slot {
    fn insert(
        &mut self,
        state: StateId,
        event: EventId,
        idx: TransitionIdx,
        auto: bool,
        row_len: usize,
    ) -> Result<(), MachineError> {
        let duplicate = MachineError::DuplicateTransition { state, event };
        match self {
            Slot::Dense(row) => {
                let cell = &mut row[event as usize];
                if cell.is_some() {
                    return Err(duplicate);
                }
                *cell = Some(idx);
            }
            Slot::List(list) => {
                if list.iter().any(|&(seen, _)| seen == event) {
                    return Err(duplicate);
                }
                if auto && list.len() >= PROMOTE_THRESHOLD {
                    // Promotion moves every accumulated entry to the row.
                    let mut row = vec![None; row_len];
                    for &(seen, entry) in list.iter() {
                        row[seen as usize] = Some(entry);
                    }
                    row[event as usize] = Some(idx);
                    fsm_log!("state {:#06x}: promoting transition list to dense row", state);
                    *self = Slot::Dense(row);
                } else {
                    list.push((event, idx));
                }
            }
        }
        Ok(())
    }
}

/// A machine's transition index, laid out per its effective hint.
pub(crate) enum Lookup {
    /// Rows indexed by event id, cells by source state id.
    Table(Vec<Vec<Option<TransitionIdx>>>),
    /// Slots indexed by source state id.
    Slots(Vec<Slot>),
}

impl Lookup {
    /// Index every declared transition. Completion transitions are routed
    /// to the side list; duplicate `(from, event)` pairs are rejected.
    pub(crate) fn build<C>(
        transitions: &[Transition<C>],
        hint: OptimizeHint,
        max_state_id: StateId,
        max_event_id: Option<EventId>,
        complete: &mut Vec<CompleteEntry>,
    ) -> Result<Self, MachineError> {
        let states = max_state_id as usize + 1;
        let events = max_event_id.map_or(0, |id| id as usize + 1);

        let mut lookup = match hint {
            OptimizeHint::Time => Lookup::Table(vec![vec![None; states]; events]),
            _ => Lookup::Slots((0..states).map(|_| Slot::List(Vec::new())).collect()),
        };

        for (idx, transition) in transitions.iter().enumerate() {
            if transition.event == EVENT_ID_COMPLETE {
                if complete.iter().any(|&(from, _)| from == transition.from) {
                    return Err(MachineError::DuplicateTransition {
                        state: transition.from,
                        event: transition.event,
                    });
                }
                complete.push((transition.from, idx));
                continue;
            }
            match &mut lookup {
                Lookup::Table(table) => {
                    let cell = &mut table[transition.event as usize][transition.from as usize];
                    if cell.is_some() {
                        return Err(MachineError::DuplicateTransition {
                            state: transition.from,
                            event: transition.event,
                        });
                    }
                    *cell = Some(idx);
                }
                Lookup::Slots(slots) => {
                    slots[transition.from as usize].insert(
                        transition.from,
                        transition.event,
                        idx,
                        hint == OptimizeHint::Auto,
                        events,
                    )?;
                }
            }
        }
        Ok(lookup)
    }

    /// Find the transition triggered by `event` out of `state`, if any.
    pub(crate) fn find(&self, state: StateId, event: EventId) -> Option<TransitionIdx> {
        match self {
            Lookup::Table(table) => table.get(event as usize)?.get(state as usize).copied().flatten(),
            Lookup::Slots(slots) => match slots.get(state as usize)? {
                Slot::Dense(row) => row.get(event as usize).copied().flatten(),
                Slot::List(list) => list
                    .iter()
                    .find(|&&(seen, _)| seen == event)
                    .map(|&(_, idx)| idx),
            },
        }
    }
}
