//! Deferred effects.
//!
//! Two kinds of deferral exist:
//! - [`Interaction`]s are produced during the decision phase, when each
//!   organism may only mutate itself, and applied serially right after it.
//! - [`PendingEvent`]s are scheduled for a future tick (gestation, pregnancy
//!   cooldown) and drained at the start of that tick by [`EventQueue`].

use std::collections::BTreeMap;

use super::organism::animal::Genome;

/// An effect one organism has on another during a tick.
///
/// Indices refer to the species lists as they were when the tick's views
/// were frozen.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// An animal bit a plant.
    Eat {
        /// Index of the eating animal.
        animal: usize,
        /// Index of the plant.
        plant: usize,
        /// Damage dealt to the plant.
        damage: f64,
    },
    /// An animal attacked another animal.
    Attack {
        /// Index of the attacker.
        attacker: usize,
        /// Index of the target.
        target: usize,
        /// Damage dealt to the target.
        damage: f64,
    },
    /// Two animals in contact want to mate.
    Mate {
        /// Index of the animal that initiated.
        initiator: usize,
        /// Index of its partner.
        partner: usize,
    },
    /// A female fertilizes herself.
    SelfFertilize {
        /// Index of the mother.
        mother: usize,
    },
    /// A plant is ready to drop a seed.
    Spread {
        /// Index of the parent plant.
        plant: usize,
    },
}

/// An event scheduled for a future tick.
#[derive(Debug, Clone)]
pub enum PendingEvent {
    /// Gestation ended.
    Birth {
        /// Identifier of the mother.
        mother_id: u64,
        /// Father's genome, captured at conception.
        father: Box<Genome>,
    },
    /// A mother may conceive again.
    CooldownEnds {
        /// Identifier of the mother.
        mother_id: u64,
    },
}

/// Events keyed by the tick on which they fire.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<u64, Vec<PendingEvent>>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` to fire on `fire_tick`.
    pub fn schedule(&mut self, fire_tick: u64, event: PendingEvent) {
        self.events.entry(fire_tick).or_default().push(event);
    }

    /// Removes and returns every event due on or before `now`, oldest first.
    /// Events sharing a tick keep their scheduling order.
    pub fn drain_due(&mut self, now: u64) -> Vec<PendingEvent> {
        let later = self.events.split_off(&now.saturating_add(1));
        std::mem::replace(&mut self.events, later)
            .into_values()
            .flatten()
            .collect()
    }

    /// Number of events still waiting.
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of waiting births.
    pub fn pending_births(&self) -> usize {
        self.events
            .values()
            .flatten()
            .filter(|e| matches!(e, PendingEvent::Birth { .. }))
            .count()
    }
}
