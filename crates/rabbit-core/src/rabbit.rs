//! Rabbits
//!
//! A rabbit is a simple creature that likes to move around a forest. You can
//! spot it, try to catch it, tag it, or accidentally kill it by deleting the
//! directory it is sitting in.
//!
//! Every change of state goes through the rabbit transition table. The rabbit
//! itself only decides whether an edge's guard passes and what the edge does.
//!
//! ```text
//!              Wait (idle elapsed)
//!              ┌────────┐
//!              ▼        │
//!  ──────▶ Wandering ───┘──Spot──▶ Spotted ──Wait──▶ Fleeing
//!              ▲                                      │
//!              └──────────Wait (flee elapsed)─────────┘
//!
//!  Wandering/Spotted/Fleeing ──Catch──▶ Caught
//!  Wandering/Spotted/Fleeing ──Kill───▶ Dead
//!  Wandering/Spotted/Fleeing ──Flee───▶ Fleeing
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::location::Location;
use crate::machine::{Edge, Machine, Stateful};
use crate::random;
use crate::timestamp::Timestamp;

/// How long a wandering rabbit stays in one place.
pub const DEFAULT_IDLE_DURATION: Duration = Duration::from_secs(5 * 60);

/// How long a spotted rabbit keeps fleeing before it settles down again.
pub const DEFAULT_FLEE_DURATION: Duration = Duration::from_secs(5);

/// Where a rabbit is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RabbitState {
    /// Initial state: idling, now and then hopping somewhere nearby
    Wandering,
    /// Just seen. Lasts exactly one wakeup.
    Spotted,
    /// Running from whoever spotted it
    Fleeing,
    /// Caught by the player; out of play
    Caught,
    /// Its location stopped existing; out of play
    Dead,
}

impl RabbitState {
    /// True for every state that keeps the rabbit in the forest.
    pub fn is_playing(self) -> bool {
        matches!(
            self,
            RabbitState::Wandering | RabbitState::Spotted | RabbitState::Fleeing
        )
    }
}

/// Things that can happen to a rabbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RabbitAction {
    /// Time passes
    Wait,
    /// Someone is looking right at it
    Spot,
    /// Something scared it off
    Flee,
    /// Someone grabs for it
    Catch,
    /// The ground vanished underneath it
    Kill,
}

pub type RabbitMachine = Machine<RabbitState, RabbitAction>;

/// Builds the rabbit transition table.
pub fn rabbit_machine() -> RabbitMachine {
    use RabbitAction::*;
    use RabbitState::*;

    let mut machine = RabbitMachine::new();
    machine
        .add_transition(Wandering, Wait, Wandering)
        .add_transition(Wandering, Spot, Spotted)
        .add_transition(Spotted, Wait, Fleeing)
        .add_transition(Fleeing, Wait, Wandering);

    for from in [Wandering, Spotted, Fleeing] {
        machine
            .add_transition(from, Kill, Dead)
            .add_transition(from, Catch, Caught)
            .add_transition(from, Flee, Fleeing);
    }
    machine
}

/// What a rabbit needs from the forest it lives in.
pub trait Habitat {
    /// True if `loc` still exists.
    fn location_exists(&self, loc: &Location) -> bool;

    /// A location a short walk away from `loc`, different from it whenever
    /// the terrain allows a move at all.
    fn nearby_location(&mut self, loc: &Location, now: Timestamp, rng: &mut dyn RngCore)
        -> Location;

    /// Somewhere far off, preferably not `avoid`.
    fn faraway_location(&mut self, avoid: Option<&Location>, rng: &mut dyn RngCore) -> Location;
}

/// Everything a rabbit's guards and effects may consult during one
/// interaction: the shared transition table, the habitat, a random source and
/// the current time.
pub struct Surroundings<'a> {
    pub machine: &'a RabbitMachine,
    pub home: &'a mut dyn Habitat,
    pub rng: &'a mut dyn RngCore,
    pub now: Timestamp,
}

/// Chance of catching a rabbit `elapsed` after it was spotted.
///
/// Falls linearly from 1 at the moment of spotting to 0 once the flee
/// duration has passed, and stays at 0 after that. A zero flee duration
/// means the rabbit can only be caught at the very instant it is spotted.
pub fn catch_probability(elapsed: Duration, flee: Duration) -> f64 {
    if flee.is_zero() {
        return if elapsed.is_zero() { 1.0 } else { 0.0 };
    }
    let fraction = elapsed.as_secs_f64() / flee.as_secs_f64();
    (1.0 - fraction).clamp(0.0, 1.0)
}

/// A rabbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rabbit {
    /// Current location. `None` once the rabbit has left play.
    location: Option<Location>,
    /// A name the player gave it
    tag: Option<String>,
    /// The location it moved away from most recently
    last_location: Option<Location>,
    /// When it last moved
    last_moved: Timestamp,
    /// When it was spotted, for as long as it is still on the run. Cleared
    /// once it settles down again.
    last_spotted: Option<Timestamp>,
    state: RabbitState,
    idle_duration: Duration,
    flee_duration: Duration,
}

impl Rabbit {
    /// A wandering rabbit at `location` with default timers.
    pub fn new(location: Location, now: Timestamp) -> Self {
        Self {
            location: Some(location),
            tag: None,
            last_location: None,
            last_moved: now,
            last_spotted: None,
            state: RabbitState::Wandering,
            idle_duration: DEFAULT_IDLE_DURATION,
            flee_duration: DEFAULT_FLEE_DURATION,
        }
    }

    /// A new rabbit placed somewhere far off in `home`.
    pub fn spawn(home: &mut dyn Habitat, rng: &mut dyn RngCore, now: Timestamp) -> Self {
        Self::new(home.faraway_location(None, rng), now)
    }

    /// Overrides the idle and flee timers.
    pub fn with_durations(mut self, idle: Duration, flee: Duration) -> Self {
        self.idle_duration = idle;
        self.flee_duration = flee;
        self
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn last_location(&self) -> Option<&Location> {
        self.last_location.as_ref()
    }

    pub fn last_moved(&self) -> Timestamp {
        self.last_moved
    }

    pub fn last_spotted(&self) -> Option<Timestamp> {
        self.last_spotted
    }

    pub fn state(&self) -> RabbitState {
        self.state
    }

    pub fn idle_duration(&self) -> Duration {
        self.idle_duration
    }

    pub fn flee_duration(&self) -> Duration {
        self.flee_duration
    }

    pub fn is_at(&self, loc: &Location) -> bool {
        self.location.as_ref() == Some(loc)
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn was_spotted(&self) -> bool {
        self.last_spotted.is_some()
    }

    /// True during the single wakeup after being spotted.
    pub fn just_spotted(&self) -> bool {
        self.state == RabbitState::Spotted
    }

    pub fn is_caught(&self) -> bool {
        self.state == RabbitState::Caught
    }

    pub fn is_dead(&self) -> bool {
        self.state == RabbitState::Dead
    }

    /// Lets time catch up with the rabbit: it dies if its location vanished,
    /// otherwise it gets one chance to act on its idle or flee timer.
    pub fn wake_up(&mut self, ctx: &mut Surroundings<'_>) {
        let machine = ctx.machine;
        let vanished = self
            .location
            .as_ref()
            .is_some_and(|loc| !ctx.home.location_exists(loc));

        if vanished {
            machine.perform(self, RabbitAction::Kill, ctx);
        } else {
            machine.perform(self, RabbitAction::Wait, ctx);
        }
    }

    /// Someone looked around `loc`. Wakes the rabbit, then, if it is sitting
    /// right there, it gets spotted. Returns whether it was spotted.
    pub fn disturbance_at(&mut self, loc: &Location, ctx: &mut Surroundings<'_>) -> bool {
        self.wake_up(ctx);
        if !self.is_at(loc) {
            return false;
        }
        let machine = ctx.machine;
        machine.perform(self, RabbitAction::Spot, ctx)
    }

    /// Grab for the rabbit at `loc`.
    ///
    /// Returns `false` if it is not (or no longer) there. A failed grab
    /// scares the rabbit off to somewhere far away.
    pub fn try_catch(&mut self, loc: &Location, ctx: &mut Surroundings<'_>) -> bool {
        self.wake_up(ctx);
        if !self.is_at(loc) {
            return false;
        }

        let machine = ctx.machine;
        if machine.perform(self, RabbitAction::Catch, ctx) {
            return true;
        }
        machine.perform(self, RabbitAction::Flee, ctx);
        false
    }

    /// Tag the rabbit at `loc`. Always works if it is there; the tagged
    /// rabbit bolts right after. An empty tag leaves it unnamed.
    pub fn try_tag(&mut self, loc: &Location, tag: &str, ctx: &mut Surroundings<'_>) -> bool {
        self.wake_up(ctx);
        if !self.is_at(loc) {
            return false;
        }

        self.tag = Some(tag.to_string()).filter(|tag| !tag.is_empty());
        let machine = ctx.machine;
        machine.perform(self, RabbitAction::Flee, ctx);
        true
    }

    fn move_to(&mut self, destination: Location, now: Timestamp) {
        self.last_location = self.location.replace(destination);
        self.last_moved = now;
    }

    fn leave_play(&mut self) {
        self.last_location = self.location.take();
    }

    /// Time since it was spotted on its current run. A rabbit that is not
    /// on the run has not been warned, so that counts as no time at all,
    /// whether it was never seen or has since settled down.
    fn since_spotted(&self, now: Timestamp) -> Duration {
        now.since(self.last_spotted.unwrap_or(now))
    }
}

impl<'a> Stateful<Surroundings<'a>> for Rabbit {
    type State = RabbitState;
    type Action = RabbitAction;

    fn state(&self) -> RabbitState {
        self.state
    }

    fn attempt(
        &mut self,
        edge: Edge<RabbitState, RabbitAction>,
        ctx: &mut Surroundings<'a>,
    ) -> bool {
        use RabbitAction::*;
        use RabbitState::*;

        let now = ctx.now;
        match (edge.from, edge.action) {
            (Wandering, Wait) => {
                let Some(here) = self.location.clone() else {
                    return false;
                };
                if now.since(self.last_moved) < self.idle_duration {
                    return false;
                }
                let next = ctx.home.nearby_location(&here, now, &mut *ctx.rng);
                tracing::debug!("Rabbit wanders from {} to {}", here, next);
                self.move_to(next, now);
            }
            (Spotted, Wait) => {}
            (Fleeing, Wait) => {
                if self.last_spotted.is_some() && self.since_spotted(now) < self.flee_duration {
                    return false;
                }
                let next = ctx
                    .home
                    .faraway_location(self.location.as_ref(), &mut *ctx.rng);
                tracing::debug!("Rabbit settles down at {}", next);
                self.move_to(next, now);
                self.last_spotted = None;
            }
            (_, Spot) => {
                self.last_spotted = Some(now);
            }
            (_, Kill) => {
                let Some(here) = self.location.as_ref() else {
                    return false;
                };
                if ctx.home.location_exists(here) {
                    return false;
                }
                tracing::info!("Rabbit at {} died with its location", here);
                self.leave_play();
            }
            (_, Catch) => {
                let p = catch_probability(self.since_spotted(now), self.flee_duration);
                let roll = random::roll(&mut *ctx.rng);
                if roll >= p {
                    tracing::debug!("Catch missed: rolled {:.3} against {:.3}", roll, p);
                    return false;
                }
                self.leave_play();
            }
            (_, Flee) => {
                if edge.from == Wandering {
                    self.last_spotted = Some(now);
                }
                let next = ctx
                    .home
                    .faraway_location(self.location.as_ref(), &mut *ctx.rng);
                tracing::debug!("Rabbit flees to {}", next);
                self.move_to(next, now);
            }
            _ => {}
        }

        tracing::debug!(
            "Rabbit {:?} --{:?}--> {:?}",
            edge.from,
            edge.action,
            edge.to
        );
        self.state = edge.to;
        true
    }
}
