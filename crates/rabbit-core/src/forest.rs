//! Forest
//!
//! The rabbit registry plus everything around it: the grounds rabbits roam,
//! the transition table they run on, population control and the lifetime
//! tally. Every player action is one call into the forest.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::HuntConfig;
use crate::grounds::Grounds;
use crate::location::Location;
use crate::rabbit::{rabbit_machine, Habitat, Rabbit, RabbitMachine, RabbitState, Surroundings};
use crate::random;
use crate::save::ForestRecord;
use crate::terrain::Terrain;
use crate::timestamp::Timestamp;
use crate::track::{TrackDirection, Tracks};

/// How many placements in a row may land on taken spots before filling the
/// forest gives up for this round. Small trees run out of free spots.
const MAX_SPAWN_MISSES: usize = 8;

/// Lifetime counters. They only ever go up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub spotted: u64,
    pub caught: u64,
    pub killed: u64,
}

/// A forest of rabbits over some terrain.
pub struct Forest<T> {
    grounds: Grounds<T>,
    machine: RabbitMachine,
    rabbits: BTreeMap<Location, Rabbit>,
    config: HuntConfig,
    tally: Tally,
}

impl<T: Terrain> Forest<T> {
    /// An empty forest. It fills up on the first check.
    pub fn new(terrain: T, config: HuntConfig) -> Self {
        let grounds = Grounds::new(terrain, config.movement.clone(), config.tracks.enabled);
        Self {
            grounds,
            machine: rabbit_machine(),
            rabbits: BTreeMap::new(),
            config,
            tally: Tally::default(),
        }
    }

    /// Rebuilds a forest from a saved record.
    ///
    /// Rabbits are re-keyed by their own location, so a record edited by hand
    /// cannot put a rabbit somewhere it is not. Rabbits out of play are dropped.
    pub fn restore(record: ForestRecord, terrain: T, config: HuntConfig) -> Self {
        let mut forest = Self::new(terrain, config);
        forest.grounds = forest.grounds.with_tracks(record.tracks);
        forest.tally = Tally {
            spotted: record.spotted_count,
            caught: record.caught_count,
            killed: record.killed_count,
        };
        for rabbit in record.rabbits.into_values() {
            forest.release(rabbit);
        }
        forest
    }

    pub fn to_record(&self) -> ForestRecord {
        ForestRecord {
            rabbits: self.rabbits.clone(),
            tracks: self.grounds.tracks().clone(),
            spotted_count: self.tally.spotted,
            caught_count: self.tally.caught,
            killed_count: self.tally.killed,
        }
    }

    /// Puts `rabbit` into the registry under its location. Returns the rabbit
    /// it displaced, if any. Rabbits out of play are not kept.
    pub fn release(&mut self, rabbit: Rabbit) -> Option<Rabbit> {
        if !rabbit.is_playing() {
            return None;
        }
        let loc = rabbit.location()?.clone();
        let displaced = self.rabbits.insert(loc.clone(), rabbit);
        if displaced.is_some() {
            tracing::warn!("Two rabbits ended up at {}; one was lost", loc);
        }
        displaced
    }

    /// Looks around `here`.
    ///
    /// Every rabbit wakes up and may move, die or get spotted. The registry
    /// is rebuilt from where they ended up, then the forest is topped up and
    /// old tracks fade. Returns the rabbit spotted at `here`, if any.
    pub fn perform_check(
        &mut self,
        here: &Location,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> Option<Rabbit> {
        let mut spotted = None;

        for (_, mut rabbit) in std::mem::take(&mut self.rabbits) {
            let mut ctx = Surroundings {
                machine: &self.machine,
                home: &mut self.grounds,
                rng: &mut *rng,
                now,
            };
            rabbit.disturbance_at(here, &mut ctx);

            if rabbit.just_spotted() {
                self.tally.spotted += 1;
                spotted = Some(rabbit.clone());
            }
            self.settle(rabbit);
        }

        self.repopulate(now, rng);
        self.fade_tracks(now);

        spotted
    }

    /// Grabs for the rabbit at `here`. Returns whether it was caught.
    pub fn perform_catch(&mut self, here: &Location, now: Timestamp, rng: &mut dyn RngCore) -> bool {
        self.fade_tracks(now);

        let Some(mut rabbit) = self.rabbits.remove(here) else {
            return false;
        };
        let mut ctx = Surroundings {
            machine: &self.machine,
            home: &mut self.grounds,
            rng,
            now,
        };
        let caught = rabbit.try_catch(here, &mut ctx);

        if caught {
            self.tally.caught += 1;
            tracing::info!("Rabbit caught at {}", here);
        }
        self.settle(rabbit);
        caught
    }

    /// Tags the rabbit at `here` with `tag`. Returns whether there was one to
    /// tag.
    pub fn perform_tag(
        &mut self,
        here: &Location,
        tag: &str,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> bool {
        self.fade_tracks(now);

        let Some(mut rabbit) = self.rabbits.remove(here) else {
            return false;
        };
        let mut ctx = Surroundings {
            machine: &self.machine,
            home: &mut self.grounds,
            rng,
            now,
        };
        let tagged = rabbit.try_tag(here, tag, &mut ctx);

        if tagged {
            tracing::info!("Rabbit at {} tagged {:?}", here, tag);
        }
        self.settle(rabbit);
        tagged
    }

    pub fn is_rabbit_here(&self, here: &Location) -> bool {
        self.rabbits.contains_key(here)
    }

    pub fn rabbit_at(&self, here: &Location) -> Option<&Rabbit> {
        self.rabbits.get(here)
    }

    /// Which way the tracks at `here` lead, if there are any.
    pub fn tracks_here(&self, here: &Location) -> Option<TrackDirection> {
        self.grounds.tracks().at(here).map(|track| track.direction)
    }

    pub fn rabbits(&self) -> impl Iterator<Item = &Rabbit> {
        self.rabbits.values()
    }

    pub fn len(&self) -> usize {
        self.rabbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rabbits.is_empty()
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn tracks(&self) -> &Tracks {
        self.grounds.tracks()
    }

    pub fn terrain(&self) -> &T {
        self.grounds.terrain()
    }

    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    pub fn location_exists(&self, loc: &Location) -> bool {
        self.grounds.location_exists(loc)
    }

    pub fn nearby_location(&mut self, loc: &Location, now: Timestamp, rng: &mut dyn RngCore) -> Location {
        self.grounds.nearby_location(loc, now, rng)
    }

    pub fn faraway_location(&mut self, avoid: Option<&Location>, rng: &mut dyn RngCore) -> Location {
        self.grounds.faraway_location(avoid, rng)
    }

    /// Files a rabbit back into the registry after an interaction, or counts
    /// it out if it left play.
    fn settle(&mut self, rabbit: Rabbit) {
        match rabbit.state() {
            RabbitState::Dead => self.tally.killed += 1,
            RabbitState::Caught => {}
            _ => {
                self.release(rabbit);
            }
        }
    }

    /// Tops the forest up to its floor, then maybe adds one more.
    fn repopulate(&mut self, now: Timestamp, rng: &mut dyn RngCore) {
        let population = &self.config.population;
        let floor = population.floor();
        let ceiling = population.max_rabbits;
        let spawn_chance = population.spawn_chance;

        let mut misses = 0;
        while self.rabbits.len() < floor && misses < MAX_SPAWN_MISSES {
            if self.spawn(now, rng) {
                misses = 0;
            } else {
                misses += 1;
            }
        }
        if self.rabbits.len() < floor {
            tracing::debug!(
                "Only room for {} of {} rabbits",
                self.rabbits.len(),
                floor
            );
        }

        if self.rabbits.len() < ceiling && random::chance(rng, spawn_chance) {
            self.spawn(now, rng);
        }
    }

    /// Places a new rabbit somewhere far off. Never evicts a rabbit already
    /// living there.
    fn spawn(&mut self, now: Timestamp, rng: &mut dyn RngCore) -> bool {
        let timing = &self.config.timing;
        let (idle, flee) = (timing.idle_duration(), timing.flee_duration());
        let rabbit = Rabbit::spawn(&mut self.grounds, rng, now).with_durations(idle, flee);

        let Some(loc) = rabbit.location().cloned() else {
            return false;
        };
        if self.rabbits.contains_key(&loc) {
            tracing::trace!("Spawn spot {} is taken", loc);
            return false;
        }

        tracing::info!("A rabbit appears at {}", loc);
        self.rabbits.insert(loc, rabbit);
        true
    }

    fn fade_tracks(&mut self, now: Timestamp) {
        let fade_after = self
            .config
            .tracks
            .fade_after(self.config.timing.idle_duration());
        let faded = self.grounds.fade_tracks(now, fade_after);
        if faded > 0 {
            tracing::trace!("{} tracks faded", faded);
        }
    }
}
