//! Narrator
//!
//! Runs one player action against the forest and tells the player what
//! happened.

use rand::RngCore;
use std::io::{self, Write};

use rabbit_core::{Forest, Location, RabbitState, Terrain, Timestamp, TrackDirection};

use crate::art::{caught_flavor, killed_flavor, rabbit_art, spotted_flavor};

pub struct Narrator<W> {
    out: W,
    ascii: bool,
}

impl<W: Write> Narrator<W> {
    /// `ascii` adds a picture of the rabbit to every encounter.
    pub fn new(out: W, ascii: bool) -> Self {
        Self { out, ascii }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Looks around `here`. Reports a spotted rabbit, or tracks if there
    /// are any. Says nothing when there is nothing to see.
    pub fn check<T: Terrain>(
        &mut self,
        forest: &mut Forest<T>,
        here: &Location,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> io::Result<()> {
        if let Some(rabbit) = forest.perform_check(here, now, rng) {
            match rabbit.tag() {
                Some(tag) => writeln!(self.out, "You see the {} rabbit!", tag)?,
                None => writeln!(self.out, "A rabbit is here!!")?,
            }
            return self.picture(RabbitState::Spotted);
        }

        match forest.tracks_here(here) {
            Some(TrackDirection::Ascending) => writeln!(self.out, "You find tracks leading up."),
            Some(TrackDirection::Descending) => writeln!(self.out, "You find tracks leading down."),
            None => Ok(()),
        }
    }

    pub fn catch<T: Terrain>(
        &mut self,
        forest: &mut Forest<T>,
        here: &Location,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> io::Result<()> {
        if !forest.is_rabbit_here(here) {
            return writeln!(self.out, "There are no rabbits here.");
        }
        if forest.perform_catch(here, now, rng) {
            writeln!(self.out, "You caught the rabbit!")?;
            self.picture(RabbitState::Caught)
        } else {
            writeln!(self.out, "The rabbit got away...")?;
            self.picture(RabbitState::Fleeing)
        }
    }

    pub fn tag<T: Terrain>(
        &mut self,
        forest: &mut Forest<T>,
        here: &Location,
        name: &str,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> io::Result<()> {
        if !forest.is_rabbit_here(here) {
            return writeln!(self.out, "There are no rabbits here.");
        }
        if forest.perform_tag(here, name, now, rng) {
            writeln!(self.out, "You successfully tagged the rabbit!")?;
            self.picture(RabbitState::Wandering)
        } else {
            writeln!(self.out, "The rabbit got away...")?;
            self.picture(RabbitState::Fleeing)
        }
    }

    pub fn stats<T: Terrain>(&mut self, forest: &Forest<T>) -> io::Result<()> {
        let tally = forest.tally();
        writeln!(self.out, "Rabbits")?;
        self.stat_line("spotted:", tally.spotted, spotted_flavor(tally.spotted))?;
        self.stat_line("caught:", tally.caught, caught_flavor(tally.caught))?;
        self.stat_line("killed:", tally.killed, killed_flavor(tally.killed))
    }

    fn stat_line(&mut self, label: &str, count: u64, flavor: &str) -> io::Result<()> {
        let line = format!("...{:<12}{} {}", label, count, flavor);
        writeln!(self.out, "{}", line.trim_end())
    }

    fn picture(&mut self, state: RabbitState) -> io::Result<()> {
        if self.ascii {
            self.out.write_all(rabbit_art(state).as_bytes())?;
        }
        Ok(())
    }
}
