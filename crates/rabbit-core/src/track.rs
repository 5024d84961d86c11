//! Tracks
//!
//! Breadcrumbs a wandering rabbit leaves behind: which way it went from a
//! location, and when. They hint at a rabbit without revealing it, and fade
//! after a while.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::location::Location;
use crate::timestamp::Timestamp;

/// Which way a rabbit left a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDirection {
    /// Up a directory, like `cd ..`
    Ascending,
    /// Down into a child directory
    Descending,
}

/// A single set of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub direction: TrackDirection,
    pub timestamp: Timestamp,
}

impl Track {
    pub fn new(direction: TrackDirection, timestamp: Timestamp) -> Self {
        Self {
            direction,
            timestamp,
        }
    }

    pub fn age(&self, now: Timestamp) -> Duration {
        now.since(self.timestamp)
    }
}

/// Tracks keyed by the location they were left at. A newer track at the same
/// location replaces the older one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tracks {
    entries: BTreeMap<Location, Track>,
}

impl Tracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that something left `from` heading `direction` at `now`.
    pub fn leave(&mut self, from: Location, direction: TrackDirection, now: Timestamp) {
        self.entries.insert(from, Track::new(direction, now));
    }

    pub fn at(&self, loc: &Location) -> Option<&Track> {
        self.entries.get(loc)
    }

    /// Drop every track older than `fade_after`. Returns how many faded.
    pub fn fade(&mut self, now: Timestamp, fade_after: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, track| track.age(now) <= fade_after);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Location, &Track)> {
        self.entries.iter()
    }
}
