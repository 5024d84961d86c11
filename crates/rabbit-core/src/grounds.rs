//! Grounds
//!
//! The walkable part of the forest: random walks over a [`Terrain`] and the
//! tracks they leave behind. This is the [`Habitat`] rabbits see.

use rand::RngCore;
use std::time::Duration;

use crate::config::MovementConfig;
use crate::location::Location;
use crate::rabbit::Habitat;
use crate::random;
use crate::terrain::Terrain;
use crate::timestamp::Timestamp;
use crate::track::{TrackDirection, Tracks};

/// One hop of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub from: Location,
    pub to: Location,
    pub direction: TrackDirection,
}

/// Terrain plus the tracks left on it.
#[derive(Debug, Clone)]
pub struct Grounds<T> {
    terrain: T,
    tracks: Tracks,
    movement: MovementConfig,
    leave_tracks: bool,
}

impl<T: Terrain> Grounds<T> {
    pub fn new(terrain: T, movement: MovementConfig, leave_tracks: bool) -> Self {
        Self {
            terrain,
            tracks: Tracks::new(),
            movement,
            leave_tracks,
        }
    }

    /// Replaces the track table, e.g. with one loaded from a save file.
    pub fn with_tracks(mut self, tracks: Tracks) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    /// Drops tracks older than `fade_after`.
    pub fn fade_tracks(&mut self, now: Timestamp, fade_after: Duration) -> usize {
        self.tracks.fade(now, fade_after)
    }

    fn step_count(&self, rng: &mut dyn RngCore) -> usize {
        if random::chance(rng, self.movement.two_step_chance) {
            2
        } else {
            1
        }
    }

    /// One random hop from `from`: usually down, sometimes up, whichever is
    /// possible when only one is. `None` when neither is.
    pub fn step(&self, from: &Location, rng: &mut dyn RngCore) -> Option<Step> {
        let up = self.terrain.ascend(from);
        let wants_up = random::chance(rng, self.movement.ascend_chance);

        let (to, direction) = match up {
            Some(parent) if wants_up => (parent, TrackDirection::Ascending),
            up => match self.terrain.random_descent(from, rng) {
                Some(child) => (child, TrackDirection::Descending),
                None => (up?, TrackDirection::Ascending),
            },
        };

        Some(Step {
            from: from.clone(),
            to,
            direction,
        })
    }

    /// Up to `steps` random hops from `start`. Stops early if it gets stuck.
    pub fn walk(&self, start: &Location, steps: usize, rng: &mut dyn RngCore) -> Vec<Step> {
        let mut path: Vec<Step> = Vec::with_capacity(steps);
        let mut here = start.clone();
        for _ in 0..steps {
            match self.step(&here, rng) {
                Some(step) => {
                    here = step.to.clone();
                    path.push(step);
                }
                None => break,
            }
        }
        path
    }

    /// Picks a destination a step or two away from `loc`, leaving tracks
    /// along the way.
    ///
    /// A two-step walk can come straight back (up, then down into the same
    /// child). That walk is discarded and one single step is taken instead,
    /// which can never end where it started. Only when `loc` is completely
    /// boxed in is `loc` itself returned.
    pub fn nearby(&mut self, loc: &Location, now: Timestamp, rng: &mut dyn RngCore) -> Location {
        let plans: &[usize] = if self.step_count(rng) == 2 { &[2, 1] } else { &[1] };

        for &steps in plans {
            let path = self.walk(loc, steps, rng);
            let Some(last) = path.last() else {
                tracing::debug!("Nowhere to go from {}", loc);
                return loc.clone();
            };
            if last.to == *loc {
                tracing::trace!("Walk from {} came back around, retrying", loc);
                continue;
            }

            let destination = last.to.clone();
            if self.leave_tracks {
                for step in path {
                    self.tracks.leave(step.from, step.direction, now);
                }
            }
            return destination;
        }

        loc.clone()
    }

    /// Picks a destination by starting over at the root and descending one
    /// or two levels. Leaves no tracks.
    ///
    /// If that lands on `avoid`, one more try is made with the other step
    /// count. Small trees may still give back `avoid`.
    pub fn faraway(&self, avoid: Option<&Location>, rng: &mut dyn RngCore) -> Location {
        let steps = self.step_count(rng);
        let destination = self.descend_from_root(steps, rng);
        if avoid != Some(&destination) {
            return destination;
        }
        self.descend_from_root(3 - steps, rng)
    }

    fn descend_from_root(&self, steps: usize, rng: &mut dyn RngCore) -> Location {
        let mut here = self.terrain.root().clone();
        for _ in 0..steps {
            match self.terrain.random_descent(&here, rng) {
                Some(child) => here = child,
                None => break,
            }
        }
        here
    }
}

impl<T: Terrain> Habitat for Grounds<T> {
    fn location_exists(&self, loc: &Location) -> bool {
        self.terrain.exists(loc)
    }

    fn nearby_location(&mut self, loc: &Location, now: Timestamp, rng: &mut dyn RngCore) -> Location {
        self.nearby(loc, now, rng)
    }

    fn faraway_location(&mut self, avoid: Option<&Location>, rng: &mut dyn RngCore) -> Location {
        self.faraway(avoid, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::DirectoryTerrain;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn loc(root: &Path, rel: &str) -> Location {
        if rel.is_empty() {
            Location::from_path(root)
        } else {
            Location::from_path(&root.join(rel))
        }
    }

    /// root/{a/{a1,a2},b/b1/b11,c}
    fn sample_tree() -> TempDir {
        let dir = tempdir().unwrap();
        for rel in ["a/a1", "a/a2", "b/b1/b11", "c"] {
            fs::create_dir_all(dir.path().join(rel)).unwrap();
        }
        dir
    }

    fn grounds(dir: &TempDir, movement: MovementConfig) -> Grounds<DirectoryTerrain> {
        Grounds::new(DirectoryTerrain::new(dir.path()), movement, true)
    }

    #[test]
    fn test_step_falls_back_to_only_direction() {
        let dir = sample_tree();
        let always_up = MovementConfig {
            ascend_chance: 1.0,
            two_step_chance: 0.0,
        };
        let always_down = MovementConfig {
            ascend_chance: 0.0,
            two_step_chance: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);

        // Root cannot go up, so it goes down.
        let step = grounds(&dir, always_up.clone())
            .step(&loc(dir.path(), ""), &mut rng)
            .unwrap();
        assert_eq!(step.direction, TrackDirection::Descending);

        // A leaf cannot go down, so it goes up.
        let step = grounds(&dir, always_down)
            .step(&loc(dir.path(), "c"), &mut rng)
            .unwrap();
        assert_eq!(step.to, loc(dir.path(), ""));
        assert_eq!(step.direction, TrackDirection::Ascending);

        // Preferred direction when both are open.
        let step = grounds(&dir, always_up)
            .step(&loc(dir.path(), "b/b1"), &mut rng)
            .unwrap();
        assert_eq!(step.to, loc(dir.path(), "b"));
    }

    #[test]
    fn test_boxed_in_stays_put() {
        let dir = tempdir().unwrap();
        let mut grounds = grounds(&dir, MovementConfig::default());
        let root = loc(dir.path(), "");
        let mut rng = StdRng::seed_from_u64(2);

        assert!(grounds.step(&root, &mut rng).is_none());
        assert_eq!(grounds.nearby(&root, Timestamp::from_millis(0), &mut rng), root);
        assert!(grounds.tracks().is_empty());
    }

    #[test]
    fn test_nearby_never_returns_start_when_movable() {
        let dir = sample_tree();
        let mut grounds = grounds(&dir, MovementConfig::default());
        let mut rng = StdRng::seed_from_u64(3);

        for rel in ["", "a", "a/a1", "b", "b/b1", "b/b1/b11", "c"] {
            let start = loc(dir.path(), rel);
            for _ in 0..200 {
                let next = grounds.nearby(&start, Timestamp::from_millis(0), &mut rng);
                assert_ne!(next, start, "walk from {:?} went nowhere", rel);
                assert!(next.is_within(grounds.terrain().root()));
            }
        }
    }

    #[test]
    fn test_two_step_walk_back_is_retried() {
        // From a leaf with a single sibling-free parent, up-then-down always
        // comes straight back.
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("only/leaf")).unwrap();
        let movement = MovementConfig {
            ascend_chance: 0.0,
            two_step_chance: 1.0,
        };
        let mut grounds = grounds(&dir, movement);
        let leaf = loc(dir.path(), "only/leaf");
        let mut rng = StdRng::seed_from_u64(4);

        let next = grounds.nearby(&leaf, Timestamp::from_millis(0), &mut rng);

        assert_eq!(next, loc(dir.path(), "only"));
    }

    #[test]
    fn test_nearby_leaves_tracks() {
        let dir = sample_tree();
        let movement = MovementConfig {
            ascend_chance: 1.0,
            two_step_chance: 0.0,
        };
        let mut grounds = grounds(&dir, movement);
        let start = loc(dir.path(), "b/b1/b11");
        let now = Timestamp::from_millis(1_234);
        let mut rng = StdRng::seed_from_u64(5);

        let next = grounds.nearby(&start, now, &mut rng);

        assert_eq!(next, loc(dir.path(), "b/b1"));
        let track = grounds.tracks().at(&start).unwrap();
        assert_eq!(track.direction, TrackDirection::Ascending);
        assert_eq!(track.timestamp, now);
    }

    #[test]
    fn test_tracks_can_be_disabled() {
        let dir = sample_tree();
        let mut grounds = Grounds::new(DirectoryTerrain::new(dir.path()), MovementConfig::default(), false);
        let mut rng = StdRng::seed_from_u64(6);

        grounds.nearby(&loc(dir.path(), "a"), Timestamp::from_millis(0), &mut rng);

        assert!(grounds.tracks().is_empty());
    }

    #[test]
    fn test_faraway_only_descends_from_root() {
        let dir = sample_tree();
        let grounds = grounds(&dir, MovementConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let root = loc(dir.path(), "");

        for _ in 0..200 {
            let far = grounds.faraway(None, &mut rng);
            let depth = far
                .as_path()
                .strip_prefix(root.as_path())
                .unwrap()
                .components()
                .count();
            assert!((1..=2).contains(&depth), "{} is {} deep", far, depth);
            assert!(grounds.terrain().exists(&far));
        }
    }

    #[test]
    fn test_faraway_retries_away_from_avoided() {
        // root/x/y: one step gives x, two steps give y. Avoiding either one
        // always yields the other.
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x/y")).unwrap();
        let grounds = grounds(&dir, MovementConfig::default());
        let x = loc(dir.path(), "x");
        let y = loc(dir.path(), "x/y");
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..50 {
            assert_eq!(grounds.faraway(Some(&x), &mut rng), y);
            assert_eq!(grounds.faraway(Some(&y), &mut rng), x);
        }
    }

    #[test]
    fn test_faraway_accepts_unavoidable_repeat() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("x")).unwrap();
        let grounds = grounds(&dir, MovementConfig::default());
        let x = loc(dir.path(), "x");
        let mut rng = StdRng::seed_from_u64(9);

        assert_eq!(grounds.faraway(Some(&x), &mut rng), x);
    }

    #[test]
    fn test_habitat_reports_deleted_location() {
        let dir = sample_tree();
        let grounds = grounds(&dir, MovementConfig::default());
        let c = loc(dir.path(), "c");

        assert!(grounds.location_exists(&c));
        fs::remove_dir(c.as_path()).unwrap();
        assert!(!grounds.location_exists(&c));
    }
}
