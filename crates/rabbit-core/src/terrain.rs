//! Terrain
//!
//! The shape of the forest: which locations exist, what lies below a location
//! and what lies above it. Answers are never cached; a directory deleted
//! between two calls simply stops existing.

use std::fs;
use std::path::Path;

use rand::RngCore;

use crate::location::Location;
use crate::random;

/// Read-only view of a tree of locations bounded by a root.
pub trait Terrain {
    /// The topmost location. Nothing above it can be reached by ascending.
    fn root(&self) -> &Location;

    /// True iff `loc` currently names an accessible container.
    fn exists(&self, loc: &Location) -> bool;

    /// Visible child containers of `loc`, sorted.
    fn children(&self, loc: &Location) -> Vec<Location>;

    /// Immediate parent of `loc`, ignoring the root boundary.
    fn parent(&self, loc: &Location) -> Option<Location>;

    fn can_descend(&self, loc: &Location) -> bool {
        !self.children(loc).is_empty()
    }

    /// Ascending is allowed while the parent stays inside the root.
    fn can_ascend(&self, loc: &Location) -> bool {
        self.ascend(loc).is_some()
    }

    /// The parent of `loc` if ascending to it is legal.
    fn ascend(&self, loc: &Location) -> Option<Location> {
        self.parent(loc).filter(|parent| parent.is_within(self.root()))
    }

    /// A uniformly chosen child of `loc`, or `None` when there is nowhere to
    /// descend. Callers are expected to check [`Terrain::can_descend`] first.
    fn random_descent(&self, loc: &Location, rng: &mut dyn RngCore) -> Option<Location> {
        random::pick(rng, &self.children(loc)).cloned()
    }
}

/// Terrain backed by the live filesystem, bounded by a home directory.
#[derive(Debug, Clone)]
pub struct DirectoryTerrain {
    root: Location,
}

impl DirectoryTerrain {
    /// Creates a terrain rooted at `root`, which should be absolute.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Location::from_path(root.as_ref()),
        }
    }
}

impl Terrain for DirectoryTerrain {
    fn root(&self) -> &Location {
        &self.root
    }

    fn exists(&self, loc: &Location) -> bool {
        fs::metadata(loc.as_path())
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn children(&self, loc: &Location) -> Vec<Location> {
        let entries = match fs::read_dir(loc.as_path()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::trace!("Cannot list {}: {}", loc, e);
                return Vec::new();
            }
        };

        // file_type() does not follow symlinks, so linked directories are
        // not walked into.
        let mut dirs: Vec<Location> = entries
            .filter_map(Result::ok)
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| Location::from_path(&entry.path()))
            .collect();
        dirs.sort();
        dirs
    }

    fn parent(&self, loc: &Location) -> Option<Location> {
        loc.as_path().parent().map(Location::from_path)
    }
}
