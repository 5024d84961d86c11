//! Locations
//!
//! A location is an opaque point in the forest. In the directory forest it is
//! an absolute path, compared by exact string equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A point in the forest, keyed by its full path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Builds a location from a filesystem path. Non UTF-8 components are
    /// replaced, so such directories become unreachable rather than fatal.
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// True if this location is `root` or lies underneath it.
    ///
    /// Compared component-wise, so `/home/ann2` is not within `/home/ann`.
    pub fn is_within(&self, root: &Location) -> bool {
        self.as_path().starts_with(root.as_path())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_within_is_component_wise() {
        let root = Location::new("/home/ann");

        assert!(Location::new("/home/ann").is_within(&root));
        assert!(Location::new("/home/ann/docs/notes").is_within(&root));
        assert!(!Location::new("/home").is_within(&root));
        assert!(!Location::new("/home/ann2").is_within(&root));
    }

    #[test]
    fn test_location_equality_is_exact() {
        assert_eq!(Location::from("/tmp/a"), Location::from_path(Path::new("/tmp/a")));
        assert_ne!(Location::from("/tmp/a"), Location::from("/tmp/a/"));
    }
}
