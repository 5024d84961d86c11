//! Save File
//!
//! The forest as it is written to disk between invocations: the rabbit
//! registry, the track table and the lifetime counters. The terrain and the
//! transition table are never saved; they are rebuilt around the record on
//! load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::location::Location;
use crate::rabbit::Rabbit;
use crate::track::Tracks;

/// Serialized forest state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForestRecord {
    /// Live rabbits keyed by where they are
    #[serde(default)]
    pub rabbits: BTreeMap<Location, Rabbit>,
    #[serde(default)]
    pub tracks: Tracks,
    #[serde(default)]
    pub spotted_count: u64,
    #[serde(default)]
    pub caught_count: u64,
    #[serde(default)]
    pub killed_count: u64,
}

/// A save file on disk.
#[derive(Debug, Clone)]
pub struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record. A file that does not exist yet is a fresh forest,
    /// anything else that goes wrong is an error.
    pub fn load(&self) -> Result<ForestRecord, SaveError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No save at {}, starting fresh", self.path.display());
                return Ok(ForestRecord::default());
            }
            Err(e) => return Err(SaveError::Io(e)),
        };
        let record: ForestRecord = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(
            "Loaded {} rabbits and {} tracks from {}",
            record.rabbits.len(),
            record.tracks.len(),
            self.path.display()
        );
        Ok(record)
    }

    /// Writes the record, replacing whatever was there.
    pub fn store(&self, record: &ForestRecord) -> Result<(), SaveError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record)?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors reading or writing a save file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt save data: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use crate::track::TrackDirection;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_fresh_forest() {
        let dir = tempdir().unwrap();
        let save = SaveFile::new(dir.path().join(".rabbit"));

        assert_eq!(save.load().unwrap(), ForestRecord::default());
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempdir().unwrap();
        let save = SaveFile::new(dir.path().join(".rabbit"));
        let burrow = Location::new("/home/ann/burrow");

        let mut record = ForestRecord {
            spotted_count: 7,
            caught_count: 2,
            killed_count: 1,
            ..ForestRecord::default()
        };
        record
            .rabbits
            .insert(burrow.clone(), Rabbit::new(burrow.clone(), Timestamp::from_millis(5)));
        record
            .tracks
            .leave(burrow.clone(), TrackDirection::Descending, Timestamp::from_millis(6));

        save.store(&record).unwrap();
        let loaded = save.load().unwrap();

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".rabbit");
        std::fs::write(&path, "{ not json").unwrap();

        let result = SaveFile::new(&path).load();

        assert!(matches!(result, Err(SaveError::Json(_))));
    }

    #[test]
    fn test_missing_fields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".rabbit");
        std::fs::write(&path, r#"{"caught_count": 3}"#).unwrap();

        let record = SaveFile::new(&path).load().unwrap();

        assert_eq!(record.caught_count, 3);
        assert!(record.rabbits.is_empty());
        assert!(record.tracks.is_empty());
    }

    #[test]
    fn test_store_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let save = SaveFile::new(dir.path().join("nope").join(".rabbit"));

        assert!(matches!(save.store(&ForestRecord::default()), Err(SaveError::Io(_))));
    }
}
