//! Rabbit hunting in a directory forest.
//!
//! Rabbits live in the directories under a root and wander between them
//! while nobody is looking. Checking a directory can spot one; a spotted
//! rabbit can be caught or tagged before it gets away. Delete a directory
//! with a rabbit in it and the rabbit is gone for good.

pub mod config;
pub mod forest;
pub mod grounds;
pub mod location;
pub mod machine;
pub mod rabbit;
pub mod random;
pub mod save;
pub mod terrain;
pub mod timestamp;
pub mod track;

pub use config::{ConfigError, HuntConfig};
pub use forest::{Forest, Tally};
pub use location::Location;
pub use machine::{Machine, Pattern, Stateful};
pub use rabbit::{Rabbit, RabbitAction, RabbitState};
pub use save::{ForestRecord, SaveError, SaveFile};
pub use terrain::{DirectoryTerrain, Terrain};
pub use timestamp::Timestamp;
pub use track::TrackDirection;
