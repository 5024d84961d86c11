//! Wall-Clock Timestamps
//!
//! Nothing in the forest ticks on its own. Every timer is a stored timestamp
//! compared against "now" the next time a rabbit is woken up.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rabbit_core::Timestamp;
//!
//! let spotted = Timestamp::from_millis(1_000);
//! let later = spotted + Duration::from_secs(2);
//! assert_eq!(later.since(spotted), Duration::from_secs(2));
//! assert_eq!(spotted.since(later), Duration::ZERO);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in wall-clock time, stored as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// The current wall-clock time. Clocks set before 1970 read as the epoch.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(millis)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` until `self`.
    ///
    /// Never negative: if `earlier` lies in the future (clock skew between
    /// invocations) the result is zero.
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let millis = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
