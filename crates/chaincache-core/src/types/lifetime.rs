//! Entry lifetimes and their wire encodings

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Lifetimes above this many seconds are sent as absolute unix timestamps.
///
/// Memcached and most protocols modelled on it read an expiry value up to
/// 30 days as relative seconds and anything larger as a point in time.
pub const MAX_RELATIVE_EXPIRY_SECS: u64 = 30 * 24 * 3600;

/// Lifetime of a cache entry in seconds, `0` meaning "never expires"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lifetime(u64);

impl Lifetime {
    /// Entry never expires
    pub const FOREVER: Lifetime = Lifetime(0);

    /// Create a lifetime of `secs` seconds (`0` = forever)
    pub const fn from_secs(secs: u64) -> Self {
        Lifetime(secs)
    }

    /// Lifetime in seconds
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Check if the entry never expires
    pub const fn is_forever(&self) -> bool {
        self.0 == 0
    }

    /// Relative duration, `None` for [`Lifetime::FOREVER`]
    pub fn as_duration(&self) -> Option<Duration> {
        if self.is_forever() {
            None
        } else {
            Some(Duration::from_secs(self.0))
        }
    }

    /// Encode for a store that takes memcached-style expiry values
    ///
    /// `now_unix` is the current unix time in seconds.
    pub fn expiry_at(&self, now_unix: u64) -> Expiry {
        match self.0 {
            0 => Expiry::Never,
            secs if secs > MAX_RELATIVE_EXPIRY_SECS => {
                Expiry::Absolute(now_unix.saturating_add(secs))
            }
            secs => Expiry::Relative(secs),
        }
    }

    /// Same as [`Lifetime::expiry_at`] using the system clock
    pub fn expiry(&self) -> Expiry {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.expiry_at(now)
    }
}

impl From<u64> for Lifetime {
    fn from(secs: u64) -> Self {
        Lifetime(secs)
    }
}

impl From<Duration> for Lifetime {
    /// Sub-second remainders round up so a short TTL never becomes "forever".
    fn from(ttl: Duration) -> Self {
        let mut secs = ttl.as_secs();
        if ttl.subsec_nanos() > 0 {
            secs = secs.saturating_add(1);
        }
        Lifetime(secs)
    }
}

/// Expiry value as understood by the underlying store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// No expiry
    Never,
    /// Seconds from now
    Relative(u64),
    /// Unix timestamp in seconds
    Absolute(u64),
}

impl Expiry {
    /// Single integer form used by memcached-like protocols
    pub fn protocol_value(&self) -> u64 {
        match *self {
            Expiry::Never => 0,
            Expiry::Relative(secs) | Expiry::Absolute(secs) => secs,
        }
    }
}
