//! Time sources for the game ledger.
//!
//! Accrual depends only on whole seconds since the Unix epoch. The game
//! reads the time through the [`Clock`] trait so tests and the simulation
//! driver can control it.
//!
//! - [`SystemClock`] reads wall-clock time.
//! - [`ManualClock`] is set and advanced explicitly. Clones share one
//!   reading, so a driver can keep a handle after moving a clone into the
//!   game.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use investor_types::Timestamp;

/// Errors that can occur when moving a [`ManualClock`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The reading would pass `u64::MAX` seconds.
    #[error("clock overflow: cannot advance {by} seconds past {now}")]
    Overflow {
        /// The current reading.
        now: Timestamp,
        /// The requested advance.
        by: u64,
    },
}

/// A source of the current time.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time via [`chrono::Utc`].
///
/// Instants before the epoch read as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A shared, explicitly driven clock.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            seconds: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Jump to `at`. Moving backwards is allowed.
    pub fn set(&self, at: Timestamp) {
        self.seconds.store(at, Ordering::SeqCst);
    }

    /// Move forward by `secs` and return the new reading.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the reading would overflow; the
    /// clock is unchanged in that case.
    pub fn advance(&self, secs: u64) -> Result<Timestamp, ClockError> {
        self.seconds
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| now.checked_add(secs))
            .map_err(|now| ClockError::Overflow { now, by: secs })
            .and_then(|previous| {
                previous
                    .checked_add(secs)
                    .ok_or(ClockError::Overflow { now: previous, by: secs })
            })
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.seconds.load(Ordering::SeqCst)
    }
}
