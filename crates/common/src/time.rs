//! Media time arithmetic.
//!
//! Every duration and position in a composition is a [`MediaTime`]: an
//! unsigned nanosecond count. Integer storage keeps repeated insert/trim
//! arithmetic exact; conversions from floating-point seconds round to the
//! nearest nanosecond.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// A point or span on a media timeline, in nanoseconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MediaTime(u64);

impl MediaTime {
    pub const ZERO: MediaTime = MediaTime(0);
    pub const MAX: MediaTime = MediaTime(u64::MAX);

    pub const fn from_nanos(ns: u64) -> Self {
        Self(ns)
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000_000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000_000_000)
    }

    /// Convert seconds to media time. Negative and NaN inputs map to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() {
            return if secs == f64::INFINITY {
                Self::MAX
            } else {
                Self::ZERO
            };
        }
        if secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * NANOS_PER_SEC).round() as u64)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, other: MediaTime) -> Option<MediaTime> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: MediaTime) -> MediaTime {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by a non-negative factor, rounding to the nearest nanosecond.
    pub fn mul_f64(self, factor: f64) -> MediaTime {
        Self::from_nanos_f64(self.0 as f64 * factor)
    }

    /// Ratio `self / other`, or `None` when `other` is zero.
    pub fn ratio(self, other: MediaTime) -> Option<f64> {
        if other.is_zero() {
            None
        } else {
            Some(self.0 as f64 / other.0 as f64)
        }
    }

    fn from_nanos_f64(ns: f64) -> Self {
        if !ns.is_finite() || ns <= 0.0 {
            return Self::ZERO;
        }
        if ns >= u64::MAX as f64 {
            return Self::MAX;
        }
        Self(ns.round() as u64)
    }
}

impl Add for MediaTime {
    type Output = MediaTime;

    fn add(self, rhs: MediaTime) -> MediaTime {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MediaTime {
    fn add_assign(&mut self, rhs: MediaTime) {
        *self = *self + rhs;
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}
